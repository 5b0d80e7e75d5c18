//! Field definitions, the registry of them, and extraction of values

pub mod definition;
pub mod extractor;
pub mod registry;
pub mod value;

pub use definition::{FieldDefinition, SubfieldSelector};
pub use extractor::extract;
pub use registry::FieldRegistry;
pub use value::{Entry, Link, Value};
