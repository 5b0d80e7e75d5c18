//! MARC record model and subfield grouping
//!
//! Records come in already parsed (or through the ISO 2709 reader here);
//! grouping rebuilds the repeated entries packed into a single field.

pub mod grouper;
pub mod parser;

pub use grouper::{group, SubfieldGroup};
pub use parser::{DataField, MarcRecord, Subfield};
