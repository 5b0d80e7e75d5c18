//! AV metadata
//!
//! Extracts labeled, ordered, presentable metadata (title, creators,
//! description, tracks, links, access restrictions) from bibliographic MARC
//! records, driven by a configurable table of field definitions.

pub mod config;
pub mod error;
pub mod fields;
pub mod identifiers;
pub mod marc;
pub mod metadata;
pub mod restrictions;
pub mod tracks;

pub use config::AppConfig;
pub use error::{MetadataError, MetadataResult};
pub use fields::{FieldDefinition, FieldRegistry, Value};
pub use identifiers::{IdentifierType, RecordIdentifier};
pub use marc::MarcRecord;
pub use metadata::Metadata;
pub use restrictions::RestrictionsResult;
pub use tracks::{Duration, Track};
