//! Applies a field definition to a record

use crate::marc::{group, DataField, MarcRecord, Subfield, SubfieldGroup};

use super::definition::{FieldDefinition, SubfieldSelector};
use super::value::{Entry, Link, Value};

/// Subfield holding a link target
pub const URL_CODE: char = 'u';
/// Subfields holding link text, by precedence
pub const BODY_CODES: [char; 2] = ['y', 'z'];

/// Extract the value a definition describes, if the record has any
pub fn extract(definition: &FieldDefinition, record: &MarcRecord) -> Option<Value> {
    let entries: Vec<Entry> = record
        .fields(&definition.tag)
        .filter(|field| definition.matches(field))
        .flat_map(|field| groups_for(definition, field))
        .flat_map(|g| entries_for(definition, g))
        .collect();

    Value::new(definition, entries)
}

/// The groups one matching field contributes, in order
pub fn groups_for(definition: &FieldDefinition, field: &DataField) -> Vec<SubfieldGroup> {
    match &definition.selector {
        SubfieldSelector::All => {
            let whole = SubfieldGroup::from_field(field);
            if whole.is_empty() {
                Vec::new()
            } else {
                vec![whole]
            }
        }
        SubfieldSelector::Codes(codes) => {
            let selected: Vec<Subfield> = field
                .subfields
                .iter()
                .filter(|sf| codes.contains(&sf.code))
                .cloned()
                .collect();
            group(&selected, definition.grouping_order())
        }
    }
}

/// Turn a group into entries: an optional link, then the joined remainder
fn entries_for(definition: &FieldDefinition, mut g: SubfieldGroup) -> Vec<Entry> {
    let mut entries = Vec::new();

    if definition.links {
        if let Some(url) = g.take(URL_CODE).map(|u| u.trim().to_string()) {
            if !url.is_empty() {
                let body = BODY_CODES.iter().find_map(|code| g.take(*code));
                entries.push(Entry::Link(Link::new(url, body.as_deref())));
            }
        }
    }

    let text = g.join(&definition.separator);
    if !text.is_empty() {
        entries.push(Entry::Text(text));
    }

    entries
}
