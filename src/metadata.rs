//! Metadata of one record: labeled values, tracks and access restrictions

use std::fmt;

use once_cell::unsync::OnceCell;

use crate::config::CatalogConfig;
use crate::fields::definition::{self, DESCRIPTION_LABEL, DESCRIPTION_TAG, TITLE_LABEL, TITLE_TAG};
use crate::fields::{extract, Entry, FieldRegistry, Link, Value};
use crate::identifiers::RecordIdentifier;
use crate::marc::MarcRecord;
use crate::restrictions::{self, RestrictionsResult};
use crate::tracks::{tracks_from, Track};

/// Presentable metadata assembled from a parsed record.
///
/// Values and tracks are computed on first access and kept for the life of
/// this object.
pub struct Metadata<'r> {
    record: MarcRecord,
    registry: &'r FieldRegistry,
    catalog: &'r CatalogConfig,
    identifier: Option<RecordIdentifier>,
    values: OnceCell<Vec<Value>>,
    tracks: OnceCell<Vec<Track>>,
}

impl<'r> Metadata<'r> {
    /// The identifier is taken from the record itself when it has one
    pub fn new(record: MarcRecord, registry: &'r FieldRegistry, catalog: &'r CatalogConfig) -> Self {
        let identifier = RecordIdentifier::from_record(&record);
        Self {
            record,
            registry,
            catalog,
            identifier,
            values: OnceCell::new(),
            tracks: OnceCell::new(),
        }
    }

    /// Use the identifier the record was requested by
    pub fn with_identifier(mut self, identifier: RecordIdentifier) -> Self {
        self.identifier = Some(identifier);
        self.values = OnceCell::new();
        self
    }

    pub fn record(&self) -> &MarcRecord {
        &self.record
    }

    pub fn identifier(&self) -> Option<&RecordIdentifier> {
        self.identifier.as_ref()
    }

    /// Catalog page of the record, if its identifier is known
    pub fn catalog_url(&self) -> Option<String> {
        self.identifier.as_ref().map(|id| id.catalog_url(self.catalog))
    }

    /// Values in registry order, with a catalog link added when missing
    pub fn values(&self) -> &[Value] {
        self.values.get_or_init(|| {
            let mut values: Vec<Value> = self
                .registry
                .fields()
                .iter()
                .filter_map(|def| extract(def, &self.record))
                .collect();
            if let Some(url) = self.catalog_url() {
                inject_catalog_link(&mut values, Link::new(url, Some(self.catalog.link_body.as_str())));
            }
            values
        })
    }

    pub fn tracks(&self) -> &[Track] {
        self.tracks.get_or_init(|| tracks_from(&self.record))
    }

    pub fn restrictions(&self) -> RestrictionsResult {
        restrictions::evaluate(&self.record)
    }

    pub fn title(&self) -> Option<&str> {
        self.first_line(TITLE_TAG, TITLE_LABEL)
    }

    pub fn description(&self) -> Option<&str> {
        self.first_line(DESCRIPTION_TAG, DESCRIPTION_LABEL)
    }

    fn first_line(&self, tag: &str, label: &str) -> Option<&str> {
        self.values()
            .iter()
            .filter(|v| v.tag == tag && v.label == label)
            .find_map(|v| v.lines().next())
    }
}

impl fmt::Display for Metadata<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in self.values() {
            writeln!(f, "{}", value)?;
        }
        Ok(())
    }
}

fn same_url(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}

/// Add `link` to the catalog link value unless some value already points there
fn inject_catalog_link(values: &mut Vec<Value>, link: Link) {
    if values
        .iter()
        .flat_map(|v| v.links())
        .any(|existing| same_url(&existing.url, &link.url))
    {
        return;
    }

    let target = definition::catalog_link();
    tracing::debug!("Adding catalog link {}", link.url);
    match values
        .iter()
        .position(|v| v.tag == target.tag && v.label == target.label)
    {
        Some(pos) => values[pos] = values[pos].with_entry(Entry::Link(link)),
        None => {
            let pos = values
                .iter()
                .position(|v| v.order > target.order)
                .unwrap_or(values.len());
            if let Some(value) = Value::new(&target, vec![Entry::Link(link)]) {
                values.insert(pos, value);
            }
        }
    }
}
