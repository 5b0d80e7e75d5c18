//! Field registry: standard definitions merged with the JSON field configuration
//!
//! The configuration document is an array of entries shaped like
//!
//! ```json
//! {
//!   "order": 4,
//!   "visible": true,
//!   "machine_name": "variant_title",
//!   "labels": { "en": "Variant Title", "fr": "Variante du titre" },
//!   "params": { "field": "246__a" }
//! }
//! ```
//!
//! `params` carries either a composite `field` token (tag, two indicators,
//! optional subfield codes; `_`, `%` or blank for "any indicator", `#` for a blank
//! one) or explicit `tag`/`ind1`/`ind2`/`subfield` keys, plus optional
//! `subfield_separator` and `subfield_order`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::{MetadataError, MetadataResult};

use super::definition::{self, FieldDefinition, SubfieldSelector, DEFAULT_SEPARATOR, LINK_TAG};

/// Bundled field configuration
const BUNDLED_CONFIG: &str = include_str!("../../config/fields.json");

/// Configuration entries whose meaning is already covered by a standard
/// definition with a different subfield selection
const DUPLICATE_MACHINE_NAMES: &[&str] = &["title", "tracks", "online_resources"];

static STANDARD: OnceCell<FieldRegistry> = OnceCell::new();

/// Ordered, deduplicated extraction rules. Immutable once built.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<FieldDefinition>,
}

#[derive(Debug, Deserialize)]
struct ConfigEntry {
    order: Option<i32>,
    #[serde(default = "default_visible")]
    visible: bool,
    machine_name: Option<String>,
    #[serde(default)]
    labels: HashMap<String, String>,
    params: Option<ConfigParams>,
}

#[derive(Debug, Deserialize)]
struct ConfigParams {
    field: Option<String>,
    tag: Option<String>,
    ind1: Option<String>,
    ind2: Option<String>,
    subfield: Option<String>,
    #[serde(alias = "separator")]
    subfield_separator: Option<String>,
    subfield_order: Option<CodeList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeList {
    List(Vec<String>),
    Joined(String),
}

fn default_visible() -> bool {
    true
}

impl FieldRegistry {
    /// Sort and deduplicate; the first of each set of same-metadata definitions wins
    pub fn new(mut definitions: Vec<FieldDefinition>) -> Self {
        definitions.sort();
        let mut seen = HashSet::new();
        let fields = definitions
            .into_iter()
            .filter(|d| {
                let fresh = seen.insert(d.metadata_key());
                if !fresh {
                    tracing::debug!("Dropping duplicate field definition {} ({})", d.label, d.tag);
                }
                fresh
            })
            .collect();
        Self { fields }
    }

    /// Standard definitions merged with a configuration document
    pub fn from_json(json: &str) -> MetadataResult<Self> {
        let mut definitions = definition::standard();
        definitions.extend(parse_config(json)?);
        let registry = Self::new(definitions);
        tracing::info!("Field registry built with {} definitions", registry.len());
        Ok(registry)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Standard definitions merged with the bundled configuration, built once
    pub fn standard() -> MetadataResult<&'static Self> {
        STANDARD.get_or_try_init(|| Self::from_json(BUNDLED_CONFIG))
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn find<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a FieldDefinition> + 'a {
        self.fields.iter().filter(move |d| d.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a configuration document, skipping entries that cannot or should
/// not become definitions
pub fn parse_config(json: &str) -> MetadataResult<Vec<FieldDefinition>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let mut definitions = Vec::new();
    for (idx, raw) in entries.into_iter().enumerate() {
        let entry: ConfigEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping field config entry {}: {}", idx, e);
                continue;
            }
        };
        match entry.into_definition() {
            Ok(Some(def)) => definitions.push(def),
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping field config entry {}: {}", idx, e),
        }
    }

    Ok(definitions)
}

impl ConfigEntry {
    /// `Ok(None)` for entries deliberately left out
    fn into_definition(self) -> MetadataResult<Option<FieldDefinition>> {
        let name = self.machine_name.as_deref().unwrap_or("<unnamed>");

        if !self.visible {
            tracing::debug!("Field config entry {} is not visible", name);
            return Ok(None);
        }
        if DUPLICATE_MACHINE_NAMES.contains(&name) {
            tracing::debug!("Field config entry {} duplicates a standard field", name);
            return Ok(None);
        }
        let Some(label) = self.labels.get("en").filter(|l| !l.trim().is_empty()) else {
            tracing::debug!("Field config entry {} has no English label", name);
            return Ok(None);
        };

        let order = self
            .order
            .ok_or_else(|| MetadataError::Configuration(format!("{}: missing order", name)))?;
        let params = self
            .params
            .ok_or_else(|| MetadataError::Configuration(format!("{}: missing params", name)))?;

        let (tag, ind1, ind2, codes) = match params.field.as_deref() {
            Some(token) => parse_field_token(token)
                .ok_or_else(|| MetadataError::Configuration(format!("{}: bad field {:?}", name, token)))?,
            None => {
                let tag = params
                    .tag
                    .clone()
                    .filter(|t| is_tag(t))
                    .ok_or_else(|| MetadataError::Configuration(format!("{}: missing tag", name)))?;
                (
                    tag,
                    params.ind1.as_deref().and_then(parse_indicator),
                    params.ind2.as_deref().and_then(parse_indicator),
                    params.subfield.as_deref().map(parse_codes).unwrap_or_default(),
                )
            }
        };

        let subfield_order = match params.subfield_order {
            Some(CodeList::List(items)) => items.iter().filter_map(|c| c.trim().chars().next()).collect(),
            Some(CodeList::Joined(joined)) => joined
                .split(',')
                .filter_map(|c| c.trim().chars().next())
                .collect(),
            None => Vec::new(),
        };

        let selector = match (codes.is_empty(), subfield_order.is_empty()) {
            (false, _) => SubfieldSelector::Codes(codes),
            (true, false) => SubfieldSelector::Codes(subfield_order.clone()),
            (true, true) => SubfieldSelector::All,
        };

        let mut def = FieldDefinition::new(order, &tag, label.trim());
        def.ind1 = ind1;
        def.ind2 = ind2;
        def.selector = selector;
        def.subfield_order = subfield_order;
        def.separator = params
            .subfield_separator
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
        def.links = tag == LINK_TAG;

        Ok(Some(def))
    }
}

fn is_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.chars().all(|c| c.is_ascii_alphanumeric())
}

/// `_`, `%` and blank accept any indicator; `#` is an explicit blank
fn parse_indicator(raw: &str) -> Option<char> {
    match raw.chars().next()? {
        '_' | '%' | ' ' => None,
        '#' => Some(' '),
        c => Some(c),
    }
}

/// Subfield codes; `*` selects the whole field
fn parse_codes(raw: &str) -> Vec<char> {
    if raw.trim() == "*" {
        return Vec::new();
    }
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Split a composite token such as `245__a` or `8564 u`
fn parse_field_token(token: &str) -> Option<(String, Option<char>, Option<char>, Vec<char>)> {
    let chars: Vec<char> = token.chars().collect();
    let tag: String = chars.iter().take(3).collect();
    if !is_tag(&tag) {
        return None;
    }
    let indicator = |i: usize| {
        chars
            .get(i)
            .and_then(|c| parse_indicator(&c.to_string()))
    };
    let codes: String = chars.iter().skip(5).collect();
    Some((tag, indicator(3), indicator(4), parse_codes(&codes)))
}
