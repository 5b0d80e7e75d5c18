//! Field definitions: the mapping rules from MARC tags to labeled values

use std::cmp::Ordering;

use serde::Serialize;

use crate::marc::DataField;

/// Which subfields of a matching data field belong to the definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubfieldSelector {
    /// Every subfield, taken as one group per field
    All,
    /// Only these codes, grouped positionally
    Codes(Vec<char>),
}

/// One extraction rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldDefinition {
    pub order: i32,
    pub tag: String,
    /// `None` accepts any first indicator
    pub ind1: Option<char>,
    /// `None` accepts any second indicator
    pub ind2: Option<char>,
    pub selector: SubfieldSelector,
    pub label: String,
    pub separator: String,
    /// Display order of codes inside a group; when non-empty, codes not
    /// listed are dropped
    pub subfield_order: Vec<char>,
    /// Groups carrying a `$u` become links
    pub links: bool,
}

/// Structural identity of a definition, label and order excluded
pub type MetadataKey = (
    String,
    Option<char>,
    Option<char>,
    SubfieldSelector,
    String,
    Vec<char>,
);

pub const DEFAULT_SEPARATOR: &str = " ";

impl FieldDefinition {
    pub fn new(order: i32, tag: &str, label: &str) -> Self {
        Self {
            order,
            tag: tag.to_string(),
            ind1: None,
            ind2: None,
            selector: SubfieldSelector::All,
            label: label.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            subfield_order: Vec::new(),
            links: false,
        }
    }

    pub fn with_indicators(mut self, ind1: Option<char>, ind2: Option<char>) -> Self {
        self.ind1 = ind1;
        self.ind2 = ind2;
        self
    }

    pub fn with_codes(mut self, codes: &[char]) -> Self {
        self.selector = SubfieldSelector::Codes(codes.to_vec());
        self
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn with_subfield_order(mut self, order: &[char]) -> Self {
        self.subfield_order = order.to_vec();
        self
    }

    pub fn with_links(mut self) -> Self {
        self.links = true;
        self
    }

    /// Whether a data field falls under this definition
    pub fn matches(&self, field: &DataField) -> bool {
        field.tag == self.tag
            && self.ind1.map_or(true, |i| i == field.ind1)
            && self.ind2.map_or(true, |i| i == field.ind2)
    }

    /// Code order handed to the grouper, `None` for first-seen order
    pub fn grouping_order(&self) -> Option<&[char]> {
        if self.subfield_order.is_empty() {
            None
        } else {
            Some(&self.subfield_order)
        }
    }

    pub fn metadata_key(&self) -> MetadataKey {
        (
            self.tag.clone(),
            self.ind1,
            self.ind2,
            self.selector.clone(),
            self.separator.clone(),
            self.subfield_order.clone(),
        )
    }

    /// Two definitions describe the same metadata when everything but
    /// label and order agrees
    pub fn same_metadata(&self, other: &FieldDefinition) -> bool {
        self.tag == other.tag
            && self.ind1 == other.ind1
            && self.ind2 == other.ind2
            && self.selector == other.selector
            && self.separator == other.separator
            && self.subfield_order == other.subfield_order
    }
}

impl Ord for FieldDefinition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.tag.cmp(&other.tag))
            .then_with(|| {
                (self.ind1, self.ind2, &self.selector).cmp(&(other.ind1, other.ind2, &other.selector))
            })
            .then_with(|| self.separator.cmp(&other.separator))
            .then_with(|| self.label.cmp(&other.label))
            .then_with(|| self.subfield_order.cmp(&other.subfield_order))
            .then_with(|| self.links.cmp(&other.links))
    }
}

impl PartialOrd for FieldDefinition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub const TITLE_TAG: &str = "245";
pub const DESCRIPTION_TAG: &str = "520";
pub const TRACKS_TAG: &str = "998";
pub const LINK_TAG: &str = "856";

pub const TITLE_LABEL: &str = "Title";
pub const DESCRIPTION_LABEL: &str = "Description";
pub const LINKED_RESOURCES_LABEL: &str = "Linked Resources";
pub const TRANSCRIPTS_LABEL: &str = "Transcripts";

pub const CATALOG_LINK_ORDER: i32 = 999;

/// Definitions every registry carries, whatever the configuration says
pub fn standard() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new(1, TITLE_TAG, TITLE_LABEL)
            .with_codes(&['a', 'b', 'f', 'g', 'k', 'n', 'p', 's'])
            .with_subfield_order(&['a', 'b', 'f', 'g', 'k', 'n', 'p', 's']),
        personal_name(2, "100", "Creator"),
        personal_name(2, "700", "Creator"),
        FieldDefinition::new(2, "110", "Creator").with_codes(&['a', 'b', 'c', 'd']),
        FieldDefinition::new(2, "710", "Creator").with_codes(&['a', 'b', 'c', 'd']),
        FieldDefinition::new(3, DESCRIPTION_TAG, DESCRIPTION_LABEL).with_codes(&['a']),
        FieldDefinition::new(98, TRACKS_TAG, "Tracks")
            .with_codes(&['g', 't', 'a'])
            .with_subfield_order(&['g', 't', 'a']),
        FieldDefinition::new(99, LINK_TAG, TRANSCRIPTS_LABEL)
            .with_indicators(Some('4'), Some('2'))
            .with_codes(&['u', 'y', 'z'])
            .with_links(),
        FieldDefinition::new(CATALOG_LINK_ORDER, LINK_TAG, LINKED_RESOURCES_LABEL)
            .with_indicators(Some('4'), Some('1'))
            .with_codes(&['u', 'y', 'z'])
            .with_links(),
    ]
}

fn personal_name(order: i32, tag: &str, label: &str) -> FieldDefinition {
    const CODES: [char; 5] = ['a', 'b', 'c', 'd', 'q'];
    FieldDefinition::new(order, tag, label)
        .with_codes(&CODES)
        .with_subfield_order(&CODES)
}

/// The definition catalog links are merged into
pub fn catalog_link() -> FieldDefinition {
    standard()
        .into_iter()
        .find(|d| d.label == LINKED_RESOURCES_LABEL)
        .unwrap_or_else(|| {
            FieldDefinition::new(CATALOG_LINK_ORDER, LINK_TAG, LINKED_RESOURCES_LABEL).with_links()
        })
}
