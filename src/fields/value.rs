//! Extracted values: labeled, ordered lists of text lines and links

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::definition::FieldDefinition;

/// A hyperlink found in a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub url: String,
    pub body: String,
}

impl Link {
    /// Body falls back to the URL when there is no usable text
    pub fn new(url: impl Into<String>, body: Option<&str>) -> Self {
        let url = url.into();
        let body = body
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map_or_else(|| url.clone(), str::to_string);
        Self { url, body }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]({})", self.body, self.url)
    }
}

impl Ord for Link {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string()
            .cmp(&other.to_string())
            .then_with(|| self.url.cmp(&other.url))
    }
}

impl PartialOrd for Link {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One line of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Text(String),
    Link(Link),
}

impl Entry {
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Entry::Link(link) => Some(link),
            Entry::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entry::Text(text) => Some(text.as_str()),
            Entry::Link(_) => None,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Text(text) => f.write_str(text),
            Entry::Link(link) => write!(f, "{}", link),
        }
    }
}

/// The result of applying one definition to one record. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    pub tag: String,
    pub label: String,
    pub order: i32,
    entries: Vec<Entry>,
}

impl Value {
    /// `None` when there is nothing to show
    pub fn new(definition: &FieldDefinition, entries: Vec<Entry>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self {
            tag: definition.tag.clone(),
            label: definition.label.clone(),
            order: definition.order,
            entries,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.entries.iter().filter_map(Entry::as_link)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(Entry::as_text)
    }

    /// A copy of this value with one more entry at the end
    pub fn with_entry(&self, entry: Entry) -> Self {
        let mut value = self.clone();
        value.entries.push(entry);
        value
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): ", self.label, self.tag)?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}
