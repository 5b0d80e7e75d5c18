//! MARC record model and ISO 2709 reader
//!
//! The record types here are the boundary with whatever produced the record:
//! the extraction engine only walks data fields by tag and reads their
//! indicators and subfields.

use std::collections::HashMap;

const FIELD_TERMINATOR: u8 = 0x1E;
const RECORD_TERMINATOR: u8 = 0x1D;
const SUBFIELD_DELIMITER: u8 = 0x1F;

/// A MARC record containing leader and fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarcRecord {
    /// The 24-character record leader
    pub leader: String,
    /// Control fields (00X)
    pub control_fields: HashMap<String, String>,
    /// Data fields in document order
    pub data_fields: Vec<DataField>,
}

/// A MARC data field (010-999)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    /// Field tag (3 characters)
    pub tag: String,
    /// First indicator, `' '` when blank
    pub ind1: char,
    /// Second indicator, `' '` when blank
    pub ind2: char,
    /// Subfields in document order
    pub subfields: Vec<Subfield>,
}

/// A MARC subfield
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield data
    pub data: String,
}

impl Subfield {
    pub fn new(code: char, data: impl Into<String>) -> Self {
        Self {
            code,
            data: data.into(),
        }
    }
}

impl MarcRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_control_field(mut self, tag: &str, value: impl Into<String>) -> Self {
        self.control_fields.insert(tag.to_string(), value.into());
        self
    }

    pub fn with_field(mut self, field: DataField) -> Self {
        self.data_fields.push(field);
        self
    }

    /// Parse every record of an ISO 2709 file, skipping the ones that cannot be read
    pub fn read_all(data: &[u8]) -> Vec<Self> {
        data.split(|&b| b == RECORD_TERMINATOR)
            .filter(|chunk| chunk.iter().any(|b| !b.is_ascii_whitespace()))
            .filter_map(|chunk| {
                let record = Self::from_bytes(chunk);
                if record.is_none() {
                    tracing::debug!("Skipping unreadable MARC record ({} bytes)", chunk.len());
                }
                record
            })
            .collect()
    }

    /// Parse a single ISO 2709 record (trailing record terminator optional)
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let data = data.strip_suffix(&[RECORD_TERMINATOR]).unwrap_or(data);
        // Tolerate line breaks between records in concatenated files
        let start = data.iter().position(|b| !b.is_ascii_whitespace())?;
        let data = &data[start..];
        if data.len() < 24 {
            return None;
        }

        let leader = String::from_utf8_lossy(&data[0..24]).to_string();
        let base_address: usize = ascii_number(&data[12..17])?;
        if base_address < 25 || base_address > data.len() {
            return None;
        }

        let directory = &data[24..base_address - 1];
        let mut record = MarcRecord {
            leader,
            ..Default::default()
        };

        // Directory entries: tag(3) + length(4) + start(5)
        for entry in directory.chunks_exact(12) {
            let tag = String::from_utf8_lossy(&entry[0..3]).to_string();
            let length: usize = ascii_number(&entry[3..7])?;
            let offset: usize = ascii_number(&entry[7..12])?;

            let field_start = base_address + offset;
            let field_end = (field_start + length).min(data.len());
            if field_start >= field_end {
                continue;
            }
            let raw = &data[field_start..field_end];
            let raw = raw.strip_suffix(&[FIELD_TERMINATOR]).unwrap_or(raw);

            if tag.starts_with("00") {
                record
                    .control_fields
                    .insert(tag, String::from_utf8_lossy(raw).to_string());
            } else if let Some(field) = DataField::from_bytes(&tag, raw) {
                record.data_fields.push(field);
            }
        }

        Some(record)
    }

    /// Get a control field value
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields.get(tag).map(String::as_str)
    }

    /// All data fields with a specific tag, in document order
    pub fn fields<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DataField> + 'a {
        self.data_fields.iter().filter(move |f| f.tag == tag)
    }

    /// First value of a subfield across all fields with the given tag
    pub fn get_subfield(&self, tag: &str, code: char) -> Option<&str> {
        self.data_fields
            .iter()
            .filter(|f| f.tag == tag)
            .find_map(|f| f.get_subfield(code))
    }
}

impl DataField {
    pub fn new(tag: &str, ind1: char, ind2: char) -> Self {
        Self {
            tag: tag.to_string(),
            ind1,
            ind2,
            subfields: Vec::new(),
        }
    }

    pub fn with_subfield(mut self, code: char, data: impl Into<String>) -> Self {
        self.subfields.push(Subfield::new(code, data));
        self
    }

    fn from_bytes(tag: &str, data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }

        let mut field = DataField::new(tag, data[0] as char, data[1] as char);
        for part in data[2..].split(|&b| b == SUBFIELD_DELIMITER) {
            // First chunk is empty when the delimiter follows the indicators
            if part.is_empty() {
                continue;
            }
            let code = part[0] as char;
            field
                .subfields
                .push(Subfield::new(code, String::from_utf8_lossy(&part[1..])));
        }

        Some(field)
    }

    /// Get a subfield value by code
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.data.as_str())
    }
}

fn ascii_number(bytes: &[u8]) -> Option<usize> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}
