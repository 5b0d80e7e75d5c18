//! Record identifiers: which upstream system owns an ID, and bib number check digits
//!
//! Three schemes are recognized by shape alone, tried in this order:
//!
//! - MMS IDs from the integrated library system: `99`, 9-12 digits, then a
//!   4-digit institution suffix
//! - legacy catalog bib numbers: `b`, 8 digits, optional check character
//!   (`0`-`9`, `x`, or the `a` wildcard)
//! - OCLC numbers: `o` followed by digits
//!
//! Anything else is taken to be a digital-collections repository ID.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::CatalogConfig;
use crate::error::{MetadataError, MetadataResult};
use crate::marc::MarcRecord;

static MMS_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^99[0-9]{9,12}[0-9]{4}$").unwrap());
static BIB_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^b(?P<digits>[0-9]{8})(?P<check>[0-9ax])?$").unwrap());
static OCLC_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<prefix>ocm|ocn|on|o)(?P<digits>[0-9]+)$").unwrap());

/// Check character standing for "compute it for me"
pub const CHECK_WILDCARD: char = 'a';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    MmsId,
    BibNumber,
    OclcNumber,
    /// Fallback for anything not matching the other schemes
    RepositoryId,
}

impl IdentifierType {
    /// Classify a raw identifier by shape
    pub fn classify(raw: &str) -> Self {
        if MMS_ID.is_match(raw) {
            IdentifierType::MmsId
        } else if BIB_NUMBER.is_match(raw) {
            IdentifierType::BibNumber
        } else if OCLC_NUMBER.is_match(raw) {
            IdentifierType::OclcNumber
        } else {
            IdentifierType::RepositoryId
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IdentifierType::MmsId => "MMS ID",
            IdentifierType::BibNumber => "bib number",
            IdentifierType::OclcNumber => "OCLC number",
            IdentifierType::RepositoryId => "repository ID",
        };
        write!(f, "{}", label)
    }
}

/// An identifier together with the scheme it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub id_type: IdentifierType,
}

impl RecordIdentifier {
    /// Classify `raw`; bib numbers are normalized to carry their check digit
    pub fn parse(raw: &str) -> MetadataResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MetadataError::InvalidIdentifier("empty identifier".to_string()));
        }
        let id_type = IdentifierType::classify(raw);
        let id = match id_type {
            IdentifierType::BibNumber => ensure_check_digit(raw)?,
            _ => raw.to_string(),
        };
        Ok(Self { id, id_type })
    }

    /// Parse `raw`, requiring it to belong to `expected`
    pub fn for_type(raw: &str, expected: IdentifierType) -> MetadataResult<Self> {
        let identifier = Self::parse(raw)?;
        if identifier.id_type != expected {
            return Err(MetadataError::InvalidIdentifier(format!(
                "{:?} is not a valid {} (looks like a {})",
                raw.trim(),
                expected,
                identifier.id_type
            )));
        }
        Ok(identifier)
    }

    /// The identifier a record carries.
    ///
    /// An MMS ID or bib number in 001 wins, then the bib number in 907$a,
    /// then whatever 001 holds (an OCLC number, else a repository ID).
    pub fn from_record(record: &MarcRecord) -> Option<Self> {
        let control = record
            .get_control_field("001")
            .and_then(Self::parse_candidate);
        let bib = record
            .get_subfield("907", 'a')
            .map(|bib| bib.trim().trim_start_matches('.'))
            .and_then(Self::parse_candidate)
            .filter(|id| id.id_type == IdentifierType::BibNumber);

        match control {
            Some(id) if matches!(id.id_type, IdentifierType::MmsId | IdentifierType::BibNumber) => {
                Some(id)
            }
            control => bib.or(control),
        }
    }

    fn parse_candidate(raw: &str) -> Option<Self> {
        match Self::parse(raw) {
            Ok(identifier) => Some(identifier),
            Err(e) => {
                tracing::debug!("Ignoring record identifier {:?}: {}", raw, e);
                None
            }
        }
    }

    /// Catalog page for this record
    pub fn catalog_url(&self, catalog: &CatalogConfig) -> String {
        match self.id_type {
            IdentifierType::MmsId => CatalogConfig::expand(&catalog.mms_id_url, &self.id),
            IdentifierType::BibNumber => {
                CatalogConfig::expand(&catalog.bib_number_url, strip_check_digit(&self.id))
            }
            IdentifierType::OclcNumber => {
                let digits = OCLC_NUMBER
                    .captures(&self.id)
                    .and_then(|caps| caps.name("digits"))
                    .map_or(self.id.as_str(), |m| m.as_str());
                CatalogConfig::expand(&catalog.oclc_number_url, digits)
            }
            IdentifierType::RepositoryId => {
                CatalogConfig::expand(&catalog.repository_id_url, &self.id)
            }
        }
    }
}

impl fmt::Display for RecordIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.id_type)
    }
}

/// Weighted mod-11 check character for eight digits.
///
/// Digits are weighted 2, 3, 4, ... from the right; a remainder of 10 is `x`.
pub fn compute_check_digit(digits: &str) -> MetadataResult<char> {
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MetadataError::InvalidIdentifier(format!(
            "check digit needs exactly 8 digits, got {:?}",
            digits
        )));
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .zip(2u32..)
        .map(|(b, weight)| u32::from(b - b'0') * weight)
        .sum();

    Ok(match sum % 11 {
        10 => 'x',
        r => char::from(b'0' + r as u8),
    })
}

/// Make sure a bib number ends in its check character.
///
/// Missing or wildcard check characters are filled in; a wrong one is an error.
pub fn ensure_check_digit(bib: &str) -> MetadataResult<String> {
    let caps = BIB_NUMBER
        .captures(bib)
        .ok_or_else(|| MetadataError::InvalidIdentifier(format!("{:?} is not a bib number", bib)))?;
    let digits = &caps["digits"];
    let expected = compute_check_digit(digits)?;

    match caps.name("check").and_then(|m| m.as_str().chars().next()) {
        None | Some(CHECK_WILDCARD) => Ok(format!("b{}{}", digits, expected)),
        Some(actual) if actual == expected => Ok(bib.to_string()),
        Some(actual) => Err(MetadataError::CheckDigitMismatch {
            bib: format!("b{}", digits),
            expected,
            actual,
        }),
    }
}

/// Drop the check character of a bib number, if it has one
pub fn strip_check_digit(bib: &str) -> &str {
    match BIB_NUMBER.captures(bib) {
        Some(caps) if caps.name("check").is_some() => &bib[..bib.len() - 1],
        _ => bib,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(IdentifierType::classify("991054360089706532"), IdentifierType::MmsId);
        assert_eq!(IdentifierType::classify("b23305522"), IdentifierType::BibNumber);
        assert_eq!(IdentifierType::classify("b233055223"), IdentifierType::BibNumber);
        assert_eq!(IdentifierType::classify("b23305522x"), IdentifierType::BibNumber);
        assert_eq!(IdentifierType::classify("o1234567"), IdentifierType::OclcNumber);
        assert_eq!(IdentifierType::classify("ocm04264484"), IdentifierType::OclcNumber);
        assert_eq!(IdentifierType::classify("ocn123456789"), IdentifierType::OclcNumber);
        assert_eq!(IdentifierType::classify("21178"), IdentifierType::RepositoryId);
    }

    #[test]
    fn test_classify_trailing_garbage_falls_through() {
        assert_eq!(IdentifierType::classify("b2330552234"), IdentifierType::RepositoryId);
        assert_eq!(IdentifierType::classify("b23305522q"), IdentifierType::RepositoryId);
        assert_eq!(IdentifierType::classify("b1234567"), IdentifierType::RepositoryId);
    }

    #[test]
    fn test_classify_mms_length_bounds() {
        // 99 + 8 digits + suffix is too short
        assert_eq!(IdentifierType::classify("99123456786532"), IdentifierType::RepositoryId);
        assert_eq!(IdentifierType::classify("991234567896532"), IdentifierType::MmsId);
        assert_eq!(IdentifierType::classify("991234567890126532"), IdentifierType::MmsId);
        assert_eq!(IdentifierType::classify("9912345678901236532"), IdentifierType::RepositoryId);
    }

    #[test]
    fn test_compute_check_digit() {
        assert_eq!(compute_check_digit("12345678").unwrap(), '2');
        assert_eq!(compute_check_digit("10000000").unwrap(), '9');
        assert_eq!(compute_check_digit("11111111").unwrap(), '0');
        assert_eq!(compute_check_digit("10000006").unwrap(), 'x');
    }

    #[test]
    fn test_compute_check_digit_wrong_length() {
        assert!(compute_check_digit("1234567").is_err());
        assert!(compute_check_digit("123456789").is_err());
        assert!(compute_check_digit("1234567a").is_err());
    }

    #[test]
    fn test_ensure_check_digit() {
        assert_eq!(ensure_check_digit("b12345678").unwrap(), "b123456782");
        assert_eq!(ensure_check_digit("b12345678a").unwrap(), "b123456782");
        assert_eq!(ensure_check_digit("b123456782").unwrap(), "b123456782");
        assert_eq!(ensure_check_digit("b10000006").unwrap(), "b10000006x");
    }

    #[test]
    fn test_ensure_check_digit_mismatch() {
        let err = ensure_check_digit("b123456789").unwrap_err();
        match err {
            MetadataError::CheckDigitMismatch { expected, actual, .. } => {
                assert_eq!(expected, '2');
                assert_eq!(actual, '9');
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_strip_then_recompute_round_trips() {
        let bib = ensure_check_digit("b23305522").unwrap();
        let stripped = strip_check_digit(&bib);
        assert_eq!(stripped, "b23305522");
        assert_eq!(ensure_check_digit(stripped).unwrap(), bib);
        assert_eq!(strip_check_digit("b23305522"), "b23305522");
    }

    #[test]
    fn test_parse_normalizes_bib_numbers() {
        let id = RecordIdentifier::parse(" b12345678 ").unwrap();
        assert_eq!(id.id, "b123456782");
        assert_eq!(id.id_type, IdentifierType::BibNumber);
        assert!(RecordIdentifier::parse("b123456789").is_err());
        assert!(RecordIdentifier::parse("  ").is_err());
    }

    #[test]
    fn test_for_type() {
        assert!(RecordIdentifier::for_type("991054360089706532", IdentifierType::MmsId).is_ok());
        let err = RecordIdentifier::for_type("21178", IdentifierType::BibNumber).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_from_record() {
        let record = MarcRecord::new().with_control_field("001", "991054360089706532");
        assert_eq!(
            RecordIdentifier::from_record(&record).unwrap().id_type,
            IdentifierType::MmsId
        );

        let record = MarcRecord::new().with_field(
            crate::marc::DataField::new("907", ' ', ' ').with_subfield('a', ".b12345678"),
        );
        assert_eq!(RecordIdentifier::from_record(&record).unwrap().id, "b123456782");

        assert!(RecordIdentifier::from_record(&MarcRecord::new()).is_none());
    }

    #[test]
    fn test_from_record_prefers_catalog_numbers() {
        let bib_field =
            crate::marc::DataField::new("907", ' ', ' ').with_subfield('a', ".b12345678");

        let record = MarcRecord::new()
            .with_control_field("001", "ocm04264484")
            .with_field(bib_field.clone());
        let id = RecordIdentifier::from_record(&record).unwrap();
        assert_eq!(id.id_type, IdentifierType::BibNumber);
        assert_eq!(id.id, "b123456782");

        let record = MarcRecord::new().with_control_field("001", "ocm04264484");
        let id = RecordIdentifier::from_record(&record).unwrap();
        assert_eq!(id.id_type, IdentifierType::OclcNumber);

        let record = MarcRecord::new()
            .with_control_field("001", "991054360089706532")
            .with_field(bib_field.clone());
        let id = RecordIdentifier::from_record(&record).unwrap();
        assert_eq!(id.id_type, IdentifierType::MmsId);

        let record = MarcRecord::new()
            .with_control_field("001", "CYS-21178")
            .with_field(bib_field);
        let id = RecordIdentifier::from_record(&record).unwrap();
        assert_eq!(id.id_type, IdentifierType::BibNumber);
        assert_eq!(id.id, "b123456782");

        let record = MarcRecord::new().with_control_field("001", "CYS-21178");
        let id = RecordIdentifier::from_record(&record).unwrap();
        assert_eq!(id.id_type, IdentifierType::RepositoryId);
    }

    #[test]
    fn test_catalog_urls() {
        let catalog = CatalogConfig {
            mms_id_url: "https://ils.example.edu/{id}".to_string(),
            bib_number_url: "https://legacy.example.edu/record={id}".to_string(),
            oclc_number_url: "https://oclc.example.org/{id}".to_string(),
            repository_id_url: "https://repo.example.edu/record/{id}".to_string(),
            link_body: "Catalog".to_string(),
        };
        let url = |raw: &str| RecordIdentifier::parse(raw).unwrap().catalog_url(&catalog);
        assert_eq!(url("b12345678"), "https://legacy.example.edu/record=b12345678");
        assert_eq!(url("o1234567"), "https://oclc.example.org/1234567");
        assert_eq!(url("ocm04264484"), "https://oclc.example.org/04264484");
        assert_eq!(url("on1234567890"), "https://oclc.example.org/1234567890");
        assert_eq!(url("991054360089706532"), "https://ils.example.edu/991054360089706532");
        assert_eq!(url("21178"), "https://repo.example.edu/record/21178");
    }
}
