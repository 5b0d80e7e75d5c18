//! Access restrictions stated in the record

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::marc::MarcRecord;

/// Fields and subfields that may carry restriction language
const RESTRICTION_TARGETS: [(&str, char); 3] = [("998", 'r'), ("506", 'a'), ("856", 'z')];

static CREDENTIAL_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)calnet").unwrap());

static CREDENTIAL_OR_NETWORK: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bUCB\s+(access|only)\b",
        r"(?i)\b(UC\s+Berkeley|UCB)\b.*\b(IP|campus|network)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Who may play a record. Both flags are computed independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestrictionsResult {
    /// Only signed-in users
    pub requires_credential: bool,
    /// Signed-in users or anyone on the institution's network
    pub requires_credential_or_network: bool,
}

impl RestrictionsResult {
    pub fn is_restricted(&self) -> bool {
        self.requires_credential || self.requires_credential_or_network
    }
}

/// Scan the restriction targets of a record
pub fn evaluate(record: &MarcRecord) -> RestrictionsResult {
    let mut result = RestrictionsResult::default();

    for (tag, code) in RESTRICTION_TARGETS {
        let phrases = record
            .fields(tag)
            .flat_map(|f| f.subfields.iter())
            .filter(|sf| sf.code == code)
            .map(|sf| sf.data.as_str());

        for phrase in phrases {
            if CREDENTIAL_ONLY.is_match(phrase) {
                result.requires_credential = true;
            }
            if CREDENTIAL_OR_NETWORK.iter().any(|re| re.is_match(phrase)) {
                result.requires_credential_or_network = true;
            }
        }
    }

    result
}
