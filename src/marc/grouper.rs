//! Positional grouping of repeated subfields
//!
//! A single data field may carry several logical entries as parallel runs
//! of repeated subfields, e.g. `$g dur1 $g dur2 $t title1 $t title2 $a path1
//! $a path2`. Grouping pairs the i-th occurrence of every code back together.

use indexmap::IndexMap;

use super::parser::{DataField, Subfield};

/// One reconstructed entry: subfield codes and values, in display order.
///
/// Groups built by [`group`] hold each code at most once. A group taken
/// from a whole field keeps repeated codes; lookups see the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubfieldGroup {
    values: Vec<(char, String)>,
}

impl SubfieldGroup {
    /// The whole field as a single group, repeated codes included
    pub fn from_field(field: &DataField) -> Self {
        field
            .subfields
            .iter()
            .map(|sf| (sf.code, sf.data.clone()))
            .collect()
    }

    pub fn get(&self, code: char) -> Option<&str> {
        self.values
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, v)| v.as_str())
    }

    /// Remove the first occurrence of a code, keeping the order of the rest
    pub fn take(&mut self, code: char) -> Option<String> {
        let pos = self.values.iter().position(|(c, _)| *c == code)?;
        Some(self.values.remove(pos).1)
    }

    pub fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.values.iter().map(|(c, _)| *c)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Join the trimmed, non-empty values with `separator`
    pub fn join(&self, separator: &str) -> String {
        self.values()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl FromIterator<(char, String)> for SubfieldGroup {
    fn from_iter<I: IntoIterator<Item = (char, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Group `subfields` positionally.
///
/// Codes come out in `order` when one is given (codes missing from `order`
/// are dropped), otherwise in first-seen order. There are as many groups as
/// the largest occurrence count; a group lacks a code when that code ran out
/// of occurrences.
pub fn group(subfields: &[Subfield], order: Option<&[char]>) -> Vec<SubfieldGroup> {
    let mut occurrences: IndexMap<char, Vec<&str>> = IndexMap::new();
    for sf in subfields {
        occurrences.entry(sf.code).or_default().push(&sf.data);
    }

    let codes: Vec<char> = match order {
        Some(order) if !order.is_empty() => order.to_vec(),
        _ => occurrences.keys().copied().collect(),
    };

    let count = codes
        .iter()
        .filter_map(|code| occurrences.get(code))
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    (0..count)
        .map(|i| {
            codes
                .iter()
                .filter_map(|code| {
                    let value = occurrences.get(code)?.get(i)?;
                    Some((*code, value.to_string()))
                })
                .collect::<SubfieldGroup>()
        })
        .collect()
}
