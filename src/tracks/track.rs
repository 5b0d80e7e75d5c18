//! Playable tracks listed in the record's 998 fields

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::fields::definition::TRACKS_TAG;
use crate::marc::{group, MarcRecord};

use super::duration::Duration;

pub const DURATION_CODE: char = 'g';
pub const TITLE_CODE: char = 't';
pub const PATH_CODE: char = 'a';

const TRACK_CODES: [char; 3] = [DURATION_CODE, TITLE_CODE, PATH_CODE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Audio,
    Video,
    Unknown,
}

impl FileType {
    pub fn from_path(path: &str) -> Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("mp3" | "m4a" | "aac" | "wav" | "flac" | "ogg") => FileType::Audio,
            Some("mp4" | "m4v" | "mov" | "mkv" | "webm") => FileType::Video,
            _ => FileType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Track {
    pub sort_order: usize,
    pub title: Option<String>,
    pub path: String,
    pub duration: Option<Duration>,
}

impl Track {
    pub fn new(sort_order: usize, path: &str) -> Self {
        Self {
            sort_order,
            title: None,
            path: path.to_string(),
            duration: None,
        }
    }

    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.title = title.map(str::trim).filter(|t| !t.is_empty()).map(String::from);
        self
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_path(&self.path)
    }
}

/// `Some` before `None`, then natural order
fn cmp_none_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Ord for Track {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then_with(|| cmp_none_last(&self.title, &other.title))
            .then_with(|| cmp_none_last(&self.duration, &other.duration))
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.to_string().cmp(&other.to_string()))
    }
}

impl PartialOrd for Track {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(duration) = &self.duration {
            parts.push(duration.to_string());
        }
        if let Some(title) = &self.title {
            parts.push(title.clone());
        }
        parts.push(self.path.clone());
        write!(f, "{}", parts.join(" "))
    }
}

/// Tracks of a record, in the order they appear.
///
/// Each 998 field is grouped on its own and the groups concatenated; groups
/// without a path are not tracks and take no sort slot.
pub fn tracks_from(record: &MarcRecord) -> Vec<Track> {
    let mut tracks = Vec::new();

    for field in record.fields(TRACKS_TAG) {
        for g in group(&field.subfields, Some(&TRACK_CODES[..])) {
            let Some(path) = g.get(PATH_CODE).map(str::trim).filter(|p| !p.is_empty()) else {
                tracing::debug!("Discarding {} group without a path: {:?}", TRACKS_TAG, g);
                continue;
            };
            let track = Track::new(tracks.len(), path)
                .with_title(g.get(TITLE_CODE))
                .with_duration(g.get(DURATION_CODE).and_then(Duration::parse));
            tracks.push(track);
        }
    }

    tracks
}
