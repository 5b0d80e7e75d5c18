//! End-to-end metadata tests over the bundled field configuration

use std::ops::RangeInclusive;

use av_metadata::config::CatalogConfig;
use av_metadata::fields::Entry;
use av_metadata::identifiers::{compute_check_digit, ensure_check_digit, strip_check_digit};
use av_metadata::marc::DataField;
use av_metadata::{
    Duration, FieldRegistry, IdentifierType, MarcRecord, Metadata, MetadataError, RecordIdentifier,
};

const FIELD_TERMINATOR: u8 = 0x1E;
const RECORD_TERMINATOR: u8 = 0x1D;
const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Minimal ISO 2709 writer for feeding the reader
fn encode(record: &MarcRecord) -> Vec<u8> {
    let mut directory = Vec::new();
    let mut body = Vec::new();
    let mut push = |tag: &str, bytes: Vec<u8>| {
        directory.extend_from_slice(
            format!("{}{:04}{:05}", tag, bytes.len() + 1, body.len()).as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.push(FIELD_TERMINATOR);
    };

    let mut control: Vec<_> = record.control_fields.iter().collect();
    control.sort();
    for (tag, value) in control {
        push(tag.as_str(), value.as_bytes().to_vec());
    }
    for field in &record.data_fields {
        let mut bytes = vec![field.ind1 as u8, field.ind2 as u8];
        for sf in &field.subfields {
            bytes.push(SUBFIELD_DELIMITER);
            bytes.push(sf.code as u8);
            bytes.extend_from_slice(sf.data.as_bytes());
        }
        push(field.tag.as_str(), bytes);
    }

    let base_address = 24 + directory.len() + 1;
    let total = base_address + body.len() + 1;
    let mut out = format!("{:05}nam a22{:05}   4500", total, base_address).into_bytes();
    out.extend_from_slice(&directory);
    out.push(FIELD_TERMINATOR);
    out.extend_from_slice(&body);
    out.push(RECORD_TERMINATOR);
    out
}

fn reading() -> MarcRecord {
    MarcRecord::new()
        .with_control_field("001", "991054360089706532")
        .with_field(
            DataField::new("245", '1', '0')
                .with_subfield('a', "Wanda Coleman")
                .with_subfield('b', "a reading"),
        )
        .with_field(
            DataField::new("700", '1', ' ')
                .with_subfield('a', "Coleman, Wanda,")
                .with_subfield('d', "1946-2013"),
        )
        .with_field(DataField::new("520", ' ', ' ').with_subfield('a', "Poetry reading."))
        .with_field(
            DataField::new("650", ' ', '0')
                .with_subfield('a', "American poetry")
                .with_subfield('y', "20th century"),
        )
        .with_field(
            DataField::new("998", ' ', ' ')
                .with_subfield('g', "00:23:38")
                .with_subfield('t', "Part one")
                .with_subfield('a', "MRCAudio/coleman1.mp3"),
        )
}

fn track_duration(n: usize) -> String {
    format!("00:0{}:{:02}", n % 10, n)
}

fn track_path(n: usize) -> String {
    format!("MRCVideo/reel{:02}.mp4", n)
}

/// A 998 laid out as runs: every `$g`, then every `$t`, then every `$a`.
/// Only tracks in `titled` get a `$t`.
fn track_runs(tracks: RangeInclusive<usize>, titled: RangeInclusive<usize>) -> DataField {
    let mut field = DataField::new("998", ' ', ' ');
    for n in tracks.clone() {
        field = field.with_subfield('g', track_duration(n));
    }
    for n in tracks.clone().filter(|n| titled.contains(n)) {
        field = field.with_subfield('t', format!("Track {}", n));
    }
    for n in tracks {
        field = field.with_subfield('a', track_path(n));
    }
    field
}

#[test]
fn test_bundled_registry_dedups_config() {
    let registry = FieldRegistry::standard().unwrap();
    let labels: Vec<_> = registry.fields().iter().map(|f| f.label.as_str()).collect();

    assert!(labels.contains(&"Description"));
    assert!(!labels.contains(&"Summary"));
    assert!(!labels.contains(&"Access"));
    assert_eq!(registry.find("700").count(), 1);
    assert_eq!(registry.find("245").count(), 1);

    let orders: Vec<_> = registry.fields().iter().map(|f| f.order).collect();
    let mut sorted = orders.clone();
    sorted.sort();
    assert_eq!(orders, sorted);
}

#[test]
fn test_read_and_render_record() {
    let data = encode(&reading());
    let records = MarcRecord::read_all(&data);
    assert_eq!(records.len(), 1);

    let registry = FieldRegistry::standard().unwrap();
    let catalog = CatalogConfig::default();
    let metadata = Metadata::new(records.into_iter().next().unwrap(), registry, &catalog);

    let identifier = metadata.identifier().unwrap();
    assert_eq!(identifier.id_type, IdentifierType::MmsId);
    assert_eq!(metadata.title(), Some("Wanda Coleman a reading"));
    assert_eq!(metadata.description(), Some("Poetry reading."));

    let rendered = metadata.to_string();
    let lines: Vec<_> = rendered.lines().collect();
    assert_eq!(lines[0], "Title (245): Wanda Coleman a reading");
    assert_eq!(lines[1], "Creator (700): Coleman, Wanda, 1946-2013");
    assert_eq!(lines[2], "Description (520): Poetry reading.");
    assert!(lines.contains(&"Subject (Topic) (650): American poetry -- 20th century"));

    let creators = metadata
        .values()
        .iter()
        .filter(|v| v.label == "Creator")
        .count();
    assert_eq!(creators, 1);
}

#[test]
fn test_catalog_link_points_at_record() {
    let registry = FieldRegistry::standard().unwrap();
    let catalog = CatalogConfig::default();
    let metadata = Metadata::new(reading(), registry, &catalog);

    let links: Vec<_> = metadata.values().iter().flat_map(|v| v.links()).collect();
    assert_eq!(links.len(), 1);
    assert_eq!(
        links[0].url,
        "https://search.library.berkeley.edu/discovery/fulldisplay?context=L&vid=01UCS_BER:UCB&docid=alma991054360089706532"
    );
    assert!(matches!(
        metadata.values().last().unwrap().entries().last(),
        Some(Entry::Link(_))
    ));
}

#[test]
fn test_tracks_split_across_fields_match_single_field() {
    // the title run of the last field is one short
    let single = MarcRecord::new().with_field(track_runs(1..=20, 1..=19));
    let split = MarcRecord::new()
        .with_field(track_runs(1..=9, 1..=9))
        .with_field(track_runs(10..=20, 10..=19));

    let registry = FieldRegistry::standard().unwrap();
    let catalog = CatalogConfig::default();
    let single = Metadata::new(single, registry, &catalog);
    let split = Metadata::new(split, registry, &catalog);

    assert_eq!(single.tracks().len(), 20);
    assert_eq!(single.tracks(), split.tracks());
    for (i, track) in split.tracks().iter().enumerate() {
        let n = i + 1;
        assert_eq!(track.sort_order, i);
        assert_eq!(track.path, track_path(n));
        assert_eq!(track.duration, Duration::parse(&track_duration(n)));
        if n < 20 {
            assert_eq!(track.title.as_deref(), Some(format!("Track {}", n).as_str()));
        } else {
            assert_eq!(track.title, None);
        }
    }
    let mut sorted = split.tracks().to_vec();
    sorted.reverse();
    sorted.sort();
    assert_eq!(sorted, split.tracks());
}

#[test]
fn test_bib_number_from_907() {
    let record = MarcRecord::new()
        .with_field(DataField::new("907", ' ', ' ').with_subfield('a', ".b12345678"));
    let identifier = RecordIdentifier::from_record(&record).unwrap();
    assert_eq!(identifier.id_type, IdentifierType::BibNumber);
    assert_eq!(identifier.id, "b123456782");
    assert_eq!(
        identifier.catalog_url(&CatalogConfig::default()),
        "http://oskicat.berkeley.edu/record=b12345678"
    );
}

#[test]
fn test_legacy_record_links_to_bib_not_control_number() {
    let record = reading()
        .with_control_field("001", "ocm04264484")
        .with_field(DataField::new("907", ' ', ' ').with_subfield('a', ".b12345678"));
    let registry = FieldRegistry::standard().unwrap();
    let catalog = CatalogConfig::default();
    let metadata = Metadata::new(record, registry, &catalog);

    let identifier = metadata.identifier().unwrap();
    assert_eq!(identifier.id_type, IdentifierType::BibNumber);
    assert_eq!(identifier.id, "b123456782");
    assert_eq!(
        metadata.catalog_url().as_deref(),
        Some("http://oskicat.berkeley.edu/record=b12345678")
    );
}

#[test]
fn test_check_digit_properties() {
    for digits in ["12345678", "10000000", "11111111", "10000006", "99999999"] {
        let check = compute_check_digit(digits).unwrap();
        assert!(check == 'x' || check.is_ascii_digit());

        let filled = ensure_check_digit(&format!("b{}", digits)).unwrap();
        assert_eq!(filled, format!("b{}{}", digits, check));
        assert_eq!(ensure_check_digit(&filled).unwrap(), filled);
        assert_eq!(ensure_check_digit(&format!("b{}a", digits)).unwrap(), filled);
        assert_eq!(strip_check_digit(&filled), format!("b{}", digits));
    }

    assert!(matches!(
        ensure_check_digit("b123456789"),
        Err(MetadataError::CheckDigitMismatch { expected: '2', actual: '9', .. })
    ));
}

#[test]
fn test_restrictions_flow_through_metadata() {
    let registry = FieldRegistry::standard().unwrap();
    let catalog = CatalogConfig::default();

    let open = Metadata::new(reading(), registry, &catalog);
    assert!(!open.restrictions().is_restricted());

    let record = reading()
        .with_field(DataField::new("506", ' ', ' ').with_subfield('a', "CalNet login required"));
    let restricted = Metadata::new(record, registry, &catalog);
    assert!(restricted.restrictions().requires_credential);
    assert!(!restricted.restrictions().requires_credential_or_network);
}
