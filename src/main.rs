//! AV metadata - print the metadata of ISO 2709 MARC files
//!
//! Usage: `av-metadata [--json] <file.mrc>...`

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use av_metadata::{config::AppConfig, FieldRegistry, MarcRecord, Metadata};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("av_metadata={}", config.logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let mut json = false;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => paths.push(arg),
        }
    }
    if paths.is_empty() {
        anyhow::bail!("usage: av-metadata [--json] <file.mrc>...");
    }

    let configured;
    let fields: &FieldRegistry = match &config.fields.path {
        Some(path) => {
            tracing::info!("Loading field configuration from {}", path);
            configured = FieldRegistry::from_path(path)?;
            &configured
        }
        None => FieldRegistry::standard()?,
    };

    for path in &paths {
        let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
        let records = MarcRecord::read_all(&data);
        tracing::info!("{}: {} records", path, records.len());

        for record in records {
            let metadata = Metadata::new(record, fields, &config.catalog);
            if json {
                let output = serde_json::json!({
                    "identifier": metadata.identifier(),
                    "catalog_url": metadata.catalog_url(),
                    "values": metadata.values(),
                    "tracks": metadata.tracks(),
                    "restrictions": metadata.restrictions(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_metadata(&metadata);
            }
        }
    }

    Ok(())
}

fn print_metadata(metadata: &Metadata<'_>) {
    match metadata.identifier() {
        Some(identifier) => println!("== {}", identifier),
        None => println!("== (no identifier)"),
    }
    print!("{}", metadata);
    for track in metadata.tracks() {
        println!("  [{:?}] {}", track.file_type(), track);
    }
    let restrictions = metadata.restrictions();
    println!(
        "Restrictions: credential={} credential_or_network={}",
        restrictions.requires_credential, restrictions.requires_credential_or_network
    );
}
