//! Configuration management for AV metadata

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FieldsConfig {
    /// Field configuration JSON replacing the bundled one
    pub path: Option<String>,
}

/// Catalog URL templates, one per identifier scheme. `{id}` is replaced
/// with the identifier.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub mms_id_url: String,
    pub bib_number_url: String,
    pub oclc_number_url: String,
    pub repository_id_url: String,
    /// Display text of an injected catalog link
    pub link_body: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub fields: FieldsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // AV_METADATA__CATALOG__LINK_BODY etc.
            .add_source(
                Environment::with_prefix("AV_METADATA")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("fields.path", env::var("AV_FIELDS_PATH").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl CatalogConfig {
    /// Expand a template with the given identifier
    pub fn expand(template: &str, id: &str) -> String {
        template.replace("{id}", id)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mms_id_url: "https://search.library.berkeley.edu/discovery/fulldisplay?context=L&vid=01UCS_BER:UCB&docid=alma{id}".to_string(),
            bib_number_url: "http://oskicat.berkeley.edu/record={id}".to_string(),
            oclc_number_url: "https://www.worldcat.org/oclc/{id}".to_string(),
            repository_id_url: "https://digicoll.lib.berkeley.edu/record/{id}".to_string(),
            link_body: "View library catalog record.".to_string(),
        }
    }
}
