//! Generator configuration module.
//!
//! Handles loading and validating `config.toml`. Configuration is sparse:
//! stock defaults cover the published dataset, and a user config file needs
//! to specify only the values it overrides.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [languages]
//! # Translation languages, in dataset order
//! translations = ["en", "ha_gumi", "yoruba_mikail"]
//!
//! # Download sources per language: the edition slug on the
//! # fawazahmed0/quran-api CDN and the chapter-metadata API language
//! [languages.sources.en]
//! edition = "eng-ummmuhammad"
//! metadata = "en"
//!
//! [languages.sources.ha_gumi]
//! edition = "hau-abubakarmahmoud"
//! metadata = "ha"
//!
//! [languages.sources.yoruba_mikail]
//! edition = "yor-shaykhaburahima"
//! metadata = "yo"
//!
//! [download]
//! chapters_url = "https://api.quran.com/api/v4"
//! editions_url = "https://cdn.jsdelivr.net/gh/fawazahmed0/quran-api@1/editions"
//! base_edition = "ara-quranuthmanienc"
//! transliteration_edition = "ara-quran-la"
//!
//! [tajweed]
//! endpoint = "https://api.alquran.cloud/v1"
//! chapter_delay_ms = 500      # pause between chapters after a success
//! retry_base_delay_ms = 5000  # first rate-limit wait, doubles per retry
//! max_retries = 5             # retries after the initial attempt
//!
//! [output]
//! cdn_base = "https://cdn.jsdelivr.net/npm/quran-json"
//! verse_batch_size = 100      # verse files written per I/O batch
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `config.toml`.
///
/// All fields have working defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Translation languages and their download sources.
    pub languages: LanguagesConfig,
    /// Remote endpoints for the ingestion stage.
    pub download: DownloadConfig,
    /// Tajweed API endpoint and rate-limit pacing.
    pub tajweed: TajweedConfig,
    /// Output layout settings.
    pub output: OutputConfig,
}

impl GeneratorConfig {
    /// Validate config values before a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.translations.is_empty() {
            return Err(ConfigError::Validation(
                "languages.translations must not be empty".into(),
            ));
        }
        for code in &self.languages.translations {
            if !self.languages.sources.contains_key(code) {
                return Err(ConfigError::Validation(format!(
                    "languages.sources is missing an entry for '{code}'"
                )));
            }
        }
        if self.tajweed.max_retries == 0 {
            return Err(ConfigError::Validation(
                "tajweed.max_retries must be at least 1".into(),
            ));
        }
        if self.output.verse_batch_size == 0 {
            return Err(ConfigError::Validation(
                "output.verse_batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Translation languages and per-language download sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguagesConfig {
    /// Translation language codes, in dataset order.
    pub translations: Vec<String>,
    /// Download sources per translation language.
    pub sources: BTreeMap<String, LanguageSource>,
}

/// Where a translation language's data comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageSource {
    /// Edition slug on the fawazahmed0/quran-api CDN.
    pub edition: String,
    /// `language` parameter for the chapter metadata API.
    pub metadata: String,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        let source = |edition: &str, metadata: &str| LanguageSource {
            edition: edition.to_string(),
            metadata: metadata.to_string(),
        };
        Self {
            translations: vec![
                "en".to_string(),
                "ha_gumi".to_string(),
                "yoruba_mikail".to_string(),
            ],
            sources: BTreeMap::from([
                ("en".to_string(), source("eng-ummmuhammad", "en")),
                ("ha_gumi".to_string(), source("hau-abubakarmahmoud", "ha")),
                (
                    "yoruba_mikail".to_string(),
                    source("yor-shaykhaburahima", "yo"),
                ),
            ]),
        }
    }
}

/// Remote endpoints for the ingestion stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    /// Chapter metadata API base URL.
    pub chapters_url: String,
    /// Edition CDN base URL.
    pub editions_url: String,
    /// Edition slug of the base Uthmani text.
    pub base_edition: String,
    /// Edition slug of the transliteration.
    pub transliteration_edition: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chapters_url: "https://api.quran.com/api/v4".to_string(),
            editions_url: "https://cdn.jsdelivr.net/gh/fawazahmed0/quran-api@1/editions"
                .to_string(),
            base_edition: "ara-quranuthmanienc".to_string(),
            transliteration_edition: "ara-quran-la".to_string(),
        }
    }
}

/// Tajweed API endpoint and rate-limit pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TajweedConfig {
    /// Tajweed API base URL.
    pub endpoint: String,
    /// Pause between chapters after a successful fetch, in milliseconds.
    pub chapter_delay_ms: u64,
    /// First wait after a rate-limited response, in milliseconds.
    /// Doubles on each subsequent retry.
    pub retry_base_delay_ms: u64,
    /// Maximum retries after the initial attempt before the run aborts.
    pub max_retries: usize,
}

impl Default for TajweedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.alquran.cloud/v1".to_string(),
            chapter_delay_ms: 500,
            retry_base_delay_ms: 5000,
            max_retries: 5,
        }
    }
}

/// Output layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// CDN base URL embedded in chapter index links.
    pub cdn_base: String,
    /// Number of verse files written per I/O batch.
    pub verse_batch_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cdn_base: "https://cdn.jsdelivr.net/npm/quran-json".to_string(),
            verse_batch_size: 100,
        }
    }
}

/// Load `config.toml` from the given directory, falling back to stock
/// defaults when the file doesn't exist.
pub fn load_config(root: &Path) -> Result<GeneratorConfig, ConfigError> {
    let path = root.join("config.toml");
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: GeneratorConfig = toml::from_str(&content)?;
    Ok(config)
}

/// A documented stock `config.toml` with every option at its default,
/// printed by the `gen-config` subcommand.
pub fn stock_config_toml() -> &'static str {
    r##"# quran-json Generator Configuration
# ==================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Languages
# ---------------------------------------------------------------------------
[languages]
# Translation languages, in dataset order.
translations = ["en", "ha_gumi", "yoruba_mikail"]

# Download sources per language: the edition slug on the
# fawazahmed0/quran-api CDN and the chapter-metadata API language.
[languages.sources.en]
edition = "eng-ummmuhammad"
metadata = "en"

[languages.sources.ha_gumi]
edition = "hau-abubakarmahmoud"
metadata = "ha"

[languages.sources.yoruba_mikail]
edition = "yor-shaykhaburahima"
metadata = "yo"

# ---------------------------------------------------------------------------
# Ingestion endpoints
# ---------------------------------------------------------------------------
[download]
chapters_url = "https://api.quran.com/api/v4"
editions_url = "https://cdn.jsdelivr.net/gh/fawazahmed0/quran-api@1/editions"
# Edition slug of the base Uthmani text.
base_edition = "ara-quranuthmanienc"
# Edition slug of the transliteration.
transliteration_edition = "ara-quran-la"

# ---------------------------------------------------------------------------
# Tajweed API pacing
# ---------------------------------------------------------------------------
[tajweed]
endpoint = "https://api.alquran.cloud/v1"
# Pause between chapters after a successful fetch.
chapter_delay_ms = 500
# First wait after a rate-limited response; doubles on each retry.
retry_base_delay_ms = 5000
# Retries after the initial attempt before the run aborts.
max_retries = 5

# ---------------------------------------------------------------------------
# Output layout
# ---------------------------------------------------------------------------
[output]
# CDN base URL embedded in chapter index links.
cdn_base = "https://cdn.jsdelivr.net/npm/quran-json"
# Verse files written per I/O batch.
verse_batch_size = 100
"##
}
