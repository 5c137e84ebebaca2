//! Local source file loading for the build stage.
//!
//! The build pipeline consumes three kinds of files from the `data/`
//! directory, all produced by the `download` stage:
//!
//! ```text
//! data/
//! ├── chapters/
//! │   ├── en.json              # Chapter metadata per language
//! │   └── ha_gumi.json
//! ├── quran.json               # Base Uthmani text, keyed by chapter id
//! └── editions/
//!     ├── transliteration.json # Romanization, same shape as quran.json
//!     ├── en.json              # Translation editions
//!     └── ha_gumi.json
//! ```
//!
//! ## Alignment
//!
//! Every source is keyed by chapter id and ordered by verse position, and
//! the pipeline zips them positionally. A verse-count disagreement between
//! any two sources would silently misalign the dataset, so loaders expose
//! [`chapter_verses`] and [`check_alignment`] and the assembly stage calls
//! them before zipping. Violations surface as named
//! [`SourceError::VerseCountMismatch`] values and abort the run.

use crate::types::ChapterType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("chapter {chapter} missing from {source_name}")]
    MissingChapter { chapter: u32, source_name: String },
    #[error(
        "verse count mismatch in chapter {chapter}: {source_name} has {found} verses, expected {expected}"
    )]
    VerseCountMismatch {
        chapter: u32,
        source_name: String,
        expected: usize,
        found: usize,
    },
}

/// Chapter metadata entry from `data/chapters/<lang>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterMeta {
    pub id: u32,
    pub name: String,
    pub transliteration: String,
    pub translation: String,
    #[serde(rename = "type")]
    pub kind: ChapterType,
    pub total_verses: usize,
}

/// One verse row from the base text or an edition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceVerse {
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

/// Verse rows grouped by chapter id, ordered within each chapter.
pub type VersesByChapter = BTreeMap<u32, Vec<SourceVerse>>;

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let content = fs::read_to_string(path).await.map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the ordered chapter metadata list for a metadata language code.
pub async fn load_chapter_metadata(
    data_dir: &Path,
    lang: &str,
) -> Result<Vec<ChapterMeta>, SourceError> {
    read_json(&data_dir.join("chapters").join(format!("{lang}.json"))).await
}

/// Load the base Uthmani text, keyed by chapter id.
pub async fn load_base_text(data_dir: &Path) -> Result<VersesByChapter, SourceError> {
    read_json(&data_dir.join("quran.json")).await
}

/// Load a translation or transliteration edition, keyed by chapter id.
pub async fn load_edition(data_dir: &Path, lang: &str) -> Result<VersesByChapter, SourceError> {
    read_json(&data_dir.join("editions").join(format!("{lang}.json"))).await
}

/// Look up one chapter's verse rows, naming the source on a miss.
pub fn chapter_verses<'a>(
    verses: &'a VersesByChapter,
    chapter: u32,
    source: &str,
) -> Result<&'a [SourceVerse], SourceError> {
    verses
        .get(&chapter)
        .map(Vec::as_slice)
        .ok_or_else(|| SourceError::MissingChapter {
            chapter,
            source_name: source.to_string(),
        })
}

/// Require a source's verse count to match the expected count for a chapter.
pub fn check_alignment(
    chapter: u32,
    source: &str,
    expected: usize,
    found: usize,
) -> Result<(), SourceError> {
    if found == expected {
        Ok(())
    } else {
        Err(SourceError::VerseCountMismatch {
            chapter,
            source_name: source.to_string(),
            expected,
            found,
        })
    }
}
