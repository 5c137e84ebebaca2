//! Per-chapter materialization and the chapter index.
//!
//! Re-projects a finished language document into one JSON file per chapter
//! plus an aggregate `index.json` that lists every chapter without its
//! verses and links to the chapter's published CDN location:
//!
//! ```text
//! dist/chapters/
//! ├── 1.json … 114.json        # Base document
//! ├── index.json
//! └── en/
//!     ├── 1.json … 114.json    # One subtree per translation language
//!     └── index.json
//! ```
//!
//! Index links embed the crate version, so a release pins its readers to
//! the matching artifact revision. All per-chapter writes for one language
//! run in parallel.

use crate::types::{self, Chapter, ChapterType, Quran};
use futures::future::try_join_all;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ChaptersError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of `index.json`: a chapter without its verses, plus the
/// absolute URL of the per-chapter artifact on the CDN.
#[derive(Debug, Serialize)]
pub struct IndexEntry {
    pub id: u32,
    pub name: String,
    pub transliteration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(rename = "type")]
    pub kind: ChapterType,
    pub total_verses: usize,
    pub link: String,
}

/// Summary of one language's chapter tree, for progress output.
#[derive(Debug)]
pub struct ChaptersReport {
    /// Path of the tree relative to the output root, e.g. `chapters/en`.
    pub scope: String,
    /// Number of per-chapter files written (excluding the index).
    pub files: usize,
}

/// Write one language's per-chapter files and index.
///
/// Files land under `chapters/` for the base document and
/// `chapters/<lang>/` for translations. The chapter writes run in
/// parallel; the index is written after all of them succeed.
pub async fn write_chapters(
    document: &Quran,
    output_dir: &Path,
    cdn_base: &str,
    version: &str,
    pretty: bool,
) -> Result<ChaptersReport, ChaptersError> {
    let lang = document.lang.code();
    let dir = match lang {
        Some(code) => output_dir.join("chapters").join(code),
        None => output_dir.join("chapters"),
    };
    fs::create_dir_all(&dir).await?;

    let writes = document.chapters.iter().map(|chapter| {
        let path = dir.join(format!("{}.json", chapter.id));
        async move {
            let json = types::to_json(chapter, pretty)?;
            fs::write(&path, json).await?;
            Ok::<_, ChaptersError>(())
        }
    });
    try_join_all(writes).await?;

    let index: Vec<IndexEntry> = document
        .chapters
        .iter()
        .map(|chapter| index_entry(chapter, lang, cdn_base, version))
        .collect();
    fs::write(dir.join("index.json"), types::to_json(&index, pretty)?).await?;

    let scope = match lang {
        Some(code) => format!("chapters/{code}"),
        None => "chapters".to_string(),
    };
    Ok(ChaptersReport {
        scope,
        files: document.chapters.len(),
    })
}

fn index_entry(chapter: &Chapter, lang: Option<&str>, cdn_base: &str, version: &str) -> IndexEntry {
    let filename = match lang {
        Some(code) => format!("{}/{}.json", code, chapter.id),
        None => format!("{}.json", chapter.id),
    };
    IndexEntry {
        id: chapter.id,
        name: chapter.name.clone(),
        transliteration: chapter.transliteration.clone(),
        translation: chapter.translation.clone(),
        kind: chapter.kind,
        total_verses: chapter.total_verses,
        link: format!("{cdn_base}@{version}/dist/chapters/{filename}"),
    }
}
