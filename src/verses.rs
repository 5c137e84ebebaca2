//! Per-verse materialization.
//!
//! Flattens the base document plus every translation document into one
//! globally numbered verse-per-file dataset:
//!
//! ```text
//! dist/verses/
//! ├── 1.json                   # First verse of chapter 1
//! ├── 2.json
//! └── ... 6236.json            # Last verse of chapter 114
//! ```
//!
//! Each record is self-contained: its own text and transliteration, a
//! `translations` map with one entry per translation language, and a
//! denormalized summary of its parent chapter (which carries its own
//! per-language map of the translated chapter name). Records are flattened
//! in memory first, then written in fixed-size batches so peak in-flight
//! file I/O stays bounded.
//!
//! All documents here share the base text's chapter/verse shape (validated
//! during assembly), so lookups across documents are positional.

use crate::types::{self, ChapterType, Quran};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum VersesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One flattened verse record.
#[derive(Debug, Serialize)]
pub struct VerseRecord {
    /// Global verse number, contiguous from 1 across the whole corpus.
    pub id: u32,
    /// Verse number within its chapter.
    pub number: u32,
    pub text: String,
    /// Language code → translated verse text.
    pub translations: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    pub chapter: ChapterContext,
}

/// Denormalized parent-chapter summary embedded in every verse record.
#[derive(Debug, Serialize)]
pub struct ChapterContext {
    pub id: u32,
    pub name: String,
    pub transliteration: String,
    /// Language code → translated chapter name.
    pub translations: BTreeMap<String, Option<String>>,
    #[serde(rename = "type")]
    pub kind: ChapterType,
}

/// Flatten the base document and the translation documents into globally
/// numbered records, in base-document order.
pub fn flatten(base: &Quran, translations: &[Quran]) -> Vec<VerseRecord> {
    let translated: Vec<(&str, &Quran)> = translations
        .iter()
        .filter_map(|document| document.lang.code().map(|code| (code, document)))
        .collect();

    let mut id = 0u32;
    let mut records = Vec::with_capacity(base.verse_count());
    for (chapter_idx, chapter) in base.chapters.iter().enumerate() {
        let chapter_names: BTreeMap<String, Option<String>> = translated
            .iter()
            .map(|(code, document)| {
                (
                    (*code).to_string(),
                    document.chapters[chapter_idx].translation.clone(),
                )
            })
            .collect();

        for (verse_idx, verse) in chapter.verses.iter().enumerate() {
            id += 1;
            let translations = translated
                .iter()
                .map(|(code, document)| {
                    (
                        (*code).to_string(),
                        document.chapters[chapter_idx].verses[verse_idx]
                            .translation
                            .clone(),
                    )
                })
                .collect();

            records.push(VerseRecord {
                id,
                number: verse.id,
                text: verse.text.clone(),
                translations,
                transliteration: verse.transliteration.clone(),
                chapter: ChapterContext {
                    id: chapter.id,
                    name: chapter.name.clone(),
                    transliteration: chapter.transliteration.clone(),
                    translations: chapter_names.clone(),
                    kind: chapter.kind,
                },
            });
        }
    }
    records
}

/// Write the verse records under `verses/`, `batch_size` files at a time.
/// Each batch is awaited fully before the next starts.
pub async fn write_verses(
    records: &[VerseRecord],
    output_dir: &Path,
    batch_size: usize,
    pretty: bool,
) -> Result<usize, VersesError> {
    let dir = output_dir.join("verses");
    fs::create_dir_all(&dir).await?;

    for batch in records.chunks(batch_size.max(1)) {
        let writes = batch.iter().map(|record| {
            let path = dir.join(format!("{}.json", record.id));
            async move {
                let json = types::to_json(record, pretty)?;
                fs::write(&path, json).await?;
                Ok::<_, VersesError>(())
            }
        });
        try_join_all(writes).await?;
    }
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chapter, DocumentLang, Verse};
    use tempfile::TempDir;

    /// Two chapters of 3 and 4 verses, with per-language texts derived
    /// from the language code so assertions can trace provenance.
    fn corpus() -> (Quran, Vec<Quran>) {
        let build = |lang: DocumentLang| {
            let code = lang.code().map(str::to_string);
            let chapters = [(1u32, 3usize), (2, 4)]
                .iter()
                .map(|&(id, count)| Chapter {
                    id,
                    name: format!("chapter {id}"),
                    transliteration: format!("Chapter-{id}"),
                    translation: code.as_ref().map(|c| format!("{c} chapter {id}")),
                    kind: ChapterType::Meccan,
                    total_verses: count,
                    verses: (1..=count as u32)
                        .map(|v| Verse {
                            id: v,
                            text: format!("text {id}:{v}"),
                            tajweed: None,
                            translation: code.as_ref().map(|c| format!("{c} {id}:{v}")),
                            transliteration: Some(format!("roman {id}:{v}")),
                        })
                        .collect(),
                })
                .collect();
            Quran { lang, chapters }
        };

        let base = build(DocumentLang::Base);
        let translations = vec![
            build(DocumentLang::Translation("en".into())),
            build(DocumentLang::Translation("ha_gumi".into())),
        ];
        (base, translations)
    }

    // =========================================================================
    // Flattening
    // =========================================================================

    #[test]
    fn global_ids_are_contiguous_from_one() {
        let (base, translations) = corpus();
        let records = flatten(&base, &translations);

        assert_eq!(records.len(), 7);
        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<u32>>());
    }

    #[test]
    fn translations_map_has_exactly_the_translated_codes() {
        let (base, translations) = corpus();
        let records = flatten(&base, &translations);

        for record in &records {
            let keys: Vec<&str> = record.translations.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["en", "ha_gumi"]);
        }
    }

    #[test]
    fn translations_come_from_matching_position() {
        let (base, translations) = corpus();
        let records = flatten(&base, &translations);

        // Global id 5 is chapter 2, verse 2.
        let record = &records[4];
        assert_eq!(record.number, 2);
        assert_eq!(record.chapter.id, 2);
        assert_eq!(
            record.translations["en"].as_deref(),
            Some("en 2:2")
        );
        assert_eq!(
            record.translations["ha_gumi"].as_deref(),
            Some("ha_gumi 2:2")
        );
    }

    #[test]
    fn chapter_context_carries_translated_names() {
        let (base, translations) = corpus();
        let records = flatten(&base, &translations);

        let record = &records[0];
        assert_eq!(record.chapter.name, "chapter 1");
        assert_eq!(
            record.chapter.translations["ha_gumi"].as_deref(),
            Some("ha_gumi chapter 1")
        );
    }

    #[test]
    fn transliteration_is_taken_from_base_verse() {
        let (base, translations) = corpus();
        let records = flatten(&base, &translations);

        assert_eq!(records[6].transliteration.as_deref(), Some("roman 2:4"));
    }

    #[test]
    fn flatten_without_translations_yields_empty_maps() {
        let (base, _) = corpus();
        let records = flatten(&base, &[]);

        assert!(records.iter().all(|r| r.translations.is_empty()));
        assert!(records.iter().all(|r| r.chapter.translations.is_empty()));
    }

    // =========================================================================
    // Batched writes
    // =========================================================================

    #[tokio::test]
    async fn writes_every_record_across_batches() {
        let tmp = TempDir::new().unwrap();
        let (base, translations) = corpus();
        let records = flatten(&base, &translations);

        let written = write_verses(&records, tmp.path(), 3, false).await.unwrap();

        assert_eq!(written, 7);
        for id in 1..=7 {
            assert!(tmp.path().join(format!("verses/{id}.json")).exists());
        }
    }

    #[tokio::test]
    async fn written_record_is_self_contained() {
        let tmp = TempDir::new().unwrap();
        let (base, translations) = corpus();
        let records = flatten(&base, &translations);

        write_verses(&records, tmp.path(), 100, true).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(tmp.path().join("verses/4.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(value["id"].as_u64(), Some(4));
        assert_eq!(value["number"].as_u64(), Some(1));
        assert_eq!(value["chapter"]["id"].as_u64(), Some(2));
        assert_eq!(value["chapter"]["type"].as_str(), Some("meccan"));
        assert!(value["translations"].get("en").is_some());
    }
}
