//! Per-language document assembly and the transliteration cross-merge.
//!
//! For each requested language this stage joins three local sources
//! (chapter metadata, the base Uthmani text, and, for everything but the
//! base document, that language's edition) with the remote tajweed text,
//! producing one in-memory [`Quran`] document per language.
//!
//! The chapter loop inside one assembly is strictly sequential: every
//! successful tajweed fetch is followed by a fixed pause to stay under the
//! API's rate limit, and a rate-limited chapter is retried before the loop
//! advances. Assemblies for different languages are independent and run
//! concurrently; the driver joins them before the cross-merge.
//!
//! All sources are zipped positionally, so verse counts are validated
//! against the base text before any chapter is built. A disagreement
//! aborts the run with a named mismatch error instead of silently
//! misaligning the dataset.

use crate::sources::{self, ChapterMeta, SourceError, VersesByChapter};
use crate::tajweed::{self, RetryPolicy, TajweedError, TajweedSource};
use crate::types::{self, Chapter, DocumentLang, Quran, Verse};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Tajweed(#[from] TajweedError),
}

/// Assemble one language's complete document.
///
/// Reads the local sources for `lang`, fetches tajweed chapter by chapter
/// through `source`, validates positional alignment, and zips everything
/// into chapters. The returned document has no transliteration on its
/// verses yet (unless it *is* the transliteration document); that is
/// injected later by [`merge_transliteration`].
pub async fn assemble_document<S>(
    data_dir: &Path,
    lang: &DocumentLang,
    source: &S,
    policy: &RetryPolicy,
    chapter_delay: Duration,
) -> Result<Quran, AssembleError>
where
    S: TajweedSource + ?Sized,
{
    let metas = sources::load_chapter_metadata(data_dir, lang.metadata_code()).await?;
    let base = sources::load_base_text(data_dir).await?;
    let edition = match lang.code() {
        Some(code) => Some((code, sources::load_edition(data_dir, code).await?)),
        None => None,
    };

    let mut chapters = Vec::with_capacity(metas.len());
    for meta in &metas {
        let tajweed = chapter_tajweed(source, meta.id, policy, chapter_delay).await?;
        let edition = edition.as_ref().map(|(code, rows)| (*code, rows));
        chapters.push(build_chapter(meta, &base, edition, tajweed, lang)?);
    }

    Ok(Quran {
        lang: lang.clone(),
        chapters,
    })
}

/// Fetch one chapter's tajweed text.
///
/// Rate-limit exhaustion aborts the run; any other failure degrades the
/// chapter to no tajweed and the loop advances. The pause after a
/// successful fetch keeps the request rate under the API's limit.
async fn chapter_tajweed<S>(
    source: &S,
    chapter: u32,
    policy: &RetryPolicy,
    delay: Duration,
) -> Result<Option<Vec<String>>, TajweedError>
where
    S: TajweedSource + ?Sized,
{
    debug!(chapter, "fetching tajweed");
    match tajweed::fetch_with_retry(source, chapter, policy).await {
        Ok(verses) => {
            tokio::time::sleep(delay).await;
            Ok((!verses.is_empty()).then_some(verses))
        }
        Err(err) if err.is_terminal() => Err(err),
        Err(err) => {
            warn!(chapter, error = %err, "tajweed unavailable, continuing without it");
            Ok(None)
        }
    }
}

fn build_chapter(
    meta: &ChapterMeta,
    base: &VersesByChapter,
    edition: Option<(&str, &VersesByChapter)>,
    tajweed: Option<Vec<String>>,
    lang: &DocumentLang,
) -> Result<Chapter, SourceError> {
    let base_verses = sources::chapter_verses(base, meta.id, "quran.json")?;
    sources::check_alignment(meta.id, "quran.json", meta.total_verses, base_verses.len())?;

    let edition_verses = edition
        .map(|(code, rows)| {
            let label = format!("editions/{code}.json");
            let rows = sources::chapter_verses(rows, meta.id, &label)?;
            sources::check_alignment(meta.id, &label, base_verses.len(), rows.len())?;
            Ok::<_, SourceError>(rows)
        })
        .transpose()?;

    if let Some(rows) = &tajweed {
        sources::check_alignment(meta.id, "tajweed", base_verses.len(), rows.len())?;
    }

    let verses = base_verses
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut verse = Verse {
                id: row.verse,
                text: row.text.clone(),
                tajweed: tajweed.as_ref().map(|rows| rows[idx].clone()),
                translation: None,
                transliteration: None,
            };
            if let Some(rows) = edition_verses {
                let text = rows[idx].text.clone();
                if lang.is_transliteration() {
                    verse.transliteration = Some(text);
                } else {
                    verse.translation = Some(text);
                }
            }
            verse
        })
        .collect();

    Ok(Chapter {
        id: meta.id,
        name: meta.name.clone(),
        transliteration: meta.transliteration.clone(),
        translation: (!lang.is_base()).then(|| meta.translation.clone()),
        kind: meta.kind,
        total_verses: meta.total_verses,
        verses,
    })
}

/// Copy the transliteration document's per-verse romanization into every
/// verse of the given documents (positional match by chapter and verse
/// index; all documents share the base text's shape).
pub fn merge_transliteration(documents: &mut [Quran], transliteration: &Quran) {
    for document in documents {
        for (chapter, source) in document
            .chapters
            .iter_mut()
            .zip(&transliteration.chapters)
        {
            for (verse, romanized) in chapter.verses.iter_mut().zip(&source.verses) {
                verse.transliteration = romanized.transliteration.clone();
            }
        }
    }
}

/// Write a document's consolidated JSON artifact, returning its path.
pub async fn write_document(
    document: &Quran,
    output_dir: &Path,
    pretty: bool,
) -> Result<PathBuf, AssembleError> {
    let path = output_dir.join(document.lang.filename());
    let json = types::to_json(&document.chapters, pretty)?;
    tokio::fs::create_dir_all(output_dir).await?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}
