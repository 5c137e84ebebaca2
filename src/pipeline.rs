//! Build-stage driver: wires assembly, cross-merge, and materialization.
//!
//! The driver owns the stage ordering guarantees:
//!
//! 1. Empty the output tree; no stale artifacts survive a run.
//! 2. Assemble the transliteration document, the base document, and one
//!    document per configured translation language, concurrently, and
//!    write each consolidated artifact.
//! 3. Cross-merge the romanization into every other document.
//! 4. Materialize per-chapter trees for the base and translation
//!    documents, concurrently.
//! 5. Materialize the per-verse tree from all of them together.
//!
//! Steps 4 and 5 only start after every document exists in memory; the
//! verse records reference all documents at once.

use crate::assemble::{self, AssembleError};
use crate::chapters::{self, ChaptersError, ChaptersReport};
use crate::config::GeneratorConfig;
use crate::tajweed::{RetryPolicy, TajweedSource};
use crate::types::DocumentLang;
use crate::verses::{self, VersesError};
use futures::future::try_join_all;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error(transparent)]
    Chapters(#[from] ChaptersError),
    #[error(transparent)]
    Verses(#[from] VersesError),
}

/// Summary of one build run, consumed by the CLI progress output.
#[derive(Debug)]
pub struct BuildReport {
    pub documents: Vec<DocumentReport>,
    pub chapter_trees: Vec<ChaptersReport>,
    pub verse_files: usize,
    pub verse_batches: usize,
}

/// One consolidated document artifact.
#[derive(Debug)]
pub struct DocumentReport {
    pub filename: String,
    pub chapters: usize,
    pub verses: usize,
}

/// Run the full build: every document, every projection.
pub async fn run<S>(
    config: &GeneratorConfig,
    data_dir: &Path,
    output_dir: &Path,
    source: &S,
    pretty: bool,
) -> Result<BuildReport, PipelineError>
where
    S: TajweedSource + ?Sized,
{
    let policy = RetryPolicy::from_config(&config.tajweed);
    let chapter_delay = Duration::from_millis(config.tajweed.chapter_delay_ms);

    if output_dir.exists() {
        tokio::fs::remove_dir_all(output_dir).await?;
    }
    tokio::fs::create_dir_all(output_dir).await?;

    let mut langs = vec![DocumentLang::Transliteration, DocumentLang::Base];
    langs.extend(
        config
            .languages
            .translations
            .iter()
            .cloned()
            .map(DocumentLang::Translation),
    );

    let mut documents = try_join_all(langs.iter().map(|lang| {
        assemble::assemble_document(data_dir, lang, source, &policy, chapter_delay)
    }))
    .await?;

    try_join_all(
        documents
            .iter()
            .map(|document| assemble::write_document(document, output_dir, pretty)),
    )
    .await?;

    let document_reports = documents
        .iter()
        .map(|document| DocumentReport {
            filename: document.lang.filename(),
            chapters: document.chapters.len(),
            verses: document.verse_count(),
        })
        .collect();

    // The transliteration document is merge input only: it gets a
    // consolidated artifact but no per-chapter or per-verse projection.
    let transliteration = documents.remove(0);
    assemble::merge_transliteration(&mut documents, &transliteration);

    let chapter_trees = try_join_all(documents.iter().map(|document| {
        chapters::write_chapters(
            document,
            output_dir,
            &config.output.cdn_base,
            env!("CARGO_PKG_VERSION"),
            pretty,
        )
    }))
    .await?;

    let base = &documents[0];
    let records = verses::flatten(base, &documents[1..]);
    let verse_files =
        verses::write_verses(&records, output_dir, config.output.verse_batch_size, pretty).await?;
    let verse_batches = records.len().div_ceil(config.output.verse_batch_size.max(1));

    Ok(BuildReport {
        documents: document_reports,
        chapter_trees,
        verse_files,
        verse_batches,
    })
}
