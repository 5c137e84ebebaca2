//! # quran-json
//!
//! Generates the quran-json dataset: the complete Quran text with
//! translations, transliteration, and tajweed annotation, materialized as
//! static JSON for CDN distribution at three granularities (whole corpus,
//! per chapter, per verse).
//!
//! # Architecture: Two-Stage Pipeline
//!
//! Two independent stages, connected only through the local `data/`
//! directory:
//!
//! ```text
//! 1. Download   remote APIs  →  data/     (one-time fetch-and-cache)
//! 2. Build      data/        →  dist/     (assemble, merge, project)
//! ```
//!
//! The download stage is a simple collaborator: each target file is
//! fetched once and skipped on later runs. The build stage is where the
//! work happens. For every language it joins chapter metadata, the base
//! Uthmani text, and that language's edition with remote tajweed markup,
//! then re-projects the merged documents into three output shapes:
//!
//! ```text
//! dist/
//! ├── quran.json               # Consolidated documents
//! ├── quran_transliteration.json
//! ├── quran_<lang>.json
//! ├── chapters/
//! │   ├── 1.json … 114.json    # One file per chapter
//! │   ├── index.json           # All chapters sans verses, with CDN links
//! │   └── <lang>/...
//! └── verses/
//!     └── 1.json … 6236.json   # Globally numbered, multi-language verses
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`download`] | Ingestion: chapter metadata and editions into `data/` |
//! | [`sources`] | Typed loading of `data/` files, alignment validation |
//! | [`tajweed`] | Remote tajweed fetch with bounded rate-limit retry |
//! | [`assemble`] | Per-language document assembly, transliteration cross-merge |
//! | [`chapters`] | Per-chapter artifacts and the linked chapter index |
//! | [`verses`] | Flattened per-verse artifacts with translation maps |
//! | [`pipeline`] | Build-stage driver wiring the stages together |
//! | [`config`] | Sparse `config.toml` loading and validation |
//! | [`types`] | Shared dataset types serialized into every artifact |
//! | [`output`] | CLI output formatting for both stages |
//!
//! # Design Decisions
//!
//! ## Positional Alignment Is Validated
//!
//! Every source (base text, each edition, each tajweed response) is an
//! ordered verse list zipped by position. The pipeline checks verse counts
//! per chapter across all of them before zipping and aborts with a named
//! mismatch error on disagreement. A silent misalignment would attach the
//! wrong translation to every following verse of a chapter, which is far
//! worse than a failed run.
//!
//! ## Bounded Retry on Rate Limits
//!
//! The tajweed API rate-limits aggressively. Rate-limited chapters are
//! retried with exponential backoff up to a configured attempt cap, and
//! exhausting the cap aborts the run. Any other per-chapter failure
//! degrades that chapter to `tajweed: null` and the run continues. A
//! missing annotation is tolerable; an infinite retry loop is not.
//!
//! ## Deterministic Artifacts
//!
//! Translation maps serialize from `BTreeMap` and chapters and verses
//! keep source order, so the same inputs always produce byte-identical
//! output and dataset diffs between releases stay reviewable.

pub mod assemble;
pub mod chapters;
pub mod config;
pub mod download;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod tajweed;
pub mod types;
pub mod verses;

#[cfg(test)]
pub(crate) mod test_helpers;
