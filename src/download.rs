//! Ingestion stage: fetch remote sources into the local `data/` tree.
//!
//! A one-time, fetch-and-cache utility. Each target file is downloaded at
//! most once: if it already exists on disk the download is skipped
//! entirely, so re-runs are cheap and the build stage always works from
//! the same frozen inputs. `--clean` empties `data/` to force a refresh.
//!
//! Targets:
//!
//! - `data/chapters/<code>.json`: chapter metadata per translation
//!   language (plus English, which the base document always needs), from
//!   the quran.com API.
//! - `data/quran.json`: the base Uthmani text.
//! - `data/editions/<code>.json`: translation and transliteration
//!   editions from the fawazahmed0/quran-api CDN, re-grouped by chapter.
//!
//! Responses pass through a [`ResponseCache`] scoped to one [`Downloader`],
//! so repeated URLs within a run cost one request and no state outlives
//! the run. The calling pattern never requests the same URL concurrently.

use crate::config::{DownloadConfig, GeneratorConfig, LanguagesConfig};
use crate::sources::{ChapterMeta, SourceVerse, VersesByChapter};
use crate::types::ChapterType;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Run-scoped response cache (URL → parsed payload).
///
/// Lives and dies with one [`Downloader`]; repeated URLs within a run cost
/// a single request and nothing is shared across runs.
#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(url).cloned()
    }

    pub fn insert(&self, url: &str, payload: Value) {
        self.entries
            .lock()
            .unwrap()
            .insert(url.to_string(), payload);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one download target, for progress output.
#[derive(Debug)]
pub struct DownloadReport {
    /// Path relative to the data directory, e.g. `chapters/en.json`.
    pub target: String,
    /// False when the file already existed and the fetch was skipped.
    pub fetched: bool,
}

/// Downloads every configured source into the data directory.
pub struct Downloader {
    client: reqwest::Client,
    cache: ResponseCache,
    download: DownloadConfig,
    languages: LanguagesConfig,
    data_dir: PathBuf,
}

impl Downloader {
    pub fn new(config: &GeneratorConfig, data_dir: &Path) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            cache: ResponseCache::new(),
            download: config.download.clone(),
            languages: config.languages.clone(),
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Download every missing target: chapter metadata first, then the
    /// base text and editions. Targets within each group run in parallel.
    pub async fn run(&self) -> Result<Vec<DownloadReport>, DownloadError> {
        // The base document reads English metadata even when `en` is not
        // a configured translation.
        let mut chapter_jobs: BTreeMap<&str, &str> = BTreeMap::from([("en", "en")]);
        for code in &self.languages.translations {
            if let Some(source) = self.languages.sources.get(code) {
                chapter_jobs.insert(code.as_str(), source.metadata.as_str());
            }
        }

        let mut reports = try_join_all(
            chapter_jobs
                .iter()
                .map(|(code, api_lang)| self.chapter_list(code, api_lang)),
        )
        .await?;

        let mut edition_jobs: Vec<(&str, String)> = vec![
            (self.download.base_edition.as_str(), "quran.json".to_string()),
            (
                self.download.transliteration_edition.as_str(),
                "editions/transliteration.json".to_string(),
            ),
        ];
        for code in &self.languages.translations {
            if let Some(source) = self.languages.sources.get(code) {
                edition_jobs.push((source.edition.as_str(), format!("editions/{code}.json")));
            }
        }

        reports.extend(
            try_join_all(
                edition_jobs
                    .iter()
                    .map(|(slug, target)| self.edition(slug, target)),
            )
            .await?,
        );
        Ok(reports)
    }

    /// Fetch one language's chapter metadata list, unless already on disk.
    pub async fn chapter_list(
        &self,
        code: &str,
        api_lang: &str,
    ) -> Result<DownloadReport, DownloadError> {
        let target = format!("chapters/{code}.json");
        let path = self.data_dir.join(&target);
        if path.exists() {
            return Ok(DownloadReport {
                target,
                fetched: false,
            });
        }

        info!(code, "downloading chapter list");
        let url = format!(
            "{}/chapters?language={}",
            self.download.chapters_url, api_lang
        );
        let payload = self.fetch_cached(&url).await?;
        let parsed: ChaptersResponse = serde_json::from_value(payload)?;
        let metas: Vec<ChapterMeta> = parsed.chapters.into_iter().map(ChapterMeta::from).collect();

        write_json_file(&path, &metas).await?;
        Ok(DownloadReport {
            target,
            fetched: true,
        })
    }

    /// Fetch one edition and re-group its flat verse list by chapter,
    /// unless already on disk.
    pub async fn edition(&self, slug: &str, target: &str) -> Result<DownloadReport, DownloadError> {
        let path = self.data_dir.join(target);
        if path.exists() {
            return Ok(DownloadReport {
                target: target.to_string(),
                fetched: false,
            });
        }

        info!(slug, "downloading edition");
        let url = format!("{}/{}.json", self.download.editions_url, slug);
        let payload = self.fetch_cached(&url).await?;
        let parsed: EditionResponse = serde_json::from_value(payload)?;
        let grouped = group_by_chapter(parsed.quran);

        write_json_file(&path, &grouped).await?;
        Ok(DownloadReport {
            target: target.to_string(),
            fetched: true,
        })
    }

    async fn fetch_cached(&self, url: &str) -> Result<Value, DownloadError> {
        if let Some(payload) = self.cache.get(url) {
            return Ok(payload);
        }
        let payload: Value = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        self.cache.insert(url, payload.clone());
        Ok(payload)
    }
}

/// Empty the data directory (the `--clean` flag).
pub async fn clean(data_dir: &Path) -> Result<(), DownloadError> {
    if data_dir.exists() {
        fs::remove_dir_all(data_dir).await?;
    }
    fs::create_dir_all(data_dir).await?;
    Ok(())
}

/// Group an edition's flat verse list by chapter id, preserving verse
/// order within each chapter.
pub fn group_by_chapter(rows: Vec<SourceVerse>) -> VersesByChapter {
    let mut grouped = VersesByChapter::new();
    for row in rows {
        grouped.entry(row.chapter).or_default().push(row);
    }
    grouped
}

async fn write_json_file<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), DownloadError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?).await?;
    Ok(())
}

/// Edition file shape of the fawazahmed0/quran-api CDN: a flat verse list
/// under a `quran` key, re-grouped by chapter before it is written to disk.
#[derive(Deserialize)]
struct EditionResponse {
    quran: Vec<SourceVerse>,
}

/// Chapter metadata shape of the quran.com API.
#[derive(Deserialize)]
struct ChaptersResponse {
    chapters: Vec<RemoteChapter>,
}

#[derive(Deserialize)]
struct RemoteChapter {
    id: u32,
    name_arabic: String,
    name_simple: String,
    translated_name: TranslatedName,
    revelation_place: String,
    verses_count: usize,
}

#[derive(Deserialize)]
struct TranslatedName {
    name: String,
}

impl From<RemoteChapter> for ChapterMeta {
    fn from(remote: RemoteChapter) -> Self {
        let kind = if remote.revelation_place == "makkah" {
            ChapterType::Meccan
        } else {
            ChapterType::Medinan
        };
        ChapterMeta {
            id: remote.id,
            name: remote.name_arabic,
            transliteration: remote.name_simple,
            translation: remote.translated_name.name,
            kind,
            total_verses: remote.verses_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn offline_config() -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        // Nothing listens here; any attempted fetch fails loudly.
        config.download.chapters_url = "http://127.0.0.1:1/api/v4".to_string();
        config.download.editions_url = "http://127.0.0.1:1/editions".to_string();
        config
    }

    // =========================================================================
    // Skip-if-present
    // =========================================================================

    #[tokio::test]
    async fn existing_chapter_list_is_not_refetched() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("chapters")).unwrap();
        std::fs::write(tmp.path().join("chapters/en.json"), "[]").unwrap();

        let downloader = Downloader::new(&offline_config(), tmp.path()).unwrap();
        let report = downloader.chapter_list("en", "en").await.unwrap();

        assert!(!report.fetched);
        assert_eq!(report.target, "chapters/en.json");
    }

    #[tokio::test]
    async fn existing_edition_is_not_refetched() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("quran.json"), "{}").unwrap();

        let downloader = Downloader::new(&offline_config(), tmp.path()).unwrap();
        let report = downloader
            .edition("ara-quranuthmanienc", "quran.json")
            .await
            .unwrap();

        assert!(!report.fetched);
    }

    #[tokio::test]
    async fn missing_target_attempts_fetch() {
        let tmp = TempDir::new().unwrap();
        let downloader = Downloader::new(&offline_config(), tmp.path()).unwrap();

        let result = downloader.chapter_list("en", "en").await;

        assert!(matches!(result, Err(DownloadError::Http(_))));
    }

    // =========================================================================
    // Response projection
    // =========================================================================

    #[test]
    fn remote_chapter_projects_to_metadata() {
        let remote: RemoteChapter = serde_json::from_value(json!({
            "id": 1,
            "name_arabic": "الفاتحة",
            "name_simple": "Al-Fatihah",
            "translated_name": {"name": "The Opener"},
            "revelation_place": "makkah",
            "verses_count": 7
        }))
        .unwrap();

        let meta = ChapterMeta::from(remote);
        assert_eq!(meta.kind, ChapterType::Meccan);
        assert_eq!(meta.transliteration, "Al-Fatihah");
        assert_eq!(meta.total_verses, 7);
    }

    #[test]
    fn madinah_projects_to_medinan() {
        let remote: RemoteChapter = serde_json::from_value(json!({
            "id": 2,
            "name_arabic": "البقرة",
            "name_simple": "Al-Baqarah",
            "translated_name": {"name": "The Cow"},
            "revelation_place": "madinah",
            "verses_count": 286
        }))
        .unwrap();

        assert_eq!(ChapterMeta::from(remote).kind, ChapterType::Medinan);
    }

    #[test]
    fn grouping_preserves_verse_order() {
        let rows = vec![
            SourceVerse {
                chapter: 1,
                verse: 1,
                text: "a".into(),
            },
            SourceVerse {
                chapter: 1,
                verse: 2,
                text: "b".into(),
            },
            SourceVerse {
                chapter: 2,
                verse: 1,
                text: "c".into(),
            },
        ];

        let grouped = group_by_chapter(rows);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1].len(), 2);
        assert_eq!(grouped[&1][1].text, "b");
        assert_eq!(grouped[&2][0].text, "c");
    }

    // =========================================================================
    // Response cache
    // =========================================================================

    #[test]
    fn cache_miss_then_hit() {
        let cache = ResponseCache::new();
        assert!(cache.get("http://x/a").is_none());

        cache.insert("http://x/a", json!({"ok": true}));

        assert_eq!(cache.get("http://x/a").unwrap()["ok"], json!(true));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_is_keyed_by_url() {
        let cache = ResponseCache::new();
        cache.insert("http://x/a", json!(1));
        cache.insert("http://x/b", json!(2));

        assert_eq!(cache.get("http://x/a").unwrap(), json!(1));
        assert_eq!(cache.get("http://x/b").unwrap(), json!(2));
    }

    // =========================================================================
    // Clean
    // =========================================================================

    #[tokio::test]
    async fn clean_empties_data_dir() {
        let tmp = TempDir::new().unwrap();
        let data_dir = tmp.path().join("data");
        std::fs::create_dir_all(data_dir.join("chapters")).unwrap();
        std::fs::write(data_dir.join("chapters/en.json"), "[]").unwrap();

        clean(&data_dir).await.unwrap();

        assert!(data_dir.exists());
        assert!(!data_dir.join("chapters").exists());
    }
}
