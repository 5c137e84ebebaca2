//! Tajweed-annotated text retrieval with rate-limit retry.
//!
//! The tajweed edition is the only remote dependency of the build stage.
//! Chapters are fetched one at a time from the alquran.cloud API, which
//! rate-limits aggressively, so the fetch path has the pipeline's only
//! failure-recovery logic:
//!
//! - A successful fetch is followed by a fixed short pause before the next
//!   chapter (the caller owns that pause).
//! - A rate-limited response is retried for the **same** chapter with
//!   exponential backoff, up to a configured attempt cap. Exhausting the
//!   cap is a terminal error: the run aborts rather than looping forever.
//! - Any other failure degrades that chapter to `tajweed: null` and the
//!   caller advances.
//!
//! The [`TajweedSource`] trait keeps the rest of the pipeline
//! network-agnostic: the production implementation is [`AlQuranCloud`],
//! and tests drive the retry loop with a scripted in-memory source.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::warn;

/// Cap on a single backoff wait, whatever the configured base delay.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Edition slug of the tajweed-annotated text on alquran.cloud.
const TAJWEED_EDITION: &str = "quran-tajweed";

#[derive(Error, Debug)]
pub enum TajweedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API rate limit exceeded")]
    RateLimited,
    #[error("tajweed request for chapter {chapter} returned {status}")]
    Status { chapter: u32, status: StatusCode },
    #[error("malformed tajweed response for chapter {chapter}")]
    MalformedResponse { chapter: u32 },
    #[error("rate limit still exceeded for chapter {chapter} after {attempts} attempts")]
    RetriesExhausted { chapter: u32, attempts: usize },
}

impl TajweedError {
    /// True for the transient rate-limit rejection that warrants a retry.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, TajweedError::RateLimited)
    }

    /// True for the exhaustion error that must abort the run instead of
    /// degrading a single chapter.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TajweedError::RetriesExhausted { .. })
    }
}

/// Bounded retry policy for rate-limited responses: waits start at
/// `base_delay` and double per retry, capped at [`MAX_BACKOFF`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_retries: usize,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_retries: usize) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    pub fn from_config(config: &crate::config::TajweedConfig) -> Self {
        Self::new(
            Duration::from_millis(config.retry_base_delay_ms),
            config.max_retries,
        )
    }

    /// Backoff waits: base, 2*base, 4*base, ... bounded by `max_retries`.
    fn strategy(&self) -> impl Iterator<Item = Duration> {
        let factor = (self.base_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(MAX_BACKOFF)
            .take(self.max_retries)
    }
}

/// Provider of per-chapter tajweed-annotated verse text.
#[async_trait]
pub trait TajweedSource: Send + Sync {
    /// Fetch the ordered per-verse tajweed text for one chapter.
    async fn fetch_chapter(&self, chapter: u32) -> Result<Vec<String>, TajweedError>;
}

/// Fetch one chapter's tajweed, retrying rate-limited responses per the
/// policy. Returns [`TajweedError::RetriesExhausted`] once the attempt cap
/// is hit; any other error is returned on the first occurrence.
pub async fn fetch_with_retry<S>(
    source: &S,
    chapter: u32,
    policy: &RetryPolicy,
) -> Result<Vec<String>, TajweedError>
where
    S: TajweedSource + ?Sized,
{
    let mut attempt = 0usize;
    let result = RetryIf::spawn(
        policy.strategy(),
        || {
            attempt += 1;
            if attempt > 1 {
                warn!(chapter, attempt, "retrying tajweed fetch after rate limit");
            }
            source.fetch_chapter(chapter)
        },
        TajweedError::is_rate_limit,
    )
    .await;

    result.map_err(|err| match err {
        TajweedError::RateLimited => TajweedError::RetriesExhausted {
            chapter,
            attempts: attempt,
        },
        other => other,
    })
}

/// Production tajweed source backed by the alquran.cloud surah API.
pub struct AlQuranCloud {
    client: reqwest::Client,
    endpoint: String,
}

/// Response envelope of `GET /surah/{n}/editions/{slug}`: one entry per
/// requested edition, each carrying its verse list.
#[derive(Deserialize)]
struct SurahResponse {
    data: Vec<EditionText>,
}

#[derive(Deserialize)]
struct EditionText {
    ayahs: Vec<Ayah>,
}

#[derive(Deserialize)]
struct Ayah {
    text: String,
}

impl AlQuranCloud {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TajweedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TajweedSource for AlQuranCloud {
    async fn fetch_chapter(&self, chapter: u32) -> Result<Vec<String>, TajweedError> {
        let url = format!(
            "{}/surah/{}/editions/{}",
            self.endpoint, chapter, TAJWEED_EDITION
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TajweedError::RateLimited);
        }
        if !status.is_success() {
            // The API sometimes reports rate limiting inside an error body
            // rather than a 429 status.
            let body = response.text().await.unwrap_or_default();
            if body.contains("rate limit") {
                return Err(TajweedError::RateLimited);
            }
            return Err(TajweedError::Status { chapter, status });
        }

        let parsed: SurahResponse = response.json().await?;
        let edition = parsed
            .data
            .into_iter()
            .next()
            .ok_or(TajweedError::MalformedResponse { chapter })?;
        Ok(edition.ayahs.into_iter().map(|ayah| ayah.text).collect())
    }
}
