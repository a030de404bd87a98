//! Rate-limited repository search client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use pulse_core::{Error, MetricKind, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::GitHubConfig;
use crate::pacer::Pacer;

/// A repository reference as rendered in digests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoRef {
    pub full_name: String,
    pub html_url: String,
}

/// Remote counting service seam. The backfill engine and digest worker only
/// see this trait; tests substitute a scripted implementation.
#[async_trait]
pub trait RepoCounter: Send + Sync {
    /// Count repositories matching `query` whose `field` date falls inside
    /// the closed interval `start..end`.
    async fn count(
        &self,
        query: &str,
        field: MetricKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64>;

    /// Best-matching repositories for the interval, for digest rendering.
    async fn top_repos(
        &self,
        query: &str,
        field: MetricKind,
        start: NaiveDate,
        end: NaiveDate,
        per_page: u32,
    ) -> Result<Vec<RepoRef>>;

    /// Remote calls issued so far in this run, retries included.
    fn calls_issued(&self) -> u64;
}

/// Search response envelope. A missing `total_count` decodes as 0; a count of
/// zero is a valid answer, never an error.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    items: Vec<RepoRef>,
}

/// Outcome classification for a single search attempt. Transient failures
/// (network blip, rate-limit rejection, 5xx) are retried; anything else
/// surfaces immediately.
enum SearchFailure {
    Transient(String),
    Fatal(Error),
}

/// GitHub `/search/repositories` client with retry and quota pacing.
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
    pacer: Mutex<Pacer>,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("repo-pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("failed to build http client: {}", e)))?;

        let pacer = Mutex::new(Pacer::new(
            config.quota,
            Duration::from_secs(config.cooldown_secs),
        ));

        info!(base_url = %config.base_url, quota = config.quota, "Created GitHub client");

        Ok(Self {
            http,
            config,
            pacer,
        })
    }

    /// Issue one paced, retried search request.
    async fn search(&self, query: String, per_page: u32) -> Result<SearchResponse> {
        let url = format!("{}/search/repositories", self.config.base_url);
        let cooldown = Duration::from_secs(self.config.cooldown_secs);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let wait = self.pacer.lock().begin_call();
            if let Some(wait) = wait {
                info!(
                    calls_issued = self.calls_issued(),
                    wait_secs = wait.as_secs(),
                    "Search quota window exhausted, pausing"
                );
                tokio::time::sleep(wait).await;
            }

            match self.try_search(&url, &query, per_page).await {
                Ok(response) => {
                    debug!(query = %query, total_count = response.total_count, "Search ok");
                    return Ok(response);
                }
                Err(SearchFailure::Fatal(err)) => return Err(err),
                Err(SearchFailure::Transient(reason)) => {
                    if attempt >= self.config.max_retries {
                        warn!(query = %query, attempts = attempt, reason = %reason, "Search retries exhausted");
                        return Err(Error::fetch_exhausted(query, attempt));
                    }
                    warn!(
                        query = %query,
                        attempt,
                        reason = %reason,
                        retry_in_secs = cooldown.as_secs(),
                        "Transient search failure, retrying"
                    );
                    tokio::time::sleep(cooldown).await;
                }
            }
        }
    }

    async fn try_search(
        &self,
        url: &str,
        query: &str,
        per_page: u32,
    ) -> std::result::Result<SearchResponse, SearchFailure> {
        let per_page = per_page.to_string();
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .query(&[("q", query), ("per_page", per_page.as_str()), ("page", "1")]);

        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchFailure::Transient(format!("request error: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<SearchResponse>()
                .await
                .map_err(|e| SearchFailure::Transient(format!("decode error: {}", e)))
        } else if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status.is_server_error()
        {
            // 403/429 are GitHub's rate-limit signals.
            Err(SearchFailure::Transient(format!("status {}", status)))
        } else {
            Err(SearchFailure::Fatal(Error::http(format!(
                "GET {} returned {}",
                url, status
            ))))
        }
    }
}

/// Query string with the date-range qualifier appended.
fn ranged_query(query: &str, field: MetricKind, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{} {}:{}..{}",
        query,
        field.qualifier(),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

#[async_trait]
impl RepoCounter for GitHubClient {
    async fn count(
        &self,
        query: &str,
        field: MetricKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        let response = self.search(ranged_query(query, field, start, end), 1).await?;
        Ok(response.total_count)
    }

    async fn top_repos(
        &self,
        query: &str,
        field: MetricKind,
        start: NaiveDate,
        end: NaiveDate,
        per_page: u32,
    ) -> Result<Vec<RepoRef>> {
        let response = self
            .search(ranged_query(query, field, start, end), per_page)
            .await?;
        Ok(response.items)
    }

    fn calls_issued(&self) -> u64 {
        self.pacer.lock().calls_issued()
    }
}
