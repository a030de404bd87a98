//! Digest worker.
//!
//! For each complete interval (weekly or monthly), fetches the top
//! repositories matching the digest query (pushed-date filter) and renders a
//! numbered markdown list under a date-interval heading.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use github_client::{RepoCounter, RepoRef};
use pulse_core::{monthly_intervals, weekly_intervals, Error, Interval, MetricKind, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Interval granularity a digest covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestPeriod {
    Weekly,
    Monthly,
}

impl DigestPeriod {
    fn title(&self) -> &'static str {
        match self {
            DigestPeriod::Weekly => "Weekly Digest",
            DigestPeriod::Monthly => "Monthly Digest",
        }
    }
}

impl Default for DigestPeriod {
    fn default() -> Self {
        DigestPeriod::Monthly
    }
}

/// Digest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Search query the digest ranks repositories for.
    #[serde(default)]
    pub query: String,
    /// Interval granularity.
    #[serde(default)]
    pub period: DigestPeriod,
    /// Entries per interval.
    #[serde(default = "default_top_n")]
    pub top_n: u32,
    /// Output markdown file.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_top_n() -> u32 {
    10
}

fn default_output() -> PathBuf {
    PathBuf::from("monthly-digest.md")
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            period: DigestPeriod::default(),
            top_n: default_top_n(),
            output: default_output(),
        }
    }
}

/// Result of one digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestSummary {
    pub sections: u64,
    pub calls_issued: u64,
}

#[derive(Debug)]
pub struct DigestWorker<C: ?Sized> {
    counter: Arc<C>,
    config: DigestConfig,
}

impl<C> DigestWorker<C>
where
    C: RepoCounter + ?Sized,
{
    pub fn new(counter: Arc<C>, config: DigestConfig) -> Result<Self> {
        if config.query.is_empty() {
            return Err(Error::invalid_config("digest query is empty"));
        }
        Ok(Self { counter, config })
    }

    /// Build and write the digest for all complete intervals at the
    /// configured granularity.
    pub async fn run(&self, anchor: NaiveDate, today: NaiveDate) -> Result<DigestSummary> {
        let intervals = match self.config.period {
            DigestPeriod::Weekly => weekly_intervals(anchor, today),
            DigestPeriod::Monthly => monthly_intervals(anchor, today),
        };
        info!(
            query = %self.config.query,
            period = ?self.config.period,
            intervals = intervals.len(),
            "Generating digest"
        );

        let calls_before = self.counter.calls_issued();

        let mut sections = Vec::with_capacity(intervals.len());
        for interval in intervals {
            let repos = self
                .counter
                .top_repos(
                    &self.config.query,
                    MetricKind::Pushed,
                    interval.start,
                    interval.end,
                    self.config.top_n,
                )
                .await?;
            sections.push((interval, repos));
        }

        let markdown = render_digest(
            self.config.period.title(),
            &sections,
            self.config.top_n as usize,
        );
        tokio::fs::write(&self.config.output, markdown)
            .await
            .map_err(|e| {
                Error::store_unavailable(format!(
                    "failed to write {}: {}",
                    self.config.output.display(),
                    e
                ))
            })?;

        info!(output = %self.config.output.display(), "Digest written");
        Ok(DigestSummary {
            sections: sections.len() as u64,
            calls_issued: self.counter.calls_issued().saturating_sub(calls_before),
        })
    }
}

/// Render digest sections as markdown.
fn render_digest(title: &str, sections: &[(Interval, Vec<RepoRef>)], top_n: usize) -> String {
    let mut out = format!("# {}\n\n", title);
    for (interval, repos) in sections {
        out.push_str(&format!("## {}\n\n", interval.label()));
        if repos.is_empty() {
            out.push_str("No repositories found for this interval.\n");
        } else {
            for (rank, repo) in repos.iter().take(top_n).enumerate() {
                out.push_str(&format!(
                    "{}. [{}]({})\n",
                    rank + 1,
                    repo.full_name,
                    repo.html_url
                ));
            }
        }
        out.push('\n');
    }
    out
}
