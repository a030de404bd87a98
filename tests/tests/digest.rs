//! Digest worker tests.

use std::sync::Arc;

use github_client::client::RepoCounter;
use integration_tests::fixtures::{anchor, date, repo};
use integration_tests::mocks::MockCounter;
use pulse_core::Error;
use worker::{DigestConfig, DigestPeriod, DigestWorker};

fn temp_output(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("repo-pulse-digest-{}-{}.md", tag, std::process::id()))
}

#[tokio::test]
async fn test_digest_renders_monthly_sections() {
    let counter = Arc::new(MockCounter::new());
    counter.set_repos(vec![repo("x/one"), repo("y/two")]);

    let output = temp_output("sections");
    let worker = DigestWorker::new(
        counter.clone(),
        DigestConfig {
            query: "coingecko".to_string(),
            period: DigestPeriod::Monthly,
            top_n: 10,
            output: output.clone(),
        },
    )
    .unwrap();

    // 6 complete weeks before 2024-02-14 -> exactly one monthly interval.
    let summary = worker.run(anchor(), date(2024, 2, 14)).await.unwrap();
    assert_eq!(summary.sections, 1);
    assert_eq!(summary.calls_issued, 1);

    let markdown = std::fs::read_to_string(&output).unwrap();
    assert!(markdown.starts_with("# Monthly Digest\n"));
    assert!(markdown.contains("## 2023-12-31 to 2024-01-27\n"));
    assert!(markdown.contains("1. [x/one](https://github.com/x/one)\n"));
    assert!(markdown.contains("2. [y/two](https://github.com/y/two)\n"));

    // Ranking uses the pushed-date filter over the monthly interval.
    assert_eq!(counter.call_log(), vec!["coingecko|pushed|2023-12-31"]);

    let _ = std::fs::remove_file(output);
}

#[tokio::test]
async fn test_weekly_digest_renders_one_section_per_week() {
    let counter = Arc::new(MockCounter::new());
    counter.set_repos(vec![repo("x/one")]);

    let output = temp_output("weekly");
    let worker = DigestWorker::new(
        counter.clone(),
        DigestConfig {
            query: "coingecko".to_string(),
            period: DigestPeriod::Weekly,
            top_n: 10,
            output: output.clone(),
        },
    )
    .unwrap();

    // 3 complete weeks before 2024-01-22.
    let summary = worker.run(anchor(), date(2024, 1, 22)).await.unwrap();
    assert_eq!(summary.sections, 3);
    assert_eq!(summary.calls_issued, 3);

    let markdown = std::fs::read_to_string(&output).unwrap();
    assert!(markdown.starts_with("# Weekly Digest\n"));
    assert!(markdown.contains("## 2023-12-31 to 2024-01-06\n"));
    assert!(markdown.contains("## 2024-01-07 to 2024-01-13\n"));
    assert!(markdown.contains("## 2024-01-14 to 2024-01-20\n"));

    let _ = std::fs::remove_file(output);
}

#[tokio::test]
async fn test_digest_empty_interval_fallback_line() {
    let counter = Arc::new(MockCounter::new());

    let output = temp_output("empty");
    let worker = DigestWorker::new(
        counter,
        DigestConfig {
            query: "coingecko".to_string(),
            period: DigestPeriod::Monthly,
            top_n: 10,
            output: output.clone(),
        },
    )
    .unwrap();

    worker.run(anchor(), date(2024, 2, 14)).await.unwrap();

    let markdown = std::fs::read_to_string(&output).unwrap();
    assert!(markdown.contains("No repositories found for this interval.\n"));

    let _ = std::fs::remove_file(output);
}

#[tokio::test]
async fn test_digest_without_query_rejected() {
    let counter = Arc::new(MockCounter::new());
    let result = DigestWorker::new(counter, DigestConfig::default());
    assert!(matches!(result.unwrap_err(), Error::InvalidConfig(_)));
}

#[tokio::test]
async fn test_digest_with_too_few_weeks_writes_no_sections() {
    let counter = Arc::new(MockCounter::new());

    let output = temp_output("short");
    let worker = DigestWorker::new(
        counter.clone(),
        DigestConfig {
            query: "coingecko".to_string(),
            period: DigestPeriod::Monthly,
            top_n: 10,
            output: output.clone(),
        },
    )
    .unwrap();

    // Only 3 complete weeks: no monthly interval yet.
    let summary = worker.run(anchor(), date(2024, 1, 22)).await.unwrap();
    assert_eq!(summary.sections, 0);
    assert_eq!(counter.calls_issued(), 0);

    let markdown = std::fs::read_to_string(&output).unwrap();
    assert_eq!(markdown, "# Monthly Digest\n\n");

    let _ = std::fs::remove_file(output);
}
