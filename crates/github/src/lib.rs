//! GitHub search client for repo-pulse.

pub mod client;
pub mod config;
pub mod pacer;

pub use client::{GitHubClient, RepoCounter, RepoRef};
pub use config::GitHubConfig;
pub use pacer::Pacer;
