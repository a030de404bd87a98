//! Workers for repo-pulse.
//!
//! - Backfill (interval × keyword count table, missing cells only)
//! - Digest (top-N repositories per weekly or monthly interval, rendered as
//!   markdown)

pub mod backfill;
pub mod digest;

pub use backfill::{BackfillConfig, BackfillEngine, BackfillSummary};
pub use digest::{DigestConfig, DigestPeriod, DigestSummary, DigestWorker};
