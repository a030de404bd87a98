//! Core types, interval generation, and header schema for repo-pulse.

pub mod error;
pub mod intervals;
pub mod schema;
pub mod table;

pub use error::{Error, Result};
pub use intervals::*;
pub use schema::*;
pub use table::*;
