//! Analysis result cache.
//!
//! Stores generated analysis text keyed by remote asset id in SQLite, with
//! an atomic insert-or-update so concurrent writers never create duplicates.

pub mod error;
pub mod metrics;
pub mod repo;

pub use error::{StoreError, StoreResult};
pub use repo::{ResultCache, SqliteAnalysisStore, MAX_ASSET_ID_LEN};
