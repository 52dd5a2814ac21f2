//! Rolling stats store
//!
//! This module provides the core time-series functionality:
//!
//! - **types**: Core data structures (Sample, StatsWindow)
//! - **series**: Fixed-horizon rolling buffer with synchronized accessors
//! - **persist**: Atomic snapshot mirror on disk
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Collector tick → Sample → StatsStore::append (evict stale prefix)
//!                           → SnapshotFile::save (temp file + rename)
//!
//! Read Path:
//!   API handler → StatsStore::snapshot → StatsWindow (five columns)
//! ```

pub mod error;
pub mod persist;
pub mod series;
pub mod types;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use persist::SnapshotFile;
pub use series::{StatsStore, DEFAULT_HORIZON};
pub use types::{Sample, StatsWindow};
