// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! devlog-git: commit collection, caching and date bucketing for devlog
//!
//! This library crate reads a repository's history into plain
//! [`CommitRecord`]s, memoizes them in a persisted [`CacheStore`], and
//! partitions them into fixed-length [`DateWindow`]s.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use devlog_git::{CacheStore, Collector, CollectorConfig, DateBucketer, GroupOptions, RepoSource};
//!
//! let mut store = CacheStore::load("commit_cache.json").expect("load cache");
//! let collector = Collector::new(CollectorConfig::default());
//! let commits = collector
//!     .collect(&RepoSource::parse("."), store.cache_mut())
//!     .expect("collect commits");
//!
//! let bucketer = DateBucketer::new(GroupOptions::days(14));
//! for window in bucketer.group(&commits, &mut store).expect("group commits") {
//!     println!("{} ({} commits)", window.label(), window.commits.len());
//! }
//! ```

pub mod cache;
pub mod collector;
pub mod commit;
pub mod error;
pub mod window;

pub use cache::{CacheEntry, CacheStore, CommitCache};
pub use collector::{Collector, CollectorConfig, RepoSource};
pub use commit::CommitRecord;
pub use error::{CacheError, GitError};
pub use window::{
    DateBucketer, DateWindow, GroupOptions, partition_into_windows, sort_chronologically,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::CacheStore;
    pub use crate::collector::{Collector, CollectorConfig, RepoSource};
    pub use crate::commit::CommitRecord;
    pub use crate::error::{CacheError, GitError};
    pub use crate::window::{DateBucketer, DateWindow, GroupOptions};
}
