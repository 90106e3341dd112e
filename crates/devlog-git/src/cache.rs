// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Persisted commit cache
//!
//! The cache is a single JSON object keyed by commit id. Each entry may hold
//! the memoized [`CommitRecord`] and a `processed` marker set once the commit
//! has been bucketed for publishing. The whole document is rewritten on every
//! save.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commit::CommitRecord;
use crate::error::CacheError;

/// Cached state for one commit id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Memoized commit metadata
    #[serde(default)]
    pub record: Option<CommitRecord>,
    /// Whether the commit was already bucketed in a previous run
    #[serde(default)]
    pub processed: bool,
}

/// In-memory commit cache keyed by commit id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl CommitCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the memoized record for a commit id
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&CommitRecord> {
        self.entries.get(id).and_then(|e| e.record.as_ref())
    }

    /// Store a record, keeping any existing `processed` marker
    pub fn insert_record(&mut self, record: CommitRecord) {
        let id = record.id.clone();
        self.entries.entry(id).or_default().record = Some(record);
    }

    /// Check whether a commit id is marked processed
    #[must_use]
    pub fn is_processed(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|e| e.processed)
    }

    /// Mark a commit id processed
    pub fn mark_processed(&mut self, id: &str) {
        self.entries.entry(id.to_string()).or_default().processed = true;
    }

    /// Get the full entry for a commit id
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    /// Number of ids marked processed
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.entries.values().filter(|e| e.processed).count()
    }

    /// Number of cached ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no ids
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A [`CommitCache`] bound to its backing file
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: Option<PathBuf>,
    cache: CommitCache,
}

impl CacheStore {
    /// Load the cache from `path`
    ///
    /// A missing file yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the file cannot be read and
    /// `CacheError::Corrupt` if it is not a valid cache document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache file {} not found, starting empty", path.display());
                return Ok(Self {
                    path: Some(path),
                    cache: CommitCache::new(),
                });
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        let cache: CommitCache = serde_json::from_str(&content)
            .map_err(|source| CacheError::Corrupt {
                path: path.clone(),
                source,
            })?;

        info!(
            "Loaded commit cache with {} entries from {}",
            cache.len(),
            path.display()
        );
        Ok(Self {
            path: Some(path),
            cache,
        })
    }

    /// Create an empty store bound to `path` without reading it
    ///
    /// Used to start over when the existing file should be discarded.
    #[must_use]
    pub fn empty_at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cache: CommitCache::new(),
        }
    }

    /// Create a store with no backing file
    ///
    /// `save` and `clear` never touch the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cache: CommitCache::new(),
        }
    }

    /// Overwrite the backing file with the full current cache
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be serialized or written.
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(&self.cache)?;
        fs::write(path, content).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Saved {} cache entries to {}", self.cache.len(), path.display());
        Ok(())
    }

    /// Delete the backing file and empty the cache
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if an existing file cannot be removed.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.cache.clear();
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => info!("Removed cache file {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(CacheError::Io {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Backing file path, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrow the in-memory cache
    #[must_use]
    pub fn cache(&self) -> &CommitCache {
        &self.cache
    }

    /// Mutably borrow the in-memory cache
    pub fn cache_mut(&mut self) -> &mut CommitCache {
        &mut self.cache
    }

    /// Number of cached ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache holds no ids
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
