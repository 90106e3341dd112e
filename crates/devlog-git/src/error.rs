// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for devlog-git

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while accessing a repository
///
/// Every variant means the repository could not be read; callers decide
/// whether that is fatal.
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Cloning a remote repository failed
    #[error("Failed to clone {url}: {source}")]
    CloneFailed {
        /// Remote URL with any credentials redacted
        url: String,
        /// Underlying git2 error
        source: git2::Error,
    },

    /// The requested branch exists neither locally nor on `origin`
    #[error("Branch not found: {branch}")]
    BranchNotFound {
        /// The branch name that could not be resolved
        branch: String,
    },

    /// The scratch clone directory could not be prepared
    #[error("Scratch directory {path}: {source}")]
    ScratchDir {
        /// The scratch directory path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Errors that can occur while loading or saving the commit cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading, writing or removing the cache file failed
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        /// The cache file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The cache file exists but is not a valid cache document
    #[error("Corrupt cache file {path}: {source}")]
    Corrupt {
        /// The cache file path
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The in-memory cache could not be serialized
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}
