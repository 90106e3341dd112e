// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit collection
//!
//! This module reads a branch's history from a local repository, or from a
//! scratch clone of a remote one, using the `git2` crate.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::build::RepoBuilder;
use git2::{BranchType, Cred, FetchOptions, Oid, RemoteCallbacks, Repository, Sort};
use tracing::{debug, info, warn};

use crate::cache::CommitCache;
use crate::commit::CommitRecord;
use crate::error::GitError;

/// Default branch walked when none is configured
pub const DEFAULT_BRANCH: &str = "main";

/// Default scratch clone directory, relative to the working directory
pub const DEFAULT_SCRATCH_DIR: &str = "temp_repo";

/// Where commits are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// A repository already on disk
    Local(PathBuf),
    /// An `http://` or `https://` URL to clone
    Remote(String),
}

impl RepoSource {
    /// Classify a repository location
    #[must_use]
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Remote(location.to_string())
        } else {
            Self::Local(PathBuf::from(location))
        }
    }

    /// Whether this source needs a scratch clone
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Settings for a [`Collector`]
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Token placed in the credentials segment of remote URLs
    pub token: Option<String>,
    /// Branch whose history is collected
    pub branch: String,
    /// Directory used for scratch clones
    pub scratch_dir: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            token: None,
            branch: DEFAULT_BRANCH.to_string(),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
        }
    }
}

/// Collects [`CommitRecord`]s from a repository
#[derive(Debug, Clone, Default)]
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    /// Create a collector with the given settings
    #[must_use]
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// The settings this collector uses
    #[must_use]
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collect every commit reachable from the configured branch
    ///
    /// Records already present in `cache` are reused as-is; new ones are
    /// derived from the repository and inserted. A scratch clone, if one was
    /// made, is removed before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the repository cannot be opened or cloned, or
    /// if the branch does not exist.
    pub fn collect(
        &self,
        source: &RepoSource,
        cache: &mut CommitCache,
    ) -> Result<Vec<CommitRecord>, GitError> {
        match source {
            RepoSource::Local(path) => {
                let repo = GitRepo::open(path)?;
                info!("Accessing repository at {}", path.display());
                repo.collect_branch(&self.config.branch, cache)
            }
            RepoSource::Remote(url) => {
                // Declared first so it is dropped after `repo`
                let scratch = ScratchClone::prepare(&self.config.scratch_dir)?;
                let repo = GitRepo::clone_into(url, self.config.token.as_deref(), scratch.path())?;
                repo.collect_branch(&self.config.branch, cache)
            }
        }
    }
}

/// A git repository wrapper for reading commits
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Clone `url` into `dest`, authenticating with `token` if given
    ///
    /// # Errors
    ///
    /// Returns `GitError::CloneFailed` if the clone does not succeed.
    pub fn clone_into(url: &str, token: Option<&str>, dest: &Path) -> Result<Self, GitError> {
        let clone_url = match token {
            Some(token) => inject_token(url, token),
            None => url.to_string(),
        };
        info!("Cloning {} to {}", redact_url(url), dest.display());

        let mut callbacks = RemoteCallbacks::new();
        if let Some(token) = token {
            let mut attempts = 0;
            callbacks.credentials(move |_url, _username, _allowed| {
                attempts += 1;
                if attempts > 1 {
                    return Err(git2::Error::from_str("token rejected by remote"));
                }
                Cred::userpass_plaintext(token, "")
            });
        }
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(callbacks);

        let repo = RepoBuilder::new()
            .fetch_options(fetch)
            .clone(&clone_url, dest)
            .map_err(|source| GitError::CloneFailed {
                url: redact_url(url),
                source,
            })?;
        Ok(Self { repo })
    }

    /// Get the repository path
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Resolve a branch to its tip, trying `origin/<branch>` after the local branch
    ///
    /// # Errors
    ///
    /// Returns `GitError::BranchNotFound` if neither branch exists.
    pub fn branch_tip(&self, branch: &str) -> Result<Oid, GitError> {
        let not_found = || GitError::BranchNotFound {
            branch: branch.to_string(),
        };
        let found = self
            .repo
            .find_branch(branch, BranchType::Local)
            .or_else(|_| {
                self.repo
                    .find_branch(&format!("origin/{branch}"), BranchType::Remote)
            })
            .map_err(|_| not_found())?;
        let tip = found.get().peel_to_commit().map_err(|_| not_found())?;
        Ok(tip.id())
    }

    /// Collect the branch history, memoizing records in `cache`
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the branch cannot be resolved or walked.
    pub fn collect_branch(
        &self,
        branch: &str,
        cache: &mut CommitCache,
    ) -> Result<Vec<CommitRecord>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(self.branch_tip(branch)?)?;

        let mut records = Vec::new();
        let mut reused = 0usize;

        for oid_result in revwalk {
            let oid = oid_result?;
            let id = oid.to_string();

            if let Some(cached) = cache.record(&id) {
                records.push(cached.clone());
                reused += 1;
                continue;
            }

            let git_commit = self.repo.find_commit(oid)?;
            let Some(record) = record_from_commit(&git_commit) else {
                warn!(
                    "Skipping {}: commit time {} is out of range",
                    id,
                    git_commit.time().seconds()
                );
                continue;
            };
            debug!("Collected {} {}", record.short_id(), record.subject());
            cache.insert_record(record.clone());
            records.push(record);
        }

        info!(
            "Found {} commits on {} ({} from cache)",
            records.len(),
            branch,
            reused
        );
        Ok(records)
    }
}

/// Convert a git2 commit into a [`CommitRecord`]
///
/// Returns `None` if the commit time cannot be represented.
#[must_use]
pub fn record_from_commit(git_commit: &git2::Commit<'_>) -> Option<CommitRecord> {
    let time = git_commit.time();
    let timestamp = commit_time(time.seconds(), time.offset_minutes())?;

    let author = git_commit.author();
    Some(CommitRecord {
        id: git_commit.id().to_string(),
        author: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        timestamp,
        message: git_commit.message().unwrap_or("").to_string(),
    })
}

/// Build an offset-aware timestamp from git's seconds and offset minutes
///
/// An offset outside +/-24h falls back to UTC.
#[must_use]
pub fn commit_time(seconds: i64, offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let offset = offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    DateTime::from_timestamp(seconds, 0).map(|utc| utc.with_timezone(&offset))
}

/// Put `token` in the credentials segment of `url`, replacing any existing one
#[must_use]
pub fn inject_token(url: &str, token: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => format!("{scheme}://{token}@{}", strip_userinfo(rest)),
        None => url.to_string(),
    }
}

/// Replace any credentials in `url` with `***`
#[must_use]
pub fn redact_url(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) if strip_userinfo(rest).len() != rest.len() => {
            format!("{scheme}://***@{}", strip_userinfo(rest))
        }
        _ => url.to_string(),
    }
}

fn strip_userinfo(rest: &str) -> &str {
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    }
}

/// A scratch clone directory removed when dropped
struct ScratchClone {
    path: PathBuf,
}

impl ScratchClone {
    /// Claim `path`, removing whatever a previous run left there
    fn prepare(path: &Path) -> Result<Self, GitError> {
        if path.exists() {
            debug!("Removing stale scratch directory {}", path.display());
            fs::remove_dir_all(path).map_err(|source| GitError::ScratchDir {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchClone {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        info!("Cleaning up temporary directory {}", self.path.display());
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}
