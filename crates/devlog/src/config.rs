// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for devlog
//!
//! Every option can be set on the command line or through the environment.
//! Components never read the environment themselves; they receive the pieces
//! of [`Config`] they need.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use clap::Parser;
use devlog_git::{CollectorConfig, GroupOptions, RepoSource};

/// Default generation endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default generation model
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// Devlog - turn commit history into development blog posts
#[derive(Parser, Debug, Clone)]
#[command(name = "devlog")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to a local repository or URL of a remote repository
    #[arg(env = "GIT_REPO", default_value = ".")]
    pub repo: String,

    /// Authentication token for remote repositories
    #[arg(long, env = "GIT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// URL of the Ollama instance
    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Model used for generation
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Branch whose history is summarized
    #[arg(short, long, env = "DEFAULT_BRANCH", default_value = "main")]
    pub branch: String,

    /// Window length in days
    #[arg(long, env = "GROUP_COMMITS_DAYS", default_value_t = devlog_git::window::DEFAULT_WINDOW_DAYS)]
    pub days: u32,

    /// Only include commits at or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, env = "DEVLOG_SINCE", value_parser = parse_since)]
    pub since: Option<DateTime<FixedOffset>>,

    /// Only include commits at or before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long, env = "DEVLOG_UNTIL", value_parser = parse_until)]
    pub until: Option<DateTime<FixedOffset>>,

    /// Skip commits already published by a previous run
    #[arg(long, env = "DEVLOG_SKIP_CACHED", default_value = "false")]
    pub skip_cached: bool,

    /// Path to the commit cache file
    ///
    /// Defaults to ~/.local/share/devlog/commit_cache.json (or platform equivalent).
    #[arg(long, env = "DEVLOG_CACHE")]
    pub cache: Option<PathBuf>,

    /// Delete the commit cache before running
    #[arg(long, default_value = "false")]
    pub clear_cache: bool,

    /// Directory that receives markdown, HTML and the index
    #[arg(short, long, env = "DEVLOG_OUTPUT", default_value = "output")]
    pub output: PathBuf,

    /// Directory used for temporary clones of remote repositories
    #[arg(long, env = "DEVLOG_SCRATCH_DIR", default_value = devlog_git::collector::DEFAULT_SCRATCH_DIR)]
    pub scratch_dir: PathBuf,

    /// Log the windows that would be generated without calling the model
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: ".".to_string(),
            token: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            branch: devlog_git::collector::DEFAULT_BRANCH.to_string(),
            days: devlog_git::window::DEFAULT_WINDOW_DAYS,
            since: None,
            until: None,
            skip_cached: false,
            cache: None,
            clear_cache: false,
            output: PathBuf::from("output"),
            scratch_dir: PathBuf::from(devlog_git::collector::DEFAULT_SCRATCH_DIR),
            dry_run: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Get the cache path, using a default if not specified
    ///
    /// Default location is platform-specific:
    /// - macOS: ~/Library/Application Support/devlog/commit_cache.json
    /// - Linux: ~/.local/share/devlog/commit_cache.json
    /// - Windows: %LOCALAPPDATA%\devlog\commit_cache.json
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.cache.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("devlog")
                .join("commit_cache.json")
        })
    }

    /// Where commits are read from
    #[must_use]
    pub fn source(&self) -> RepoSource {
        RepoSource::parse(&self.repo)
    }

    /// Settings for the commit collector
    #[must_use]
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            token: self.token.clone(),
            branch: self.branch.clone(),
            scratch_dir: self.scratch_dir.clone(),
        }
    }

    /// Settings for the date bucketer
    #[must_use]
    pub fn group_options(&self) -> GroupOptions {
        GroupOptions {
            window_days: self.days,
            since: self.since,
            until: self.until,
            skip_cached: self.skip_cached,
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The window length is zero
    /// - `since` is later than `until`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if let (Some(since), Some(until)) = (self.since, self.until)
            && since > until
        {
            return Err(ConfigError::EmptyRange { since, until });
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Load a `.env` file from the working directory or one of its parents
///
/// Variables already present in the environment are kept, so the precedence
/// is command line, then environment, then `.env`. Returns the file that was
/// loaded, or `None` if there is none.
///
/// # Errors
///
/// Returns `dotenvy::Error` if a `.env` file exists but cannot be read or
/// parsed.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Window length of zero days
    #[error("Window length must be at least one day")]
    ZeroWindow,

    /// Date range that excludes everything
    #[error("--since {since} is after --until {until}")]
    EmptyRange {
        /// Lower bound
        since: DateTime<FixedOffset>,
        /// Upper bound
        until: DateTime<FixedOffset>,
    },

    /// Unparseable date bound
    #[error("Invalid date '{0}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate(String),
}

fn parse_bound(value: &str, time_of_day: NaiveTime) -> Result<DateTime<FixedOffset>, ConfigError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc().fixed_offset())
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

/// Parse a lower bound; a bare date means the start of that day (UTC)
///
/// # Errors
///
/// Returns `ConfigError::InvalidDate` for anything else.
pub fn parse_since(value: &str) -> Result<DateTime<FixedOffset>, ConfigError> {
    parse_bound(value, NaiveTime::MIN)
}

/// Parse an upper bound; a bare date means the end of that day (UTC)
///
/// # Errors
///
/// Returns `ConfigError::InvalidDate` for anything else.
pub fn parse_until(value: &str) -> Result<DateTime<FixedOffset>, ConfigError> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    parse_bound(value, end_of_day)
}
