// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-to-end run
//!
//! Collect commits, group them into windows, and for each window in turn
//! generate a narrative and publish it. A repository that cannot be read
//! yields zero commits; a window whose generation fails is skipped. Cache and
//! publish failures abort the run.

use devlog_git::{
    CacheError, CacheStore, Collector, CommitRecord, DateBucketer, DateWindow, GitError,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigError};
use crate::generator::NarrativeGenerator;
use crate::publish::{Post, PublishError, Publisher};

/// Errors that stop a run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The commit cache could not be read or written
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Output files could not be written
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Counts from one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Commits collected from the repository
    pub commits: usize,
    /// Windows produced by grouping
    pub windows: usize,
    /// Windows published
    pub published: usize,
    /// Windows skipped because generation failed
    pub skipped: usize,
}

/// Drives collection, grouping, generation and publishing
pub struct Pipeline<G> {
    config: Config,
    generator: G,
}

impl<G: NarrativeGenerator> Pipeline<G> {
    /// Create a pipeline for `config` using `generator`
    pub fn new(config: Config, generator: G) -> Self {
        Self { config, generator }
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage once
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` for invalid configuration, cache I/O failures
    /// and publish failures. Repository and generation failures are logged
    /// and do not stop the run.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;

        let mut store = self.open_cache()?;

        let commits = match self.collect(&mut store) {
            Ok(commits) => commits,
            Err(e) => {
                error!("Error: {}", e);
                Vec::new()
            }
        };
        store.save()?;

        let windows = self.group(&commits, &mut store)?;
        info!("Total windows: {}", windows.len());

        let publisher = Publisher::new(&self.config.output);
        let mut summary = RunSummary {
            commits: commits.len(),
            windows: windows.len(),
            ..Default::default()
        };

        for window in &windows {
            let label = window.label();
            let prompt = build_prompt(window);
            info!("Commits from {}: {}", label, window.commits.len());
            debug!("Prompt for {}:\n{}", label, prompt);

            if self.config.dry_run {
                continue;
            }

            match self.generator.generate(&prompt) {
                Ok(narrative) => {
                    publisher.publish(&[post_for(window, narrative)])?;
                    summary.published += 1;
                }
                Err(e) => {
                    error!("Generation failed for {}: {}", label, e);
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Collect commits into the cache, keeping repository errors distinct
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the repository could not be read.
    pub fn collect(&self, store: &mut CacheStore) -> Result<Vec<CommitRecord>, GitError> {
        Collector::new(self.config.collector_config())
            .collect(&self.config.source(), store.cache_mut())
    }

    fn open_cache(&self) -> Result<CacheStore, CacheError> {
        let path = self.config.cache_path();
        if self.config.clear_cache {
            let mut store = CacheStore::empty_at(path);
            store.clear()?;
            return Ok(store);
        }
        CacheStore::load(path)
    }

    fn group(
        &self,
        commits: &[CommitRecord],
        store: &mut CacheStore,
    ) -> Result<Vec<DateWindow>, CacheError> {
        let bucketer = DateBucketer::new(self.config.group_options());
        if !self.config.dry_run {
            return bucketer.group(commits, store);
        }

        // Dry runs must not mark anything processed
        if bucketer.options().skip_cached {
            warn!("Dry run: processed markers will not be saved");
        }
        let mut scratch = CacheStore::in_memory();
        *scratch.cache_mut() = store.cache().clone();
        bucketer.group(commits, &mut scratch)
    }
}

/// Prompt text for one window
#[must_use]
pub fn build_prompt(window: &DateWindow) -> String {
    format!("Date range: {}\n\n{}", window.label(), window.prompt_text())
}

/// Post for one window's narrative
#[must_use]
pub fn post_for(window: &DateWindow, narrative: String) -> Post {
    let label = window.label();
    Post {
        title: format!("Development Update for {label}"),
        date_range: label,
        content: narrative,
    }
}
