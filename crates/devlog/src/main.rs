// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! devlog: turn a repository's commit history into development blog posts

use anyhow::{Context, Result};
use clap::Parser;
use devlog::config::Config;
use devlog::generator::OllamaClient;
use devlog::pipeline::{Pipeline, PipelineError};
use devlog_git::CacheError;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let env_file = devlog::config::load_dotenv();
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match env_file {
        Ok(Some(path)) => debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => warn!("Ignoring .env file: {}", e),
    }

    info!("Starting devlog for {}", config.repo);

    let client = OllamaClient::new(&config.ollama_url, &config.model)
        .context("Failed to create generation client")?;

    let summary = match Pipeline::new(config, client).run() {
        Ok(summary) => summary,
        Err(e @ PipelineError::Cache(CacheError::Corrupt { .. })) => {
            return Err(e).context("Cache file is unreadable; rerun with --clear-cache to start over");
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Done: {} commits, {} windows, {} published, {} skipped",
        summary.commits, summary.windows, summary.published, summary.skipped
    );
    Ok(())
}
