// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! devlog: development blog posts from commit history
//!
//! This crate ties the collector and bucketer from `devlog-git` to a
//! narrative generator and a static publisher.
//!
//! # Example
//!
//! ```no_run
//! use devlog::config::Config;
//! use devlog::generator::OllamaClient;
//! use devlog::pipeline::Pipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let client = OllamaClient::new(&config.ollama_url, &config.model)?;
//! let summary = Pipeline::new(config, client).run()?;
//! println!("Published {} posts", summary.published);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod generator;
pub mod markdown;
pub mod pipeline;
pub mod publish;
