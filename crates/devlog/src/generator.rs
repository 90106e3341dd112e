// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Narrative generation
//!
//! A [`NarrativeGenerator`] turns a window's commit text into prose. The
//! production implementation talks to an Ollama-compatible
//! `/api/generate` endpoint with a blocking HTTP client.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Instructions prepended to every prompt
pub const SYSTEM_PROMPT: &str = "\
You are a professional social manager for a development team.
Your one and only goal is to review all the commits and their messages on the given repository and transform them into multiple coherent blog posts.
You will be given a list of commits and their messages, and you will need to transform them into a single coherent blog post.
Use the date given at the beginning of the prompt to format the date in the blog post and to create a title.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors from the generation endpoint
///
/// Callers treat every variant the same way: the narrative is unavailable.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request could not be sent or returned a non-success status
    #[error("Error communicating with generation endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not JSON
    #[error("Error decoding JSON response: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The response JSON lacks the expected string field
    #[error("Unexpected response format: missing '{0}'")]
    MissingField(&'static str),

    /// A prompt file could not be read
    #[error("Error reading prompt file: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that turns prompt text into narrative text
pub trait NarrativeGenerator {
    /// Generate a narrative for `prompt`
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if no narrative could be produced.
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Read a prompt from `path` and generate a narrative for it
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Io` if the file cannot be read, or any error
    /// from [`NarrativeGenerator::generate`].
    fn generate_from_file(&self, path: &Path) -> Result<String, GenerationError> {
        let prompt = std::fs::read_to_string(path)?;
        self.generate(&prompt)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

/// Client for an Ollama `/api/generate` endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for `base_url` using `model`
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, model: &str) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Full URL of the generate endpoint
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    /// Model name sent with each request
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl NarrativeGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: format!("{SYSTEM_PROMPT}\n\n{prompt}"),
            stream: false,
        };

        debug!("POST {} ({} prompt bytes)", self.endpoint(), request.prompt.len());
        let body = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()?
            .error_for_status()?
            .text()?;

        parse_generate_response(&body)
    }
}

/// Extract the `response` field from a non-streaming generate reply
///
/// # Errors
///
/// Returns `GenerationError::MalformedPayload` if `body` is not JSON and
/// `GenerationError::MissingField` if `response` is absent or not a string.
pub fn parse_generate_response(body: &str) -> Result<String, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    value
        .get("response")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or(GenerationError::MissingField("response"))
}
