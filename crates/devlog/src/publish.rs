// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Writing posts to disk
//!
//! Layout under the output root:
//!
//! ```text
//! output/
//! ├── index.html
//! ├── markdown/<stem>.md
//! └── html/<stem>.html
//! ```
//!
//! The stem is `<date range>_<title>`, lowercased with spaces replaced by
//! underscores, so the index can recover both parts from file names alone.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::markdown::{escape_html, to_html};

const MARKDOWN_DIR: &str = "markdown";
const HTML_DIR: &str = "html";
const INDEX_FILE: &str = "index.html";
const INDEX_TITLE: &str = "Development Log";

/// Length of `YYYY-MM-DD_to_YYYY-MM-DD`
const DATE_RANGE_STEM_LEN: usize = 24;

/// Errors while writing output files
#[derive(Debug, Error)]
pub enum PublishError {
    /// A file or directory could not be written or listed
    #[error("Failed to write {path}: {source}")]
    Io {
        /// The path being written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// One narrative ready to publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Window label, e.g. `2024-01-01 to 2024-01-15`
    pub date_range: String,
    /// Human readable title
    pub title: String,
    /// Markdown body
    pub content: String,
}

impl Post {
    /// File stem shared by the markdown and HTML outputs
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}_{}", slugify(&self.date_range), slugify(&self.title))
    }
}

/// An index entry recovered from an HTML file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// File name under `html/`
    pub file_name: String,
    /// Date range, e.g. `2024-01-01 to 2024-01-15`, if the name carries one
    pub date_range: Option<String>,
    /// Title with underscores turned back into spaces
    pub title: String,
}

impl IndexEntry {
    /// Parse an entry from an HTML file name
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Self {
        let stem = file_name.strip_suffix(".html").unwrap_or(file_name);

        let (date_range, rest) = match stem.get(..DATE_RANGE_STEM_LEN) {
            Some(head) if is_date_range_stem(head) => {
                let rest = &stem[DATE_RANGE_STEM_LEN..];
                (Some(head.replace('_', " ")), rest.strip_prefix('_').unwrap_or(rest))
            }
            _ => (None, stem),
        };

        Self {
            file_name: file_name.to_string(),
            date_range,
            title: capitalize(&rest.replace('_', " ")),
        }
    }

    /// Text shown in the index
    #[must_use]
    pub fn label(&self) -> String {
        match &self.date_range {
            Some(range) if !self.title.is_empty() => format!("{range}: {}", self.title),
            Some(range) => range.clone(),
            None => self.title.clone(),
        }
    }
}

/// Writes posts and the index under an output root
#[derive(Debug, Clone)]
pub struct Publisher {
    root: PathBuf,
}

impl Publisher {
    /// Create a publisher writing under `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write each post as markdown and HTML, then rewrite the index
    ///
    /// Returns the HTML paths written, in input order.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Io` if any file or directory cannot be written.
    pub fn publish(&self, posts: &[Post]) -> Result<Vec<PathBuf>, PublishError> {
        let markdown_dir = self.root.join(MARKDOWN_DIR);
        let html_dir = self.root.join(HTML_DIR);
        create_dir(&markdown_dir)?;
        create_dir(&html_dir)?;

        let mut written = Vec::with_capacity(posts.len());
        for post in posts {
            let stem = post.file_stem();

            let md_path = markdown_dir.join(format!("{stem}.md"));
            write_file(&md_path, &post.content)?;

            let html_path = html_dir.join(format!("{stem}.html"));
            write_file(&html_path, &html_page(&post.title, &to_html(&post.content)))?;

            info!("Published {}", html_path.display());
            written.push(html_path);
        }

        self.write_index()?;
        Ok(written)
    }

    /// Rewrite `index.html` from the files currently under `html/`
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Io` if the directory cannot be listed or the
    /// index cannot be written.
    pub fn write_index(&self) -> Result<PathBuf, PublishError> {
        let entries = self.index_entries()?;

        let mut body = format!("<h1>{INDEX_TITLE}</h1>\n<ul>\n");
        for entry in &entries {
            body.push_str(&format!(
                "<li><a href=\"{HTML_DIR}/{}\">{}</a></li>\n",
                escape_html(&entry.file_name),
                escape_html(&entry.label())
            ));
        }
        body.push_str("</ul>\n");

        let index_path = self.root.join(INDEX_FILE);
        write_file(&index_path, &html_page(INDEX_TITLE, &body))?;
        debug!("Index lists {} posts", entries.len());
        Ok(index_path)
    }

    /// HTML outputs in descending file name order
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Io` if `html/` exists but cannot be listed.
    pub fn index_entries(&self) -> Result<Vec<IndexEntry>, PublishError> {
        let html_dir = self.root.join(HTML_DIR);
        if !html_dir.exists() {
            return Ok(Vec::new());
        }

        let io_err = |source: std::io::Error| PublishError::Io {
            path: html_dir.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&html_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "html")
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                names.push(name.to_string());
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names
            .iter()
            .map(|name| IndexEntry::from_file_name(name))
            .collect())
    }
}

/// Lowercase and replace spaces with underscores; path separators become `-`
#[must_use]
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' => '-',
            _ => c,
        })
        .collect()
}

fn is_date_range_stem(head: &str) -> bool {
    head.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 | 18 | 21 => b == b'-',
        10 | 13 => b == b'_',
        11 => b == b't',
        12 => b == b'o',
        _ => b.is_ascii_digit(),
    })
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

fn create_dir(path: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(path).map_err(|source| PublishError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), PublishError> {
    fs::write(path, content).map_err(|source| PublishError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use tempfile::tempdir;

    fn post(range: &str) -> Post {
        Post {
            date_range: range.to_string(),
            title: format!("Development Update for {range}"),
            content: format!("# Update {range}\n\nWe fixed **bugs**.\n"),
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            post("2024-01-01 to 2024-01-15").file_stem(),
            "2024-01-01_to_2024-01-15_development_update_for_2024-01-01_to_2024-01-15"
        );
    }

    #[test]
    fn test_slugify_strips_separators() {
        assert_eq!(slugify(" CI/CD Weekly "), "ci-cd_weekly");
    }

    #[test]
    fn test_index_entry_round_trip() {
        let post = post("2024-01-01 to 2024-01-15");
        let entry = IndexEntry::from_file_name(&format!("{}.html", post.file_stem()));
        assert_eq!(entry.date_range.as_deref(), Some("2024-01-01 to 2024-01-15"));
        assert_eq!(
            entry.title,
            "Development update for 2024-01-01 to 2024-01-15"
        );
        assert_eq!(
            entry.label(),
            "2024-01-01 to 2024-01-15: Development update for 2024-01-01 to 2024-01-15"
        );
    }

    #[test]
    fn test_index_entry_without_date_range() {
        let entry = IndexEntry::from_file_name("release_notes.html");
        assert_eq!(entry.date_range, None);
        assert_eq!(entry.label(), "Release notes");
    }

    #[test]
    fn test_publish_writes_markdown_and_html() {
        let dir = tempdir().unwrap();
        let publisher = Publisher::new(dir.path());
        let post = post("2024-01-01 to 2024-01-15");

        let written = publisher.publish(std::slice::from_ref(&post)).unwrap();
        assert_eq!(written.len(), 1);

        let stem = post.file_stem();
        let md = fs::read_to_string(dir.path().join("markdown").join(format!("{stem}.md"))).unwrap();
        assert_eq!(md, post.content);

        let html = fs::read_to_string(&written[0]).unwrap();
        assert!(html.contains("<title>Development Update for 2024-01-01 to 2024-01-15</title>"));
        assert!(html.contains("<strong>bugs</strong>"));
        assert!(dir.path().join("index.html").exists());
    }

    #[test]
    fn test_index_is_descending_and_accumulates() {
        let dir = tempdir().unwrap();
        let publisher = Publisher::new(dir.path());

        publisher.publish(&[post("2024-01-01 to 2024-01-15")]).unwrap();
        publisher.publish(&[post("2024-01-25 to 2024-02-08")]).unwrap();

        let entries = publisher.index_entries().unwrap();
        let ranges: Vec<_> = entries.iter().filter_map(|e| e.date_range.clone()).collect();
        assert_eq!(
            ranges,
            vec!["2024-01-25 to 2024-02-08", "2024-01-01 to 2024-01-15"]
        );

        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        let newer = index.find("2024-01-25 to 2024-02-08:").unwrap();
        let older = index.find("2024-01-01 to 2024-01-15:").unwrap();
        assert!(newer < older);
        assert!(index.contains("href=\"html/2024-01-25_to_2024-02-08_"));
    }

    #[test]
    fn test_republish_overwrites() {
        let dir = tempdir().unwrap();
        let publisher = Publisher::new(dir.path());
        let mut post = post("2024-01-01 to 2024-01-15");

        publisher.publish(std::slice::from_ref(&post)).unwrap();
        post.content = "Second draft".to_string();
        let written = publisher.publish(std::slice::from_ref(&post)).unwrap();

        assert_eq!(publisher.index_entries().unwrap().len(), 1);
        assert!(fs::read_to_string(&written[0]).unwrap().contains("<p>Second draft</p>"));
    }

    #[test]
    fn test_index_on_empty_root() {
        let dir = tempdir().unwrap();
        let publisher = Publisher::new(dir.path().join("fresh"));
        assert!(publisher.index_entries().unwrap().is_empty());
    }
}
