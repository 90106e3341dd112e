// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Plain commit records

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A commit reduced to the fields devlog needs
///
/// The timestamp keeps the committer's UTC offset, so [`CommitRecord::date`]
/// is the calendar day the committer saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The commit SHA (40 hex characters)
    pub id: String,
    /// Author name
    pub author: String,
    /// Author email
    #[serde(default)]
    pub author_email: String,
    /// Commit timestamp in the committer's offset
    pub timestamp: DateTime<FixedOffset>,
    /// Full commit message
    pub message: String,
}

impl CommitRecord {
    /// Get the short id (first 7 characters)
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }

    /// Get the first line of the commit message (subject)
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Calendar date of the commit in its own offset
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// One prompt line: short id and trimmed message
    #[must_use]
    pub fn prompt_line(&self) -> String {
        format!("{} - {}", self.short_id(), self.message.trim())
    }
}
