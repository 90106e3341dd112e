// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Date bucketing
//!
//! Commits are sorted by time and partitioned greedily into windows of
//! `window_days` days. Each window is anchored to the date of its first
//! commit, so gaps in history never produce empty windows.

use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::commit::CommitRecord;
use crate::error::CacheError;

/// Default window length used by the CLI
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// A contiguous span of days and the commits that fall inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// Date of the first commit in the window
    pub start: NaiveDate,
    /// `start` plus the window length
    pub end: NaiveDate,
    /// Commits in chronological order
    pub commits: Vec<CommitRecord>,
}

impl DateWindow {
    /// Label in the form `"2024-01-01 to 2024-01-15"`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }

    /// Commit lines for the generation prompt, one per commit
    #[must_use]
    pub fn prompt_text(&self) -> String {
        self.commits
            .iter()
            .map(|c| format!("{}\n", c.prompt_line()))
            .collect()
    }
}

/// Options controlling how commits are grouped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOptions {
    /// Window length in days
    pub window_days: u32,
    /// Drop commits before this instant
    pub since: Option<DateTime<FixedOffset>>,
    /// Drop commits after this instant
    pub until: Option<DateTime<FixedOffset>>,
    /// Skip commits already marked processed, and mark the rest
    pub skip_cached: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self::days(DEFAULT_WINDOW_DAYS)
    }
}

impl GroupOptions {
    /// Group into windows of `n` days with no other filtering
    #[must_use]
    pub fn days(n: u32) -> Self {
        Self {
            window_days: n,
            since: None,
            until: None,
            skip_cached: false,
        }
    }

    /// Only include commits at or after this instant
    #[must_use]
    pub fn since(mut self, since: DateTime<FixedOffset>) -> Self {
        self.since = Some(since);
        self
    }

    /// Only include commits at or before this instant
    #[must_use]
    pub fn until(mut self, until: DateTime<FixedOffset>) -> Self {
        self.until = Some(until);
        self
    }

    /// Enable or disable cache skipping
    #[must_use]
    pub fn skip_cached(mut self, skip: bool) -> Self {
        self.skip_cached = skip;
        self
    }

    fn in_range(&self, commit: &CommitRecord) -> bool {
        self.since.is_none_or(|since| commit.timestamp >= since)
            && self.until.is_none_or(|until| commit.timestamp <= until)
    }
}

/// Groups commit records into [`DateWindow`]s
#[derive(Debug, Clone, Default)]
pub struct DateBucketer {
    options: GroupOptions,
}

impl DateBucketer {
    /// Create a bucketer with the given options
    #[must_use]
    pub fn new(options: GroupOptions) -> Self {
        Self { options }
    }

    /// The options this bucketer applies
    #[must_use]
    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    /// Filter, sort and partition `commits` into windows
    ///
    /// With `skip_cached` set, commits already marked processed in `store`
    /// are dropped, every kept commit is marked, and the store is saved.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be saved.
    pub fn group(
        &self,
        commits: &[CommitRecord],
        store: &mut CacheStore,
    ) -> Result<Vec<DateWindow>, CacheError> {
        let mut kept = Vec::with_capacity(commits.len());
        let mut skipped = 0usize;

        for commit in commits {
            if !self.options.in_range(commit) {
                continue;
            }
            if self.options.skip_cached {
                if store.cache().is_processed(&commit.id) {
                    skipped += 1;
                    continue;
                }
                store.cache_mut().mark_processed(&commit.id);
            }
            kept.push(commit.clone());
        }

        if skipped > 0 {
            info!("Skipped {} already processed commits", skipped);
        }

        sort_chronologically(&mut kept);
        let windows = partition_into_windows(kept, self.options.window_days);

        if self.options.skip_cached {
            store.save()?;
        }

        debug!("Grouped commits into {} windows", windows.len());
        Ok(windows)
    }
}

/// Sort commits by calendar date, then by instant
///
/// This is plain timestamp order whenever commits share a UTC offset. With
/// mixed offsets it keeps local dates non-decreasing, which the window
/// bounds rely on.
pub fn sort_chronologically(commits: &mut [CommitRecord]) {
    commits.sort_by_key(|c| (c.date(), c.timestamp));
}

/// Greedily partition commits already ordered by [`sort_chronologically`]
///
/// A new window starts at the date of the first commit that falls after the
/// current window's end. Both ends are inclusive.
#[must_use]
pub fn partition_into_windows(sorted: Vec<CommitRecord>, window_days: u32) -> Vec<DateWindow> {
    let span = Days::new(u64::from(window_days));
    let mut windows = Vec::new();
    let mut current: Option<DateWindow> = None;

    for commit in sorted {
        let date = commit.date();
        if let Some(window) = current.as_mut()
            && date <= window.end
        {
            window.commits.push(commit);
            continue;
        }

        if let Some(done) = current.take() {
            windows.push(done);
        }
        current = Some(DateWindow {
            start: date,
            end: date.checked_add_days(span).unwrap_or(NaiveDate::MAX),
            commits: vec![commit],
        });
    }

    if let Some(done) = current {
        windows.push(done);
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn commit_at(id: &str, y: i32, m: u32, d: u32) -> CommitRecord {
        CommitRecord {
            id: id.to_string(),
            author: "Author".to_string(),
            author_email: String::new(),
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(y, m, d, 12, 0, 0)
                .unwrap(),
            message: format!("commit {id}\n"),
        }
    }

    fn ids(window: &DateWindow) -> Vec<&str> {
        window.commits.iter().map(|c| c.id.as_str()).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fourteen_day_example() {
        let commits = vec![
            commit_at("c", 2024, 1, 25),
            commit_at("a", 2024, 1, 1),
            commit_at("b", 2024, 1, 10),
        ];
        let mut store = CacheStore::in_memory();
        let windows = DateBucketer::new(GroupOptions::days(14))
            .group(&commits, &mut store)
            .unwrap();

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].label(), "2024-01-01 to 2024-01-15");
        assert_eq!(ids(&windows[0]), vec!["a", "b"]);
        assert_eq!(windows[1].label(), "2024-01-25 to 2024-02-08");
        assert_eq!(ids(&windows[1]), vec!["c"]);
    }

    #[test]
    fn test_empty_input() {
        let mut store = CacheStore::in_memory();
        let windows = DateBucketer::default().group(&[], &mut store).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_window_end_is_inclusive() {
        let sorted = vec![commit_at("a", 2024, 3, 1), commit_at("b", 2024, 3, 8)];
        let windows = partition_into_windows(sorted, 7);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end, ymd(2024, 3, 8));
    }

    #[test]
    fn test_new_window_anchors_to_next_commit() {
        let sorted = vec![
            commit_at("a", 2024, 3, 1),
            commit_at("b", 2024, 3, 9),
            commit_at("c", 2024, 3, 16),
            commit_at("d", 2024, 3, 17),
        ];
        let windows = partition_into_windows(sorted, 7);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].start, ymd(2024, 3, 9));
        assert_eq!(ids(&windows[1]), vec!["b", "c"]);
        assert_eq!(windows[2].label(), "2024-03-17 to 2024-03-24");
    }

    #[test]
    fn test_zero_day_windows_group_same_day() {
        let sorted = vec![
            commit_at("a", 2024, 3, 1),
            commit_at("b", 2024, 3, 1),
            commit_at("c", 2024, 3, 2),
        ];
        let windows = partition_into_windows(sorted, 0);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].label(), "2024-03-01 to 2024-03-01");
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let commits = vec![
            commit_at("a", 2024, 1, 1),
            commit_at("b", 2024, 1, 10),
            commit_at("c", 2024, 1, 25),
        ];
        let since = commits[1].timestamp;
        let until = commits[1].timestamp;
        let mut store = CacheStore::in_memory();
        let windows = DateBucketer::new(GroupOptions::days(14).since(since).until(until))
            .group(&commits, &mut store)
            .unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(ids(&windows[0]), vec!["b"]);
    }

    #[test]
    fn test_open_ended_range() {
        let commits = vec![commit_at("a", 2024, 1, 1), commit_at("b", 2024, 2, 1)];
        let since = commits[1].timestamp;
        let mut store = CacheStore::in_memory();
        let windows = DateBucketer::new(GroupOptions::days(14).since(since))
            .group(&commits, &mut store)
            .unwrap();
        assert_eq!(ids(&windows[0]), vec!["b"]);
    }

    #[test]
    fn test_skip_cached_drops_processed_and_marks_kept() {
        let commits = vec![commit_at("a", 2024, 1, 1), commit_at("b", 2024, 1, 2)];
        let mut store = CacheStore::in_memory();
        store.cache_mut().mark_processed("a");

        let bucketer = DateBucketer::new(GroupOptions::days(14).skip_cached(true));
        let windows = bucketer.group(&commits, &mut store).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(ids(&windows[0]), vec!["b"]);
        assert!(store.cache().is_processed("b"));

        // A second run sees nothing new
        let windows = bucketer.group(&commits, &mut store).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_without_skip_cached_cache_is_untouched() {
        let commits = vec![commit_at("a", 2024, 1, 1)];
        let mut store = CacheStore::in_memory();
        store.cache_mut().mark_processed("a");

        let windows = DateBucketer::new(GroupOptions::days(14))
            .group(&commits, &mut store)
            .unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(store.cache().processed_count(), 1);
    }

    #[test]
    fn test_out_of_range_commits_are_not_marked() {
        let commits = vec![commit_at("a", 2024, 1, 1), commit_at("b", 2024, 2, 1)];
        let since = commits[1].timestamp;
        let mut store = CacheStore::in_memory();
        DateBucketer::new(GroupOptions::days(14).since(since).skip_cached(true))
            .group(&commits, &mut store)
            .unwrap();
        assert!(!store.cache().is_processed("a"));
        assert!(store.cache().is_processed("b"));
    }

    #[test]
    fn test_skip_cached_persists_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let commits = vec![commit_at("a", 2024, 1, 1)];

        let mut store = CacheStore::load(&path).unwrap();
        DateBucketer::new(GroupOptions::days(14).skip_cached(true))
            .group(&commits, &mut store)
            .unwrap();

        let reloaded = CacheStore::load(&path).unwrap();
        assert!(reloaded.cache().is_processed("a"));
    }

    #[test]
    fn test_prompt_text() {
        let window = partition_into_windows(
            vec![commit_at("1234567890", 2024, 1, 1), commit_at("abcdefghij", 2024, 1, 2)],
            14,
        )
        .remove(0);
        assert_eq!(
            window.prompt_text(),
            "1234567 - commit 1234567890\nabcdefg - commit abcdefghij\n"
        );
    }

    #[test]
    fn test_mixed_offsets_sort_by_local_date() {
        let at = |id: &str, hours: i32, d: u32, h: u32| {
            let mut c = commit_at(id, 2024, 1, d);
            c.timestamp = FixedOffset::east_opt(hours * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 1, d, h, 0, 0)
                .unwrap();
            c
        };
        // `a` is earlier in UTC but falls on a later local date
        let a = at("a", 14, 2, 1);
        let b = at("b", -10, 1, 20);
        assert!(a.timestamp < b.timestamp);

        let mut commits = vec![a, b];
        sort_chronologically(&mut commits);
        let order: Vec<_> = commits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);

        let windows = partition_into_windows(commits, 0);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].label(), "2024-01-01 to 2024-01-01");
        assert_eq!(windows[1].label(), "2024-01-02 to 2024-01-02");
    }
}
