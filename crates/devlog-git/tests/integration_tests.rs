// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for devlog-git
//!
//! These tests build throwaway repositories with `git2` and run the
//! collector, cache and bucketer against them.

use std::path::Path;

use devlog_git::collector::GitRepo;
use devlog_git::{
    CacheStore, Collector, CollectorConfig, CommitCache, CommitRecord, DateBucketer, GitError,
    GroupOptions, RepoSource,
};
use git2::{Oid, Repository, Signature, Time};
use similar_asserts::assert_eq;
use tempfile::TempDir;

/// Seconds for 2024-01-01T12:00:00Z
const JAN_1_2024: i64 = 1_704_110_400;
const DAY: i64 = 86_400;

/// Append a commit to `refs/heads/<branch>` at `secs` with the given offset
fn commit_on(repo: &Repository, branch: &str, secs: i64, offset_minutes: i32, msg: &str) -> Oid {
    let sig = Signature::new("Test Author", "test@example.com", &Time::new(secs, offset_minutes))
        .expect("signature");
    let tree_id = repo.index().expect("index").write_tree().expect("tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let refname = format!("refs/heads/{branch}");
    let parent = repo
        .find_reference(&refname)
        .ok()
        .and_then(|r| r.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some(&refname), &sig, &sig, msg, &tree, &parents)
        .expect("commit")
}

/// A repository on `main` with commits on days 0, 9 and 24 of 2024
fn fixture_repo() -> (TempDir, Vec<Oid>) {
    let dir = TempDir::new().expect("tempdir");
    let repo = Repository::init(dir.path()).expect("init");
    let oids = vec![
        commit_on(&repo, "main", JAN_1_2024, 0, "Initial commit\n"),
        commit_on(&repo, "main", JAN_1_2024 + 9 * DAY, 0, "Add parser\n\nWith body.\n"),
        commit_on(&repo, "main", JAN_1_2024 + 24 * DAY, 0, "Fix parser\n"),
    ];
    repo.set_head("refs/heads/main").expect("set head");
    (dir, oids)
}

fn collect_local(path: &Path, branch: &str, cache: &mut CommitCache) -> Result<Vec<CommitRecord>, GitError> {
    let collector = Collector::new(CollectorConfig {
        branch: branch.to_string(),
        ..Default::default()
    });
    collector.collect(&RepoSource::Local(path.to_path_buf()), cache)
}

#[test]
fn test_collect_local_repository() {
    let (dir, oids) = fixture_repo();
    let mut cache = CommitCache::new();

    let commits = collect_local(dir.path(), "main", &mut cache).expect("collect");

    assert_eq!(commits.len(), 3);
    let mut ids: Vec<String> = commits.iter().map(|c| c.id.clone()).collect();
    ids.sort();
    let mut expected: Vec<String> = oids.iter().map(Oid::to_string).collect();
    expected.sort();
    assert_eq!(ids, expected);

    for commit in &commits {
        assert_eq!(commit.id.len(), 40);
        assert_eq!(commit.author, "Test Author");
        assert_eq!(commit.author_email, "test@example.com");
    }
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_collect_preserves_commit_offset() {
    let dir = TempDir::new().expect("tempdir");
    let repo = Repository::init(dir.path()).expect("init");
    // 23:30 UTC on Jan 1 is already Jan 2 at +02:00
    commit_on(&repo, "main", JAN_1_2024 + 11 * 3600 + 1800, 120, "Late night\n");

    let commits = collect_local(dir.path(), "main", &mut CommitCache::new()).expect("collect");
    assert_eq!(commits[0].timestamp.offset().local_minus_utc(), 7200);
    assert_eq!(commits[0].date().to_string(), "2024-01-02");
}

#[test]
fn test_collect_missing_branch() {
    let (dir, _) = fixture_repo();
    let result = collect_local(dir.path(), "does-not-exist", &mut CommitCache::new());
    match result {
        Err(GitError::BranchNotFound { branch }) => assert_eq!(branch, "does-not-exist"),
        other => panic!("Expected BranchNotFound, got {other:?}"),
    }
}

#[test]
fn test_collect_invalid_path() {
    let dir = TempDir::new().expect("tempdir");
    let result = collect_local(&dir.path().join("nope"), "main", &mut CommitCache::new());
    assert!(matches!(result, Err(GitError::RepositoryNotFound { .. })));
}

#[test]
fn test_collect_reuses_cached_records() {
    let (dir, oids) = fixture_repo();
    let mut cache = CommitCache::new();

    // Seed the cache with an edited record for the newest commit
    let mut seeded = collect_local(dir.path(), "main", &mut CommitCache::new())
        .expect("collect")
        .into_iter()
        .find(|c| c.id == oids[2].to_string())
        .expect("newest commit");
    seeded.message = "Cached message\n".to_string();
    cache.insert_record(seeded);

    let commits = collect_local(dir.path(), "main", &mut cache).expect("collect");
    let newest = commits
        .iter()
        .find(|c| c.id == oids[2].to_string())
        .expect("newest commit");
    assert_eq!(newest.message, "Cached message\n");
}

#[test]
fn test_clone_resolves_remote_branch() {
    let (source, _) = fixture_repo();
    {
        let repo = Repository::open(source.path()).expect("open");
        commit_on(&repo, "feature", JAN_1_2024 + 40 * DAY, 0, "Feature work\n");
    }

    let dest = TempDir::new().expect("tempdir");
    let clone_path = dest.path().join("clone");
    let url = source.path().to_str().expect("utf-8 path");
    let repo = GitRepo::clone_into(url, None, &clone_path).expect("clone");

    // `feature` only exists as origin/feature in the clone
    let mut cache = CommitCache::new();
    let commits = repo.collect_branch("feature", &mut cache).expect("collect");
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].subject(), "Feature work");

    let main = repo.collect_branch("main", &mut cache).expect("collect");
    assert_eq!(main.len(), 3);
}

#[test]
fn test_collect_then_group() {
    let (dir, _) = fixture_repo();
    let mut store = CacheStore::in_memory();

    let commits = collect_local(dir.path(), "main", store.cache_mut()).expect("collect");
    let windows = DateBucketer::new(GroupOptions::days(14))
        .group(&commits, &mut store)
        .expect("group");

    let labels: Vec<String> = windows.iter().map(|w| w.label()).collect();
    assert_eq!(
        labels,
        vec!["2024-01-01 to 2024-01-15", "2024-01-25 to 2024-02-08"]
    );
    assert_eq!(windows[0].commits[0].subject(), "Initial commit");
    assert_eq!(windows[0].commits[1].subject(), "Add parser");
}

#[test]
fn test_skip_cached_across_runs() {
    let (dir, _) = fixture_repo();
    let cache_dir = TempDir::new().expect("tempdir");
    let cache_path = cache_dir.path().join("commit_cache.json");
    let bucketer = DateBucketer::new(GroupOptions::days(14).skip_cached(true));

    {
        let mut store = CacheStore::load(&cache_path).expect("load");
        let commits = collect_local(dir.path(), "main", store.cache_mut()).expect("collect");
        store.save().expect("save");
        let windows = bucketer.group(&commits, &mut store).expect("group");
        assert_eq!(windows.len(), 2);
    }

    // New commit after the first run
    {
        let repo = Repository::open(dir.path()).expect("open");
        commit_on(&repo, "main", JAN_1_2024 + 60 * DAY, 0, "Release\n");
    }

    let mut store = CacheStore::load(&cache_path).expect("load");
    let commits = collect_local(dir.path(), "main", store.cache_mut()).expect("collect");
    let windows = bucketer.group(&commits, &mut store).expect("group");

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].commits.len(), 1);
    assert_eq!(windows[0].commits[0].subject(), "Release");
}
