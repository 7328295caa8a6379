#![allow(dead_code)]

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::Path;

// 12:00 UTC on the given day, so every time zone sees the same month
pub const JAN_15: i64 = 1705320000;
pub const JAN_20: i64 = 1705752000;
pub const FEB_15: i64 = 1707998400;
pub const MAR_15: i64 = 1710504000;
pub const MAR_20: i64 = 1710936000;

pub fn init_repo(dir: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(dir, &opts).unwrap()
}

/// Commits a one-file change to the current branch, authored and committed at `secs`.
pub fn commit(repo: &Repository, author: &str, secs: i64, message: &str) -> Oid {
    let sig = Signature::new(
        author,
        &format!("{}@example.com", author.to_lowercase()),
        &Time::new(secs, 0),
    )
    .unwrap();

    let workdir = repo.workdir().unwrap();
    fs::write(workdir.join("CHANGES"), format!("{secs} {message}\n")).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("CHANGES")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let parents: Vec<Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Oldest first: Ada (Jan), Linus (Jan), Ada (Feb), Ada (Mar), Grace (Mar).
pub fn seed_history(repo: &Repository) {
    commit(repo, "Ada", JAN_15, "Initial import");
    commit(repo, "Linus", JAN_20, "Add parser");
    commit(repo, "Ada", FEB_15, "Fix parser");
    commit(repo, "Ada", MAR_15, "Release 1.0");
    commit(repo, "Grace", MAR_20, "Document release");
}
