// src/analyzer.rs

use crate::error::{Error, Result};
use crate::model::{CommitRecord, TimestampSource};
use chrono::{DateTime, Utc};
use git2::{BranchType, Commit, ErrorCode, Oid, Repository, Revwalk, Sort};
use std::path::Path;
use tracing::debug;

const REMOTE: &str = "origin";

/// Read-only access to a working copy's commit history.
pub struct History {
    repo: Repository,
    source: TimestampSource,
}

/// A branch or revision resolved to the commit it points at. `target` is
/// `None` for an unborn branch, which has no commits yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub name: String,
    pub target: Option<Oid>,
}

impl History {
    pub fn open(repo_path: &Path, source: TimestampSource) -> Result<Self> {
        let repo = Repository::open(repo_path)?;
        debug!("opened repository at {}", repo_path.display());
        Ok(Self { repo, source })
    }

    /// `None` means whatever HEAD points at. Named branches prefer the
    /// remote-tracking ref, which a fetch keeps current, over a local branch
    /// that may lag behind it.
    pub fn resolve(&self, branch: Option<&str>) -> Result<ResolvedRef> {
        let Some(name) = branch else {
            if let Some(name) = unborn_branch(&self.repo)? {
                debug!("{name} has no commits yet");
                return Ok(ResolvedRef { name, target: None });
            }
            let head = self.repo.head()?;
            let name = head.shorthand().unwrap_or("HEAD").to_string();
            let target = Some(head.peel_to_commit()?.id());
            return Ok(ResolvedRef { name, target });
        };

        let remote_name = format!("{REMOTE}/{name}");
        let candidates = [
            (remote_name.as_str(), Some(BranchType::Remote)),
            (name, Some(BranchType::Local)),
            (name, None),
        ];

        for (candidate, kind) in candidates {
            let commit = match kind {
                Some(kind) => self
                    .repo
                    .find_branch(candidate, kind)
                    .and_then(|b| b.get().peel_to_commit()),
                None => self
                    .repo
                    .revparse_single(candidate)
                    .and_then(|o| o.peel_to_commit()),
            };
            if let Ok(commit) = commit {
                debug!("resolved {name} via {candidate} to {}", commit.id());
                return Ok(ResolvedRef {
                    name: name.to_string(),
                    target: Some(commit.id()),
                });
            }
        }

        if unborn_branch(&self.repo)?.as_deref() == Some(name) {
            return Ok(ResolvedRef {
                name: name.to_string(),
                target: None,
            });
        }
        Err(Error::BranchNotFound(name.to_string()))
    }

    /// Newest-first walk of `branch`. Every call starts a fresh walk.
    pub fn commits(&self, branch: Option<&str>) -> Result<Commits<'_>> {
        let resolved = self.resolve(branch)?;
        self.commits_from(resolved.target)
    }

    /// A `None` tip yields nothing.
    pub fn commits_from(&self, tip: Option<Oid>) -> Result<Commits<'_>> {
        let walk = match tip {
            Some(tip) => {
                let mut walk = self.repo.revwalk()?;
                walk.push(tip)?;
                walk.set_sorting(Sort::TIME)?;
                Some(walk)
            }
            None => None,
        };
        Ok(Commits {
            repo: &self.repo,
            walk,
            source: self.source,
        })
    }
}

/// The branch HEAD names while that branch has no commits, `None` once it has.
pub(crate) fn unborn_branch(repo: &Repository) -> Result<Option<String>> {
    match repo.head() {
        Ok(_) => Ok(None),
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head = repo.find_reference("HEAD")?;
            Ok(head
                .symbolic_target()
                .map(|target| target.trim_start_matches("refs/heads/").to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Lazily reads commit records off a revwalk.
pub struct Commits<'r> {
    repo: &'r Repository,
    walk: Option<Revwalk<'r>>,
    source: TimestampSource,
}

impl Iterator for Commits<'_> {
    type Item = Result<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match self.walk.as_mut()?.next()? {
            Ok(oid) => oid,
            Err(e) => return Some(Err(e.into())),
        };
        Some(
            self.repo
                .find_commit(oid)
                .map_err(Error::from)
                .and_then(|commit| to_record(&commit, self.source)),
        )
    }
}

fn to_record(commit: &Commit, source: TimestampSource) -> Result<CommitRecord> {
    let author = commit.author();
    let seconds = match source {
        TimestampSource::Committer => commit.time().seconds(),
        TimestampSource::Author => author.when().seconds(),
    };
    let time = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
        git2::Error::from_str(&format!("commit {} has an invalid timestamp", commit.id()))
    })?;

    Ok(CommitRecord {
        id: commit.id().to_string(),
        author: author.name().unwrap_or("Unknown").to_string(),
        email: author.email().unwrap_or("").to_string(),
        time,
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
    })
}
