// src/sync.rs

use crate::analyzer::unborn_branch;
use crate::credentials::{remote_callbacks, CredentialProvider};
use crate::error::{Error, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{ErrorCode, FetchOptions, Oid, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const REMOTE: &str = "origin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Cloned,
    UpToDate {
        branch: String,
    },
    /// `from` is `None` when the branch had no commits before.
    Updated {
        branch: String,
        from: Option<Oid>,
        to: Oid,
        new_commits: usize,
    },
}

/// Clone `url` into `dest`, or bring an existing working copy up to date.
///
/// Not safe to run concurrently against the same `dest`.
pub fn synchronize(
    url: &str,
    dest: &Path,
    credentials: &dyn CredentialProvider,
) -> Result<SyncOutcome> {
    if dest.exists() {
        pull(dest, credentials)
    } else {
        clone(url, dest, credentials)?;
        Ok(SyncOutcome::Cloned)
    }
}

fn transfer_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} objects",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar
}

fn clone(url: &str, dest: &Path, credentials: &dyn CredentialProvider) -> Result<Repository> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    info!("cloning {} into {}", url, dest.display());

    let bar = transfer_bar();
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(remote_callbacks(credentials, &bar));

    let repo = RepoBuilder::new().fetch_options(fetch_options).clone(url, dest);
    bar.finish_and_clear();
    Ok(repo?)
}

fn pull(dest: &Path, credentials: &dyn CredentialProvider) -> Result<SyncOutcome> {
    let repo = Repository::open(dest)?;
    info!("updating {}", dest.display());

    let remote_default = {
        let bar = transfer_bar();
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(credentials, &bar));

        let mut remote = repo.find_remote(REMOTE)?;
        let fetched = remote.fetch::<&str>(&[], Some(&mut fetch_options), None);
        bar.finish_and_clear();
        fetched?;

        // Only known once connected; lets a clone of an empty remote pick up
        // whatever branch the remote started with.
        let default = remote.default_branch().ok().and_then(|buf| {
            buf.as_str()
                .map(|name| name.trim_start_matches("refs/heads/").to_string())
        });
        default
    };

    if let Some(unborn) = unborn_branch(&repo)? {
        return adopt_first_commits(&repo, remote_default.unwrap_or(unborn));
    }

    let head = repo.head()?;
    if !head.is_branch() {
        return Err(Error::DetachedHead);
    }
    let branch = head.shorthand().unwrap_or("HEAD").to_string();
    let local = head.target().ok_or(Error::DetachedHead)?;

    let upstream_name = format!("refs/remotes/{REMOTE}/{branch}");
    let upstream = repo
        .find_reference(&upstream_name)
        .map_err(|_| Error::BranchNotFound(format!("{REMOTE}/{branch}")))?;
    let target = upstream
        .target()
        .ok_or_else(|| Error::BranchNotFound(upstream_name.clone()))?;
    debug!("local {branch} at {local}, {upstream_name} at {target}");

    if local == target {
        return Ok(SyncOutcome::UpToDate { branch });
    }

    let annotated = repo.find_annotated_commit(target)?;
    let (analysis, _) = repo.merge_analysis(&[&annotated])?;

    if analysis.is_up_to_date() {
        return Ok(SyncOutcome::UpToDate { branch });
    }
    if !analysis.is_fast_forward() {
        return Err(Error::Diverged(branch));
    }

    let mut reference = repo.find_reference(&format!("refs/heads/{branch}"))?;
    reference.set_target(target, &format!("fast-forward {branch} to {target}"))?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;

    let mut walk = repo.revwalk()?;
    walk.push(target)?;
    walk.hide(local)?;
    let new_commits = walk.count();

    info!("fast-forwarded {branch} by {new_commits} commits");
    Ok(SyncOutcome::Updated {
        branch,
        from: Some(local),
        to: target,
        new_commits,
    })
}

/// The working copy was cloned while the remote was empty. Once the remote
/// has commits on `branch`, create the local branch there and check it out.
fn adopt_first_commits(repo: &Repository, branch: String) -> Result<SyncOutcome> {
    let upstream_name = format!("refs/remotes/{REMOTE}/{branch}");
    let upstream = match repo.find_reference(&upstream_name) {
        Ok(reference) => reference,
        Err(e) if e.code() == ErrorCode::NotFound => {
            debug!("{upstream_name} does not exist yet, nothing to check out");
            return Ok(SyncOutcome::UpToDate { branch });
        }
        Err(e) => return Err(e.into()),
    };
    let target = upstream
        .target()
        .ok_or_else(|| Error::BranchNotFound(upstream_name.clone()))?;

    let local_name = format!("refs/heads/{branch}");
    repo.reference(&local_name, target, true, &format!("create {branch} from {upstream_name}"))?;
    repo.set_head(&local_name)?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;

    let mut walk = repo.revwalk()?;
    walk.push(target)?;
    let new_commits = walk.count();

    info!("checked out {branch} with its first {new_commits} commits");
    Ok(SyncOutcome::Updated {
        branch,
        from: None,
        to: target,
        new_commits,
    })
}
