mod common;

use chrono::Utc;
use commit_report::analyzer::History;
use commit_report::credentials::CredentialSource;
use commit_report::model::{CommitRecord, MonthlyAggregate, TimestampSource, YearMonth};
use commit_report::sync::{synchronize, SyncOutcome};
use commit_report::Error;
use common::*;
use git2::{Repository, Signature, Time};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Fixture {
    upstream_dir: TempDir,
    upstream: Repository,
    _work: TempDir,
    dest: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let upstream_dir = tempdir().unwrap();
        let upstream = init_repo(upstream_dir.path());
        seed_history(&upstream);
        let work = tempdir().unwrap();
        let dest = work.path().join("repositories").join("widgets");
        Self {
            upstream_dir,
            upstream,
            _work: work,
            dest,
        }
    }

    fn url(&self) -> &str {
        self.upstream_dir.path().to_str().unwrap()
    }

    fn sync(&self) -> commit_report::Result<SyncOutcome> {
        synchronize(self.url(), &self.dest, &CredentialSource::Anonymous)
    }
}

fn authors(history: &History, branch: Option<&str>) -> Vec<String> {
    history
        .commits(branch)
        .unwrap()
        .map(|c| c.unwrap().author)
        .collect()
}

#[test]
fn second_sync_updates_instead_of_cloning() {
    let fx = Fixture::new();

    assert_eq!(fx.sync().unwrap(), SyncOutcome::Cloned);
    assert!(fx.dest.join(".git").exists());
    assert_eq!(
        fx.sync().unwrap(),
        SyncOutcome::UpToDate {
            branch: "main".into()
        }
    );

    let tip = commit(&fx.upstream, "Grace", MAR_20 + 3600, "Hotfix");
    match fx.sync().unwrap() {
        SyncOutcome::Updated {
            branch,
            to,
            new_commits,
            ..
        } => {
            assert_eq!(branch, "main");
            assert_eq!(to, tip);
            assert_eq!(new_commits, 1);
        }
        other => panic!("expected an update, got {other:?}"),
    }
    let tree_file = fs::read_to_string(fx.dest.join("CHANGES")).unwrap();
    assert!(tree_file.contains("Hotfix"));

    assert_eq!(
        fx.sync().unwrap(),
        SyncOutcome::UpToDate {
            branch: "main".into()
        }
    );
}

#[test]
fn unchanged_remote_adds_nothing_to_the_aggregate() {
    let fx = Fixture::new();
    fx.sync().unwrap();
    let count = |dest: &Path| {
        let history = History::open(dest, TimestampSource::Committer).unwrap();
        MonthlyAggregate::from_commits(history.commits(None).unwrap(), &Utc)
            .unwrap()
            .total()
    };
    let first = count(&fx.dest);
    fx.sync().unwrap();
    assert_eq!(first, 5);
    assert_eq!(count(&fx.dest), first);
}

#[test]
fn diverged_history_is_an_error() {
    let fx = Fixture::new();
    fx.sync().unwrap();

    let local = Repository::open(&fx.dest).unwrap();
    commit(&local, "Ada", MAR_20 + 60, "Local work");
    commit(&fx.upstream, "Linus", MAR_20 + 120, "Remote work");

    match fx.sync() {
        Err(Error::Diverged(branch)) => assert_eq!(branch, "main"),
        other => panic!("expected divergence, got {other:?}"),
    }
}

#[test]
fn detached_head_is_not_updated() {
    let fx = Fixture::new();
    fx.sync().unwrap();

    let local = Repository::open(&fx.dest).unwrap();
    let tip = local.head().unwrap().target().unwrap();
    local.set_head_detached(tip).unwrap();

    assert!(matches!(fx.sync(), Err(Error::DetachedHead)));
}

#[test]
fn empty_remote_converges_once_it_has_commits() {
    let upstream_dir = tempdir().unwrap();
    let upstream = init_repo(upstream_dir.path());
    let work = tempdir().unwrap();
    let dest = work.path().join("repositories").join("widgets");
    let url = upstream_dir.path().to_str().unwrap();
    let sync = || synchronize(url, &dest, &CredentialSource::Anonymous);

    assert_eq!(sync().unwrap(), SyncOutcome::Cloned);
    assert!(matches!(sync().unwrap(), SyncOutcome::UpToDate { .. }));
    assert!(matches!(sync().unwrap(), SyncOutcome::UpToDate { .. }));

    let history = History::open(&dest, TimestampSource::Committer).unwrap();
    assert_eq!(history.resolve(None).unwrap().target, None);
    assert_eq!(history.commits(None).unwrap().count(), 0);

    let tip = commit(&upstream, "Ada", JAN_15, "Initial import");
    match sync().unwrap() {
        SyncOutcome::Updated {
            branch,
            from,
            to,
            new_commits,
        } => {
            assert_eq!(branch, "main");
            assert_eq!(from, None);
            assert_eq!(to, tip);
            assert_eq!(new_commits, 1);
        }
        other => panic!("expected the first commits, got {other:?}"),
    }
    assert!(fs::read_to_string(dest.join("CHANGES"))
        .unwrap()
        .contains("Initial import"));
    assert_eq!(
        sync().unwrap(),
        SyncOutcome::UpToDate {
            branch: "main".into()
        }
    );
}

#[test]
fn empty_repository_has_an_empty_history() {
    let dir = tempdir().unwrap();
    init_repo(dir.path());
    let history = History::open(dir.path(), TimestampSource::Committer).unwrap();

    let head = history.resolve(None).unwrap();
    assert_eq!(head.name, "main");
    assert_eq!(head.target, None);
    assert_eq!(history.commits(Some("main")).unwrap().count(), 0);
    assert!(matches!(
        history.commits(Some("dev")),
        Err(Error::BranchNotFound(name)) if name == "dev"
    ));
    let aggregate = MonthlyAggregate::from_commits(history.commits(None).unwrap(), &Utc).unwrap();
    assert!(aggregate.is_empty());
}

#[test]
fn existing_path_that_is_not_a_repository_fails() {
    let fx = Fixture::new();
    fs::create_dir_all(&fx.dest).unwrap();
    assert!(matches!(fx.sync(), Err(Error::Git(_))));
}

#[test]
fn walks_newest_first_and_restarts() {
    let fx = Fixture::new();
    fx.sync().unwrap();
    let history = History::open(&fx.dest, TimestampSource::Committer).unwrap();

    let expected = ["Grace", "Ada", "Ada", "Linus", "Ada"];
    assert_eq!(authors(&history, Some("main")), expected);
    assert_eq!(authors(&history, Some("main")), expected);
    assert_eq!(authors(&history, None), expected);

    let newest: CommitRecord = history.commits(None).unwrap().next().unwrap().unwrap();
    assert_eq!(newest.message, "Document release");
    assert_eq!(newest.email, "grace@example.com");
    assert_eq!(newest.time.timestamp(), MAR_20);
    assert_eq!(newest.id.len(), 40);
}

#[test]
fn aggregates_a_real_history() {
    let fx = Fixture::new();
    fx.sync().unwrap();
    let history = History::open(&fx.dest, TimestampSource::Committer).unwrap();
    let commits = history.commits(Some("main")).unwrap();
    let aggregate = MonthlyAggregate::from_commits(commits, &Utc).unwrap();

    assert_eq!(aggregate.total(), 5);
    assert_eq!(
        aggregate.monthly_counts(),
        vec![
            (YearMonth::new(2024, 1), 2),
            (YearMonth::new(2024, 2), 1),
            (YearMonth::new(2024, 3), 2),
        ]
    );
    assert_eq!(aggregate.authors().ranked(), vec![("Ada", 3), ("Grace", 1), ("Linus", 1)]);
}

#[test]
fn other_branches_are_read_without_checkout() {
    let fx = Fixture::new();
    let main_tip = fx.upstream.head().unwrap().peel_to_commit().unwrap();
    fx.upstream.branch("feature", &main_tip, false).unwrap();
    fx.upstream.set_head("refs/heads/feature").unwrap();
    commit(&fx.upstream, "Linus", MAR_20 + 600, "Feature work");
    fx.upstream.set_head("refs/heads/main").unwrap();

    fx.sync().unwrap();
    let before = fs::read_to_string(fx.dest.join("CHANGES")).unwrap();

    let history = History::open(&fx.dest, TimestampSource::Committer).unwrap();
    let resolved = history.resolve(Some("feature")).unwrap();
    assert_eq!(resolved.name, "feature");
    assert_eq!(authors(&history, Some("feature")).len(), 6);

    let repo = Repository::open(&fx.dest).unwrap();
    assert_eq!(repo.head().unwrap().shorthand(), Some("main"));
    assert_eq!(fs::read_to_string(fx.dest.join("CHANGES")).unwrap(), before);
}

#[test]
fn unknown_branch_is_reported() {
    let fx = Fixture::new();
    fx.sync().unwrap();
    let history = History::open(&fx.dest, TimestampSource::Committer).unwrap();
    match history.commits(Some("dev")) {
        Err(Error::BranchNotFound(name)) => assert_eq!(name, "dev"),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("dev should not resolve"),
    };
}

#[test]
fn author_and_committer_timestamps_are_selectable() {
    let dir = tempdir().unwrap();
    let repo = init_repo(dir.path());
    fs::write(dir.path().join("CHANGES"), "rebased\n").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new("CHANGES")).unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let author = Signature::new("Ada", "ada@example.com", &Time::new(JAN_15, 0)).unwrap();
    let committer = Signature::new("Linus", "linus@example.com", &Time::new(MAR_15, 0)).unwrap();
    repo.commit(Some("HEAD"), &author, &committer, "Rebased change", &tree, &[])
        .unwrap();

    let month_of = |source| {
        let history = History::open(dir.path(), source).unwrap();
        let commit = history.commits(None).unwrap().next().unwrap().unwrap();
        assert_eq!(commit.author, "Ada");
        commit.month_in(&Utc)
    };
    assert_eq!(month_of(TimestampSource::Committer), YearMonth::new(2024, 3));
    assert_eq!(month_of(TimestampSource::Author), YearMonth::new(2024, 1));
}
