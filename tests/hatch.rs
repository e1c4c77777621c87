mod common;

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use egg_hatcher::builder::ArchiveBuilder;
use egg_hatcher::checkout::Checkout;
use egg_hatcher::forks::ForkLister;
use egg_hatcher::git::{Remote, Repo};
use egg_hatcher::lister::RevisionLister;
use egg_hatcher::refresh;
use egg_hatcher::types::revision::{Revision, RevisionKind};

#[tokio::test]
async fn pull_before_list() {
    let repos = common::setup();
    let cfg = common::server_config(&repos);
    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    let lister = RevisionLister::new(checkout, &cfg.repo, &cfg.build);

    common::commit_version(&repos.origin, "3.0");
    common::git(&repos.origin, &["tag", "insights-core-3.0"]);

    let tags = lister.list_tags().await.unwrap();
    assert_eq!(tags.first(), Some(&Revision::new("master", "master")));
    assert_eq!(
        tags.last(),
        Some(&Revision::new("3.0", "insights-core-3.0"))
    );
}

#[tokio::test]
async fn list_without_pull() {
    let repos = common::setup();
    let mut cfg = common::server_config(&repos);
    cfg.repo.pull_before_list = false;
    cfg.build.tag_prefixes = vec![String::from("insights-")];

    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    let lister = RevisionLister::new(checkout, &cfg.repo, &cfg.build);

    common::commit_version(&repos.origin, "3.0");
    common::git(&repos.origin, &["tag", "insights-core-3.0"]);

    let tags = lister.list_tags().await.unwrap();
    let expect = vec![
        Revision::new("master", "master"),
        Revision::new("0.9", "0.9"),
        Revision::new("core-1.0", "insights-core-1.0"),
        Revision::new("falafel-2.0", "falafel-2.0"),
    ];
    assert_eq!(tags, expect);
}

#[tokio::test]
async fn refresh_fetches_new_branches() {
    let repos = common::setup();
    let mut cfg = common::server_config(&repos);
    cfg.repo.pull_before_list = false;

    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    let lister = RevisionLister::new(checkout.clone(), &cfg.repo, &cfg.build);

    common::git(&repos.origin, &["branch", "late-branch"]);
    let branches = lister.list_branches().await.unwrap();
    assert!(!branches.iter().any(|b| b.name == "late-branch"));

    let forks = Arc::new(ForkLister::new(&cfg.repo, &cfg.forks).unwrap());
    let refresher = tokio::spawn(refresh::start_refresh(checkout, forks, 1));
    tokio::time::sleep(Duration::from_millis(2500)).await;
    refresher.abort();

    let branches = lister.list_branches().await.unwrap();
    assert!(branches
        .iter()
        .any(|b| b == &Revision::new("late-branch", "origin/late-branch")));
}

#[tokio::test]
async fn build_missing_artifact() {
    let repos = common::setup();
    let mut cfg = common::server_config(&repos);
    cfg.build.artifact = String::from("dist/client.zip");

    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    let builder = ArchiveBuilder::new(checkout, &cfg.repo, &cfg.build);

    // The script succeeds but leaves its output somewhere else.
    let err = builder
        .build(RevisionKind::Tag, "insights-core-1.0")
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("read artifact"));
    assert!(repos.checkout.join("insights.zip").exists());
}

#[tokio::test]
async fn build_leaves_failed_checkout() {
    let repos = common::setup();
    let cfg = common::server_config(&repos);
    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    let builder = ArchiveBuilder::new(checkout, &cfg.repo, &cfg.build);

    let err = builder
        .build(RevisionKind::Branch, "broken")
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("cannot hatch"));

    // No rollback, the checkout stays on the broken revision.
    let repo = Repo::new(repos.checkout.clone());
    let head = repo.head().await.unwrap();
    let broken = common::git(&repos.origin, &["rev-parse", "broken"]);
    assert_eq!(head, broken.trim());
}

#[tokio::test]
async fn clone_on_open() {
    let repos = common::setup();
    let mut cfg = common::server_config(&repos);
    let path = repos.dir.path().join("data").join("fresh");
    cfg.repo.path = format!("{}", path.display());
    cfg.repo.url = format!("{}", repos.origin.display());

    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    assert_eq!(checkout.path(), path.as_path());
    assert!(path.join(".git").is_dir());

    let builder = ArchiveBuilder::new(checkout, &cfg.repo, &cfg.build);
    let artifact = builder
        .build(RevisionKind::Tag, "falafel-2.0")
        .await
        .unwrap();
    assert_eq!(artifact.file_name, "insights-core-2.0.egg");
    assert_eq!(artifact.data, b"egg:2.0");
}

#[tokio::test]
async fn abandoned_build_keeps_lock() {
    let repos = common::setup();
    common::push_branch(&repos, "slow", common::SLOW_SCRIPT);
    let cfg = common::server_config(&repos);
    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    let builder = ArchiveBuilder::new(checkout.clone(), &cfg.repo, &cfg.build);

    // The caller gives up long before the script is done, like a client
    // hanging up on a slow build.
    let start = Instant::now();
    let result = tokio::time::timeout(
        Duration::from_millis(200),
        builder.build(RevisionKind::Branch, "slow"),
    )
    .await;
    assert!(result.is_err());

    let blocked = tokio::time::timeout(Duration::from_millis(200), checkout.lock()).await;
    assert!(blocked.is_err());

    // Once the lock is free again the script has run to completion.
    let repo = checkout.lock().await;
    assert!(start.elapsed() >= Duration::from_secs(1));
    let artifact = fs::read_to_string(repos.checkout.join("insights.zip")).unwrap();
    assert_eq!(artifact, "egg:slow");
    assert!(!repos.checkout.join(".git").join("index.lock").exists());
    drop(repo);

    let artifact = builder
        .build(RevisionKind::Tag, "insights-core-1.0")
        .await
        .unwrap();
    assert_eq!(artifact.data, b"egg:1.0");
}

#[tokio::test]
async fn build_adds_remote() {
    let repos = common::setup();
    let fork = common::setup_fork(&repos, "alice");
    let cfg = common::server_config(&repos);
    let checkout = Arc::new(Checkout::open(&cfg.repo).await.unwrap());
    let builder = ArchiveBuilder::new(checkout.clone(), &cfg.repo, &cfg.build);

    let remote = Remote::new("alice", format!("{}", fork.display()));
    let artifact = builder
        .build_remote_branch(&remote, "speedup")
        .await
        .unwrap();
    assert_eq!(artifact.file_name, "insights-core-alice-speedup.egg");
    assert_eq!(artifact.data, b"egg:alice");

    let repo = Repo::new(repos.checkout.clone());
    let mut remotes = repo.remotes().await.unwrap();
    remotes.sort();
    assert_eq!(remotes, vec!["alice", "origin"]);

    // A known remote is not added again, and needs no url.
    let remote = Remote::new("alice", "");
    assert!(!repo.ensure_remote(&remote).await.unwrap());
    let artifact = builder
        .build_remote_branch(&remote, "master")
        .await
        .unwrap();
    assert_eq!(artifact.file_name, "insights-core-alice-master.egg");
    assert_eq!(artifact.data, b"egg:2.0");

    // Unknown remotes without a url cannot be added.
    let remote = Remote::new("bob", "");
    assert!(builder.build_remote_branch(&remote, "master").await.is_err());
}
