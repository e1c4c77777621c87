#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use egg_hatcher::config::{CommonConfig, PathSet};
use egg_hatcher::server::config::ServerConfig;
use tempfile::TempDir;

pub const BUILD_SCRIPT: &str = "#!/bin/sh\nset -e\nprintf 'egg:%s' \"$(cat VERSION)\" > insights.zip\n";
pub const BROKEN_SCRIPT: &str = "#!/bin/sh\necho 'cannot hatch' >&2\nexit 1\n";
pub const SLOW_SCRIPT: &str = "#!/bin/sh\nset -e\nsleep 1\nprintf 'egg:slow' > insights.zip\n";

/// An origin repository and a clone of it, the clone is what the server
/// works on.
///
/// origin layout:
/// - master: VERSION 1.0 (tags `0.9`, `insights-core-1.0`), then VERSION 2.0
///   (tag `falafel-2.0`)
/// - feature/egg: VERSION feature
/// - broken: build script exits 1
pub struct TestRepos {
    pub dir: TempDir,
    pub origin: PathBuf,
    pub checkout: PathBuf,
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "commit.gpgsign=false", "-c", "core.hooksPath=/dev/null"])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Egg Hatcher")
        .env("GIT_AUTHOR_EMAIL", "hatcher@example.com")
        .env("GIT_COMMITTER_NAME", "Egg Hatcher")
        .env("GIT_COMMITTER_EMAIL", "hatcher@example.com")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

pub fn write_script(dir: &Path, content: &str) {
    let path = dir.join("build_client_egg.sh");
    fs::write(&path, content).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

pub fn commit_version(dir: &Path, version: &str) {
    fs::write(dir.join("VERSION"), version).unwrap();
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", &format!("version {version}")]);
}

pub fn setup() -> TestRepos {
    let dir = tempfile::tempdir().unwrap();
    let origin = dir.path().join("origin");
    let checkout = dir.path().join("checkout");

    fs::create_dir(&origin).unwrap();
    git(&origin, &["init", "-q"]);
    git(&origin, &["symbolic-ref", "HEAD", "refs/heads/master"]);

    write_script(&origin, BUILD_SCRIPT);
    commit_version(&origin, "1.0");
    git(&origin, &["tag", "0.9"]);
    git(&origin, &["tag", "insights-core-1.0"]);
    commit_version(&origin, "2.0");
    git(&origin, &["tag", "falafel-2.0"]);

    git(&origin, &["checkout", "-q", "-b", "feature/egg"]);
    commit_version(&origin, "feature");

    git(&origin, &["checkout", "-q", "-b", "broken", "master"]);
    write_script(&origin, BROKEN_SCRIPT);
    git(&origin, &["commit", "-q", "-a", "-m", "break the build"]);

    git(&origin, &["checkout", "-q", "master"]);

    let origin_str = format!("{}", origin.display());
    let checkout_str = format!("{}", checkout.display());
    git(dir.path(), &["clone", "-q", &origin_str, &checkout_str]);

    TestRepos {
        dir,
        origin,
        checkout,
    }
}

pub fn server_config(repos: &TestRepos) -> ServerConfig {
    let ps = PathSet::new(
        Some(repos.dir.path().join("config")),
        Some(repos.dir.path().join("data")),
    )
    .unwrap();

    let mut cfg = ServerConfig::default();
    cfg.repo.path = format!("{}", repos.checkout.display());
    cfg.repo.url = String::new();
    cfg.repo.fetch_interval_secs = 0;
    cfg.forks.enabled = false;
    cfg.complete(&ps).unwrap();
    cfg
}

/// Push a branch `name` to origin whose build script is `script`, and fetch
/// it into the checkout.
pub fn push_branch(repos: &TestRepos, name: &str, script: &str) {
    git(&repos.origin, &["checkout", "-q", "-b", name, "master"]);
    write_script(&repos.origin, script);
    git(&repos.origin, &["commit", "-q", "-a", "-m", name]);
    git(&repos.origin, &["checkout", "-q", "master"]);
    git(&repos.checkout, &["fetch", "-q", "origin"]);
}

/// A clone of origin standing in for a GitHub fork, with one extra branch
/// `speedup` whose VERSION is the owner name.
pub fn setup_fork(repos: &TestRepos, owner: &str) -> PathBuf {
    let fork = repos.dir.path().join(format!("{owner}-fork"));
    let origin_str = format!("{}", repos.origin.display());
    let fork_str = format!("{}", fork.display());
    git(repos.dir.path(), &["clone", "-q", &origin_str, &fork_str]);

    git(&fork, &["checkout", "-q", "-b", "speedup"]);
    commit_version(&fork, owner);
    git(&fork, &["checkout", "-q", "master"]);
    fork
}
