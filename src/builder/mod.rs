use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use anyhow::{bail, Context, Result};
use log::{debug, info};

use crate::checkout::config::RepoConfig;
use crate::checkout::Checkout;
use crate::exec::Cmd;
use crate::git::{Remote, Repo};
use crate::types::revision::{trim_tag, RevisionKind};

use self::config::BuildConfig;

pub mod config;

/// The result of a successful build.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Checks out a revision and runs the build script against it.
pub struct ArchiveBuilder {
    checkout: Arc<Checkout>,

    remote: Remote,

    script: PathBuf,
    artifact: PathBuf,

    download_prefix: String,
    download_ext: String,
    tag_prefixes: Vec<String>,
}

impl ArchiveBuilder {
    pub fn new(checkout: Arc<Checkout>, repo_cfg: &RepoConfig, cfg: &BuildConfig) -> Self {
        let script = PathBuf::from(&cfg.script);
        let script = if script.is_relative() {
            checkout.path().join(script)
        } else {
            script
        };
        let artifact = checkout.path().join(&cfg.artifact);

        Self {
            checkout,
            remote: Remote::new(&repo_cfg.remote, &repo_cfg.url),
            script,
            artifact,
            download_prefix: cfg.download_prefix.clone(),
            download_ext: cfg.download_ext.clone(),
            tag_prefixes: cfg.tag_prefixes.clone(),
        }
    }

    /// Build a tag, or a branch of the configured remote, and read back the
    /// artifact.
    pub async fn build(&self, kind: RevisionKind, rev: &str) -> Result<Artifact> {
        match kind {
            RevisionKind::Tag => {
                validate_revision(rev)?;
                let file_name = self.download_name(kind, rev);
                let job = BuildJob {
                    remote: None,
                    target: rev.to_string(),
                    desc: format!("tag '{rev}'"),
                };
                self.hatch(job, file_name).await
            }
            RevisionKind::Branch => self.build_remote_branch(&self.remote, rev).await,
        }
    }

    /// Build `branch` of `remote`. A remote the checkout does not know yet is
    /// added and fetched first.
    pub async fn build_remote_branch(&self, remote: &Remote, branch: &str) -> Result<Artifact> {
        validate_revision(branch)?;
        let file_name = if remote.name == self.remote.name {
            self.download_name(RevisionKind::Branch, branch)
        } else {
            let qualified = format!("{}/{branch}", remote.name);
            self.download_name(RevisionKind::Branch, &qualified)
        };
        let job = BuildJob {
            remote: Some(remote.clone()),
            target: format!("{}/{branch}", remote.name),
            desc: format!("branch '{branch}' of '{}'", remote.name),
        };
        self.hatch(job, file_name).await
    }

    /// The checkout is locked from the checkout until the artifact has been
    /// read, so concurrent builds queue up instead of overwriting each other's
    /// output. A failed build leaves the checkout as the failing command left
    /// it.
    async fn hatch(&self, job: BuildJob, file_name: String) -> Result<Artifact> {
        let desc = job.desc.clone();
        let script = self.script.clone();
        let artifact = self.artifact.clone();
        let data = self
            .checkout
            .run(move |repo| async move { job.run(&repo, &script, &artifact).await })
            .await?;

        info!("Built {desc} as '{file_name}', {} bytes", data.len());
        Ok(Artifact { file_name, data })
    }

    /// `<prefix>-<revision>.<ext>`, known prefixes are stripped from tags and
    /// slashes in branch names become dashes.
    pub fn download_name(&self, kind: RevisionKind, rev: &str) -> String {
        let name = match kind {
            RevisionKind::Tag => trim_tag(&self.tag_prefixes, rev).to_string(),
            RevisionKind::Branch => rev.replace('/', "-"),
        };
        format!("{}-{name}.{}", self.download_prefix, self.download_ext)
    }
}

struct BuildJob {
    remote: Option<Remote>,
    target: String,
    desc: String,
}

impl BuildJob {
    async fn run(&self, repo: &Repo, script: &Path, artifact: &Path) -> Result<Vec<u8>> {
        info!("Begin to build {}", self.desc);
        if let Some(remote) = self.remote.as_ref() {
            repo.ensure_remote(remote).await?;
        }

        remove_stale(artifact)?;
        repo.checkout(&self.target).await?;
        if log::log_enabled!(log::Level::Debug) {
            let head = repo.head().await?;
            debug!("Checked out '{}' at {head}", self.target);
        }

        Cmd::new(script, repo.path())
            .execute()
            .await
            .with_context(|| format!("run build script for {}", self.desc))?;

        fs::read(artifact).with_context(|| format!("read artifact '{}'", artifact.display()))
    }
}

/// Revisions come straight from the url. Reject anything git could take as
/// an option or that cannot be a ref name.
pub fn validate_revision(rev: &str) -> Result<()> {
    if rev.is_empty() {
        bail!("revision cannot be empty");
    }
    if rev.starts_with('-') {
        bail!("revision '{rev}' cannot start with '-'");
    }
    if rev.contains("..") {
        bail!("revision '{rev}' cannot contain '..'");
    }
    if rev.chars().any(|c| c.is_whitespace() || c.is_control()) {
        bail!("revision '{rev}' cannot contain whitespace or control characters");
    }
    Ok(())
}

fn remove_stale(artifact: &Path) -> Result<()> {
    match fs::remove_file(artifact) {
        Ok(()) => {
            debug!("Removed stale artifact '{}'", artifact.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err)
            .with_context(|| format!("remove stale artifact '{}'", artifact.display())),
    }
}
