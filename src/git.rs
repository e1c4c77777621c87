use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;

use crate::exec::Cmd;

/// A named remote of the checkout. `url` is only needed to add the remote
/// when the checkout does not have it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A git working directory. Every method shells out to the `git` binary with
/// the repository as the current directory.
#[derive(Debug, Clone)]
pub struct Repo {
    path: PathBuf,
}

impl Repo {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.join(".git").exists()
    }

    /// Clone `url` into `path`, the parent directory of `path` must exist.
    pub async fn clone_from(url: &str, path: PathBuf) -> Result<Self> {
        if path.exists() && path.read_dir()?.next().is_some() {
            bail!(
                "cannot clone into '{}', the directory is not empty",
                path.display()
            );
        }
        let parent = match path.parent() {
            Some(parent) => parent,
            None => bail!("invalid clone path '{}'", path.display()),
        };

        info!("git clone {url} {}", path.display());
        Cmd::git(parent)
            .arg("clone")
            .arg(url)
            .arg(&path)
            .execute()
            .await
            .with_context(|| format!("clone '{url}'"))?;

        Ok(Self::new(path))
    }

    /// Anything that `git checkout` can understand.
    pub async fn checkout(&self, rev: &str) -> Result<()> {
        Cmd::git(&self.path)
            .args(["checkout", "--quiet", rev])
            .execute()
            .await
            .with_context(|| format!("checkout '{rev}'"))?;
        Ok(())
    }

    pub async fn pull(&self) -> Result<()> {
        Cmd::git(&self.path)
            .args(["pull", "--ff-only", "--quiet"])
            .execute()
            .await
            .context("pull")?;
        Ok(())
    }

    pub async fn fetch(&self) -> Result<()> {
        Cmd::git(&self.path)
            .args(["fetch", "--all", "--prune", "--tags", "--quiet"])
            .execute()
            .await
            .context("fetch")?;
        Ok(())
    }

    pub async fn fetch_remote(&self, name: &str) -> Result<()> {
        Cmd::git(&self.path)
            .args(["fetch", "--prune", "--quiet"])
            .arg(name)
            .execute()
            .await
            .with_context(|| format!("fetch remote '{name}'"))?;
        Ok(())
    }

    /// Names of all configured remotes.
    pub async fn remotes(&self) -> Result<Vec<String>> {
        let out = Cmd::git(&self.path)
            .arg("remote")
            .execute()
            .await
            .context("list remotes")?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Add `remote` and fetch it, unless a remote of that name exists already.
    /// Returns whether the remote was added.
    pub async fn ensure_remote(&self, remote: &Remote) -> Result<bool> {
        let remotes = self.remotes().await?;
        if remotes.iter().any(|name| name == &remote.name) {
            return Ok(false);
        }
        if remote.url.is_empty() {
            bail!("remote '{}' does not exist and has no url", remote.name);
        }

        info!("git remote add {} {}", remote.name, remote.url);
        Cmd::git(&self.path)
            .args(["remote", "add"])
            .arg(&remote.name)
            .arg(&remote.url)
            .execute()
            .await
            .with_context(|| format!("add remote '{}'", remote.name))?;
        self.fetch_remote(&remote.name).await?;
        Ok(true)
    }

    /// Raw `git tag` output, one tag per line.
    pub async fn tags(&self) -> Result<String> {
        let out = Cmd::git(&self.path)
            .args(["--no-pager", "tag"])
            .execute()
            .await
            .context("list tags")?;
        Ok(out)
    }

    /// Raw `git branch -r` output, one remote branch per line.
    pub async fn remote_branches(&self) -> Result<String> {
        let out = Cmd::git(&self.path)
            .args(["--no-pager", "branch", "-r"])
            .execute()
            .await
            .context("list remote branches")?;
        Ok(out)
    }

    pub async fn head(&self) -> Result<String> {
        let out = Cmd::git(&self.path)
            .args(["rev-parse", "HEAD"])
            .execute()
            .await
            .context("rev-parse HEAD")?;
        Ok(out.trim().to_string())
    }
}
