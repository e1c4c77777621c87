use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::dirs;
use crate::git::Repo;

use self::config::RepoConfig;

pub mod config;

/// The single git working directory every operation runs against.
///
/// Lists, builds and fetches all mutate the working tree (checkout, pull, the
/// artifact file), so they must hold the guard returned by [`Checkout::lock`]
/// for as long as they touch it. Requests queue up on the lock in arrival
/// order.
///
/// Work started on behalf of a request goes through [`Checkout::run`], which
/// outlives the request: a client that disconnects mid build does not stop
/// git or the build script, and the lock is released only once they exit.
pub struct Checkout {
    path: PathBuf,
    repo: Arc<Mutex<Repo>>,
}

impl Checkout {
    pub fn new(repo: Repo) -> Self {
        Self {
            path: repo.path().to_path_buf(),
            repo: Arc::new(Mutex::new(repo)),
        }
    }

    /// Open the configured checkout, cloning it first if it does not exist
    /// and a clone url is configured.
    pub async fn open(cfg: &RepoConfig) -> Result<Self> {
        let path = cfg.get_path();
        let repo = Repo::new(path.clone());
        if repo.exists() {
            info!("Using checkout '{}'", path.display());
            return Ok(Self::new(repo));
        }

        if cfg.url.is_empty() {
            bail!(
                "checkout '{}' does not exist and no clone url is configured",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            dirs::ensure_dir_exists(parent)?;
        }
        let repo = Repo::clone_from(&cfg.url, path)
            .await
            .context("init checkout")?;
        Ok(Self::new(repo))
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn lock(&self) -> OwnedMutexGuard<Repo> {
        self.repo.clone().lock_owned().await
    }

    /// Wait for the lock, then run `f` with it on a task of its own. Dropping
    /// the returned future does not cancel `f`, the lock is held until `f`
    /// returns.
    pub async fn run<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(OwnedMutexGuard<Repo>) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let repo = self.lock().await;
        tokio::spawn(f(repo)).await.context("join checkout task")?
    }
}
