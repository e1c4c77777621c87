use anyhow::{bail, Context, Result};
use log::{debug, info};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::checkout::config::RepoConfig;
use crate::git::Remote;
use crate::types::fork::Fork;

use self::config::ForkConfig;

pub mod config;

/// Caches the GitHub forks of the upstream repository. The upstream itself
/// is always the first entry, and maps to the configured remote of the
/// checkout; every other fork maps to a remote named after its owner.
pub struct ForkLister {
    client: reqwest::Client,

    enabled: bool,
    url: String,
    token: Option<String>,
    max_pages: u64,

    upstream: Fork,
    upstream_remote: Remote,

    forks: RwLock<Vec<Fork>>,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
    clone_url: String,
    owner: GithubOwner,
}

#[derive(Debug, Deserialize)]
struct GithubOwner {
    login: String,
}

impl ForkLister {
    const PER_PAGE: usize = 100;

    pub fn new(repo_cfg: &RepoConfig, cfg: &ForkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("egg-hatcher/", env!("EGG_HATCHER_VERSION")))
            .build()
            .context("build http client")?;

        let upstream = Fork {
            name: cfg.owner.clone(),
            full_name: format!("{}/{}", cfg.owner, cfg.repo),
            url: repo_cfg.url.clone(),
        };
        let url = format!("{}/repos/{}/{}/forks", cfg.api_url, cfg.owner, cfg.repo);
        let token = if cfg.token.is_empty() {
            None
        } else {
            Some(cfg.token.clone())
        };

        Ok(Self {
            client,
            enabled: cfg.enabled,
            url,
            token,
            max_pages: cfg.max_pages,
            forks: RwLock::new(vec![upstream.clone()]),
            upstream,
            upstream_remote: Remote::new(&repo_cfg.remote, &repo_cfg.url),
        })
    }

    /// The cached forks, upstream first.
    pub async fn list(&self) -> Vec<Fork> {
        self.forks.read().await.clone()
    }

    /// The remote to list and build branches of fork `name` from. Only cached
    /// forks are known.
    pub async fn resolve(&self, name: &str) -> Result<Remote> {
        if name == self.upstream.name {
            return Ok(self.upstream_remote.clone());
        }
        let forks = self.forks.read().await;
        match forks.iter().find(|fork| fork.name == name) {
            Some(fork) => Ok(Remote::new(&fork.name, &fork.url)),
            None => bail!("unknown fork '{name}'"),
        }
    }

    /// Query the GitHub API and replace the cache. On error the previous
    /// cache is kept.
    pub async fn refresh(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut repos = Vec::new();
        for page in 1..=self.max_pages {
            let batch = self.fetch_page(page).await?;
            let count = batch.len();
            repos.extend(batch);
            if count < Self::PER_PAGE {
                break;
            }
        }

        let forks = collect_forks(&self.upstream, repos);
        info!(
            "Listed {} forks of '{}'",
            forks.len() - 1,
            self.upstream.full_name
        );
        *self.forks.write().await = forks;
        Ok(())
    }

    async fn fetch_page(&self, page: u64) -> Result<Vec<GithubRepo>> {
        let url = format!("{}?per_page={}&page={page}", self.url, Self::PER_PAGE);
        debug!("Request forks: {url}");

        let mut req = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = self.token.as_ref() {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.context("request forks")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("list forks: server returned {status}: {}", text.trim());
        }
        resp.json().await.context("parse forks response")
    }
}

/// Upstream first, then the forks sorted by owner. Entries owned by the
/// upstream owner or with an unusable owner name are dropped.
fn collect_forks(upstream: &Fork, repos: Vec<GithubRepo>) -> Vec<Fork> {
    let mut forks: Vec<Fork> = repos
        .into_iter()
        .filter(|repo| repo.owner.login != upstream.name && is_remote_name(&repo.owner.login))
        .map(|repo| Fork {
            name: repo.owner.login,
            full_name: repo.full_name,
            url: repo.clone_url,
        })
        .collect();
    forks.sort_by(|a, b| a.name.cmp(&b.name));

    let mut all = Vec::with_capacity(forks.len() + 1);
    all.push(upstream.clone());
    all.extend(forks);
    all
}

/// GitHub logins are ASCII letters, digits and inner dashes.
fn is_remote_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
