use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::config::BuildConfig;
use crate::checkout::config::RepoConfig;
use crate::config::{expandenv, CommonConfig, PathSet};
use crate::dirs;
use crate::forks::config::ForkConfig;
use crate::logs::LogsConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,

    #[serde(default = "ServerConfig::default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    #[serde(default = "ServerConfig::default_workers")]
    pub workers: u64,

    /// HTML file served at `/`, empty means the built-in landing page.
    #[serde(default = "ServerConfig::default_index_path")]
    pub index_path: String,

    #[serde(default = "RepoConfig::default")]
    pub repo: RepoConfig,

    #[serde(default = "BuildConfig::default")]
    pub build: BuildConfig,

    #[serde(default = "ForkConfig::default")]
    pub forks: ForkConfig,

    #[serde(default = "LogsConfig::default")]
    pub logs: LogsConfig,
}

impl CommonConfig for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            keep_alive_secs: Self::default_keep_alive_secs(),
            workers: Self::default_workers(),
            index_path: Self::default_index_path(),
            repo: RepoConfig::default(),
            build: BuildConfig::default(),
            forks: ForkConfig::default(),
            logs: LogsConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.bind = expandenv("bind", &self.bind)?;
        if self.bind.is_empty() {
            bail!("bind cannot be empty");
        }

        self.index_path = expandenv("index_path", &self.index_path)?;
        if !self.index_path.is_empty() {
            let path = dirs::absolute(Path::new(&self.index_path))?;
            self.index_path = format!("{}", path.display());
        }

        self.repo.complete(ps).context("repo")?;
        self.build.complete(ps).context("build")?;
        self.forks.complete(ps).context("forks")?;

        Ok(())
    }
}

impl ServerConfig {
    #[inline]
    pub fn get_index_path(&self) -> Option<PathBuf> {
        if self.index_path.is_empty() {
            return None;
        }
        Some(PathBuf::from(&self.index_path))
    }

    pub fn default_bind() -> String {
        String::from("0.0.0.0:3000")
    }

    pub fn default_keep_alive_secs() -> u64 {
        0
    }

    pub fn default_workers() -> u64 {
        0
    }

    pub fn default_index_path() -> String {
        String::new()
    }
}
