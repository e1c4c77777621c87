use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};
use crate::dirs;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepoConfig {
    /// The checkout directory, default is `<data_path>/insights-core`.
    #[serde(default = "RepoConfig::default_path")]
    pub path: String,

    /// Cloned into `path` when the checkout does not exist yet. Empty means
    /// the checkout must be prepared by hand.
    #[serde(default = "RepoConfig::default_url")]
    pub url: String,

    #[serde(default = "RepoConfig::default_remote")]
    pub remote: String,

    #[serde(default = "RepoConfig::default_branch")]
    pub default_branch: String,

    /// Checkout the default branch and pull before listing tags.
    #[serde(default = "RepoConfig::default_pull_before_list")]
    pub pull_before_list: bool,

    /// Zero disables the background fetch.
    #[serde(default = "RepoConfig::default_fetch_interval_secs")]
    pub fetch_interval_secs: u64,
}

impl CommonConfig for RepoConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            url: Self::default_url(),
            remote: Self::default_remote(),
            default_branch: Self::default_branch(),
            pull_before_list: Self::default_pull_before_list(),
            fetch_interval_secs: Self::default_fetch_interval_secs(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.path = expandenv("path", &self.path)?;
        let path = if self.path.is_empty() {
            ps.data_path.join("insights-core")
        } else {
            dirs::absolute(Path::new(&self.path))?
        };
        self.path = format!("{}", path.display());

        self.url = expandenv("url", &self.url)?;

        if self.remote.is_empty() {
            bail!("remote cannot be empty");
        }
        if self.default_branch.is_empty() {
            bail!("default_branch cannot be empty");
        }

        Ok(())
    }
}

impl RepoConfig {
    #[inline]
    pub fn get_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    pub fn default_path() -> String {
        String::new()
    }

    pub fn default_url() -> String {
        String::from("https://github.com/RedHatInsights/insights-core")
    }

    pub fn default_remote() -> String {
        String::from("origin")
    }

    pub fn default_branch() -> String {
        String::from("master")
    }

    pub fn default_pull_before_list() -> bool {
        true
    }

    pub fn default_fetch_interval_secs() -> u64 {
        300
    }
}
