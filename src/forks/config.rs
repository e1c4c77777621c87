use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ForkConfig {
    /// Query the GitHub API for forks. When disabled only the upstream
    /// repository is listed.
    #[serde(default = "ForkConfig::default_enabled")]
    pub enabled: bool,

    #[serde(default = "ForkConfig::default_api_url")]
    pub api_url: String,

    /// The upstream repository is `<owner>/<repo>`.
    #[serde(default = "ForkConfig::default_owner")]
    pub owner: String,

    #[serde(default = "ForkConfig::default_repo")]
    pub repo: String,

    /// Optional API token, raises the rate limit. Supports `${ENV}`.
    #[serde(default = "ForkConfig::default_token")]
    pub token: String,

    /// At most `max_pages * 100` forks are listed.
    #[serde(default = "ForkConfig::default_max_pages")]
    pub max_pages: u64,
}

impl CommonConfig for ForkConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            api_url: Self::default_api_url(),
            owner: Self::default_owner(),
            repo: Self::default_repo(),
            token: Self::default_token(),
            max_pages: Self::default_max_pages(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        if self.owner.is_empty() {
            bail!("owner cannot be empty");
        }
        if self.repo.is_empty() {
            bail!("repo cannot be empty");
        }

        self.token = expandenv("token", &self.token)?;
        self.api_url = expandenv("api_url", &self.api_url)?;
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        if !self.enabled {
            return Ok(());
        }

        let url = Url::parse(&self.api_url).context("parse api_url")?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => bail!("invalid api_url scheme, expect 'http' or 'https', not '{scheme}'"),
        }
        if self.max_pages == 0 {
            bail!("max_pages cannot be zero");
        }

        Ok(())
    }
}

impl ForkConfig {
    pub fn default_enabled() -> bool {
        true
    }

    pub fn default_api_url() -> String {
        String::from("https://api.github.com")
    }

    pub fn default_owner() -> String {
        String::from("RedHatInsights")
    }

    pub fn default_repo() -> String {
        String::from("insights-core")
    }

    pub fn default_token() -> String {
        String::new()
    }

    pub fn default_max_pages() -> u64 {
        10
    }
}
