use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};

use crate::builder::config::BuildConfig;
use crate::checkout::config::RepoConfig;
use crate::checkout::Checkout;
use crate::git::Remote;
use crate::types::revision::{self, Revision};

/// Lists the tags and remote branches of the checkout.
pub struct RevisionLister {
    checkout: Arc<Checkout>,

    remote: Remote,
    default_branch: String,
    pull_before_list: bool,

    tag_prefixes: Vec<String>,
}

impl RevisionLister {
    pub fn new(checkout: Arc<Checkout>, repo_cfg: &RepoConfig, build_cfg: &BuildConfig) -> Self {
        Self {
            checkout,
            remote: Remote::new(&repo_cfg.remote, &repo_cfg.url),
            default_branch: repo_cfg.default_branch.clone(),
            pull_before_list: repo_cfg.pull_before_list,
            tag_prefixes: build_cfg.tag_prefixes.clone(),
        }
    }

    /// All tags sorted by display name, with the default branch first.
    pub async fn list_tags(&self) -> Result<Vec<Revision>> {
        let default_branch = self.default_branch.clone();
        let pull_before_list = self.pull_before_list;
        let output = self
            .checkout
            .run(move |repo| async move {
                if pull_before_list {
                    debug!("Pull '{default_branch}' before listing tags");
                    repo.checkout(&default_branch).await?;
                    repo.pull().await?;
                }
                repo.tags().await
            })
            .await?;

        let tags = revision::parse_tags(&output, &self.tag_prefixes, &self.default_branch);
        info!("Listed {} tags", tags.len() - 1);
        Ok(tags)
    }

    /// All branches of the configured remote sorted by name, with the default
    /// branch first.
    pub async fn list_branches(&self) -> Result<Vec<Revision>> {
        self.list_remote_branches(&self.remote).await
    }

    /// Like [`RevisionLister::list_branches`], for any remote. A remote the
    /// checkout does not know yet is added and fetched first.
    pub async fn list_remote_branches(&self, remote: &Remote) -> Result<Vec<Revision>> {
        let target = remote.clone();
        let output = self
            .checkout
            .run(move |repo| async move {
                repo.ensure_remote(&target).await?;
                repo.remote_branches().await
            })
            .await?;

        let branches = revision::parse_branches(&output, &remote.name, &self.default_branch);
        info!("Listed {} branches of '{}'", branches.len(), remote.name);
        Ok(branches)
    }
}
