use std::sync::Arc;

use log::error;

use crate::builder::ArchiveBuilder;
use crate::forks::ForkLister;
use crate::lister::RevisionLister;
use crate::server::response::Response;
use crate::types::revision::RevisionKind;

pub struct RevisionsHandler {
    lister: RevisionLister,
    builder: ArchiveBuilder,
    forks: Arc<ForkLister>,
}

impl RevisionsHandler {
    pub fn new(lister: RevisionLister, builder: ArchiveBuilder, forks: Arc<ForkLister>) -> Self {
        Self {
            lister,
            builder,
            forks,
        }
    }

    pub async fn list(&self, kind: RevisionKind) -> Response {
        let result = match kind {
            RevisionKind::Tag => self.lister.list_tags().await,
            RevisionKind::Branch => self.lister.list_branches().await,
        };
        match result {
            Ok(revisions) => Response::json(revisions),
            Err(e) => {
                error!("List {}s failed: {e:#}", kind.as_str());
                Response::error()
            }
        }
    }

    pub async fn build(&self, kind: RevisionKind, rev: &str) -> Response {
        match self.builder.build(kind, rev).await {
            Ok(artifact) => Response::download(artifact),
            Err(e) => {
                error!("Build {} '{rev}' failed: {e:#}", kind.as_str());
                Response::error()
            }
        }
    }

    pub async fn list_forks(&self) -> Response {
        Response::json(self.forks.list().await)
    }

    pub async fn list_fork_branches(&self, fork: &str) -> Response {
        let result = async {
            let remote = self.forks.resolve(fork).await?;
            self.lister.list_remote_branches(&remote).await
        }
        .await;
        match result {
            Ok(branches) => Response::json(branches),
            Err(e) => {
                error!("List branches of fork '{fork}' failed: {e:#}");
                Response::error()
            }
        }
    }

    pub async fn build_fork_branch(&self, fork: &str, branch: &str) -> Response {
        let result = async {
            let remote = self.forks.resolve(fork).await?;
            self.builder.build_remote_branch(&remote, branch).await
        }
        .await;
        match result {
            Ok(artifact) => Response::download(artifact),
            Err(e) => {
                error!("Build branch '{branch}' of fork '{fork}' failed: {e:#}");
                Response::error()
            }
        }
    }
}
