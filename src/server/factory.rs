use std::sync::Arc;

use anyhow::{Context, Result};

use crate::builder::ArchiveBuilder;
use crate::checkout::Checkout;
use crate::forks::ForkLister;
use crate::lister::RevisionLister;

use super::config::ServerConfig;
use super::handlers::healthz::HealthzHandler;
use super::handlers::index::IndexHandler;
use super::handlers::revisions::RevisionsHandler;
use super::restful::{RestfulContext, RestfulServer};

pub struct ServerFactory {
    cfg: ServerConfig,
}

impl ServerFactory {
    pub fn new(cfg: ServerConfig) -> Self {
        Self { cfg }
    }

    pub async fn build_checkout(&self) -> Result<Arc<Checkout>> {
        let checkout = Checkout::open(&self.cfg.repo)
            .await
            .context("open checkout")?;
        Ok(Arc::new(checkout))
    }

    /// The fork cache starts with the upstream only, fill it with
    /// [`ForkLister::refresh`].
    pub fn build_forks(&self) -> Result<Arc<ForkLister>> {
        let forks = ForkLister::new(&self.cfg.repo, &self.cfg.forks).context("init forks")?;
        Ok(Arc::new(forks))
    }

    pub fn build_context(
        &self,
        checkout: Arc<Checkout>,
        forks: Arc<ForkLister>,
    ) -> Arc<RestfulContext> {
        let lister = RevisionLister::new(checkout.clone(), &self.cfg.repo, &self.cfg.build);
        let builder = ArchiveBuilder::new(checkout, &self.cfg.repo, &self.cfg.build);

        let ctx = RestfulContext {
            revisions_handler: RevisionsHandler::new(lister, builder, forks),
            index_handler: IndexHandler::new(self.cfg.get_index_path()),
            healthz_handler: HealthzHandler::new(),
        };
        Arc::new(ctx)
    }

    pub fn build_server(&self, ctx: Arc<RestfulContext>) -> RestfulServer {
        let mut srv = RestfulServer::new(self.cfg.bind.clone(), ctx);
        if self.cfg.keep_alive_secs > 0 {
            srv.set_keep_alive_secs(self.cfg.keep_alive_secs);
        }
        if self.cfg.workers > 0 {
            srv.set_workers(self.cfg.workers);
        }
        srv
    }

    /// Zero means the refresher is disabled.
    pub fn refresh_interval_secs(&self) -> u64 {
        self.cfg.repo.fetch_interval_secs
    }
}
