use std::sync::Arc;
use std::time::Duration;

use actix_web::web::{self, Data, ServiceConfig};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::info;
use sd_notify::NotifyState;

use crate::types::revision::RevisionKind;

use super::handlers::healthz::HealthzHandler;
use super::handlers::index::IndexHandler;
use super::handlers::revisions::RevisionsHandler;
use super::response::Response;

pub struct RestfulServer {
    ctx: Arc<RestfulContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,

    bind: String,
}

pub struct RestfulContext {
    pub revisions_handler: RevisionsHandler,
    pub index_handler: IndexHandler,
    pub healthz_handler: HealthzHandler,
}

impl RestfulServer {
    const INDEX_PATH: &'static str = "/";
    const TAGS_PATH: &'static str = "/tags";
    const BRANCHES_PATH: &'static str = "/branches";
    const FORKS_PATH: &'static str = "/forks";
    const HEALTHZ_PATH: &'static str = "/healthz";

    pub fn new(bind: String, ctx: Arc<RestfulContext>) -> Self {
        Self {
            ctx,
            keep_alive_secs: None,
            workers: None,
            bind,
        }
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    /// Register every route. The context must be registered as
    /// `Data<Arc<RestfulContext>>` by the caller.
    pub fn routes(cfg: &mut ServiceConfig) {
        cfg.route(Self::INDEX_PATH, web::get().to(Self::handle_index))
            .route(Self::TAGS_PATH, web::get().to(Self::handle_list_tags))
            .route("/tags/{tag}", web::get().to(Self::handle_build_tag))
            .route(Self::BRANCHES_PATH, web::get().to(Self::handle_list_branches))
            .route(
                "/branches/{branch:.*}",
                web::get().to(Self::handle_build_branch),
            )
            .route(Self::FORKS_PATH, web::get().to(Self::handle_list_forks))
            .route(
                "/forks/{fork}/branches",
                web::get().to(Self::handle_list_fork_branches),
            )
            .route(
                "/forks/{fork}/branches/{branch:.*}",
                web::get().to(Self::handle_build_fork_branch),
            )
            .route(Self::HEALTHZ_PATH, web::get().to(Self::handle_healthz))
            .default_service(web::route().to(Self::default_handler));
    }

    pub async fn run(self) -> Result<()> {
        let ctx = self.ctx.clone();
        let mut srv = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(ctx.clone()))
                .configure(Self::routes)
        });

        info!("Binding to http://{}", self.bind);
        srv = srv.bind(&self.bind).context("bind server")?;

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting restful server");
        srv.run().await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    async fn handle_index(ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.index_handler.handle().await.into()
    }

    async fn handle_list_tags(ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.revisions_handler.list(RevisionKind::Tag).await.into()
    }

    async fn handle_build_tag(
        tag: web::Path<String>,
        ctx: Data<Arc<RestfulContext>>,
    ) -> HttpResponse {
        ctx.revisions_handler
            .build(RevisionKind::Tag, &tag)
            .await
            .into()
    }

    async fn handle_list_branches(ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.revisions_handler.list(RevisionKind::Branch).await.into()
    }

    async fn handle_build_branch(
        branch: web::Path<String>,
        ctx: Data<Arc<RestfulContext>>,
    ) -> HttpResponse {
        ctx.revisions_handler
            .build(RevisionKind::Branch, &branch)
            .await
            .into()
    }

    async fn handle_list_forks(ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.revisions_handler.list_forks().await.into()
    }

    async fn handle_list_fork_branches(
        fork: web::Path<String>,
        ctx: Data<Arc<RestfulContext>>,
    ) -> HttpResponse {
        ctx.revisions_handler.list_fork_branches(&fork).await.into()
    }

    async fn handle_build_fork_branch(
        path: web::Path<(String, String)>,
        ctx: Data<Arc<RestfulContext>>,
    ) -> HttpResponse {
        let (fork, branch) = path.into_inner();
        ctx.revisions_handler
            .build_fork_branch(&fork, &branch)
            .await
            .into()
    }

    async fn handle_healthz(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.healthz_handler.handle(req).into()
    }

    async fn default_handler(req: HttpRequest) -> HttpResponse {
        let path = req.uri().path().to_string();
        let method = req.method().as_str().to_string();
        Response::not_found(format!("No route to {method} {path}")).into()
    }
}
