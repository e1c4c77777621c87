use std::path::PathBuf;

use log::error;

use crate::server::response::Response;

const DEFAULT_INDEX: &str = include_str!("../../../static/index.html");

/// Serves the landing page. A configured file is read on every request so it
/// can be edited without a restart.
pub struct IndexHandler {
    path: Option<PathBuf>,
}

impl IndexHandler {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub async fn handle(&self) -> Response {
        let path = match self.path.as_ref() {
            Some(path) => path,
            None => return Response::html(DEFAULT_INDEX.as_bytes().to_vec()),
        };
        match tokio::fs::read(path).await {
            Ok(data) => Response::html(data),
            Err(e) => {
                error!("Read index page '{}' failed: {e:#}", path.display());
                Response::error()
            }
        }
    }
}
