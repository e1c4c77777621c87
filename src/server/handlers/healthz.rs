use actix_web::HttpRequest;
use chrono::Local;

use crate::server::response::Response;
use crate::types::healthz::HealthzResponse;

#[derive(Default)]
pub struct HealthzHandler;

impl HealthzHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, req: HttpRequest) -> Response {
        let local = Local::now();
        let offset = format!("{}", local.offset());
        let now = local.timestamp() as u64;
        let response = HealthzResponse {
            now,
            time_zone: offset,
            client_ip: req.connection_info().peer_addr().map(|a| a.to_string()),
            version: env!("EGG_HATCHER_VERSION").to_string(),
        };
        Response::json(response)
    }
}
