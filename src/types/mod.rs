pub mod fork;
pub mod healthz;
pub mod response;
pub mod revision;
