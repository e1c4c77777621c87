pub mod healthz;
pub mod index;
pub mod revisions;
