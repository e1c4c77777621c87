mod response;

pub mod config;
pub mod factory;
pub mod handlers;
pub mod restful;
