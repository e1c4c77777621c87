pub mod builder;
pub mod checkout;
pub mod config;
pub mod dirs;
pub mod exec;
pub mod forks;
pub mod git;
pub mod lister;
pub mod logs;
pub mod refresh;
pub mod server;
pub mod types;
