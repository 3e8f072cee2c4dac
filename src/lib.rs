pub mod config;
pub mod connectors;
pub mod constants;
pub mod error;
pub mod logging;
pub mod projects;
pub mod server;
