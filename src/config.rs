use crate::constants::{
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_PORT, DEFAULT_REQUEST_DEADLINE_SECONDS,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::{Result, ServiceError};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Overall deadline for one connector request, covering every page fetch.
    #[serde(default = "default_request_deadline_seconds")]
    pub request_deadline_seconds: u64,
}

/// Per-source fetcher configuration, supplied by the registry at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub id: String,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_deadline_seconds: default_request_deadline_seconds(),
        }
    }
}

impl AppConfig {
    pub fn load(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ServiceError::Config(format!("Failed to read config file '{config_path}': {e}"))
        })?;

        let config: AppConfig = toml::from_str(&config_content)?;
        Ok(config)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_deadline_seconds() -> u64 {
    DEFAULT_REQUEST_DEADLINE_SECONDS
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_enabled() -> bool {
    true
}
