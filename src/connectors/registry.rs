use crate::config::SourceConfig;
use crate::error::{Result, ServiceError};
use std::collections::HashMap;
use tracing::debug;

/// Registry of external funding sources, built once at startup from
/// configuration and read-only afterwards. The registry is the single
/// source of truth for valid source identifiers; request handlers must
/// not keep their own allow-list.
pub struct SourceRegistry {
    // Enumeration order follows the configuration file
    ids: Vec<String>,
    sources: HashMap<String, SourceConfig>,
}

impl SourceRegistry {
    pub fn from_sources(configs: &[SourceConfig]) -> Self {
        let mut ids = Vec::new();
        let mut sources = HashMap::new();

        for config in configs {
            let id = config.id.to_uppercase();
            if !config.enabled {
                debug!("Skipping disabled source: {}", id);
                continue;
            }
            if sources.insert(id.clone(), config.clone()).is_none() {
                ids.push(id);
            }
        }

        Self { ids, sources }
    }

    /// All registered source identifiers, in configuration order.
    pub fn valid_sources(&self) -> &[String] {
        &self.ids
    }

    pub fn is_registered(&self, source_id: &str) -> bool {
        self.sources.contains_key(source_id)
    }

    /// Fetcher configuration for a registered source. Callers should check
    /// membership with `is_registered` first rather than using this as
    /// control flow.
    pub fn config_for(&self, source_id: &str) -> Result<&SourceConfig> {
        self.sources
            .get(source_id)
            .ok_or_else(|| ServiceError::UnknownSource(source_id.to_string()))
    }
}
