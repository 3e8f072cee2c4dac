use crate::connectors::anr::AnrFetcher;
use crate::connectors::cordis::CordisFetcher;
use crate::connectors::registry::SourceRegistry;
use crate::connectors::ProjectSource;
use crate::constants::{ANR_SOURCE, CORDIS_SOURCE};
use crate::error::{Result, ServiceError};

/// Construct the connector registered for a canonicalized source
/// identifier, injecting its fetcher configuration. Performs no network
/// I/O. Adding a registry means adding one match arm and one fetcher
/// implementation.
pub fn create(source_id: &str, registry: &SourceRegistry) -> Result<Box<dyn ProjectSource>> {
    let config = registry.config_for(source_id)?;
    match source_id {
        ANR_SOURCE => Ok(Box::new(AnrFetcher::new(config.clone())?)),
        CORDIS_SOURCE => Ok(Box::new(CordisFetcher::new(config.clone())?)),
        other => Err(ServiceError::UnknownSource(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;

    fn registry() -> SourceRegistry {
        let sources: Vec<SourceConfig> = [ANR_SOURCE, CORDIS_SOURCE]
            .iter()
            .map(|id| SourceConfig {
                id: id.to_string(),
                endpoint: format!("https://api.example.org/{}", id.to_lowercase()),
                api_key: None,
                timeout_seconds: 5,
                max_pages: 2,
                page_size: 10,
                enabled: true,
            })
            .collect();
        SourceRegistry::from_sources(&sources)
    }

    #[test]
    fn creates_a_connector_per_registered_source() {
        let registry = registry();
        for id in [ANR_SOURCE, CORDIS_SOURCE] {
            let connector = create(id, &registry).unwrap();
            assert_eq!(connector.source_id(), id);
        }
    }

    #[test]
    fn unknown_source_errors_with_the_identifier() {
        let err = create("FOO", &registry()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown source: FOO");
    }
}
