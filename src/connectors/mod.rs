pub mod anr;
pub mod cordis;
pub mod factory;
pub mod registry;

use crate::error::Result;
use std::collections::HashMap;

/// Normalized project record as returned from external funding registries.
/// Guaranteed keys are `id`, `name` and `source`; everything else is
/// registry-specific passthrough.
pub type ProjectRecord = serde_json::Value;

/// Query parameters forwarded verbatim from the incoming request. Fetchers
/// interpret only the keys they recognize and ignore the rest.
pub type QueryParams = HashMap<String, String>;

/// Core trait that every funding-registry connector must implement.
#[async_trait::async_trait]
pub trait ProjectSource: Send + Sync + std::fmt::Debug {
    /// Canonical identifier of the registry this connector is bound to
    fn source_id(&self) -> &'static str;

    /// Fetch and normalize the project listing for the given query
    async fn fetch_projects(&self, params: &QueryParams) -> Result<Vec<ProjectRecord>>;
}
