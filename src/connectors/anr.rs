use crate::config::SourceConfig;
use crate::connectors::{ProjectRecord, ProjectSource, QueryParams};
use crate::constants::ANR_SOURCE;
use crate::error::{Result, ServiceError};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Connector for the ANR (Agence Nationale de la Recherche) open-data API.
///
/// The API answers `GET <endpoint>?q=<text>&page=<n>&pageSize=<n>` with
/// `{"total": <n>, "projects": [...]}`; each entry carries `codeProjet`
/// and a French (`titre`) or English (`titreEn`) title.
#[derive(Debug)]
pub struct AnrFetcher {
    client: reqwest::Client,
    config: SourceConfig,
}

impl AnrFetcher {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch_page(&self, query: Option<&str>, page: u32, page_size: u32) -> Result<Value> {
        let mut request = self.client.get(&self.config.endpoint).query(&[
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ]);
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }
        if let Some(key) = &self.config.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await?.error_for_status()?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ServiceError::Fetch {
                message: format!("ANR returned an unparsable response: {e}"),
            })
    }

    /// Map one external entry into a normalized record, or None when the
    /// required fields are missing. Unrecognized fields pass through.
    fn normalize(entry: &Value) -> Option<ProjectRecord> {
        let fields = entry.as_object()?;
        let id = fields.get("codeProjet")?.as_str()?;
        let name = fields
            .get("titre")
            .and_then(Value::as_str)
            .or_else(|| fields.get("titreEn").and_then(Value::as_str))?;

        let mut record = fields.clone();
        record.insert("id".to_string(), json!(id));
        record.insert("name".to_string(), json!(name));
        record.insert("source".to_string(), json!(ANR_SOURCE));
        Some(Value::Object(record))
    }
}

#[async_trait::async_trait]
impl ProjectSource for AnrFetcher {
    fn source_id(&self) -> &'static str {
        ANR_SOURCE
    }

    #[instrument(skip(self, params))]
    async fn fetch_projects(&self, params: &QueryParams) -> Result<Vec<ProjectRecord>> {
        let query = params
            .get("query")
            .or_else(|| params.get("q"))
            .map(String::as_str);
        let pinned_page: Option<u32> = params.get("page").and_then(|p| p.parse().ok());
        let page_size: u32 = params
            .get("limit")
            .and_then(|l| l.parse().ok())
            .unwrap_or(self.config.page_size);

        let mut records = Vec::new();
        let mut seen = 0usize;
        let mut page = pinned_page.unwrap_or(1);
        loop {
            debug!("Fetching ANR page {}", page);
            let body = self.fetch_page(query, page, page_size).await?;
            let entries = body["projects"]
                .as_array()
                .ok_or_else(|| ServiceError::Fetch {
                    message: "ANR response is missing the 'projects' array".to_string(),
                })?;

            for entry in entries {
                match Self::normalize(entry) {
                    Some(record) => records.push(record),
                    None => warn!("Skipping unmappable ANR record: {}", entry),
                }
            }
            seen += entries.len();

            if pinned_page.is_some() {
                break;
            }
            let total = body["total"].as_u64().unwrap_or(0);
            if entries.len() < page_size as usize
                || (total > 0 && seen as u64 >= total)
                || page >= self.config.max_pages
            {
                break;
            }
            page += 1;
        }

        info!("Fetched {} projects from ANR", records.len());
        Ok(records)
    }
}
