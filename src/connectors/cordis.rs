use crate::config::SourceConfig;
use crate::connectors::{ProjectRecord, ProjectSource, QueryParams};
use crate::constants::CORDIS_SOURCE;
use crate::error::{Result, ServiceError};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Connector for the CORDIS search API (EU research programme registry).
///
/// The API answers `GET <endpoint>?q=<text>&p=<page>&num=<size>` with
/// `{"payload": {"total": <n>, "items": [...]}}`; items are identified by
/// a numeric `rcn` and carry `title` plus an optional `acronym`.
#[derive(Debug)]
pub struct CordisFetcher {
    client: reqwest::Client,
    config: SourceConfig,
}

impl CordisFetcher {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch_page(&self, query: Option<&str>, page: u32, page_size: u32) -> Result<Value> {
        let mut request = self
            .client
            .get(&self.config.endpoint)
            .query(&[("p", page.to_string()), ("num", page_size.to_string())]);
        if let Some(q) = query {
            request = request.query(&[("q", q)]);
        }
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?.error_for_status()?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ServiceError::Fetch {
                message: format!("CORDIS returned an unparsable response: {e}"),
            })
    }

    fn normalize(entry: &Value) -> Option<ProjectRecord> {
        let fields = entry.as_object()?;
        // rcn is numeric in CORDIS responses, but tolerate strings
        let id = match fields.get("rcn").or_else(|| fields.get("id"))? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let name = fields.get("title").and_then(Value::as_str)?;

        let mut record = fields.clone();
        record.insert("id".to_string(), json!(id));
        record.insert("name".to_string(), json!(name));
        record.insert("source".to_string(), json!(CORDIS_SOURCE));
        Some(Value::Object(record))
    }
}

#[async_trait::async_trait]
impl ProjectSource for CordisFetcher {
    fn source_id(&self) -> &'static str {
        CORDIS_SOURCE
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
            debug!("Fetching CORDIS page {}", page);
            let body = self.fetch_page(query, page, page_size).await?;
            let items = body["payload"]["items"]
                .as_array()
                .ok_or_else(|| ServiceError::Fetch {
                    message: "CORDIS response is missing the 'payload.items' array".to_string(),
                })?;

            for item in items {
                match Self::normalize(item) {
                    Some(record) => records.push(record),
                    None => warn!("Skipping unmappable CORDIS record: {}", item),
                }
            }
            seen += items.len();

            if pinned_page.is_some() {
                break;
            }
            let total = body["payload"]["total"].as_u64().unwrap_or(0);
            if items.len() < page_size as usize
                || (total > 0 && seen as u64 >= total)
                || page >= self.config.max_pages
            {
                break;
            }
            page += 1;
        }

        info!("Fetched {} projects from CORDIS", records.len());
        Ok(records)
    }
}
