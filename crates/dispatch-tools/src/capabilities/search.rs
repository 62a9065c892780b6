use async_trait::async_trait;
use dispatch_core::{Capability, CapabilityFault, CapabilityInput, CapabilityKind};
use reqwest::Client;
use serde::Deserialize;

use super::wrong_input;
use crate::config::SearchConfig;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
}

/// Google Custom Search; returns the top three result titles.
pub struct WebSearchCapability {
    client: Client,
    config: SearchConfig,
}

impl WebSearchCapability {
    pub fn new(client: Client, config: SearchConfig) -> Self {
        Self { client, config }
    }

    async fn search(&self, api_key: &str, engine_id: &str, query: &str) -> Result<String, String> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("key", api_key), ("cx", engine_id), ("q", query)])
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let results: SearchResponse = response.json().await.map_err(|e| e.to_string())?;
        if results.items.is_empty() {
            return Ok(format!("No search results found for '{}'", query));
        }

        let titles = results
            .items
            .iter()
            .take(3)
            .enumerate()
            .map(|(index, item)| format!("{}. {}", index + 1, item.title))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(format!("Web search results for '{}':\n{}", query, titles))
    }
}

#[async_trait]
impl Capability for WebSearchCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::WebSearch
    }

    fn description(&self) -> &str {
        "Perform a web search for the given query"
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        let query = match input {
            CapabilityInput::WebSearch(request) => request.query,
            other => return Err(wrong_input(self.kind(), &other)),
        };

        let (Some(api_key), Some(engine_id)) = (
            self.config.api_key.as_deref(),
            self.config.engine_id.as_deref(),
        ) else {
            return Ok("Error: GOOGLE_API_KEY or GOOGLE_CSE_ID not set.".to_string());
        };

        match self.search(api_key, engine_id, &query).await {
            Ok(results) => Ok(results),
            Err(error) => {
                let message = format!("Error performing web search for {}: {}", query, error);
                log::error!("{}", message);
                Ok(message)
            }
        }
    }
}
