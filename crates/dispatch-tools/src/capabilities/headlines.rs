use std::sync::OnceLock;

use async_trait::async_trait;
use dispatch_core::{Capability, CapabilityFault, CapabilityInput, CapabilityKind};
use regex::Regex;
use reqwest::Client;

use super::wrong_input;
use crate::config::HeadlinesConfig;

/// Scrapes the front page of a Hacker News style site.
///
/// Returns a numbered list of the top titles, or an "Error scraping
/// headlines" message once every attempt has failed.
pub struct HeadlinesCapability {
    client: Client,
    config: HeadlinesConfig,
}

impl HeadlinesCapability {
    pub fn new(client: Client, config: HeadlinesConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        response.text().await.map_err(|e| e.to_string())
    }

    async fn scrape(&self, url: &str) -> String {
        let attempts = self.config.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_page(url).await {
                Ok(page) => {
                    let titles = extract_titles(&page, self.config.limit);
                    if titles.is_empty() {
                        return format!("Error scraping headlines: no headlines found at {}", url);
                    }
                    return numbered(&titles);
                }
                Err(error) => {
                    log::warn!(
                        "Attempt {} failed to scrape headlines from {}: {}",
                        attempt,
                        url,
                        error
                    );
                    last_error = error;
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_pause).await;
                    }
                }
            }
        }

        log::error!("Error scraping headlines from {}: {}", url, last_error);
        format!("Error scraping headlines: {}", last_error)
    }
}

#[async_trait]
impl Capability for HeadlinesCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::FetchHeadlines
    }

    fn description(&self) -> &str {
        "Scrape top headlines from a URL (defaults to Hacker News)"
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        match input {
            CapabilityInput::FetchHeadlines(request) => Ok(self.scrape(&request.url).await),
            other => Err(wrong_input(self.kind(), &other)),
        }
    }
}

fn title_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?s)class="titleline"[^>]*>\s*<a[^>]*>(.*?)</a>"#).ok())
        .as_ref()
}

fn extract_titles(page: &str, limit: usize) -> Vec<String> {
    let Some(pattern) = title_pattern() else {
        return Vec::new();
    };

    pattern
        .captures_iter(page)
        .filter_map(|captures| captures.get(1))
        .map(|title| decode_entities(title.as_str().trim()))
        .filter(|title| !title.is_empty())
        .take(limit)
        .collect()
}

fn numbered(titles: &[String]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(index, title)| format!("{}. {}", index + 1, title))
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
