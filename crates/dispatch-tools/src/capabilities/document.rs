use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dispatch_core::{Capability, CapabilityFault, CapabilityInput, CapabilityKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::wrong_input;
use crate::config::DocumentConfig;

const SUMMARY_INSTRUCTION: &str = "Summarize the following text in 100 words or less:\n\n";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Extracts the text of a PDF and summarizes it with a chat model.
///
/// Without an API key the capability still validates the file but answers
/// with a mock summary.
pub struct DocumentSummaryCapability {
    client: Client,
    config: DocumentConfig,
}

impl DocumentSummaryCapability {
    pub fn new(client: Client, config: DocumentConfig) -> Self {
        Self { client, config }
    }

    async fn summarize_file(&self, file_path: &str) -> Result<String, String> {
        let path = Path::new(file_path);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(format!("Error: File not found at {}", file_path));
        }
        if !file_path.to_lowercase().ends_with(".pdf") {
            return Err(format!("Error: File at {} is not a PDF", file_path));
        }

        let Some(api_key) = self.config.api_key.as_deref() else {
            log::warn!(
                "Summarizer unavailable for PDF at {}, returning mock summary",
                file_path
            );
            return Ok(format!(
                "Summary of PDF at {}: (Mock) This PDF appears to discuss important topics, but summarization is unavailable without a configured model.",
                file_path
            ));
        };

        let text = extract_text(path.to_path_buf()).await?;
        if text.trim().is_empty() {
            return Err(format!(
                "Error: No text extracted from PDF at {}. It may be a scanned image.",
                file_path
            ));
        }

        let summary = self.summarize_text(api_key, &text).await?;
        Ok(format!("Summary of PDF at {}: {}", file_path, summary))
    }

    async fn summarize_text(&self, api_key: &str, text: &str) -> Result<String, String> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: format!("{}{}", SUMMARY_INSTRUCTION, text),
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("summarizer request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(format!("summarizer returned HTTP {}: {}", status, text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid summarizer response: {}", e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| "summarizer returned no choices".to_string())
    }
}

/// PDF parsing is CPU bound and may panic on malformed input.
async fn extract_text(path: PathBuf) -> Result<String, String> {
    let display = path.display().to_string();
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path)).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(format!("could not read PDF at {}: {}", display, e)),
        Err(e) => Err(format!("PDF parser crashed on {}: {}", display, e)),
    }
}

#[async_trait]
impl Capability for DocumentSummaryCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::ExtractAndSummarizeDocument
    }

    fn description(&self) -> &str {
        "Summarize a PDF file at the given path"
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        let file_path = match input {
            CapabilityInput::ExtractAndSummarizeDocument(request) => request.file_path,
            other => return Err(wrong_input(self.kind(), &other)),
        };

        match self.summarize_file(&file_path).await {
            Ok(summary) => Ok(summary),
            Err(error) if error.starts_with("Error") => Ok(error),
            Err(error) => {
                let message = format!("Error summarizing PDF at {}: {}", file_path, error);
                log::error!("{}", message);
                Ok(message)
            }
        }
    }
}
