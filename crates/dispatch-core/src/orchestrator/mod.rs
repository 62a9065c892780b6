//! Runs the capability chain bound to each intent.

mod error;
pub mod extract;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::capability::{
    has_error_marker, CapabilityFault, CapabilityInput, CapabilityTable, DocumentRequest,
    HeadlinesRequest, MessageRequest, PostRequest, RecentPostsRequest, TableError,
};
use crate::config::{DispatchConfig, SummaryPublishing};
use crate::intent::{Intent, IntentClassifier};

pub use error::{DispatchError, DispatchOutcome};

type WorkflowResult = Result<String, DispatchError>;

/// Classifier plus orchestrator over a fixed capability table.
///
/// Holds no mutable state, so one instance can serve concurrent invocations.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<DispatchConfig>,
    classifier: IntentClassifier,
    table: CapabilityTable,
}

impl Dispatcher {
    /// Fails if the table lacks a capability the configured workflows call.
    pub fn new(config: DispatchConfig, table: CapabilityTable) -> Result<Self, TableError> {
        table.require(&config.required_capabilities())?;
        Ok(Self::unchecked(config, table))
    }

    fn unchecked(config: DispatchConfig, table: CapabilityTable) -> Self {
        let classifier = IntentClassifier::new(&config.classifier, &config.subject.names);
        Self {
            config: Arc::new(config),
            classifier,
            table,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    pub fn classify(&self, prompt: &str) -> Intent {
        self.classifier.classify(prompt)
    }

    /// Classifies `prompt` and runs the matching workflow.
    pub async fn dispatch(&self, prompt: &str) -> DispatchOutcome {
        let intent = self.classify(prompt);
        self.execute(intent, prompt).await
    }

    /// Runs the workflow for `intent` and flattens the outcome to text.
    pub async fn run(&self, intent: Intent, prompt: &str) -> String {
        self.execute(intent, prompt).await.into_text()
    }

    pub async fn execute(&self, intent: Intent, prompt: &str) -> DispatchOutcome {
        log::info!("Dispatching prompt (intent: {}): {}", intent, prompt);

        let result = match intent {
            Intent::FetchAndDistributeHeadlines => self.distribute_headlines(prompt).await,
            Intent::SummarizeAndPostRecentActivity => self.summarize_activity(prompt).await,
            Intent::SummarizeDocument => self.summarize_document(prompt).await,
            Intent::Unrecognized => Ok(self.guidance()),
        };

        if let Err(error) = &result {
            log::error!("Workflow {} failed: {}", intent, error);
        }

        DispatchOutcome { intent, result }
    }

    /// Runs the document workflow on a known path.
    ///
    /// The path is passed to the capability as is, so it may contain
    /// whitespace and needs no trigger phrase.
    pub async fn summarize_document_at(&self, file_path: &str) -> DispatchOutcome {
        let intent = Intent::SummarizeDocument;
        let prompt = format!("Summarize the PDF at {}", file_path);
        log::info!("Dispatching document (intent: {}): {}", intent, file_path);

        let result = self
            .call(
                DocumentRequest {
                    file_path: file_path.to_string(),
                }
                .into(),
                &prompt,
            )
            .await;

        if let Err(error) = &result {
            log::error!("Workflow {} failed: {}", intent, error);
        }

        DispatchOutcome { intent, result }
    }

    async fn distribute_headlines(&self, prompt: &str) -> WorkflowResult {
        let config = &self.config.headlines;

        let headlines = self
            .call(
                HeadlinesRequest {
                    url: config.source_url.clone(),
                }
                .into(),
                prompt,
            )
            .await?;
        if has_error_marker(&headlines) {
            return Err(DispatchError::step_failed("fetch headlines", headlines));
        }

        let recipient = extract::find_recipient(prompt, &config.recipient_phrase)
            .unwrap_or_else(|| config.default_recipient.clone());
        if !recipient.contains('@') {
            log::warn!("Recipient '{}' does not look like an address", recipient);
        }

        let body = format!("{}\n{}", config.heading, headlines);
        let sent = self
            .call(
                MessageRequest {
                    recipient,
                    subject: config.title.clone(),
                    body: body.clone(),
                }
                .into(),
                prompt,
            )
            .await?;
        if has_error_marker(&sent) {
            log::warn!("Headlines fetched but delivery failed: {}", sent);
        }

        Ok(format!("{}\n{}", body, sent))
    }

    async fn summarize_activity(&self, prompt: &str) -> WorkflowResult {
        let subject = &self.config.subject;
        let activity = &self.config.activity;

        let posts = self
            .call(
                RecentPostsRequest {
                    username: subject.handle.clone(),
                }
                .into(),
                prompt,
            )
            .await?;
        if has_error_marker(&posts) {
            return Err(DispatchError::step_failed("fetch recent posts", posts));
        }

        let summary = extract::topic_summary(&subject.display_name, &posts, activity);

        let published = match activity.publishing {
            SummaryPublishing::Post => {
                let posted = self
                    .call(
                        PostRequest {
                            content: summary.clone(),
                        }
                        .into(),
                        prompt,
                    )
                    .await?;
                if has_error_marker(&posted) {
                    log::warn!("Summary derived but posting failed: {}", posted);
                    DispatchError::step_failed("post summary", posted).to_string()
                } else {
                    posted
                }
            }
            SummaryPublishing::Log => {
                log::info!(
                    "Posting summary of {}'s recent posts: {}",
                    subject.display_name,
                    summary
                );
                "Posted summary to log.".to_string()
            }
        };

        Ok(format!(
            "{}'s recent posts:\n{}\n{}\n{}",
            subject.display_name, posts, summary, published
        ))
    }

    async fn summarize_document(&self, prompt: &str) -> WorkflowResult {
        let suffix = &self.config.document.suffix;
        let file_path = extract::find_document_token(prompt, suffix).ok_or_else(|| {
            DispatchError::MissingReference {
                label: extract::suffix_label(suffix),
            }
        })?;

        self.call(DocumentRequest { file_path }.into(), prompt).await
    }

    fn guidance(&self) -> String {
        format!(
            "Prompt not recognized. Try asking about Hacker News headlines, {}'s recent posts, or PDF summarization.",
            self.config.subject.display_name
        )
    }

    /// One capability call. Faults and panics become [`DispatchError::CapabilityFault`].
    async fn call(&self, input: CapabilityInput, prompt: &str) -> WorkflowResult {
        let kind = input.kind();
        log::debug!("Calling capability {}", kind);

        let fault = match AssertUnwindSafe(self.table.invoke(input))
            .catch_unwind()
            .await
        {
            Ok(Ok(output)) => {
                log::debug!("Capability {} returned {} bytes", kind, output.len());
                return Ok(output);
            }
            Ok(Err(fault)) => fault,
            Err(payload) => CapabilityFault::Panicked(panic_message(payload.as_ref())),
        };

        log::error!("Capability {} faulted: {}", kind, fault);
        Err(DispatchError::CapabilityFault {
            capability: kind,
            prompt: prompt.to_string(),
            message: fault.to_string(),
        })
    }
}

/// Runs `intent` against `table` with the default configuration.
///
/// A capability missing from `table` surfaces as a fault string, not a panic.
pub async fn run(intent: Intent, prompt: &str, table: &CapabilityTable) -> String {
    Dispatcher::unchecked(DispatchConfig::default(), table.clone())
        .run(intent, prompt)
        .await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests;
