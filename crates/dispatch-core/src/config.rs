//! Dispatch configuration.
//!
//! Every field has a default matching the stock deployment, so an empty YAML
//! document (or no file at all) yields a working configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::CapabilityKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub classifier: ClassifierConfig,
    pub subject: SubjectConfig,
    pub headlines: HeadlinesConfig,
    pub activity: ActivityConfig,
    pub document: DocumentConfig,
}

/// Trigger phrases, matched case-insensitively as substrings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub document_triggers: Vec<String>,
    pub headline_triggers: Vec<String>,
    /// Words that, next to a subject name, ask for a recent-activity summary.
    pub activity_keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            document_triggers: strings(&["summarize the pdf", "summarize pdf", "summarize the document"]),
            headline_triggers: strings(&["scrape top headlines"]),
            activity_keywords: strings(&["tweets", "posts", "summary"]),
        }
    }
}

/// The public figure whose recent posts get summarized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectConfig {
    pub names: Vec<String>,
    pub handle: String,
    pub display_name: String,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            names: strings(&["elon musk"]),
            handle: "@elonmusk".to_string(),
            display_name: "Elon Musk".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlinesConfig {
    pub source_url: String,
    /// Subject line of the outgoing message.
    pub title: String,
    pub heading: String,
    pub recipient_phrase: String,
    pub default_recipient: String,
}

impl Default for HeadlinesConfig {
    fn default() -> Self {
        Self {
            source_url: "https://news.ycombinator.com/".to_string(),
            title: "Hacker News Top Headlines".to_string(),
            heading: "Top 5 headlines from Hacker News:".to_string(),
            recipient_phrase: "email them to".to_string(),
            default_recipient: "user@example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRule {
    pub keyword: String,
    pub label: String,
}

impl TopicRule {
    pub fn new(keyword: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            label: label.into(),
        }
    }
}

/// What happens to a derived activity summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPublishing {
    /// Publish through the post-message capability.
    #[default]
    Post,
    /// Only write the summary to the log.
    Log,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Scanned in order; matched labels keep this order in the summary.
    pub topics: Vec<TopicRule>,
    pub fallback_topic: String,
    pub publishing: SummaryPublishing,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            topics: vec![
                TopicRule::new("tesla", "Tesla"),
                TopicRule::new("spacex", "SpaceX"),
                TopicRule::new("mars", "Mars exploration"),
                TopicRule::new("ai", "AI"),
            ],
            fallback_topic: "various topics".to_string(),
            publishing: SummaryPublishing::Post,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub suffix: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            suffix: ".pdf".to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: DispatchConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let classifier = &self.classifier;
        for (field, values) in [
            ("classifier.document_triggers", &classifier.document_triggers),
            ("classifier.headline_triggers", &classifier.headline_triggers),
            ("classifier.activity_keywords", &classifier.activity_keywords),
            ("subject.names", &self.subject.names),
        ] {
            if values.iter().all(|value| value.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "{field} needs at least one non-empty entry"
                )));
            }
        }

        if self.document.suffix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "document.suffix cannot be empty".to_string(),
            ));
        }
        if self.headlines.default_recipient.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "headlines.default_recipient cannot be empty".to_string(),
            ));
        }
        if self
            .activity
            .topics
            .iter()
            .any(|topic| topic.keyword.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "activity.topics keywords cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Capability kinds the configured workflows call.
    pub fn required_capabilities(&self) -> Vec<CapabilityKind> {
        let mut kinds = vec![
            CapabilityKind::FetchHeadlines,
            CapabilityKind::SendMessage,
            CapabilityKind::FetchRecentPosts,
            CapabilityKind::ExtractAndSummarizeDocument,
        ];
        if self.activity.publishing == SummaryPublishing::Post {
            kinds.push(CapabilityKind::PostMessage);
        }
        kinds
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
