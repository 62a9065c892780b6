use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;

/// Task category derived from a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    FetchAndDistributeHeadlines,
    SummarizeAndPostRecentActivity,
    SummarizeDocument,
    Unrecognized,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::FetchAndDistributeHeadlines => "fetch-and-distribute-headlines",
            Intent::SummarizeAndPostRecentActivity => "summarize-and-post-recent-activity",
            Intent::SummarizeDocument => "summarize-document",
            Intent::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps prompt text to an [`Intent`] with ordered substring rules.
///
/// Rules are checked in priority order and the first match wins:
/// document triggers, then subject + activity keyword, then headline
/// triggers. Anything else is [`Intent::Unrecognized`].
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    document_triggers: Vec<String>,
    headline_triggers: Vec<String>,
    activity_keywords: Vec<String>,
    subject_names: Vec<String>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        let config = crate::config::DispatchConfig::default();
        Self::new(&config.classifier, &config.subject.names)
    }
}

impl IntentClassifier {
    pub fn new(config: &ClassifierConfig, subject_names: &[String]) -> Self {
        Self {
            document_triggers: lowered(&config.document_triggers),
            headline_triggers: lowered(&config.headline_triggers),
            activity_keywords: lowered(&config.activity_keywords),
            subject_names: lowered(subject_names),
        }
    }

    pub fn classify(&self, text: &str) -> Intent {
        let text = text.to_lowercase();

        if contains_any(&text, &self.document_triggers) {
            Intent::SummarizeDocument
        } else if contains_any(&text, &self.subject_names)
            && contains_any(&text, &self.activity_keywords)
        {
            Intent::SummarizeAndPostRecentActivity
        } else if contains_any(&text, &self.headline_triggers) {
            Intent::FetchAndDistributeHeadlines
        } else {
            Intent::Unrecognized
        }
    }
}

/// Classifies with the default trigger set.
pub fn classify(text: &str) -> Intent {
    IntentClassifier::default().classify(text)
}

fn lowered(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| text.contains(needle.as_str()))
}
