use thiserror::Error;

use crate::capability::CapabilityKind;
use crate::intent::Intent;

/// Why a workflow stopped early.
///
/// Every message carries the error marker, so flattened output keeps the
/// textual failure contract callers already rely on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Error: {label} file path not found in prompt. Please upload a {label} and try again.")]
    MissingReference { label: String },

    #[error("Failed to {step}: {message}")]
    StepFailed { step: String, message: String },

    #[error("Error running {capability} for prompt '{prompt}': {message}")]
    CapabilityFault {
        capability: CapabilityKind,
        prompt: String,
        message: String,
    },
}

impl DispatchError {
    pub(crate) fn step_failed(step: &str, message: impl Into<String>) -> Self {
        DispatchError::StepFailed {
            step: step.to_string(),
            message: message.into(),
        }
    }
}

/// The structured result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub intent: Intent,
    pub result: Result<String, DispatchError>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Flattens to the plain-text contract.
    pub fn into_text(self) -> String {
        match self.result {
            Ok(text) => text,
            Err(error) => error.to_string(),
        }
    }
}
