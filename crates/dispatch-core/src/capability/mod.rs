pub mod table;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use table::{CapabilityTable, CapabilityTableBuilder, TableError};
pub use types::{
    CapabilityInput, CapabilityKind, DocumentRequest, HeadlinesRequest, MessageRequest,
    PostRequest, RecentPostsRequest, SearchRequest,
};

/// Substring a capability embeds in its output to report a failure.
pub const ERROR_MARKER: &str = "error";

/// A fault a capability could not express through its output text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityFault {
    #[error("invalid input: expected {expected} request, got {actual}")]
    InvalidInput {
        expected: CapabilityKind,
        actual: CapabilityKind,
    },

    #[error("{0}")]
    Failed(String),

    #[error("capability panicked: {0}")]
    Panicked(String),
}

/// An externally supplied operation the orchestrator calls by kind.
///
/// Reported failures travel inside the returned text (see [`has_error_marker`]);
/// `Err` is reserved for faults the capability did not absorb.
#[async_trait]
pub trait Capability: Send + Sync {
    fn kind(&self) -> CapabilityKind;

    fn description(&self) -> &str {
        ""
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault>;
}

pub type SharedCapability = Arc<dyn Capability>;

/// Case-insensitive check for the error marker in capability output.
pub fn has_error_marker(text: &str) -> bool {
    text.to_lowercase().contains(ERROR_MARKER)
}
