//! Concrete capabilities for the dispatcher.
//!
//! Every capability follows the same contract: reported failures come back
//! as text containing "error", and only malformed input is a fault.

pub mod capabilities;
mod config;

use dispatch_core::{CapabilityTable, TableError};
use thiserror::Error;

pub use capabilities::{
    DocumentSummaryCapability, EmailCapability, HeadlinesCapability, PostMessageCapability,
    RecentPostsCapability, WebSearchCapability,
};
pub use config::{
    DocumentConfig, EmailConfig, HeadlinesConfig, SearchConfig, SocialConfig, ToolsConfig,
};

#[derive(Debug, Error)]
pub enum ToolsError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Registers every built-in capability.
pub fn default_table(config: &ToolsConfig) -> Result<CapabilityTable, ToolsError> {
    let client = config.http_client()?;

    let table = CapabilityTable::builder()
        .register(HeadlinesCapability::new(client.clone(), config.headlines.clone()))?
        .register(EmailCapability::new(config.email.clone()))?
        .register(RecentPostsCapability::new(client.clone(), config.social.clone()))?
        .register(PostMessageCapability::new(client.clone(), config.social.clone()))?
        .register(DocumentSummaryCapability::new(
            client.clone(),
            config.document.clone(),
        ))?
        .register(WebSearchCapability::new(client, config.search.clone()))?
        .build(&[])?;

    log::info!("Registered {} capabilities", table.len());
    Ok(table)
}
