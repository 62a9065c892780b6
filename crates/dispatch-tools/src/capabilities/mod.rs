mod document;
mod email;
mod headlines;
mod search;
mod social;

use dispatch_core::{CapabilityFault, CapabilityInput, CapabilityKind};

pub use document::DocumentSummaryCapability;
pub use email::EmailCapability;
pub use headlines::HeadlinesCapability;
pub use search::WebSearchCapability;
pub use social::{PostMessageCapability, RecentPostsCapability};

fn wrong_input(expected: CapabilityKind, input: &CapabilityInput) -> CapabilityFault {
    CapabilityFault::InvalidInput {
        expected,
        actual: input.kind(),
    }
}

/// Cuts `text` to `max` characters, ending with "..." when shortened.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
