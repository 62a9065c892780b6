//! Prompt-triggered task dispatch.
//!
//! A prompt is classified into one of a small set of intents, and the
//! orchestrator runs the fixed capability chain bound to that intent.

pub mod capability;
pub mod config;
pub mod intent;
pub mod orchestrator;

pub use capability::{
    has_error_marker, Capability, CapabilityFault, CapabilityInput, CapabilityKind,
    CapabilityTable, CapabilityTableBuilder, DocumentRequest, HeadlinesRequest, MessageRequest,
    PostRequest, RecentPostsRequest, SearchRequest, SharedCapability, TableError,
};
pub use config::{
    ActivityConfig, ClassifierConfig, ConfigError, DispatchConfig, DocumentConfig,
    HeadlinesConfig, SubjectConfig, SummaryPublishing, TopicRule,
};
pub use intent::{classify, Intent, IntentClassifier};
pub use orchestrator::{run, DispatchError, DispatchOutcome, Dispatcher};
