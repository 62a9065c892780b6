use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dispatch_core::Dispatcher;

use crate::store::AgentStore;

/// Pause between an upload appearing and its summarization.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Shared by every worker of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<AgentStore>,
    pub upload_dir: PathBuf,
    pub settle_delay: Duration,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            store: Arc::new(AgentStore::new()),
            upload_dir: upload_dir.into(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}
