//! Summarizes documents as they land in the upload directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dispatch_core::Dispatcher;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};

use crate::store::AgentStore;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("no async runtime to run summaries on: {0}")]
    Runtime(#[from] TryCurrentError),

    #[error("File watch error: {0}")]
    Notify(#[from] notify::Error),
}

/// Keeps the directory watch alive; dropping it stops the watch.
pub struct UploadWatcher {
    _watcher: Mutex<RecommendedWatcher>,
}

impl UploadWatcher {
    /// Watches `upload_dir` (not its subdirectories) on behalf of `agent_id`.
    ///
    /// Each newly created file whose name ends with the configured document
    /// suffix is summarized after `settle_delay`, and the result stored as the
    /// agent's latest document summary.
    pub fn start(
        agent_id: String,
        upload_dir: &Path,
        dispatcher: Arc<Dispatcher>,
        store: Arc<AgentStore>,
        settle_delay: Duration,
    ) -> Result<Self, WatchError> {
        let handle = Handle::try_current()?;
        let suffix = dispatcher.config().document.suffix.to_lowercase();
        let watched_agent = agent_id.clone();

        let mut watcher: RecommendedWatcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        log::error!("[{}] Upload watch error: {}", watched_agent, e);
                        return;
                    }
                };
                if !matches!(event.kind, EventKind::Create(_)) {
                    return;
                }

                for path in event.paths {
                    if !is_document(&path, &suffix) {
                        continue;
                    }
                    log::info!("[{}] New document detected: {}", watched_agent, path.display());
                    handle.spawn(summarize_upload(
                        watched_agent.clone(),
                        path,
                        dispatcher.clone(),
                        store.clone(),
                        settle_delay,
                    ));
                }
            })?;

        watcher.watch(upload_dir, RecursiveMode::NonRecursive)?;
        log::info!("[{}] Watching {} for documents", agent_id, upload_dir.display());

        Ok(Self {
            _watcher: Mutex::new(watcher),
        })
    }
}

fn is_document(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase().ends_with(suffix))
        .unwrap_or(false)
}

async fn summarize_upload(
    agent_id: String,
    path: PathBuf,
    dispatcher: Arc<Dispatcher>,
    store: Arc<AgentStore>,
    settle_delay: Duration,
) {
    // Let the writer finish before reading.
    tokio::time::sleep(settle_delay).await;

    if !store.contains(&agent_id) {
        log::warn!("[{}] Agent gone, skipping {}", agent_id, path.display());
        return;
    }

    let summary = dispatcher
        .summarize_document_at(&path.to_string_lossy())
        .await
        .into_text();
    log::info!("[{}] Document summary: {}", agent_id, summary);

    if let Err(e) = store.set_document_summary(&agent_id, summary) {
        log::warn!("[{}] Could not store document summary: {}", agent_id, e);
    }
}
