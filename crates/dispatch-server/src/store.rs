//! In-memory registry of agents and their background handles.
//!
//! Records live only as long as the process; nothing is persisted.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dispatch_core::Intent;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::watcher::UploadWatcher;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Agent {0} not found")]
    NotFound(String),
}

/// A saved prompt plus what its runs produced.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRecord {
    pub agent_id: String,
    pub prompt: String,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<f64>,
    pub last_document_summary: Option<String>,
    pub last_output: Option<String>,
    pub runs: u64,
    pub created_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
}

struct AgentEntry {
    record: AgentRecord,
    schedule: Option<CancellationToken>,
    watcher: Option<UploadWatcher>,
}

impl AgentEntry {
    fn stop(&mut self) {
        if let Some(token) = self.schedule.take() {
            token.cancel();
        }
        self.watcher.take();
    }
}

#[derive(Default)]
pub struct AgentStore {
    agents: DashMap<String, AgentEntry>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &self,
        prompt: impl Into<String>,
        intent: Intent,
        interval_minutes: Option<f64>,
    ) -> AgentRecord {
        let record = AgentRecord {
            agent_id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            intent,
            interval_minutes,
            last_document_summary: None,
            last_output: None,
            runs: 0,
            created_at: Utc::now(),
            last_run_at: None,
        };

        self.agents.insert(
            record.agent_id.clone(),
            AgentEntry {
                record: record.clone(),
                schedule: None,
                watcher: None,
            },
        );
        log::debug!("[{}] Agent created", record.agent_id);
        record
    }

    pub fn get(&self, agent_id: &str) -> Option<AgentRecord> {
        self.agents.get(agent_id).map(|entry| entry.record.clone())
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.agents.contains_key(agent_id)
    }

    /// All agents, oldest first.
    pub fn list(&self) -> Vec<AgentRecord> {
        let mut records: Vec<AgentRecord> = self
            .agents
            .iter()
            .map(|entry| entry.record.clone())
            .collect();
        records.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.agent_id.cmp(&right.agent_id))
        });
        records
    }

    pub fn record_run(&self, agent_id: &str, output: &str) -> Result<(), StoreError> {
        let mut entry = self.entry_mut(agent_id)?;
        entry.record.last_output = Some(output.to_string());
        entry.record.last_run_at = Some(Utc::now());
        entry.record.runs += 1;
        Ok(())
    }

    pub fn set_document_summary(&self, agent_id: &str, summary: String) -> Result<(), StoreError> {
        self.entry_mut(agent_id)?.record.last_document_summary = Some(summary);
        Ok(())
    }

    /// Replaces any previous schedule, cancelling it.
    pub fn attach_schedule(
        &self,
        agent_id: &str,
        token: CancellationToken,
    ) -> Result<(), StoreError> {
        let mut entry = self.entry_mut(agent_id).map_err(|error| {
            token.cancel();
            error
        })?;
        if let Some(previous) = entry.schedule.replace(token) {
            previous.cancel();
        }
        Ok(())
    }

    pub fn attach_watcher(&self, agent_id: &str, watcher: UploadWatcher) -> Result<(), StoreError> {
        self.entry_mut(agent_id)?.watcher = Some(watcher);
        Ok(())
    }

    /// Removes an agent, stopping its schedule and upload watcher.
    pub fn remove(&self, agent_id: &str) -> Option<AgentRecord> {
        let (_, mut entry) = self.agents.remove(agent_id)?;
        entry.stop();
        log::info!("[{}] Agent removed", agent_id);
        Some(entry.record)
    }

    /// Stops and drops every agent; returns how many there were.
    pub fn shutdown(&self) -> usize {
        let ids: Vec<String> = self.agents.iter().map(|entry| entry.key().clone()).collect();
        let removed = ids.iter().filter(|id| self.remove(id).is_some()).count();
        log::info!("Agent store shut down, {} agents stopped", removed);
        removed
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn entry_mut(
        &self,
        agent_id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, String, AgentEntry>, StoreError> {
        self.agents
            .get_mut(agent_id)
            .ok_or_else(|| StoreError::NotFound(agent_id.to_string()))
    }
}
