use std::time::Duration;

use actix_web::{web, HttpResponse};
use dispatch_core::Intent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, ServerError};
use crate::scheduler::{interval_from_minutes, parse_interval, spawn_schedule};
use crate::state::AppState;
use crate::watcher::UploadWatcher;

#[derive(Debug, Deserialize)]
pub struct GenerateAgentRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub interval: Option<IntervalValue>,
}

/// Minutes, accepted either as a JSON number or as numeric text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IntervalValue {
    Minutes(f64),
    Text(String),
}

impl IntervalValue {
    fn resolve(&self) -> Result<(f64, Duration)> {
        let resolved = match self {
            IntervalValue::Minutes(minutes) => {
                interval_from_minutes(*minutes).map(|every| (*minutes, every))
            }
            IntervalValue::Text(text) => parse_interval(text),
        };
        resolved.map_err(|e| ServerError::BadRequest(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentOutput {
    pub agent_id: String,
    pub output: String,
}

/// `POST /generate_agent`: registers the prompt as an agent and runs it once.
pub async fn generate(
    state: web::Data<AppState>,
    body: web::Json<GenerateAgentRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    if request.prompt.trim().is_empty() {
        return Err(ServerError::BadRequest("Prompt is required".to_string()));
    }
    let interval = request.interval.as_ref().map(IntervalValue::resolve).transpose()?;

    let intent = state.dispatcher.classify(&request.prompt);
    let record = state
        .store
        .create(request.prompt.clone(), intent, interval.map(|(minutes, _)| minutes));
    let agent_id = record.agent_id;
    log::info!("[{}] Agent generated ({}): {}", agent_id, intent, request.prompt);

    let output = state.dispatcher.execute(intent, &request.prompt).await.into_text();
    log::info!("[{}] Initial run output: {}", agent_id, output);
    state.store.record_run(&agent_id, &output)?;

    if let Some((_, every)) = interval {
        let token = spawn_schedule(
            agent_id.clone(),
            every,
            state.dispatcher.clone(),
            state.store.clone(),
        );
        state.store.attach_schedule(&agent_id, token)?;
    }

    if intent == Intent::SummarizeDocument {
        match UploadWatcher::start(
            agent_id.clone(),
            &state.upload_dir,
            state.dispatcher.clone(),
            state.store.clone(),
            state.settle_delay,
        ) {
            Ok(watcher) => state.store.attach_watcher(&agent_id, watcher)?,
            Err(e) => log::error!("[{}] Failed to start upload monitoring: {}", agent_id, e),
        }
    }

    Ok(HttpResponse::Ok().json(AgentOutput { agent_id, output }))
}

/// `GET /run_agent/{agent_id}`: runs the stored prompt again.
pub async fn run(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let agent_id = path.into_inner();
    let record = state
        .store
        .get(&agent_id)
        .ok_or_else(|| ServerError::AgentNotFound(agent_id.clone()))?;

    log::info!("[{}] Manual run: {}", agent_id, record.prompt);
    let output = state.dispatcher.execute(record.intent, &record.prompt).await.into_text();
    state.store.record_run(&agent_id, &output)?;

    let output = match record.last_document_summary {
        Some(summary) => format!("{}\nLast PDF Summary: {}", output, summary),
        None => output,
    };

    Ok(HttpResponse::Ok().json(AgentOutput { agent_id, output }))
}

/// `GET /agents`
pub async fn list(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.store.list())
}

/// `DELETE /agents/{agent_id}`: stops the agent's schedule and watcher.
pub async fn delete(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let agent_id = path.into_inner();
    state
        .store
        .remove(&agent_id)
        .ok_or_else(|| ServerError::AgentNotFound(agent_id.clone()))?;

    Ok(HttpResponse::Ok().json(json!({ "agent_id": agent_id, "deleted": true })))
}
