//! Periodic re-runs of a stored prompt.

use std::sync::Arc;
use std::time::Duration;

use dispatch_core::Dispatcher;
use thiserror::Error;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::store::AgentStore;

#[derive(Debug, Error, PartialEq)]
pub enum IntervalError {
    #[error("Interval must be a number of minutes, got '{0}'")]
    NotANumber(String),

    #[error("Interval must be a positive number of minutes, got {0}")]
    OutOfRange(f64),
}

/// Converts a minute count into the tick period.
pub fn interval_from_minutes(minutes: f64) -> Result<Duration, IntervalError> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(IntervalError::OutOfRange(minutes));
    }
    Duration::try_from_secs_f64(minutes * 60.0).map_err(|_| IntervalError::OutOfRange(minutes))
}

/// Like [`interval_from_minutes`] for values that arrived as text.
pub fn parse_interval(text: &str) -> Result<(f64, Duration), IntervalError> {
    let minutes: f64 = text
        .trim()
        .parse()
        .map_err(|_| IntervalError::NotANumber(text.to_string()))?;
    Ok((minutes, interval_from_minutes(minutes)?))
}

/// Re-dispatches the agent's prompt every `every` until the returned token is
/// cancelled or the agent is removed from `store`.
///
/// The first run happens one full period after the call; the agent has
/// already run once at creation.
pub fn spawn_schedule(
    agent_id: String,
    every: Duration,
    dispatcher: Arc<Dispatcher>,
    store: Arc<AgentStore>,
) -> CancellationToken {
    let token = CancellationToken::new();
    let cancelled = token.clone();

    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log::info!("[{}] Scheduled every {:?}", agent_id, every);

        loop {
            tokio::select! {
                _ = cancelled.cancelled() => {
                    log::info!("[{}] Schedule stopped", agent_id);
                    break;
                }
                _ = ticker.tick() => {
                    let Some(record) = store.get(&agent_id) else {
                        log::warn!("[{}] Agent gone, stopping schedule", agent_id);
                        break;
                    };

                    log::info!("[{}] Scheduled run: {}", agent_id, record.prompt);
                    let output = dispatcher
                        .execute(record.intent, &record.prompt)
                        .await
                        .into_text();
                    log::info!("[{}] Scheduled run output: {}", agent_id, output);

                    if let Err(e) = store.record_run(&agent_id, &output) {
                        log::warn!("[{}] Could not record scheduled run: {}", agent_id, e);
                        break;
                    }
                }
            }
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::document_dispatcher;
    use dispatch_core::Intent;

    #[test]
    fn interval_validation() {
        assert_eq!(interval_from_minutes(2.0).unwrap(), Duration::from_secs(120));
        assert_eq!(interval_from_minutes(0.5).unwrap(), Duration::from_secs(30));
        assert!(interval_from_minutes(0.0).is_err());
        assert!(interval_from_minutes(-3.0).is_err());
        assert!(interval_from_minutes(f64::NAN).is_err());
        assert!(interval_from_minutes(f64::INFINITY).is_err());
    }

    #[test]
    fn interval_from_text() {
        assert_eq!(parse_interval(" 5 ").unwrap(), (5.0, Duration::from_secs(300)));
        assert_eq!(
            parse_interval("soon"),
            Err(IntervalError::NotANumber("soon".to_string()))
        );
        assert!(matches!(parse_interval("-1"), Err(IntervalError::OutOfRange(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_each_period_until_cancelled() {
        let (dispatcher, calls) = document_dispatcher("summary");
        let store = Arc::new(AgentStore::new());
        let id = store
            .create("Summarize the PDF at a.pdf", Intent::SummarizeDocument, Some(1.0))
            .agent_id;

        let token = spawn_schedule(
            id.clone(),
            Duration::from_secs(60),
            Arc::new(dispatcher),
            store.clone(),
        );

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.get(&id).unwrap().runs, 0);

        time::sleep(Duration::from_secs(100)).await;
        let record = store.get(&id).unwrap();
        assert_eq!(record.runs, 2);
        assert_eq!(record.last_output.as_deref(), Some("summary"));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);

        token.cancel();
        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(store.get(&id).unwrap().runs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_run_uses_stored_intent() {
        let (dispatcher, calls) = document_dispatcher("summary");
        let store = Arc::new(AgentStore::new());
        // The text alone would classify as unrecognized.
        let id = store
            .create("weekly report.pdf", Intent::SummarizeDocument, Some(1.0))
            .agent_id;

        let token = spawn_schedule(
            id.clone(),
            Duration::from_secs(60),
            Arc::new(dispatcher),
            store.clone(),
        );

        time::sleep(Duration::from_secs(90)).await;
        token.cancel();

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(store.get(&id).unwrap().last_output.as_deref(), Some("summary"));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_agent_removed() {
        let (dispatcher, calls) = document_dispatcher("summary");
        let store = Arc::new(AgentStore::new());
        let id = store
            .create("Summarize the PDF at a.pdf", Intent::SummarizeDocument, Some(1.0))
            .agent_id;

        let token = spawn_schedule(
            id.clone(),
            Duration::from_secs(60),
            Arc::new(dispatcher),
            store.clone(),
        );
        // Removal without attaching the token: the task must notice on its own.
        store.remove(&id);

        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!token.is_cancelled());
    }
}
