//! Result sink trait and implementations.

use std::io::Write;
use std::sync::Mutex;

use assist_core::{Action, ActionKind, Fingerprint, PipelineResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// One finished trigger: what fired, what ran, and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutcome {
    pub kind: ActionKind,
    pub action: Action,
    pub fingerprint: Fingerprint,
    pub result: PipelineResult,
}

/// Receives pipeline results.
///
/// Abstracted to support different front ends (notifications, stdout,
/// tests, etc.)
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Deliver one outcome.
    async fn deliver(&self, outcome: &TriggerOutcome) -> Result<(), OrchestratorError>;
}

/// A no-op sink that discards all results.
#[derive(Debug, Clone, Default)]
pub struct NoOpSink;

#[async_trait]
impl ResultSink for NoOpSink {
    async fn deliver(&self, _outcome: &TriggerOutcome) -> Result<(), OrchestratorError> {
        Ok(())
    }
}

/// A logging sink for debugging.
///
/// Logs lengths and error messages, never the result text.
#[derive(Debug, Clone, Default)]
pub struct LoggingSink;

#[async_trait]
impl ResultSink for LoggingSink {
    async fn deliver(&self, outcome: &TriggerOutcome) -> Result<(), OrchestratorError> {
        match &outcome.result {
            PipelineResult::Success { text } => tracing::info!(
                "[{}] {} succeeded ({} chars)",
                outcome.kind,
                outcome.action,
                text.chars().count()
            ),
            failure => tracing::info!("[{}] {} failed: {}", outcome.kind, outcome.action, failure),
        }
        Ok(())
    }
}

/// Keeps every delivered outcome in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    outcomes: Mutex<Vec<TriggerOutcome>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes delivered so far, in delivery order.
    pub fn outcomes(&self) -> Vec<TriggerOutcome> {
        self.outcomes
            .lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResultSink for CollectingSink {
    async fn deliver(&self, outcome: &TriggerOutcome) -> Result<(), OrchestratorError> {
        self.outcomes
            .lock()
            .map_err(|_| OrchestratorError::DeliveryFailed("sink state poisoned".to_string()))?
            .push(outcome.clone());
        Ok(())
    }
}

/// Writes each outcome as one line of JSON.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    async fn deliver(&self, outcome: &TriggerOutcome) -> Result<(), OrchestratorError> {
        let line = serde_json::to_string(outcome)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| OrchestratorError::DeliveryFailed("writer poisoned".to_string()))?;
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| OrchestratorError::DeliveryFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_core::PipelineError;

    fn outcome(result: PipelineResult) -> TriggerOutcome {
        TriggerOutcome {
            kind: ActionKind::Copy,
            action: Action::Translate,
            fingerprint: Fingerprint::new("abc"),
            result,
        }
    }

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpSink;

        // Should not error
        sink.deliver(&outcome(PipelineResult::success("x"))).await.unwrap();
    }

    #[tokio::test]
    async fn test_logging_sink() {
        let sink = LoggingSink;

        // Should not error
        sink.deliver(&outcome(PipelineResult::success("x"))).await.unwrap();
        sink.deliver(&outcome(
            PipelineError::ApiCallFailed("timeout".into()).into(),
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.deliver(&outcome(PipelineResult::success("one"))).await.unwrap();
        sink.deliver(&outcome(PipelineResult::success("two"))).await.unwrap();

        let outcomes = sink.outcomes();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].result, PipelineResult::success("two"));
    }

    #[tokio::test]
    async fn test_json_lines_sink() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.deliver(&outcome(PipelineResult::success("Bonjour")))
            .await
            .unwrap();
        sink.deliver(&outcome(
            PipelineError::FileNotFound("/tmp/missing.txt".into()).into(),
        ))
        .await
        .unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "copy");
        assert_eq!(lines[0]["action"], "translate");
        assert_eq!(lines[0]["result"]["status"], "success");
        assert_eq!(lines[0]["result"]["text"], "Bonjour");
        assert_eq!(lines[1]["result"]["kind"], "file_not_found");
    }
}
