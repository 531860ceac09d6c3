//! Binds fired triggers to pipeline actions.

use std::collections::HashMap;
use std::sync::Arc;

use assist_core::{Action, ActionKind};
use async_trait::async_trait;
use tracing::{error, info};
use trigger_detector::{DoubleActionSignal, SignalHandler};

use crate::orchestrator::Orchestrator;
use crate::sink::{ResultSink, TriggerOutcome};

/// Default kind → action bindings: copy translates, select explains.
pub fn default_bindings() -> HashMap<ActionKind, Action> {
    HashMap::from([
        (ActionKind::Copy, Action::Translate),
        (ActionKind::Select, Action::Explain),
    ])
}

/// Runs the pipeline for each fired trigger and delivers the result.
pub struct TriggerDispatcher<S: ResultSink> {
    orchestrator: Arc<Orchestrator>,
    bindings: HashMap<ActionKind, Action>,
    sink: S,
}

impl<S: ResultSink> TriggerDispatcher<S> {
    /// Create a dispatcher with the default bindings.
    pub fn new(orchestrator: Arc<Orchestrator>, sink: S) -> Self {
        Self {
            orchestrator,
            bindings: default_bindings(),
            sink,
        }
    }

    /// Bind a trigger kind to an action, replacing any existing binding.
    pub fn bind(mut self, kind: ActionKind, action: Action) -> Self {
        self.bindings.insert(kind, action);
        self
    }

    /// Remove the binding for a kind.
    pub fn unbind(mut self, kind: &ActionKind) -> Self {
        self.bindings.remove(kind);
        self
    }

    /// The action bound to a kind, if any.
    pub fn action_for(&self, kind: &ActionKind) -> Option<Action> {
        self.bindings.get(kind).copied()
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[async_trait]
impl<S: ResultSink + 'static> SignalHandler for TriggerDispatcher<S> {
    async fn handle(&self, signal: DoubleActionSignal) {
        let Some(action) = self.action_for(&signal.kind) else {
            info!("No action bound to double {}, ignoring", signal.kind);
            return;
        };

        let result = self
            .orchestrator
            .execute(signal.content, action, None)
            .await;

        let outcome = TriggerOutcome {
            kind: signal.kind,
            action,
            fingerprint: signal.fingerprint,
            result,
        };

        if let Err(e) = self.sink.deliver(&outcome).await {
            error!("Failed to deliver result for double {}: {}", outcome.kind, e);
        }
    }

    fn name(&self) -> &str {
        "TriggerDispatcher"
    }
}
