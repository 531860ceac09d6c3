//! Delayed completion service - wraps another service with artificial delay.

use std::time::Duration;

use assist_core::{
    async_trait, CompletionRequest, CompletionResponse, CompletionService, PipelineError,
};
use tokio::time::sleep;

/// A completion service that sleeps before delegating.
///
/// Useful for keeping a pipeline in flight while more trigger events arrive.
pub struct DelayedCompletion<S: CompletionService> {
    inner: S,
    delay: Duration,
}

impl<S: CompletionService> DelayedCompletion<S> {
    /// Wrap `inner` with the given delay.
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Wrap `inner` with a delay in milliseconds.
    pub fn with_millis(inner: S, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// The wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CompletionService> CompletionService for DelayedCompletion<S> {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, PipelineError> {
        sleep(self.delay).await;
        self.inner.complete(request).await
    }

    fn name(&self) -> &str {
        "DelayedCompletion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EchoCompletion;
    use assist_core::ChatMessage;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_completion() {
        let service = DelayedCompletion::with_millis(EchoCompletion::new(), 100);
        let request = CompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::user("test")],
            temperature: 0.3,
            max_tokens: None,
        };

        let start = Instant::now();
        let response = service.complete(request).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(response.first_text(), Some("test"));
        assert!(elapsed >= Duration::from_millis(100));
        assert_eq!(service.inner().call_count(), 1);
    }

    #[test]
    fn test_service_name() {
        let service = DelayedCompletion::with_millis(EchoCompletion::new(), 0);
        assert_eq!(service.name(), "DelayedCompletion");
    }
}
