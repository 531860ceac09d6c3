//! Echo completion service - echoes the user message or answers with a fixed reply.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use assist_core::{
    async_trait, CompletionChoice, CompletionRequest, CompletionResponse, CompletionService,
    PipelineError, Role,
};

#[derive(Debug, Clone)]
enum Reply {
    Echo,
    Fixed(String),
    Fail(PipelineError),
    NoContent,
}

/// A completion service that never leaves the process.
///
/// Records every request it receives so tests can inspect the model and
/// messages the pipeline produced.
#[derive(Debug)]
pub struct EchoCompletion {
    reply: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl Default for EchoCompletion {
    fn default() -> Self {
        Self::from_reply(Reply::Echo)
    }
}

impl EchoCompletion {
    /// Create a service that echoes the last user message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service that always answers with `reply`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_services::EchoCompletion;
    ///
    /// let service = EchoCompletion::with_reply("<translated text>");
    /// assert_eq!(service.call_count(), 0);
    /// ```
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self::from_reply(Reply::Fixed(reply.into()))
    }

    /// Create a service whose every call fails with `error`.
    pub fn failing(error: PipelineError) -> Self {
        Self::from_reply(Reply::Fail(error))
    }

    /// Create a service that answers with a choice carrying no content.
    pub fn without_content() -> Self {
        Self::from_reply(Reply::NoContent)
    }

    fn from_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of completion calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All requests received, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests().pop()
    }
}

#[async_trait]
impl CompletionService for EchoCompletion {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match &self.reply {
            Reply::Echo => {
                let text = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(CompletionResponse::single(request.model, text))
            }
            Reply::Fixed(text) => Ok(CompletionResponse::single(request.model, text.clone())),
            Reply::Fail(error) => Err(error.clone()),
            Reply::NoContent => Ok(CompletionResponse {
                model: request.model,
                choices: vec![CompletionChoice::default()],
                usage: None,
            }),
        }
    }

    fn name(&self) -> &str {
        "EchoCompletion"
    }
}
