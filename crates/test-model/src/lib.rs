//! A scripted fake model for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use trip_planner_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent, ModelTurn, OpaqueMessage,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "test model: {} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Clone, Debug)]
enum ScriptStep {
    UserInput,
    ToolResult,
    ModelResponse(PresetResponse),
}

#[derive(Default)]
struct Counters {
    requests: u64,
    attempts_per_step: HashMap<usize, u64>,
}

/// A local fake model for testing purpose.
///
/// The script describes the whole conversation, one step per history
/// message. A request with `n` history messages is answered by step `n`,
/// which must be a model response step. If the script has no such step,
/// the request fails with [`ErrorKind::Other`].
///
/// Clones share their request counters, so a test can keep a clone
/// around and inspect it after handing the provider to an agent.
///
/// # Note
///
/// This type copies the whole request for every response. You should
/// only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<ScriptStep>,
    delay: Option<Duration>,
    counters: Arc<Mutex<Counters>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_user_input_step(&mut self) {
        self.script.push(ScriptStep::UserInput);
    }

    #[inline]
    pub fn add_tool_result_step(&mut self) {
        self.script.push(ScriptStep::ToolResult);
    }

    #[inline]
    pub fn add_model_response_step(&mut self, preset: PresetResponse) {
        self.script.push(ScriptStep::ModelResponse(preset));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns how many requests this provider (and its clones) received.
    pub fn request_count(&self) -> u64 {
        self.counters.lock().map(|c| c.requests).unwrap_or_default()
    }

    fn preset_for(&self, step_idx: usize) -> Result<&PresetResponse, Error> {
        match self.script.get(step_idx) {
            Some(ScriptStep::ModelResponse(preset)) => Ok(preset),
            Some(step) => Err(Error::new(
                format!("step {step_idx} is {step:?}, not a model response"),
                ErrorKind::Other,
            )),
            None => Err(Error::new(
                format!("no step {step_idx} in the script"),
                ErrorKind::Other,
            )),
        }
    }

    /// Counts a request for `step_idx` and decides whether it is one of the
    /// scripted failures.
    fn record_attempt(&self, step_idx: usize) -> Result<&PresetResponse, Error> {
        let attempts = match self.counters.lock() {
            Ok(mut counters) => {
                counters.requests += 1;
                let attempts =
                    counters.attempts_per_step.entry(step_idx).or_default();
                *attempts += 1;
                *attempts
            }
            Err(_) => 1,
        };
        let preset = self.preset_for(step_idx)?;
        let failing = match preset.failures {
            Some(0) => true,
            Some(failures) => attempts <= failures,
            None => false,
        };
        if failing {
            return Err(Error::new(
                format!("scripted failure at step {step_idx}"),
                ErrorKind::RateLimitExceeded,
            ));
        }
        Ok(preset)
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let step_idx = req.messages.len();
        let result = self.record_attempt(step_idx).map(|preset| {
            TestModelResponse {
                preset: preset.clone(),
                step_idx,
                delay: self.delay.unwrap_or(Duration::from_millis(1)),
                event_idx: 0,
                sleep: None,
            }
        });
        ready(result)
    }
}

pub struct TestModelResponse {
    preset: PresetResponse,
    step_idx: usize,
    delay: Duration,
    event_idx: usize,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.get_mut();
        let events = &this.preset.events;
        if this.event_idx > events.len() {
            return Poll::Ready(Ok(None));
        }

        let timer = this
            .sleep
            .get_or_insert_with(|| Box::pin(sleep(this.delay)));
        ready!(timer.as_mut().poll(cx));
        this.sleep = None;

        let event = match events.get(this.event_idx) {
            Some(PresetEvent::MessageDelta(text)) => {
                ModelResponseEvent::MessageDelta(text.clone())
            }
            Some(PresetEvent::ToolCall(call)) => {
                ModelResponseEvent::ToolCall(call.clone())
            }
            None => ModelResponseEvent::Completed(if this.preset.has_tool_call() {
                ModelFinishReason::ToolCalls
            } else {
                ModelFinishReason::Stop
            }),
        };
        this.event_idx += 1;
        Poll::Ready(Ok(Some(event)))
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        let mut turn = ModelTurn::default();
        for event in &self.preset.events {
            match event {
                PresetEvent::MessageDelta(text) => turn.text.push_str(text),
                PresetEvent::ToolCall(call) => turn.tool_calls.push(call.clone()),
            }
        }
        Some(OpaqueMessage::new(format!("msg:{}", self.step_idx), turn))
    }
}
