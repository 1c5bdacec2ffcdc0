use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use trip_planner_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    OpaqueMessage, ToolCallRequest,
};

use crate::io::Sse;
use crate::proto::{Content, GenerateContentResponse, Part};
use crate::{Error, classify_stream_error};

/// Finish reasons that mean the candidate was withheld by safety filters.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "IMAGE_SAFETY",
];

struct PartialState {
    sse: Sse,
    response_id: Option<String>,
    parts: Vec<Part>,
    tool_call_count: usize,
    // Events decoded from the last chunk but not yet handed out. One chunk
    // may carry several parts.
    pending_events: VecDeque<ModelResponseEvent>,
    completed: bool,
}

impl PartialState {
    #[inline]
    fn finish(self) -> (String, Content) {
        let id = self.response_id.unwrap_or_else(|| "gemini".to_owned());
        let content = Content {
            role: Some("model".to_owned()),
            parts: self.parts,
        };
        (id, content)
    }

    fn absorb_chunk(&mut self, chunk: GenerateContentResponse) -> Result<(), Error> {
        if let Some(error) = chunk.error {
            return Err(classify_stream_error(error));
        }
        if let Some(reason) = chunk
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(Error::new(
                format!("prompt blocked: {reason}"),
                ErrorKind::Moderated,
            ));
        }
        if self.response_id.is_none() {
            self.response_id = chunk.response_id;
        }

        // Only one candidate is ever requested.
        let Some(candidate) = chunk.candidates.into_iter().next() else {
            return Ok(());
        };

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(call) = &part.function_call {
                let id = call.id.clone().unwrap_or_else(|| {
                    format!("call_{}", self.tool_call_count)
                });
                self.tool_call_count += 1;
                self.pending_events.push_back(ModelResponseEvent::ToolCall(
                    ToolCallRequest {
                        id,
                        name: call.name.clone(),
                        arguments: call.args.clone(),
                    },
                ));
            } else if let Some(text) = &part.text {
                if part.thought != Some(true) && !text.is_empty() {
                    self.pending_events
                        .push_back(ModelResponseEvent::MessageDelta(text.clone()));
                }
            }
            self.parts.push(part);
        }

        match candidate.finish_reason.as_deref() {
            Some(reason) if BLOCKED_FINISH_REASONS.contains(&reason) => {
                Err(Error::new(
                    format!("response blocked: {reason}"),
                    ErrorKind::Moderated,
                ))
            }
            Some("MALFORMED_FUNCTION_CALL") => Err(Error::new(
                "model produced a malformed function call",
                ErrorKind::Other,
            )),
            _ => Ok(()),
        }
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    /// A streaming reply to `streamGenerateContent`.
    pub struct GeminiResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
        full_msg: Option<(String, Content)>,
    }
}

impl GeminiResponse {
    pub(crate) fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            response_id: None,
            parts: Vec::new(),
            tool_call_count: 0,
            pending_events: VecDeque::new(),
            completed: false,
        };
        Self {
            next_event_fut: Some(Box::pin(next_event(partial_state))),
            full_msg: None,
        }
    }
}

impl ModelResponse for GeminiResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, partial_state)) => {
                    *this.next_event_fut = None;
                    *this.full_msg = Some(partial_state.finish());
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        *this.next_event_fut = Some(Box::pin(next_event(partial_state)));
        Poll::Ready(Ok(Some(event)))
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        self.full_msg
            .as_ref()
            .map(|(id, content)| OpaqueMessage::new(id, content.clone()))
    }
}

async fn next_event(mut partial_state: PartialState) -> NextEvent {
    loop {
        if let Some(event) = partial_state.pending_events.pop_front() {
            return Ok((Some(event), partial_state));
        }
        if partial_state.completed {
            return Ok((None, partial_state));
        }

        let data = match partial_state.sse.next_event().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                // Gemini reports `STOP` even when it asks for tools, so the
                // finish reason is derived from what was streamed.
                let reason = if partial_state.tool_call_count > 0 {
                    ModelFinishReason::ToolCalls
                } else {
                    ModelFinishReason::Stop
                };
                partial_state.completed = true;
                partial_state
                    .pending_events
                    .push_back(ModelResponseEvent::Completed(reason));
                continue;
            }
            Err(err) => {
                return Err(Error::new(format!("{err:?}"), ErrorKind::Other));
            }
        };
        trace!("got sse event: {data}");

        let chunk = serde_json::from_str::<GenerateContentResponse>(&data)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        partial_state.absorb_chunk(chunk)?;
    }
}
