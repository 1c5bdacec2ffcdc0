use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::{poll_fn, ready};
use std::pin::Pin;
use std::task::{self, Poll};

use serde_json::json;
use trip_planner_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};

#[derive(Debug)]
struct EchoError(ErrorKind);

impl Display for EchoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "echo model failed: {}", self.0)
    }
}

impl Error for EchoError {}

impl ModelProviderError for EchoError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Replies with the last user message word by word. A message mentioning
/// "weather" makes it ask for the forecast tool instead.
struct EchoResponse {
    events: VecDeque<ModelResponseEvent>,
}

impl ModelResponse for EchoResponse {
    type Error = EchoError;

    fn poll_next_event(
        mut self: Pin<&mut Self>,
        _cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        Poll::Ready(Ok(self.events.pop_front()))
    }
}

struct EchoProvider;

impl ModelProvider for EchoProvider {
    type Error = EchoError;
    type Response = EchoResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let last_user = req.messages.iter().rev().find_map(|msg| match msg {
            ModelMessage::User(text) => Some(text.clone()),
            _ => None,
        });
        let result = match last_user {
            None => Err(EchoError(ErrorKind::RateLimitExceeded)),
            Some(text) if text.contains("weather") => {
                let events = VecDeque::from([
                    ModelResponseEvent::ToolCall(ToolCallRequest {
                        id: "call_0".to_owned(),
                        name: "get_weather_forecast".to_owned(),
                        arguments: json!({ "city": "Paris" }),
                    }),
                    ModelResponseEvent::Completed(ModelFinishReason::ToolCalls),
                ]);
                Ok(EchoResponse { events })
            }
            Some(text) => {
                let mut events: VecDeque<_> = text
                    .split_inclusive(' ')
                    .map(|word| ModelResponseEvent::MessageDelta(word.to_owned()))
                    .collect();
                events.push_back(ModelResponseEvent::Completed(
                    ModelFinishReason::Stop,
                ));
                Ok(EchoResponse { events })
            }
        };
        ready(result)
    }
}

async fn drain(
    mut resp: EchoResponse,
) -> (String, Vec<ToolCallRequest>, Option<ModelFinishReason>) {
    let mut text = String::new();
    let mut calls = vec![];
    let mut finish = None;
    while let Some(event) =
        poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx))
            .await
            .unwrap()
    {
        match event {
            ModelResponseEvent::MessageDelta(delta) => text.push_str(&delta),
            ModelResponseEvent::ToolCall(call) => calls.push(call),
            ModelResponseEvent::Completed(reason) => finish = Some(reason),
        }
    }
    (text, calls, finish)
}

#[tokio::test]
async fn test_text_reply() {
    let req = ModelRequest {
        system: Some("You are a travel planner.".to_owned()),
        messages: vec![ModelMessage::User("Three days in Lisbon".to_owned())],
        tools: vec![],
    };
    let resp = EchoProvider.send_request(&req).await.unwrap();
    let (text, calls, finish) = drain(resp).await;

    assert_eq!(text, "Three days in Lisbon");
    assert!(calls.is_empty());
    assert_eq!(finish, Some(ModelFinishReason::Stop));
}

#[tokio::test]
async fn test_tool_call_reply() {
    let req = ModelRequest {
        messages: vec![ModelMessage::User("weather in Paris?".to_owned())],
        ..Default::default()
    };
    let resp = EchoProvider.send_request(&req).await.unwrap();
    let (text, calls, finish) = drain(resp).await;

    assert!(text.is_empty());
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arguments["city"], "Paris");
    assert_eq!(finish, Some(ModelFinishReason::ToolCalls));
}

#[tokio::test]
async fn test_error_kind() {
    let result = EchoProvider.send_request(&ModelRequest::default()).await;
    let err = result.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    assert!(err.kind().is_transient());
    assert!(!ErrorKind::Moderated.is_transient());
}
