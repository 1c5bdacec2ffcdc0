//! A model provider for the Google Gemini API.
//!
//! Requests go to `streamGenerateContent` and the reply is consumed as
//! server-sent events, so text reaches the agent as soon as it is
//! generated. Quota errors (HTTP 429 / `RESOURCE_EXHAUSTED`) are reported
//! as [`ErrorKind::RateLimitExceeded`] so the agent can back off.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};
use trip_planner_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};

pub use config::{GeminiConfig, GeminiConfigBuilder};
use io::{Chunks, Sse};
use proto::{ApiError, ApiErrorBody};
pub use response::GeminiResponse;

/// Error type for [`GeminiProvider`].
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

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Gemini model provider.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: Client,
    config: Arc<GeminiConfig>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider` with the given configuration.
    #[inline]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ModelProvider for GeminiProvider {
    type Error = Error;
    type Response = GeminiResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let gemini_req = proto::create_request(req, &self.config);
        let resp_fut = self
            .client
            .post(self.config.stream_url())
            .header("x-goog-api-key", &self.config.api_key)
            .header(header::ACCEPT, "text/event-stream")
            .json(&gemini_req)
            .send();

        async move {
            let resp = resp_fut.await.map_err(|err| {
                Error::new(format!("request failed: {err}"), ErrorKind::Other)
            })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(error_from_response(resp).await);
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse::<Mime>().ok())
                .map(|m| m.essence_str() == mime::TEXT_EVENT_STREAM.essence_str())
                .unwrap_or(false);
            if !is_event_stream {
                return Err(Error::new(
                    format!("unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            let sse = Sse::new(Chunks::from_response(resp));
            Ok(GeminiResponse::from_sse(sse))
        }
    }
}

async fn error_from_response(resp: Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let api_error = serde_json::from_str::<ApiErrorBody>(&body).ok();
    debug!("gemini returned {status}: {body}");
    classify_error(status, api_error)
}

/// Classifies an error reported in the body of a stream that has already
/// started, using the HTTP code it carries.
fn classify_stream_error(error: ApiError) -> Error {
    let status = StatusCode::from_u16(error.code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    classify_error(status, Some(ApiErrorBody { error }))
}

fn classify_error(status: StatusCode, body: Option<ApiErrorBody>) -> Error {
    let (api_status, message) = match body {
        Some(ApiErrorBody { error }) => (error.status, error.message),
        None => (String::new(), String::new()),
    };
    let kind = if status == StatusCode::TOO_MANY_REQUESTS
        || api_status == "RESOURCE_EXHAUSTED"
    {
        ErrorKind::RateLimitExceeded
    } else {
        ErrorKind::Other
    };
    let message = match (api_status.is_empty(), message.is_empty()) {
        (_, true) => format!("gemini returned {status}"),
        (true, false) => format!("gemini returned {status}: {message}"),
        (false, false) => {
            format!("gemini returned {status} ({api_status}): {message}")
        }
    };
    Error::new(message, kind)
}
