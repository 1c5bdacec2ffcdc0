//! The protocol spoken between the trip planner agent and LLM backends.
//!
//! Backends (Gemini, the scripted test model, ...) implement the traits in
//! this crate, so the agent loop never depends on a concrete wire format.
//! Types here carry data only; retrying, throttling and tool execution
//! live in `trip-planner-core`.

#![deny(missing_docs)]

mod error;
mod opaque;
mod provider;
mod request;
mod response;

pub use error::*;
pub use opaque::*;
pub use provider::*;
pub use request::*;
pub use response::*;
