//! Core logic of the trip planner: the model/tool loop, tool execution,
//! and the throttling and retry policy around model calls.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod error;
mod model_client;
mod retry;
mod throttle;
pub mod tool;

pub use agent::{Agent, AgentBuilder, Reply, ReplyKind};
pub use error::AgentError;
pub use retry::RetryPolicy;
