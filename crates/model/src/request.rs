use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::OpaqueMessage;
use crate::response::ToolCallRequest;

/// A request to be sent to the model provider.
///
/// Every request carries the full history; providers keep no session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelRequest {
    /// System instructions, sent separately from the history.
    pub system: Option<String>,
    /// The conversation so far, oldest first.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
}

/// A complete message in the conversation history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelMessage {
    /// A user query.
    User(String),
    /// A turn produced by the model.
    Model(ModelTurn),
    /// The result of one tool call.
    ToolResult(ToolCallResult),
    /// A provider-native model turn, see [`OpaqueMessage`].
    Opaque(OpaqueMessage),
}

/// A provider-independent model turn: the text it wrote and the tools it
/// asked for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelTurn {
    /// Text written by the model. May be empty for pure tool-call turns.
    pub text: String,
    /// Tool calls requested in this turn.
    pub tool_calls: Vec<ToolCallRequest>,
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Id of the [`ToolCallRequest`] this result answers.
    pub id: String,
    /// Name of the tool that was called. Some providers match results by
    /// name rather than by id.
    pub name: String,
    /// Output of the tool, or a description of why it failed.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool, as a
    /// [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}
