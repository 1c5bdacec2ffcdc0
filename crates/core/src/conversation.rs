//! Conversation-related types.
//!
//! A conversation is an append-only log: messages are only ever pushed at
//! the end, never edited, removed or reordered.

use std::fmt::{self, Display};
use std::slice;

use trip_planner_model::{
    ModelMessage, ModelTurn, ToolCallRequest, ToolCallResult,
};

/// Who produced a conversation item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person asking for a plan.
    User,
    /// The language model.
    Model,
    /// A tool that the model asked for.
    ToolResult,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
            Role::ToolResult => write!(f, "tool"),
        }
    }
}

/// Represents a conversation.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    items: Vec<Item>,
}

impl Conversation {
    /// Returns the number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the most recent item.
    #[inline]
    pub fn last(&self) -> Option<&Item> {
        self.items.last()
    }

    /// Iterates over the items, oldest first.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub(crate) fn push_user(&mut self, text: String) {
        self.items.push(Item {
            role: Role::User,
            msg: ModelMessage::User(text.clone()),
            transcript: text,
            tool_calls: vec![],
        });
    }

    /// Appends a model turn. `native` is the provider's own copy of the
    /// turn, preferred over the generic one when replaying history.
    pub(crate) fn push_model(
        &mut self,
        turn: ModelTurn,
        native: Option<ModelMessage>,
    ) {
        let transcript = turn.text.clone();
        let tool_calls = turn.tool_calls.clone();
        self.items.push(Item {
            role: Role::Model,
            msg: native.unwrap_or(ModelMessage::Model(turn)),
            transcript,
            tool_calls,
        });
    }

    pub(crate) fn push_tool_result(&mut self, result: ToolCallResult) {
        self.items.push(Item {
            role: Role::ToolResult,
            transcript: result.content.clone(),
            msg: ModelMessage::ToolResult(result),
            tool_calls: vec![],
        });
    }

    pub(crate) fn messages(&self) -> Vec<ModelMessage> {
        self.items.iter().map(|item| item.msg.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Item;
    type IntoIter = slice::Iter<'a, Item>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An item in the conversation.
#[derive(Clone, Debug)]
pub struct Item {
    role: Role,
    msg: ModelMessage,
    transcript: String,
    tool_calls: Vec<ToolCallRequest>,
}

impl Item {
    /// Returns who produced this item.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the transcript of this item.
    ///
    /// The transcript is the text of the message: the query, the model's
    /// prose, or the tool output. It is not enough to reconstruct the
    /// message sent to the provider.
    #[inline]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Returns the tool calls requested by a model item.
    #[inline]
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        &self.tool_calls
    }

    /// Returns the message as it is sent to the provider.
    #[inline]
    pub fn message(&self) -> &ModelMessage {
        &self.msg
    }
}
