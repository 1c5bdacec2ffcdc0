use crate::conversation::{Conversation, Role};

/// A node of the agent loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    /// Ask the model for the next turn.
    Model,
    /// Run the tools requested by the last model turn.
    Tools,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Goto(Node),
    /// The run is over; carries the final answer.
    End(String),
}

/// Decides where to go after a model turn: to the tools if the model asked
/// for any, otherwise the turn's text is the answer.
pub fn route(conversation: &Conversation) -> Transition {
    match conversation.last() {
        Some(item) if item.role() == Role::Model => {
            if item.tool_calls().is_empty() {
                Transition::End(item.transcript().to_owned())
            } else {
                Transition::Goto(Node::Tools)
            }
        }
        _ => Transition::Goto(Node::Model),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use trip_planner_model::{ModelTurn, ToolCallRequest};

    use super::*;

    #[test]
    fn test_route() {
        let mut conversation = Conversation::default();
        conversation.push_user("Hotels in Tokyo?".to_owned());
        assert_eq!(route(&conversation), Transition::Goto(Node::Model));

        conversation.push_model(
            ModelTurn {
                text: String::new(),
                tool_calls: vec![ToolCallRequest {
                    id: "call_0".to_owned(),
                    name: "search_flights_hotels".to_owned(),
                    arguments: json!({}),
                }],
            },
            None,
        );
        assert_eq!(route(&conversation), Transition::Goto(Node::Tools));

        conversation.push_model(
            ModelTurn {
                text: "Try Park Hyatt.".to_owned(),
                tool_calls: vec![],
            },
            None,
        );
        assert_eq!(
            route(&conversation),
            Transition::End("Try Park Hyatt.".to_owned())
        );
    }
}
