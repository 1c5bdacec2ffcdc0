mod builder;
mod state;

use trip_planner_model::{ModelMessage, ModelRequest, ToolCallResult};

use crate::conversation::Conversation;
use crate::error::{AgentError, CallError};
use crate::model_client::ModelClient;
use crate::retry::{RetryPolicy, call_with_retry};
use crate::throttle::Throttle;
use crate::tool::Executor as ToolExecutor;
pub use builder::AgentBuilder;
use state::{Node, Transition, route};

/// The message returned when the model stays rate limited after all
/// retries.
const QUOTA_EXHAUSTED_MESSAGE: &str = "Sorry, the model's request quota \
    is exhausted right now. Please wait a minute and try again.";

/// The message returned when the model ends its turn without any text.
const NO_ANSWER_MESSAGE: &str = "The model finished without writing an \
    answer. Try asking again or rephrasing the question.";

/// The tool result recorded for calls cut off by the step limit.
const STEP_LIMIT_TOOL_RESULT: &str = "Error: step limit reached";

/// An agent that answers queries by alternating between the model and
/// its tools.
///
/// The agent keeps one conversation for its whole lifetime, so later
/// queries see the earlier ones. Queries are handled one at a time.
pub struct Agent {
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    system_prompt: Option<String>,
    conversation: Conversation,
    throttle: Throttle,
    retry_policy: RetryPolicy,
    max_steps: usize,
    quota_message: String,
}

/// How an agent run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplyKind {
    /// The model produced a final answer.
    Answer,
    /// The model stayed rate limited; the text is a notice for the user.
    QuotaExhausted,
    /// The model ended its turn without text; the text is a notice for
    /// the user.
    NoAnswer,
}

/// The outcome of [`Agent::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// Text to show to the user.
    pub text: String,
    /// Whether `text` came from the model.
    pub kind: ReplyKind,
}

impl Reply {
    fn answer(text: String) -> Self {
        Self {
            text,
            kind: ReplyKind::Answer,
        }
    }

    fn quota_exhausted(text: String) -> Self {
        Self {
            text,
            kind: ReplyKind::QuotaExhausted,
        }
    }

    fn no_answer() -> Self {
        Self {
            text: NO_ANSWER_MESSAGE.to_owned(),
            kind: ReplyKind::NoAnswer,
        }
    }
}

impl Agent {
    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Answers `query`, calling tools as often as the model asks for them.
    ///
    /// The query and everything produced while answering it are appended
    /// to the conversation, including the partial progress of a failed run.
    pub async fn run(
        &mut self,
        query: impl Into<String>,
    ) -> Result<Reply, AgentError> {
        let query = query.into();
        info!("new query ({} chars)", query.len());
        self.conversation.push_user(query);

        let mut node = Node::Model;
        for step in 1..=self.max_steps {
            debug!("step {step}: {node:?}");
            let transition = match node {
                Node::Model => match self.call_model().await {
                    Ok(transition) => transition,
                    Err(CallError::QuotaExhausted {
                        attempts,
                        last_error,
                    }) => {
                        error!(
                            "giving up after {attempts} attempts: {last_error}"
                        );
                        return Ok(Reply::quota_exhausted(
                            self.quota_message.clone(),
                        ));
                    }
                    Err(CallError::Provider(err)) => {
                        return Err(AgentError::Model(err));
                    }
                },
                Node::Tools => self.run_tools().await,
            };

            match transition {
                Transition::Goto(next) => node = next,
                Transition::End(text) if text.trim().is_empty() => {
                    warn!("model finished without any text");
                    return Ok(Reply::no_answer());
                }
                Transition::End(text) => return Ok(Reply::answer(text)),
            }
        }

        warn!("step limit of {} reached", self.max_steps);
        if node == Node::Tools {
            self.skip_tools();
        }
        Err(AgentError::StepLimitExceeded {
            limit: self.max_steps,
        })
    }

    async fn call_model(&mut self) -> Result<Transition, CallError> {
        let request = self.build_model_request();
        let resp = call_with_retry(
            &self.model_client,
            &request,
            &mut self.throttle,
            &self.retry_policy,
        )
        .await?;
        debug!(
            "model turn finished ({:?}) with {} tool calls",
            resp.finish_reason,
            resp.tool_calls.len()
        );

        let (turn, opaque_msg) = resp.into_turn();
        self.conversation
            .push_model(turn, opaque_msg.map(ModelMessage::Opaque));
        Ok(route(&self.conversation))
    }

    async fn run_tools(&mut self) -> Transition {
        let calls = self
            .conversation
            .last()
            .map(|item| item.tool_calls().to_vec())
            .unwrap_or_default();
        for call in &calls {
            let result = self.tool_executor.execute(call).await;
            self.conversation.push_tool_result(result);
        }
        Transition::Goto(Node::Model)
    }

    /// Answers every pending tool call with an error, so the next request
    /// never carries a call without a response.
    fn skip_tools(&mut self) {
        let calls = self
            .conversation
            .last()
            .map(|item| item.tool_calls().to_vec())
            .unwrap_or_default();
        for call in calls {
            self.conversation.push_tool_result(ToolCallResult {
                id: call.id,
                name: call.name,
                content: STEP_LIMIT_TOOL_RESULT.to_owned(),
            });
        }
    }

    fn build_model_request(&self) -> ModelRequest {
        ModelRequest {
            system: self.system_prompt.clone(),
            messages: self.conversation.messages(),
            tools: self.tool_executor.definitions(),
        }
    }
}
