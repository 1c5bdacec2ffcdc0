use std::time::Duration;

use trip_planner_model::ModelProvider;

use super::{Agent, QUOTA_EXHAUSTED_MESSAGE};
use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::retry::RetryPolicy;
use crate::throttle::Throttle;
use crate::tool::{AnyTool, Executor as ToolExecutor, Tool, ToolObject};

/// The default step limit. Every model call and every round of tool calls
/// counts as one step.
const DEFAULT_MAX_STEPS: usize = 25;

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    system_prompt: Option<String>,
    tools: Vec<Box<dyn ToolObject>>,
    min_call_interval: Duration,
    retry_policy: RetryPolicy,
    max_steps: usize,
    quota_message: Option<String>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: None,
            tools: vec![],
            min_call_interval: Duration::ZERO,
            retry_policy: RetryPolicy::default(),
            max_steps: DEFAULT_MAX_STEPS,
            quota_message: None,
        }
    }

    /// Sets the system prompt sent with every model request.
    #[inline]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(AnyTool(tool)));
        self
    }

    /// Sets the minimum time between two model calls. Defaults to zero.
    #[inline]
    pub fn with_min_call_interval(mut self, interval: Duration) -> Self {
        self.min_call_interval = interval;
        self
    }

    /// Sets how rate-limited model calls are retried.
    #[inline]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets the maximum number of steps in a run. Defaults to 25.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Replaces the notice returned when the model stays rate limited.
    #[inline]
    pub fn with_quota_message(mut self, message: impl Into<String>) -> Self {
        self.quota_message = Some(message.into());
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Agent {
        let Self {
            model_client,
            system_prompt,
            tools,
            min_call_interval,
            retry_policy,
            max_steps,
            quota_message,
        } = self;

        Agent {
            model_client,
            tool_executor: ToolExecutor::with_tools(tools),
            system_prompt,
            conversation: Conversation::default(),
            throttle: Throttle::new(min_call_interval),
            retry_policy,
            max_steps,
            quota_message: quota_message
                .unwrap_or_else(|| QUOTA_EXHAUSTED_MESSAGE.to_owned()),
        }
    }
}
