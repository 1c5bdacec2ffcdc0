use std::time::Duration;

use trip_planner_core::conversation::Conversation;
use trip_planner_core::{Agent, AgentBuilder, AgentError, Reply, RetryPolicy};
use trip_planner_model::ModelProvider;

use crate::tools::*;

const SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider)
            .with_system_prompt(SYSTEM_PROMPT);
        Self { agent_builder }
    }

    /// Replaces the built-in system prompt.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.agent_builder = self.agent_builder.with_system_prompt(prompt);
        self
    }

    /// Sets the minimum time between two model calls.
    #[inline]
    pub fn with_min_call_interval(mut self, interval: Duration) -> Self {
        self.agent_builder = self.agent_builder.with_min_call_interval(interval);
        self
    }

    /// Sets how rate-limited model calls are retried.
    #[inline]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.agent_builder = self.agent_builder.with_retry_policy(policy);
        self
    }

    /// Builds a new session with all travel tools registered.
    pub fn build(self) -> Session {
        let agent = self
            .agent_builder
            .with_tool(WeatherTool::new())
            .with_tool(AttractionsTool::new())
            .with_tool(BudgetTool::new())
            .with_tool(FlightsHotelsTool::new())
            .build();

        Session { agent }
    }
}

/// A planning session. Every query sees the ones asked before it.
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Asks a travel question and waits for the final answer.
    pub async fn ask(&mut self, query: &str) -> Result<Reply, AgentError> {
        debug!("asking: {query}");
        self.agent.run(query).await
    }

    /// Returns every message exchanged so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        self.agent.conversation()
    }
}
