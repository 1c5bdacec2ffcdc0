use std::collections::HashMap;

use tracing::Instrument;
use trip_planner_model::{ModelTool, ToolCallRequest, ToolCallResult};

use crate::tool::{Error, ToolObject};

/// An executor that handles tool call requests from the model.
pub struct Executor {
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Executor {
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut tool_map = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name();
            if tool_map.contains_key(name) {
                warn!("tool {name} registered twice, keeping the last one");
            }
            tool_map.insert(name.to_owned(), tool);
        }
        let tools = tool_map;
        Self { tools }
    }

    /// Returns the definitions of all tools, sorted by name so that
    /// requests are stable across runs.
    pub fn definitions(&self) -> Vec<ModelTool> {
        let mut definitions: Vec<_> =
            self.tools.values().map(|tool| tool.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Runs one tool call. Failures are reported to the model as the
    /// content of the result.
    pub async fn execute(&self, req: &ToolCallRequest) -> ToolCallResult {
        let span = debug_span!("tool", name = %req.name, id = %req.id);
        let content = async {
            let result = match self.tools.get(&req.name) {
                Some(tool) => {
                    trace!("running with args: {:?}", req.arguments);
                    tool.execute(req.arguments.clone()).await
                }
                None => Err(Error::not_found()
                    .with_reason(format!("unknown tool `{}`", req.name))),
            };
            match result {
                Ok(output) => output,
                Err(err) => {
                    warn!("tool call failed: {err}");
                    format!("Error: {}", err.reason())
                }
            }
        }
        .instrument(span)
        .await;

        ToolCallResult {
            id: req.id.clone(),
            name: req.name.clone(),
            content,
        }
    }
}
