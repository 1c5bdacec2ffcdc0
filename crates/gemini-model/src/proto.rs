use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use trip_planner_model::{
    ModelMessage, ModelRequest, ModelTool, ModelTurn, ToolCallResult,
};

use crate::GeminiConfig;

// ------------------------------------
// Types shared by requests and replies
// ------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Marks a thought summary rather than answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    /// Must be sent back unchanged with the part it came with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl Part {
    #[inline]
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub response_id: Option<String>,
    /// Set when the request fails after the stream has started.
    pub error: Option<ApiError>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters_json_schema: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

// -----------
// Conversions
// -----------

pub fn create_request(
    req: &ModelRequest,
    config: &GeminiConfig,
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = Vec::with_capacity(req.messages.len());
    for msg in &req.messages {
        match msg {
            ModelMessage::User(text) => contents.push(Content {
                role: Some("user".to_owned()),
                parts: vec![Part::text(text.as_str())],
            }),
            ModelMessage::Model(turn) => contents.push(create_model_content(turn)),
            ModelMessage::Opaque(opaque) => {
                match opaque.downcast_ref::<Content>() {
                    Some(content) => contents.push(content.clone()),
                    None => match opaque.downcast_ref::<ModelTurn>() {
                        Some(turn) => contents.push(create_model_content(turn)),
                        None => {
                            warn!("dropping foreign opaque message: {opaque:?}")
                        }
                    },
                }
            }
            ModelMessage::ToolResult(result) => {
                // Gemini wants every response to one model turn in a single
                // content, so consecutive results are merged.
                let part = create_function_response(result);
                match contents.last_mut() {
                    Some(last) if is_function_response_content(last) => {
                        last.parts.push(part)
                    }
                    _ => contents.push(Content {
                        role: Some("user".to_owned()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    let function_declarations: Vec<_> =
        req.tools.iter().map(create_function_declaration).collect();
    let tools = if function_declarations.is_empty() {
        vec![]
    } else {
        vec![Tool {
            function_declarations,
        }]
    };

    GenerateContentRequest {
        contents,
        system_instruction: req.system.as_ref().map(|system| Content {
            role: None,
            parts: vec![Part::text(system.as_str())],
        }),
        tools,
        generation_config: GenerationConfig {
            temperature: config.temperature,
        },
    }
}

fn create_model_content(turn: &ModelTurn) -> Content {
    let mut parts = Vec::with_capacity(turn.tool_calls.len() + 1);
    if !turn.text.is_empty() {
        parts.push(Part::text(turn.text.as_str()));
    }
    for call in &turn.tool_calls {
        parts.push(Part {
            function_call: Some(FunctionCall {
                id: None,
                name: call.name.clone(),
                args: call.arguments.clone(),
            }),
            ..Default::default()
        });
    }
    if parts.is_empty() {
        parts.push(Part::text(""));
    }
    Content {
        role: Some("model".to_owned()),
        parts,
    }
}

#[inline]
fn create_function_response(result: &ToolCallResult) -> Part {
    Part {
        function_response: Some(FunctionResponse {
            name: result.name.clone(),
            response: json!({ "result": result.content }),
        }),
        ..Default::default()
    }
}

#[inline]
fn is_function_response_content(content: &Content) -> bool {
    content.role.as_deref() == Some("user")
        && !content.parts.is_empty()
        && content.parts.iter().all(|p| p.function_response.is_some())
}

fn create_function_declaration(tool: &ModelTool) -> FunctionDeclaration {
    let mut schema = tool.parameters.clone();
    // Gemini rejects the meta-schema keyword at the root.
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.trim().to_owned(),
        parameters_json_schema: schema,
    }
}
