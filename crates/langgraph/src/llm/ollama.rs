//! Ollama chat client (`/api/chat`, non-streaming) implementing `LlmClient`.
//!
//! Sends the message history and tool declarations; the reply is either text or
//! `tool_calls`. Tool arguments arrive as JSON objects and are kept as JSON strings
//! in `ToolCall::arguments`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{LlmClient, LlmError, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Ollama connection and sampling settings.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server base URL, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model tag, e.g. `mistral`.
    pub model: String,
    pub temperature: f32,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Optional cap on generated tokens (`num_predict`).
    pub max_tokens: Option<u32>,
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: model.into(),
            temperature: 0.1,
            timeout: Duration::from_secs(30),
            max_tokens: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaFunctionCall {
    name: String,
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OllamaToolCallOut {
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCallOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OllamaFunction<'a>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Deserialize)]
struct OllamaFunctionIn {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct OllamaToolCallIn {
    function: OllamaFunctionIn,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageIn {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<OllamaToolCallIn>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessageIn,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

/// Arguments are stored as a JSON string; anything that is not JSON is sent as a string value.
fn arguments_to_value(arguments: &str) -> Value {
    if arguments.trim().is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(arguments).unwrap_or_else(|_| Value::String(arguments.to_string()))
}

fn arguments_to_string(arguments: Value) -> String {
    match arguments {
        Value::String(s) => s,
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    }
}

fn to_wire(message: &Message) -> OllamaMessage {
    let mut out = OllamaMessage {
        role: message.role(),
        content: message.content().to_string(),
        tool_calls: vec![],
        tool_name: None,
    };
    match message {
        Message::ToolCalls { calls, .. } => {
            out.tool_calls = calls
                .iter()
                .map(|c| OllamaToolCallOut {
                    function: OllamaFunctionCall {
                        name: c.name.clone(),
                        arguments: arguments_to_value(&c.arguments),
                    },
                })
                .collect();
        }
        Message::Tool(result) => out.tool_name = Some(result.name.clone()),
        _ => {}
    }
    out
}

fn map_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(e.to_string())
    } else {
        LlmError::Network(e.to_string())
    }
}

/// Ollama chat client implementing `LlmClient`.
///
/// **Interaction**: Used by `ModelNode` through `Arc<dyn LlmClient>`.
#[derive(Debug, Clone)]
pub struct ChatOllama {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl ChatOllama {
    /// Builds the client; the HTTP client carries `config.timeout`.
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;
        Ok(Self {
            config: OllamaConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            client,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Lists installed models (`GET /api/tags`). Used by diagnostics to check that the
    /// server is reachable and the configured model is pulled.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.config.base_url);
        let res = self.client.get(&url).send().await.map_err(map_reqwest_error)?;
        let status = res.status();
        let text = res.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(LlmError::ApiError(format!("{status}: {text}")));
        }
        let parsed: OllamaTagsResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// True when `list_models` contains the configured model (`mistral` matches `mistral:latest`).
    pub async fn has_model(&self) -> Result<bool, LlmError> {
        let wanted = self.config.model.as_str();
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| {
            m == wanted || m.split(':').next() == Some(wanted)
        }))
    }

    fn build_body<'a>(&'a self, messages: &[Message], tools: &'a [ToolSpec]) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.config.model,
            messages: messages.iter().map(to_wire).collect(),
            tools: tools
                .iter()
                .map(|t| OllamaTool {
                    kind: "function",
                    function: OllamaFunction {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.input_schema,
                    },
                })
                .collect(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmClient for ChatOllama {
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/api/chat", self.config.base_url);
        let body = self.build_body(messages, tools);
        debug!(model = %self.config.model, messages = messages.len(), tools = tools.len(), "ollama chat request");
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = res.status();
        let text = res.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(match status.as_u16() {
                404 => LlmError::ModelNotFound(text),
                408 => LlmError::Timeout(text),
                400..=499 => LlmError::InvalidRequest(text),
                _ => LlmError::ApiError(text),
            });
        }
        let parsed: OllamaChatResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
        let tool_calls = parsed
            .message
            .tool_calls
            .into_iter()
            .map(|tc| ToolCall::new(tc.function.name, arguments_to_string(tc.function.arguments)))
            .collect();
        Ok(LlmResponse {
            content: parsed.message.content,
            tool_calls,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ToolResult;

    fn client() -> ChatOllama {
        ChatOllama::new(OllamaConfig {
            base_url: "http://localhost:11434/".into(),
            ..OllamaConfig::new("mistral")
        })
        .unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(client().config().base_url, "http://localhost:11434");
    }

    #[test]
    fn body_carries_tools_and_tool_messages() {
        let c = client();
        let tools = vec![ToolSpec {
            name: "calculator".into(),
            description: "math".into(),
            input_schema: serde_json::json!({"type": "object"}),
        }];
        let messages = vec![
            Message::user("2+2?"),
            Message::ToolCalls {
                content: String::new(),
                calls: vec![ToolCall::new("calculator", r#"{"expression":"2+2"}"#)],
            },
            Message::Tool(ToolResult::ok(None, "calculator", "4")),
        ];
        let body = serde_json::to_value(c.build_body(&messages, &tools)).unwrap();
        assert_eq!(body["stream"], false);
        assert_eq!(body["tools"][0]["function"]["name"], "calculator");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(
            body["messages"][1]["tool_calls"][0]["function"]["arguments"]["expression"],
            "2+2"
        );
        assert_eq!(body["messages"][2]["role"], "tool");
        assert_eq!(body["messages"][2]["tool_name"], "calculator");
        assert!(body["options"].get("num_predict").is_none());
    }

    #[test]
    fn response_tool_arguments_become_json_strings() {
        let raw = r#"{"message":{"role":"assistant","content":"","tool_calls":[{"function":{"name":"search_movie_info","arguments":{"query":"Inception cast"}}}]},"done":true}"#;
        let parsed: OllamaChatResponse = serde_json::from_str(raw).unwrap();
        let tc = &parsed.message.tool_calls[0];
        let args = arguments_to_string(tc.function.arguments.clone());
        assert_eq!(args, r#"{"query":"Inception cast"}"#);
    }

    #[test]
    fn non_json_arguments_are_sent_as_strings() {
        assert_eq!(arguments_to_value("2 + 2"), Value::String("2 + 2".into()));
        assert_eq!(arguments_to_value(""), serde_json::json!({}));
    }
}
