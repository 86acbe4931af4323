//! LLM-backed agent using OpenAI-compatible function calling.
//!
//! The model sees the tool registry as OpenAI `tools`. Tool calls it returns
//! are executed through the same registry the rule-based agent uses, and a
//! second completion turns the results into the final answer.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use miette::Diagnostic;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[cfg(test)]
use mockall::automock;

use super::agent::AgentReply;
use crate::db::ToolCallRecord;
use crate::tools::{ToolCall, ToolRegistry};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "You are a helpful task management assistant. \
Use the provided tools to add, list, update, complete and delete the user's tasks. \
Dates are YYYY-MM-DD. Priorities are low, medium, high or urgent. \
After a tool runs, confirm what was done in one or two friendly sentences.";

#[derive(Error, Diagnostic, Debug)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    #[diagnostic(code(taskchat::llm::request))]
    Request(#[from] reqwest::Error),

    #[error("LLM API returned {status}: {message}")]
    #[diagnostic(code(taskchat::llm::api))]
    Api { status: u16, message: String },

    #[error("LLM returned no choices")]
    #[diagnostic(code(taskchat::llm::empty_response))]
    EmptyResponse,
}

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl LlmConfig {
    /// Read the configuration from the environment.
    ///
    /// Returns `None` when neither `TASKCHAT_LLM_API_KEY` nor `OPENAI_API_KEY`
    /// holds a non-empty key.
    pub fn from_env() -> Option<Self> {
        let api_key = ["TASKCHAT_LLM_API_KEY", "OPENAI_API_KEY"]
            .into_iter()
            .filter_map(|name| env::var(name).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())?;

        let model = env::var("TASKCHAT_LLM_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = env::var("TASKCHAT_LLM_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Some(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as the API sends them.
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

/// One message of a chat completion exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ModelToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role("tool", content)
        }
    }
}

/// A chat completion endpoint.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion. `tools` are OpenAI tool definitions; empty means none.
    async fn complete(&self, messages: &[ChatMessage], tools: &[Value])
    -> Result<ChatMessage, LlmError>;
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// `ChatModel` over HTTP against `{base_url}/chat/completions`.
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, config })
    }

    /// Client configured from the environment, or `None` when no API key is set.
    pub fn from_env() -> Option<Result<Self, LlmError>> {
        LlmConfig::from_env().map(Self::new)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value],
    ) -> Result<ChatMessage, LlmError> {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });
        if !tools.is_empty() {
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api { status, message });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Agent that lets the model pick tools from the registry.
#[derive(Clone)]
pub struct LlmAgent {
    model: Arc<dyn ChatModel>,
    registry: ToolRegistry,
}

impl LlmAgent {
    pub fn new(model: Arc<dyn ChatModel>, registry: ToolRegistry) -> Self {
        Self { model, registry }
    }

    /// Answer `message`.
    ///
    /// Fails only when the first completion fails. Once tools have run, a
    /// failed follow-up completion yields a summary instead of an error so
    /// the caller never repeats the actions.
    #[instrument(skip_all)]
    pub async fn respond(&self, message: &str) -> Result<AgentReply, LlmError> {
        let tools = self.registry.openai_tools();
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(message)];

        let first = self.model.complete(&messages, &tools).await?;
        let requested = first.tool_calls.clone().unwrap_or_default();
        if requested.is_empty() {
            return Ok(AgentReply::text(first.content.unwrap_or_default()));
        }
        messages.push(first);

        let mut records = Vec::with_capacity(requested.len());
        for call in requested {
            let arguments = serde_json::from_str::<Value>(&call.function.arguments)
                .unwrap_or_else(|_| Value::String(call.function.arguments.clone()));
            let tool_call = ToolCall::new(call.function.name.clone(), arguments);

            let result = match self.registry.call(&tool_call).await {
                Ok(value) => value,
                Err(e) => {
                    debug!(tool = %tool_call.name, error = %e, "tool call failed");
                    json!({ "error": e.to_string() })
                }
            };

            messages.push(ChatMessage::tool(call.id, result.to_string()));
            records.push(ToolCallRecord {
                name: tool_call.name,
                arguments: tool_call.arguments,
                result,
            });
        }

        let response = match self.model.complete(&messages, &[]).await {
            Ok(answer) => answer.content.filter(|c| !c.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "follow-up completion failed");
                None
            }
        }
        .unwrap_or_else(|| summarize(&records));

        Ok(AgentReply {
            response,
            tool_calls: records,
        })
    }
}

fn summarize(records: &[ToolCallRecord]) -> String {
    let names = records
        .iter()
        .map(|r| {
            if r.result.get("error").is_some() {
                format!("{} (failed)", r.name)
            } else {
                r.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("I ran {}.", names)
}
