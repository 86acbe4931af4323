//! Natural-language front-end for tasks.
//!
//! - `intent`: keyword classification into one of six intents
//! - `extract`: regex slot extraction (title, priority, due date, tags, recurrence, references)
//! - `responses`: reply templates
//! - `agent`: the rule-based agent and the LLM-first `ChatAgent`
//! - `llm`: OpenAI-compatible function calling
//! - `service`: conversations persisted around the agent

mod agent;
pub mod extract;
mod intent;
pub mod llm;
pub mod responses;
mod service;

#[cfg(test)]
mod agent_test;

pub use agent::{AgentReply, ChatAgent, RuleBasedAgent};
pub use intent::{Intent, classify, tokenize};
pub use llm::{ChatModel, LlmAgent, LlmConfig, LlmError, OpenAiClient};
pub use service::{ChatError, ChatReply, ChatResult, ChatService, ConversationHistory};
