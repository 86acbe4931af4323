//! Name to callable map with JSON-schema metadata.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rmcp::schemars::{self, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::ToolError;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type Handler = Arc<dyn Fn(Value) -> BoxFuture<Result<Value, ToolError>> + Send + Sync>;

/// A structured request to run a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Public description of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Clone)]
struct RegisteredTool {
    description: String,
    schema: Value,
    handler: Handler,
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

fn schema_of<P: JsonSchema>() -> Value {
    let mut schema =
        serde_json::to_value(schemars::schema_for!(P)).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
        map.entry("type").or_insert_with(|| json!("object"));
    }
    schema
}

fn parse_arguments<P: DeserializeOwned>(tool: &str, arguments: Value) -> Result<P, ToolError> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::invalid(tool, e))
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool whose arguments deserialize into `P`.
    ///
    /// Registering a name twice replaces the earlier tool.
    pub fn register<P, F, Fut>(&mut self, name: &str, description: &str, handler: F)
    where
        P: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let tool = name.to_string();
        let handler: Handler = Arc::new(move |arguments| -> BoxFuture<Result<Value, ToolError>> {
            match parse_arguments::<P>(&tool, arguments) {
                Ok(params) => Box::pin(handler(params)),
                Err(e) => Box::pin(std::future::ready(Err(e))),
            }
        });

        self.tools.insert(
            name.to_string(),
            RegisteredTool {
                description: description.to_string(),
                schema: schema_of::<P>(),
                handler,
            },
        );
    }

    /// Execute a tool call.
    #[instrument(skip(self, call), fields(tool = %call.name))]
    pub async fn call(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: call.name.clone(),
            })?;

        debug!(arguments = %call.arguments, "calling tool");
        (tool.handler)(call.arguments.clone()).await
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|(name, tool)| ToolDefinition {
                name: name.clone(),
                description: tool.description.clone(),
                parameters: tool.schema.clone(),
            })
            .collect()
    }

    /// Definitions in the OpenAI function-calling format.
    pub fn openai_tools(&self) -> Vec<Value> {
        self.definitions()
            .into_iter()
            .map(|def| {
                json!({
                    "type": "function",
                    "function": {
                        "name": def.name,
                        "description": def.description,
                        "parameters": def.parameters,
                    }
                })
            })
            .collect()
    }
}
