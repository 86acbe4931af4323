//! Chat agents: the rule-based pipeline and the LLM-backed front.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use super::extract::{self, TaskRef, UpdateFields};
use super::intent::{Intent, classify};
use super::llm::{ChatModel, LlmAgent};
use super::responses;
use crate::db::{Database, Id, Task, TaskQuery, ToolCallRecord};
use crate::tasks::{Completion, TaskService};
use crate::tools::params::{CompleteTaskParams, DeleteTaskParams};
use crate::tools::{ToolCall, ToolError, ToolRegistry};

/// What an agent says back, plus the tool calls it made on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentReply {
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

impl AgentReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            tool_calls: Vec::new(),
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ToolError> {
    Ok(serde_json::from_value(value)?)
}

enum Resolved {
    Task(Id),
    Reply(String),
}

/// Keyword classification and regex extraction feeding the tool registry.
pub struct RuleBasedAgent<D: Database> {
    service: TaskService<D>,
    registry: ToolRegistry,
}

impl<D: Database> Clone for RuleBasedAgent<D> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<D: Database + 'static> RuleBasedAgent<D> {
    pub fn new(service: TaskService<D>) -> Self {
        let registry = ToolRegistry::for_tasks(service.clone());
        Self { service, registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn respond(&self, message: &str) -> AgentReply {
        self.respond_at(message, Local::now().naive_local()).await
    }

    /// Answer `message` as if the current local time were `now`.
    #[instrument(skip(self, message))]
    pub async fn respond_at(&self, message: &str, now: NaiveDateTime) -> AgentReply {
        let intent = classify(message);
        debug!(%intent, "classified message");

        let today = now.date();
        let mut calls = Vec::new();
        let response = match intent {
            Intent::AddTask => self.add(message, today, &mut calls).await,
            Intent::ListTasks => self.list(message, &mut calls).await,
            Intent::UpdateTask => {
                let fields = extract::update_fields(message, today);
                self.update(message, fields, &mut calls).await
            }
            Intent::CompleteTask if extract::marks_incomplete(message) => {
                let fields = UpdateFields {
                    completed: Some(false),
                    ..Default::default()
                };
                self.update(message, fields, &mut calls).await
            }
            Intent::CompleteTask => self.complete(message, &mut calls).await,
            Intent::DeleteTask => self.delete(message, &mut calls).await,
            Intent::General => responses::general(message, now),
        };

        AgentReply {
            response,
            tool_calls: calls,
        }
    }

    async fn execute<P: Serialize>(
        &self,
        name: &str,
        params: &P,
        calls: &mut Vec<ToolCallRecord>,
    ) -> Result<Value, ToolError> {
        let call = ToolCall::new(name, serde_json::to_value(params)?);
        let result = self.registry.call(&call).await;

        let recorded = match &result {
            Ok(value) => value.clone(),
            Err(e) => json!({ "error": e.to_string() }),
        };
        calls.push(ToolCallRecord {
            name: call.name,
            arguments: call.arguments,
            result: recorded,
        });
        result
    }

    async fn add(&self, message: &str, today: NaiveDate, calls: &mut Vec<ToolCallRecord>) -> String {
        let params = extract::add_task_params(message, today);
        match self
            .execute("add_task", &params, calls)
            .await
            .and_then(decode::<Task>)
        {
            Ok(task) => responses::task_added(&task),
            Err(e) => responses::tool_failed("add", None, &e),
        }
    }

    async fn list(&self, message: &str, calls: &mut Vec<ToolCallRecord>) -> String {
        let filters = extract::list_filters(message);
        let listed = self
            .execute("list_tasks", &filters, calls)
            .await
            .and_then(|mut value| {
                let total = value["total"].as_u64().unwrap_or_default() as usize;
                let items: Vec<Task> = decode(value["items"].take())?;
                Ok((items, total))
            });

        match listed {
            Ok((items, total)) => responses::task_list(&items, total, &filters),
            Err(e) => responses::list_failed(&e),
        }
    }

    async fn update(
        &self,
        message: &str,
        fields: UpdateFields,
        calls: &mut Vec<ToolCallRecord>,
    ) -> String {
        let id = match self
            .resolve(message, "update", &fields.quoted_values(), false)
            .await
        {
            Resolved::Task(id) => id,
            Resolved::Reply(reply) => return reply,
        };
        if fields.is_empty() {
            return responses::what_to_update(id);
        }

        let changed = changed_fields(&fields);
        let reopening = changed == ["status"] && fields.completed == Some(false);
        let params = fields.into_params(id);

        match self
            .execute("update_task", &params, calls)
            .await
            .and_then(decode::<Task>)
        {
            Ok(task) if reopening => responses::task_reopened(&task),
            Ok(task) => responses::task_updated(&task, &changed),
            Err(e) => responses::tool_failed("update", Some(id), &e),
        }
    }

    async fn complete(&self, message: &str, calls: &mut Vec<ToolCallRecord>) -> String {
        let id = match self.resolve(message, "complete", &[], true).await {
            Resolved::Task(id) => id,
            Resolved::Reply(reply) => return reply,
        };

        match self
            .execute("complete_task", &CompleteTaskParams { task_id: id }, calls)
            .await
            .and_then(decode::<Completion>)
        {
            Ok(completion) => responses::task_completed(&completion),
            Err(e) => responses::tool_failed("complete", Some(id), &e),
        }
    }

    async fn delete(&self, message: &str, calls: &mut Vec<ToolCallRecord>) -> String {
        let id = match self.resolve(message, "delete", &[], false).await {
            Resolved::Task(id) => id,
            Resolved::Reply(reply) => return reply,
        };

        match self
            .execute("delete_task", &DeleteTaskParams { task_id: id }, calls)
            .await
            .and_then(|mut value| decode::<Task>(value["task"].take()))
        {
            Ok(task) => responses::task_deleted(&task),
            Err(e) => responses::tool_failed("delete", Some(id), &e),
        }
    }

    /// Turn the task reference in `message` into an id, or a reply asking the
    /// user to clarify. `open_only` restricts title matches to incomplete tasks.
    async fn resolve(
        &self,
        message: &str,
        action: &str,
        exclude: &[&str],
        open_only: bool,
    ) -> Resolved {
        let query = match extract::task_ref(message, exclude) {
            None => return Resolved::Reply(responses::which_task(action)),
            Some(TaskRef::Id(id)) => return Resolved::Task(id),
            Some(TaskRef::Title(query)) => query,
        };

        let tasks = match self.service.list(&TaskQuery::default()).await {
            Ok(result) => result.items,
            Err(e) => {
                let e = ToolError::from(e);
                return Resolved::Reply(responses::tool_failed(action, None, &e));
            }
        };

        let candidates = match_title(tasks, &query, open_only);
        match candidates.as_slice() {
            [] => Resolved::Reply(responses::no_task_matching(&query)),
            [task] => Resolved::Task(task.id),
            _ => Resolved::Reply(responses::ambiguous(&query, action, &candidates)),
        }
    }
}

/// Tasks whose title matches `query`: exact (case-insensitive) matches when
/// there are any, otherwise substring matches. Several matches are narrowed
/// to the incomplete ones when that leaves at least one.
fn match_title(tasks: Vec<Task>, query: &str, open_only: bool) -> Vec<Task> {
    let needle = query.to_lowercase();
    let pool: Vec<Task> = tasks
        .into_iter()
        .filter(|t| !open_only || !t.completed)
        .collect();

    let exact: Vec<Task> = pool
        .iter()
        .filter(|t| t.title.to_lowercase() == needle)
        .cloned()
        .collect();
    let candidates = if exact.is_empty() {
        pool.into_iter()
            .filter(|t| t.title.to_lowercase().contains(&needle))
            .collect()
    } else {
        exact
    };

    if candidates.len() > 1 && candidates.iter().any(|t| !t.completed) {
        candidates.into_iter().filter(|t| !t.completed).collect()
    } else {
        candidates
    }
}

fn changed_fields(fields: &UpdateFields) -> Vec<&'static str> {
    [
        ("title", fields.title.is_some()),
        ("description", fields.description.is_some()),
        ("priority", fields.priority.is_some()),
        ("due date", fields.due_date.is_some()),
        ("tags", fields.tags.is_some()),
        ("recurrence", fields.recurrence.is_some()),
        ("status", fields.completed.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, set)| set.then_some(name))
    .collect()
}

/// The agent behind every chat surface.
///
/// Uses the LLM when one is configured; if the model fails before any tool
/// ran, the rule-based agent answers instead.
pub struct ChatAgent<D: Database> {
    rules: RuleBasedAgent<D>,
    llm: Option<LlmAgent>,
}

impl<D: Database> Clone for ChatAgent<D> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            llm: self.llm.clone(),
        }
    }
}

impl<D: Database + 'static> ChatAgent<D> {
    /// Rule-based only.
    pub fn new(service: TaskService<D>) -> Self {
        Self {
            rules: RuleBasedAgent::new(service),
            llm: None,
        }
    }

    /// Use `model` first, with the rule-based agent as fallback.
    pub fn with_model(service: TaskService<D>, model: Arc<dyn ChatModel>) -> Self {
        let rules = RuleBasedAgent::new(service);
        let llm = LlmAgent::new(model, rules.registry().clone());
        Self {
            rules,
            llm: Some(llm),
        }
    }

    /// Configure the LLM from the environment when an API key is present.
    pub fn from_env(service: TaskService<D>) -> Self {
        match super::llm::OpenAiClient::from_env() {
            Some(Ok(client)) => {
                info!(model = client.model(), "using LLM chat agent");
                Self::with_model(service, Arc::new(client))
            }
            Some(Err(e)) => {
                warn!(error = %e, "LLM client unavailable; using rule-based agent");
                Self::new(service)
            }
            None => Self::new(service),
        }
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn respond(&self, message: &str) -> AgentReply {
        if let Some(llm) = &self.llm {
            match llm.respond(message).await {
                Ok(reply) => return reply,
                Err(e) => warn!(error = %e, "LLM request failed; falling back to rule-based agent"),
            }
        }
        self.rules.respond(message).await
    }
}
