//! Exam-ready long answers.
//!
//! The responder drives an explicit plan → act → observe loop: the model is
//! offered a search tool, tool calls are executed and fed back, and the loop
//! ends on the first text answer. The number of tool calls and the total time
//! are both bounded.

use super::{Responder, ResponderId};
use crate::{
    context::TurnContext,
    envelope::ResultEnvelope,
    error::{LlmError, ResponderError},
    llm_client::{ChatMessage, LLMAction, LLMClient, ToolCall, ToolSpec},
    prompts,
    retrieval::{SearchTool, render_hits},
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Name under which the retrieval tool is offered to the model.
pub const SEARCH_TOOL_NAME: &str = "search_study_material";

const DEFAULT_MAX_TOOL_CALLS: usize = 3;
const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// Arguments the model passes to the search tool.
#[derive(Deserialize, JsonSchema, Debug)]
struct SearchArgs {
    /// The concept or question to look up.
    #[schemars(description = "The concept or question to look up")]
    query: String,
}

fn search_tool_spec() -> ToolSpec {
    let parameters = serde_json::to_value(schemars::schema_for!(SearchArgs))
        .unwrap_or_else(|_| serde_json::json!({"type": "object"}));
    ToolSpec {
        name: SEARCH_TOOL_NAME.to_string(),
        description: "Retrieve academic and explanatory material when the topic needs \
                      enrichment beyond standard textbook knowledge."
            .to_string(),
        parameters,
    }
}

pub struct ExamDetailedResponder {
    llm: Arc<dyn LLMClient>,
    search: Option<Arc<dyn SearchTool>>,
    template: String,
    max_tool_calls: usize,
    deadline: Duration,
}

impl ExamDetailedResponder {
    /// Creates the responder. Without a `search` tool the model is never
    /// offered one and answers from its own knowledge.
    pub fn new(
        llm: Arc<dyn LLMClient>,
        search: Option<Arc<dyn SearchTool>>,
        template: String,
    ) -> Self {
        Self {
            llm,
            search,
            template,
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    async fn run_loop(&self, query: &str, context: &TurnContext) -> Result<String, ResponderError> {
        let system = prompts::render(&self.template, &context.transcript);
        let tool_spec = search_tool_spec();
        let mut messages = vec![ChatMessage::User(query.to_string())];
        let mut calls_made = 0usize;

        loop {
            let offer_tool = self.search.is_some() && calls_made < self.max_tool_calls;
            let tools: &[ToolSpec] = if offer_tool {
                std::slice::from_ref(&tool_spec)
            } else {
                &[]
            };

            match self.llm.decide_action(&system, &messages, tools).await? {
                LLMAction::TextResponse(text) => {
                    if text.trim().is_empty() {
                        return Err(LlmError::EmptyOutput.into());
                    }
                    info!(tool_calls = calls_made, "Exam answer synthesized");
                    return Ok(text);
                }
                LLMAction::ToolCall(calls) => {
                    // Each accepted round strictly increases `calls_made`, so
                    // the loop ends after at most `max_tool_calls` rounds.
                    if calls.is_empty()
                        || !offer_tool
                        || calls_made + calls.len() > self.max_tool_calls
                    {
                        return Err(ResponderError::Timeout {
                            limit: format!("{} tool calls", self.max_tool_calls),
                        });
                    }
                    calls_made += calls.len();

                    let mut results = Vec::with_capacity(calls.len());
                    for call in &calls {
                        results.push(ChatMessage::ToolResult {
                            call_id: call.id.clone(),
                            content: self.execute(call).await,
                        });
                    }
                    messages.push(ChatMessage::ToolCalls(calls));
                    messages.extend(results);
                }
            }
        }
    }

    /// Runs one tool call. Problems are reported back to the model as tool
    /// output; they never fail the turn.
    async fn execute(&self, call: &ToolCall) -> String {
        if call.name != SEARCH_TOOL_NAME {
            warn!(tool = %call.name, "Model requested an unknown tool");
            return format!("Unknown tool '{}'.", call.name);
        }
        let args: SearchArgs = match serde_json::from_str(&call.arguments) {
            Ok(args) => args,
            Err(e) => return format!("Invalid arguments for '{}': {}", SEARCH_TOOL_NAME, e),
        };
        let Some(search) = &self.search else {
            return "Search is not available.".to_string();
        };

        match search.search(&args.query).await {
            Ok(hits) => {
                info!(query = %args.query, hits = hits.len(), "Retrieved study material");
                render_hits(&hits)
            }
            Err(e) => {
                warn!(query = %args.query, error = %e, "Retrieval failed, continuing without enrichment");
                "Search failed; no results are available. Answer from built-in knowledge."
                    .to_string()
            }
        }
    }
}

#[async_trait]
impl Responder for ExamDetailedResponder {
    fn id(&self) -> ResponderId {
        ResponderId::ExamDetailed
    }

    async fn respond(&self, query: &str, context: &TurnContext) -> ResultEnvelope {
        let outcome = match tokio::time::timeout(self.deadline, self.run_loop(query, context)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ResponderError::Timeout {
                limit: format!("{:?}", self.deadline),
            }),
        };

        match outcome {
            Ok(text) => ResultEnvelope::success(self.id(), text),
            Err(e) => {
                error!(error = %e, "Exam answer failed");
                ResultEnvelope::failure(self.id(), [e.to_string()])
            }
        }
    }
}
