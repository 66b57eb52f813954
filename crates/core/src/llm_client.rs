use crate::error::LlmError;
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolChoiceOption,
        ChatCompletionToolType, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
        FunctionCall, FunctionObjectArgs,
    },
};
use async_trait::async_trait;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

/// A tool the model may call, described by a JSON schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    User(String),
    Assistant(String),
    /// The model's own request to call tools, echoed back in the history.
    ToolCalls(Vec<ToolCall>),
    ToolResult { call_id: String, content: String },
}

/// Represents the two possible outcomes of the LLM's decision-making turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LLMAction {
    /// The LLM decided to respond directly with text.
    TextResponse(String),
    /// The LLM decided to call one or more tools.
    ToolCall(Vec<ToolCall>),
}

/// A generic client for interacting with an LLM.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Makes a single, non-interactive call and returns the generated text.
    async fn generate(
        &self,
        system_instructions: &str,
        messages: &[ChatMessage],
    ) -> Result<String, LlmError>;

    /// Makes a single call that lets the LLM either answer or request tools.
    async fn decide_action(
        &self,
        system_instructions: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<LLMAction, LlmError>;
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The specific model identifier to use for chat completions (e.g., "gpt-4o").
    /// * `temperature` - Sampling temperature used for every request.
    pub fn new(config: OpenAIConfig, model: String, temperature: f32) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            temperature,
        }
    }

    fn build_messages(
        system_instructions: &str,
        messages: &[ChatMessage],
    ) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        let mut request_messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_instructions)
                .build()?
                .into(),
        ];
        for msg in messages {
            let converted: ChatCompletionRequestMessage = match msg {
                ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
                    .content(content.as_str())
                    .build()?
                    .into(),
                ChatMessage::Assistant(content) => {
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(content.as_str())
                        .build()?
                        .into()
                }
                ChatMessage::ToolCalls(calls) => {
                    let tool_calls = calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>();
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls)
                        .build()?
                        .into()
                }
                ChatMessage::ToolResult { call_id, content } => {
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(call_id.as_str())
                        .content(content.as_str())
                        .build()?
                        .into()
                }
            };
            request_messages.push(converted);
        }
        Ok(request_messages)
    }

    fn build_tools(tools: &[ToolSpec]) -> Result<Vec<ChatCompletionTool>, OpenAIError> {
        tools
            .iter()
            .map(|t| {
                ChatCompletionToolArgs::default()
                    .function(
                        FunctionObjectArgs::default()
                            .name(t.name.as_str())
                            .description(t.description.as_str())
                            .parameters(t.parameters.clone())
                            .build()?,
                    )
                    .build()
            })
            .collect()
    }

    async fn complete(
        &self,
        system_instructions: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<CreateChatCompletionResponse, LlmError> {
        let request_messages = Self::build_messages(system_instructions, messages)
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .temperature(self.temperature)
            .messages(request_messages);
        if !tools.is_empty() {
            let request_tools =
                Self::build_tools(tools).map_err(|e| LlmError::Malformed(e.to_string()))?;
            builder
                .tools(request_tools)
                .tool_choice(ChatCompletionToolChoiceOption::Auto);
        }
        let request = builder
            .build()
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        self.client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Transient(e.to_string()))
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn generate(
        &self,
        system_instructions: &str,
        messages: &[ChatMessage],
    ) -> Result<String, LlmError> {
        let response = self.complete(system_instructions, messages, &[]).await?;
        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::Malformed("no response choice from LLM".to_string()))?;

        match &choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content.clone()),
            _ => Err(LlmError::EmptyOutput),
        }
    }

    async fn decide_action(
        &self,
        system_instructions: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<LLMAction, LlmError> {
        let response = self.complete(system_instructions, messages, tools).await?;
        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::Malformed("no response choice from LLM".to_string()))?;

        if let Some(tool_calls) = &choice.message.tool_calls {
            Ok(LLMAction::ToolCall(
                tool_calls
                    .iter()
                    .map(|call| ToolCall {
                        id: call.id.clone(),
                        name: call.function.name.clone(),
                        arguments: call.function.arguments.clone(),
                    })
                    .collect(),
            ))
        } else if let Some(content) = &choice.message.content {
            Ok(LLMAction::TextResponse(content.clone()))
        } else {
            Err(LlmError::Malformed(
                "LLM response had neither text content nor tool calls.".to_string(),
            ))
        }
    }
}
