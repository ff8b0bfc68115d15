//! `OpenAI` and `OpenAI`-compatible chat completion provider

use super::memory::ConversationMemory;
use super::types::{LlmMessage, LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

/// Characters the completion API accepts in a message `name`
static NAME_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // Literal pattern
    Regex::new(r"[^a-zA-Z0-9_-]").unwrap()
});

/// Reduce a chat display name to what the `name` field accepts.
/// Returns `None` when nothing usable remains.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let cleaned = NAME_DISALLOWED.replace_all(raw, "").into_owned();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Connection settings for an `OpenAI`-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAIOptions {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub memory_window: usize,
    pub timeout: Duration,
}

/// OpenAI-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    system_prompt: Option<String>,
    memory: ConversationMemory,
}

impl OpenAIService {
    pub fn new(options: OpenAIOptions) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: options.api_key,
            endpoint: format!(
                "{}/chat/completions",
                options.base_url.trim_end_matches('/')
            ),
            model: options.model,
            system_prompt: options.system_prompt,
            memory: ConversationMemory::new(options.memory_window),
        })
    }

    /// The user turn as it is sent and remembered
    fn user_message(request: &LlmRequest) -> LlmMessage {
        let name = request.user_name.as_deref().and_then(sanitize_name);
        let content = match &name {
            Some(name) => format!("User {name} says:\n{}", request.prompt),
            None => request.prompt.clone(),
        };
        LlmMessage {
            role: MessageRole::User,
            content,
            name,
        }
    }

    fn translate_request(&self, request: &LlmRequest, user: &LlmMessage) -> OpenAIRequest {
        let mut messages = Vec::new();

        if let Some(system) = &self.system_prompt {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                name: None,
            });
        }

        for msg in self
            .memory
            .history(&request.conversation_id)
            .iter()
            .chain(std::iter::once(user))
        {
            messages.push(Self::translate_message(msg));
        }

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        }
    }

    fn translate_message(msg: &LlmMessage) -> OpenAIMessage {
        OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content.clone()),
            name: msg.name.clone(),
        }
    }

    fn normalize_response(resp: OpenAIResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("No choices in response"))?;

        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_tokens),
            output_tokens: u64::from(u.completion_tokens),
        });

        Ok(LlmResponse {
            text: choice.message.content.unwrap_or_default(),
            usage,
        })
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let user = Self::user_message(request);
        let openai_request = self.translate_request(request, &user);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |error_resp| error_resp.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        let normalized = Self::normalize_response(openai_response)?;
        self.memory
            .record_exchange(&request.conversation_id, user, &normalized.text);
        Ok(normalized)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn forget(&self, conversation_id: &str) {
        self.memory.clear(conversation_id);
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
