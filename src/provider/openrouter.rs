//! OpenRouter chat-completions client.

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::provider::MappingProvider;
use crate::rename::RenameEntry;
use crate::tree::FlatItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const SYSTEM_PROMPT: &str = "You are an assistant strictly limited to renaming files and \
directories. Return ONLY a JSON array with each entry containing 'original' and 'new'. \
Do not include explanations or anything else.";

/// Mapping provider backed by an OpenRouter-compatible API.
#[derive(Debug)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenRouterClient {
    /// Build a client from configuration.
    ///
    /// Requires `openrouter_api_key`; the request timeout bounds the whole
    /// mapping call so a stalled remote never holds a run hostage.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let api_key = config.openrouter_api_key.clone().ok_or_else(|| {
            ApiError::ConfigError(
                "openrouter_api_key is not configured (config file or RENAMEGENIE_OPENROUTER_API_KEY)"
                    .to_string(),
            )
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: config.openrouter_endpoint.trim_end_matches('/').to_string(),
            model: config.openrouter_model.clone(),
            api_key,
        })
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl MappingProvider for OpenRouterClient {
    async fn propose(
        &self,
        items: &[FlatItem],
        instruction: &str,
    ) -> Result<Vec<RenameEntry>, ApiError> {
        info!(items = items.len(), model = %self.model, "requesting rename mapping");

        let user_content = serde_json::json!({
            "prompt": instruction,
            "files": items,
        })
        .to_string();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RemoteCall(format!(
                "mapping provider returned {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| ApiError::RemoteCall(format!("malformed provider response: {}", e)))?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ApiError::RemoteCall("provider response contained no choices".to_string())
            })?;

        debug!(content = %truncate(&content, 500), "received mapping content");
        parse_mapping(&content)
    }
}

/// Validate the model's reply as a JSON array of `{original, new}` objects.
///
/// Models occasionally wrap the array in a Markdown code fence despite the
/// system prompt; the fence is stripped before parsing. Anything else that
/// does not match the schema fails the mapping stage.
pub fn parse_mapping(content: &str) -> Result<Vec<RenameEntry>, ApiError> {
    let body = strip_code_fence(content);
    serde_json::from_str(body).map_err(|e| {
        ApiError::RemoteCall(format!(
            "mapping response is not a JSON array of {{original, new}} objects: {}",
            e
        ))
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start();
    match rest.strip_suffix("```") {
        Some(inner) => inner.trim_end(),
        None => rest,
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
