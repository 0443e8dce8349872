use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::chat::{ChatMessage, Role};
use crate::config::Settings;

// Structures matching the OpenAI-compatible /chat/completions endpoint
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    tools: &'a serde_json::Value,
    tool_choice: &'a str,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    choices: Vec<Choice>,
    // id, usage, etc. are ignored
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize, Debug)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Deserialize, Debug)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

/// A function invocation requested by the model. `arguments` is the raw JSON
/// text exactly as the model produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(Option<String>),
    ToolCalls(Vec<ToolCall>),
}

/// Thin client for one chat-completion endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    settings: Settings,
}

impl LlmClient {
    pub fn new(settings: Settings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends the full history plus tool declarations and returns the first choice.
    #[instrument(skip_all, fields(model = %self.settings.model, history = messages.len()))]
    pub async fn complete(&self, messages: &[ChatMessage], tools: &serde_json::Value) -> Result<ModelReply> {
        let url = format!("{}/chat/completions", self.settings.base_url);

        let request_payload = CompletionRequest {
            model: &self.settings.model,
            messages: messages
                .iter()
                .map(|m| WireMessage { role: m.role, content: &m.content })
                .collect(),
            tools,
            tool_choice: "auto",
            temperature: 0.0,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&request_payload)
            .send()
            .await
            .context(format!("Failed to send request to chat completion API at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %error_body, "Chat completion request failed");
            return Err(anyhow::anyhow!(
                "Chat completion request failed with status {}: {}",
                status, error_body
            ));
        }

        let completion = response
            .json::<CompletionResponse>()
            .await
            .context("Failed to parse JSON response from chat completion API")?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .context("Chat completion response contained no choices")?;

        debug!(?message, "Received model message");

        Ok(into_reply(message))
    }
}

fn into_reply(message: ResponseMessage) -> ModelReply {
    match message.tool_calls {
        Some(calls) if !calls.is_empty() => ModelReply::ToolCalls(
            calls
                .into_iter()
                .map(|call| ToolCall {
                    name: call.function.name,
                    arguments: call.function.arguments.unwrap_or_default(),
                })
                .collect(),
        ),
        _ => ModelReply::Text(message.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> ModelReply {
        let response: CompletionResponse = serde_json::from_value(json).unwrap();
        into_reply(response.choices.into_iter().next().unwrap().message)
    }

    #[test]
    fn test_text_reply() {
        let reply = parse(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
        }));
        assert_eq!(reply, ModelReply::Text(Some("Hi there".to_string())));
    }

    #[test]
    fn test_null_content_without_tools() {
        let reply = parse(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        }));
        assert_eq!(reply, ModelReply::Text(None));
    }

    #[test]
    fn test_empty_tool_call_list_is_text() {
        let reply = parse(serde_json::json!({
            "choices": [{ "message": { "content": "ok", "tool_calls": [] } }]
        }));
        assert_eq!(reply, ModelReply::Text(Some("ok".to_string())));
    }

    #[test]
    fn test_tool_calls_take_precedence_over_content() {
        let reply = parse(serde_json::json!({
            "choices": [{ "message": {
                "content": "ignored",
                "tool_calls": [
                    { "id": "call_1", "type": "function",
                      "function": { "name": "cancel_order", "arguments": "{\"order_id\":\"ORD-1003\"}" } },
                    { "id": "call_2", "type": "function",
                      "function": { "name": "place_order" } }
                ]
            } }]
        }));
        assert_eq!(
            reply,
            ModelReply::ToolCalls(vec![
                ToolCall { name: "cancel_order".to_string(), arguments: "{\"order_id\":\"ORD-1003\"}".to_string() },
                ToolCall { name: "place_order".to_string(), arguments: String::new() },
            ])
        );
    }
}
