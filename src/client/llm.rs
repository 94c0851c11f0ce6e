//! LLM Chat-Completion Transport
//!
//! Synchronous client for an OpenAI-compatible chat endpoint. Manages the
//! message history around a system prompt; the curation pipeline runs it
//! stateless (history cleared after each call) so every prompt stands
//! alone.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CuratorError, Result};

/// Chat-completion contract consumed by the cluster refiner.
pub trait ChatCompleter {
    /// Sends one prompt and returns the assistant's reply text.
    fn send_message(&mut self, message: &str) -> Result<String>;
}

/// Message roles understood by the chat endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in the conversation history.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-compatible chat-completion API.
pub struct LlmClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    history: bool,
    messages: Vec<ChatMessage>,
}

impl LlmClient {
    /// Creates a client. With `history` disabled the conversation is reset
    /// to the system prompt after every send.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
        history: bool,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            temperature,
            history,
            messages: vec![ChatMessage {
                role: Role::System,
                content: system_prompt.into(),
            }],
        }
    }

    /// Drops everything but the system prompt.
    pub fn clear_history(&mut self) {
        self.messages.retain(|message| message.role == Role::System);
    }

    /// Replaces the system prompt in place.
    pub fn update_system_prompt(&mut self, system_prompt: impl Into<String>) {
        if let Some(first) = self.messages.first_mut() {
            first.content = system_prompt.into();
        }
    }
}

impl ChatCompleter for LlmClient {
    fn send_message(&mut self, message: &str) -> Result<String> {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: message.to_string(),
        });

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: &self.messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        debug!("sending {} messages to {}", self.messages.len(), url);

        let response: ChatResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CuratorError::BadResponse {
                service: "llm".to_string(),
                detail: "no completion choices in response".to_string(),
            })?;

        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: content.clone(),
        });
        if !self.history {
            self.clear_history();
        }
        Ok(content)
    }
}
