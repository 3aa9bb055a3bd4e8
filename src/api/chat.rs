//! Chat Completion API
//!
//! Request and response types for chat completions, streamed or not.

use crate::api::completion::{created_at, CompletionsUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Function,
    Tool,
    /// A role this crate does not know about
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::Function => "function",
            ChatRole::Tool => "tool",
            ChatRole::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,

    /// Message text; the service may send null for function-call replies
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Partial message carried by a streamed chat fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDelta {
    /// Role (usually only in the first fragment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ChatRole>,

    /// Content delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Chat completion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionsOptions {
    /// Messages in the conversation, oldest first
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Number of choices to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    /// End-user identifier for abuse monitoring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Enable streaming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    /// Model name (public OpenAI API only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatCompletionsOptions {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }
}

/// Chat completion response, or one fragment of a streamed one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletions {
    pub id: String,

    /// Creation timestamp (Unix seconds)
    pub created: u64,

    /// Response choices, in service order
    pub choices: Vec<ChatChoice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionsUsage>,
}

impl ChatCompletions {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        created_at(self.created)
    }
}

/// A choice in a chat completion. Full responses carry `message`,
/// streamed fragments carry `delta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChatMessageDelta>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl ChatChoice {
    /// Role of this choice, from the full message or the delta
    pub fn role(&self) -> Option<ChatRole> {
        match (&self.message, &self.delta) {
            (Some(message), _) => Some(message.role),
            (None, Some(delta)) => delta.role,
            (None, None) => None,
        }
    }

    /// Text of this choice, from the full message or the delta
    pub fn content(&self) -> Option<&str> {
        match (&self.message, &self.delta) {
            (Some(message), _) => message.content.as_deref(),
            (None, Some(delta)) => delta.content.as_deref(),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_options_preserve_message_order() {
        let options = ChatCompletionsOptions::new(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("bye"),
        ]);

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "bye"}
                ]
            })
        );
    }

    #[test]
    fn test_chat_completions_deserialization() {
        let json = r#"{
            "id": "chatcmpl-7R1nGnsXO8n4oi9UPz2f3UHdgAYMn",
            "object": "chat.completion",
            "created": 1686676106,
            "model": "gpt-35-turbo",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {"role": "assistant", "content": "Arr, patience be key."}
            }],
            "usage": {"completion_tokens": 6, "prompt_tokens": 55, "total_tokens": 61}
        }"#;

        let response: ChatCompletions = serde_json::from_str(json).unwrap();
        let choice = &response.choices[0];
        assert_eq!(choice.role(), Some(ChatRole::Assistant));
        assert_eq!(choice.content(), Some("Arr, patience be key."));
        assert_eq!(response.usage.unwrap().prompt_tokens, 55);
    }

    #[test]
    fn test_chat_delta_deserialization() {
        let json = r#"{"id":"chatcmpl-1","created":1686676106,"choices":[{"index":0,"finish_reason":null,"delta":{"content":" parrot"}}]}"#;
        let fragment: ChatCompletions = serde_json::from_str(json).unwrap();
        let choice = &fragment.choices[0];
        assert_eq!(choice.role(), None);
        assert_eq!(choice.content(), Some(" parrot"));
        assert!(fragment.usage.is_none());
    }

    #[test]
    fn test_unrecognised_role_still_parses() {
        let json = r#"{"id":"chatcmpl-1","created":1,"choices":[
            {"index":0,"delta":{"role":"tool","content":"{}"}},
            {"index":1,"delta":{"role":"critic","content":"hmm"}}
        ]}"#;
        let fragment: ChatCompletions = serde_json::from_str(json).unwrap();
        assert_eq!(fragment.choices[0].role(), Some(ChatRole::Tool));
        assert_eq!(fragment.choices[1].role(), Some(ChatRole::Unknown));
        assert_eq!(fragment.choices[1].content(), Some("hmm"));
        assert_eq!(ChatRole::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_prompt_filter_fragment_has_no_choices() {
        let json = r#"{"id":"","object":"","created":0,"model":"","prompt_annotations":[],"choices":[]}"#;
        let fragment: ChatCompletions = serde_json::from_str(json).unwrap();
        assert!(fragment.choices.is_empty());
    }
}
