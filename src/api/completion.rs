//! Text Completion API
//!
//! Request and response types for the legacy completions endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text completion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionsOptions {
    /// Prompts to complete
    pub prompt: Vec<String>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Number of choices to generate per prompt
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

    /// Model name (only sent to the public OpenAI API; Azure uses the deployment path)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CompletionsOptions {
    /// Create a new completion request
    pub fn new(prompt: Vec<String>) -> Self {
        Self {
            prompt,
            ..Default::default()
        }
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Enable streaming
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = Some(stream);
        self
    }
}

/// Text completion response, or one fragment of a streamed one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completions {
    /// Response ID
    pub id: String,

    /// Creation timestamp (Unix seconds)
    pub created: u64,

    /// Response choices, in service order
    pub choices: Vec<Choice>,

    /// Token usage (absent on most streamed fragments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionsUsage>,
}

impl Completions {
    /// Creation time as a UTC timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        created_at(self.created)
    }
}

/// A choice in a text completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Choice index
    pub index: u32,

    /// Generated text
    #[serde(default)]
    pub text: String,

    /// Finish reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionsUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,

    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens
    pub total_tokens: u32,
}

pub(crate) fn created_at(created: u64) -> Option<DateTime<Utc>> {
    i64::try_from(created)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
