//! Streaming Support
//!
//! Server-Sent Events parsing and reassembly of streamed fragments.

use crate::api::chat::ChatCompletions;
use crate::api::completion::{Completions, CompletionsUsage};
use crate::error::{Result, SampleError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One meaningful SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent<T> {
    /// A `data:` payload
    Data(T),

    /// The `data: [DONE]` terminator
    Done,
}

#[derive(Deserialize)]
struct ErrorFrame {
    error: ErrorFrameBody,
}

#[derive(Deserialize)]
struct ErrorFrameBody {
    message: String,
}

/// Parse an SSE line into an event
///
/// Blank lines, comments and non-`data` fields yield `None`.
pub fn parse_sse_line<T: DeserializeOwned>(line: &str) -> Result<Option<SseEvent<T>>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(None);
    }

    if let Some(data) = line.strip_prefix("data:") {
        let data = data.trim();

        if data == "[DONE]" {
            return Ok(Some(SseEvent::Done));
        }

        // The service reports mid-stream failures as an error envelope
        if let Ok(frame) = serde_json::from_str::<ErrorFrame>(data) {
            return Err(SampleError::Stream(frame.error.message));
        }

        let chunk: T = serde_json::from_str(data).map_err(|e| {
            SampleError::Stream(format!("Failed to parse SSE chunk: {}. Data: {}", e, data))
        })?;

        return Ok(Some(SseEvent::Data(chunk)));
    }

    // event:, id:, retry:
    Ok(None)
}

/// Anything that carries per-choice text and optional usage
pub trait Fragment {
    fn id(&self) -> &str;

    fn usage(&self) -> Option<&CompletionsUsage>;

    /// `(choice index, text)` pairs in service order
    fn texts(&self) -> Vec<(u32, &str)>;
}

impl Fragment for Completions {
    fn id(&self) -> &str {
        &self.id
    }

    fn usage(&self) -> Option<&CompletionsUsage> {
        self.usage.as_ref()
    }

    fn texts(&self) -> Vec<(u32, &str)> {
        self.choices
            .iter()
            .map(|c| (c.index, c.text.as_str()))
            .collect()
    }
}

impl Fragment for ChatCompletions {
    fn id(&self) -> &str {
        &self.id
    }

    fn usage(&self) -> Option<&CompletionsUsage> {
        self.usage.as_ref()
    }

    fn texts(&self) -> Vec<(u32, &str)> {
        self.choices
            .iter()
            .filter_map(|c| c.content().map(|text| (c.index, text)))
            .collect()
    }
}

/// Accumulated text of a call, one entry per choice index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    id: Option<String>,
    choices: BTreeMap<u32, String>,
    usage: Option<CompletionsUsage>,
    fragments: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one response or fragment into the transcript
    pub fn record<F: Fragment>(&mut self, fragment: &F) {
        self.fragments += 1;

        // Some services open the stream with an anonymous fragment
        if self.id.is_none() && !fragment.id().is_empty() {
            self.id = Some(fragment.id().to_string());
        }

        if let Some(usage) = fragment.usage() {
            self.usage = Some(*usage);
        }

        for (index, text) in fragment.texts() {
            self.choices.entry(index).or_default().push_str(text);
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Full text for a choice
    pub fn text(&self, index: u32) -> Option<&str> {
        self.choices.get(&index).map(String::as_str)
    }

    /// Last usage block seen
    pub fn usage(&self) -> Option<&CompletionsUsage> {
        self.usage.as_ref()
    }

    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    /// Number of responses or fragments recorded
    pub fn fragments(&self) -> usize {
        self.fragments
    }
}
