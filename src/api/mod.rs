//! API Module
//!
//! Completions and chat completions wire types, plus streaming support.

pub mod chat;
pub mod completion;
pub mod streaming;

pub use chat::{
    ChatChoice, ChatCompletions, ChatCompletionsOptions, ChatMessage, ChatMessageDelta, ChatRole,
};
pub use completion::{Choice, Completions, CompletionsOptions, CompletionsUsage};
pub use streaming::{parse_sse_line, Fragment, SseEvent, Transcript};
