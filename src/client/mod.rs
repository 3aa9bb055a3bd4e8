//! Client Module
//!
//! The two calling conventions the sample exercises, and the HTTP-backed
//! clients that implement them.

pub mod blocking;
pub mod builder;
pub mod http;
pub mod nonblocking;
pub mod publisher;

pub use blocking::{IterableStream, OpenAiClient};
pub use builder::OpenAiClientBuilder;
pub use http::HttpClient;
pub use nonblocking::OpenAiAsyncClient;
pub use publisher::{Publisher, Signal, Signals, Subscription};

use crate::api::{ChatCompletions, ChatCompletionsOptions, Completions, CompletionsOptions};
use crate::error::Result;

/// Blocking calling convention
pub trait CompletionsApi {
    /// Full text completion
    fn get_completions(&self, deployment: &str, options: CompletionsOptions) -> Result<Completions>;

    /// Streamed text completion; each `next()` blocks for one fragment
    fn get_completions_stream(
        &self,
        deployment: &str,
        options: CompletionsOptions,
    ) -> Result<IterableStream<Completions>>;

    /// Full chat completion
    fn get_chat_completions(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Result<ChatCompletions>;

    /// Streamed chat completion
    fn get_chat_completions_stream(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Result<IterableStream<ChatCompletions>>;
}

/// Non-blocking calling convention. Every call returns at once; failures
/// arrive through the subscriber's error callback.
pub trait AsyncCompletionsApi {
    fn get_completions(&self, deployment: &str, options: CompletionsOptions) -> Publisher<Completions>;

    fn get_completions_stream(
        &self,
        deployment: &str,
        options: CompletionsOptions,
    ) -> Publisher<Completions>;

    fn get_chat_completions(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Publisher<ChatCompletions>;

    fn get_chat_completions_stream(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Publisher<ChatCompletions>;
}
