//! OpenAI Client Sample
//!
//! Exercises text and chat completions against an Azure OpenAI (or plain
//! OpenAI) endpoint through a blocking and a non-blocking client, each in
//! streaming and non-streaming form.
//!
//! The binary runs all eight variants in a fixed order; the library exposes
//! the pieces so each variant can be driven on its own.

pub mod api;
pub mod client;
pub mod config;
pub mod demo;
pub mod error;

pub use api::{
    ChatCompletions, ChatCompletionsOptions, ChatMessage, ChatRole, Completions, CompletionsOptions,
    CompletionsUsage, Transcript,
};
pub use client::{
    AsyncCompletionsApi, CompletionsApi, IterableStream, OpenAiAsyncClient, OpenAiClient,
    OpenAiClientBuilder, Publisher, Subscription,
};
pub use config::{ConfigLoader, KeyCredential, SampleConfig, ServiceEndpoint};
pub use demo::{Console, DemoRunner, DemoSettings, DemoStep, RunSummary, StepOutcome};
pub use error::{Result, SampleError};
