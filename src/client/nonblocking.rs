//! Non-blocking Client
//!
//! Calls return a `Publisher` straight away. Nothing is sent until the
//! publisher is subscribed; the work then runs on the client's runtime.

use crate::api::{ChatCompletions, ChatCompletionsOptions, Completions, CompletionsOptions};
use crate::client::http::HttpClient;
use crate::client::publisher::Publisher;
use crate::client::AsyncCompletionsApi;
use futures::stream::{self, TryStreamExt};
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};

/// Non-blocking client
pub struct OpenAiAsyncClient {
    http: HttpClient,
    runtime: Arc<Runtime>,
}

impl OpenAiAsyncClient {
    pub(crate) fn new(http: HttpClient, runtime: Runtime) -> Self {
        Self {
            http,
            runtime: Arc::new(runtime),
        }
    }

    fn executor(&self) -> Handle {
        self.runtime.handle().clone()
    }
}

impl AsyncCompletionsApi for OpenAiAsyncClient {
    fn get_completions(&self, deployment: &str, options: CompletionsOptions) -> Publisher<Completions> {
        let http = self.http.clone();
        let (url, body) = http.completions_request(deployment, options, false);
        Publisher::from_future(self.executor(), async move { http.post_json(&url, &body).await })
    }

    fn get_completions_stream(
        &self,
        deployment: &str,
        options: CompletionsOptions,
    ) -> Publisher<Completions> {
        let http = self.http.clone();
        let (url, body) = http.completions_request(deployment, options, true);
        let fragments = stream::once(async move { http.post_stream(&url, &body).await }).try_flatten();
        Publisher::from_stream(self.executor(), fragments)
    }

    fn get_chat_completions(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Publisher<ChatCompletions> {
        let http = self.http.clone();
        let (url, body) = http.chat_request(deployment, options, false);
        Publisher::from_future(self.executor(), async move { http.post_json(&url, &body).await })
    }

    fn get_chat_completions_stream(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Publisher<ChatCompletions> {
        let http = self.http.clone();
        let (url, body) = http.chat_request(deployment, options, true);
        let fragments = stream::once(async move { http.post_stream(&url, &body).await }).try_flatten();
        Publisher::from_stream(self.executor(), fragments)
    }
}
