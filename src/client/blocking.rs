//! Blocking Client
//!
//! Every call suspends the calling thread until the response, or the next
//! streamed fragment, is available.

use crate::api::{ChatCompletions, ChatCompletionsOptions, Completions, CompletionsOptions};
use crate::client::http::HttpClient;
use crate::client::CompletionsApi;
use crate::error::Result;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Lazy, forward-only sequence of streamed fragments
pub struct IterableStream<T> {
    inner: Box<dyn Iterator<Item = Result<T>> + Send>,
}

impl<T> IterableStream<T> {
    /// Wrap any iterator of fragments
    pub fn new<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = Result<T>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Box::new(fragments.into_iter()),
        }
    }
}

impl<T: Send + 'static> IterableStream<T> {
    /// Drive an async stream one element per `next()` call
    pub(crate) fn blocking(mut stream: BoxStream<'static, Result<T>>, runtime: Arc<Runtime>) -> Self {
        Self::new(std::iter::from_fn(move || runtime.block_on(stream.next())))
    }
}

impl<T> Iterator for IterableStream<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Blocking client
pub struct OpenAiClient {
    http: HttpClient,
    runtime: Arc<Runtime>,
}

impl OpenAiClient {
    pub(crate) fn new(http: HttpClient, runtime: Runtime) -> Self {
        Self {
            http,
            runtime: Arc::new(runtime),
        }
    }

    fn stream<R>(&self, stream: Result<BoxStream<'static, Result<R>>>) -> Result<IterableStream<R>>
    where
        R: Send + 'static,
    {
        Ok(IterableStream::blocking(stream?, self.runtime.clone()))
    }
}

impl CompletionsApi for OpenAiClient {
    fn get_completions(&self, deployment: &str, options: CompletionsOptions) -> Result<Completions> {
        let (url, body) = self.http.completions_request(deployment, options, false);
        self.runtime.block_on(self.http.post_json(&url, &body))
    }

    fn get_completions_stream(
        &self,
        deployment: &str,
        options: CompletionsOptions,
    ) -> Result<IterableStream<Completions>> {
        let (url, body) = self.http.completions_request(deployment, options, true);
        self.stream(self.runtime.block_on(self.http.post_stream(&url, &body)))
    }

    fn get_chat_completions(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Result<ChatCompletions> {
        let (url, body) = self.http.chat_request(deployment, options, false);
        self.runtime.block_on(self.http.post_json(&url, &body))
    }

    fn get_chat_completions_stream(
        &self,
        deployment: &str,
        options: ChatCompletionsOptions,
    ) -> Result<IterableStream<ChatCompletions>> {
        let (url, body) = self.http.chat_request(deployment, options, true);
        self.stream(self.runtime.block_on(self.http.post_stream(&url, &body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatMessage, ChatRole};
    use crate::client::OpenAiClientBuilder;
    use crate::config::KeyCredential;
    use crate::error::SampleError;
    use mockito::Matcher;

    const COMPLETIONS_BODY: &str = r#"{
        "id": "cmpl-1",
        "object": "text_completion",
        "created": 1686617332,
        "model": "text-davinci-003",
        "choices": [{"text": "Because", "index": 0, "finish_reason": "stop", "logprobs": null}],
        "usage": {"completion_tokens": 1, "prompt_tokens": 12, "total_tokens": 13}
    }"#;

    fn client_for(server: &mockito::Server) -> OpenAiClient {
        OpenAiClientBuilder::new()
            .endpoint(server.url())
            .credential(KeyCredential::new("test-key"))
            .api_version("2023-05-15")
            .build_client()
            .unwrap()
    }

    #[test]
    fn test_get_completions() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/openai/deployments/text-davinci-003/completions")
            .match_query(Matcher::UrlEncoded("api-version".into(), "2023-05-15".into()))
            .match_header("api-key", "test-key")
            .match_body(Matcher::Json(serde_json::json!({"prompt": ["Why?"]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(COMPLETIONS_BODY)
            .create();

        let client = client_for(&server);
        let completions = client
            .get_completions("text-davinci-003", CompletionsOptions::new(vec!["Why?".to_string()]))
            .unwrap();

        mock.assert();
        assert_eq!(completions.id, "cmpl-1");
        assert_eq!(completions.choices[0].text, "Because");
    }

    #[test]
    fn test_get_chat_completions_stream() {
        let body = concat!(
            "data: {\"id\":\"\",\"created\":0,\"choices\":[]}\n\n",
            "data: {\"id\":\"chatcmpl-1\",\"created\":2,\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"id\":\"chatcmpl-1\",\"created\":2,\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Arr\"}}]}\n\n",
            "data: [DONE]\n\n"
        );

        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/openai/deployments/gpt-35-turbo/chat/completions")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({"stream": true})))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create();

        let client = client_for(&server);
        let options = ChatCompletionsOptions::new(vec![ChatMessage::user("Ahoy")]);
        let fragments: Vec<ChatCompletions> = client
            .get_chat_completions_stream("gpt-35-turbo", options)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        mock.assert();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[1].choices[0].role(), Some(ChatRole::Assistant));
        assert_eq!(fragments[2].choices[0].content(), Some("Arr"));
    }

    #[test]
    fn test_unauthorized_maps_to_auth_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"code":"401","message":"Access denied"}}"#)
            .create();

        let client = client_for(&server);
        let result = client.get_chat_completions("gpt-35-turbo", ChatCompletionsOptions::default());
        assert!(matches!(result, Err(SampleError::Auth(m)) if m == "Access denied"));
    }

    #[test]
    fn test_stream_error_status_fails_the_call() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":"DeploymentNotFound","message":"The API deployment for this resource does not exist."}}"#)
            .create();

        let client = client_for(&server);
        let result = client.get_completions_stream("missing", CompletionsOptions::default());
        assert!(matches!(result, Err(SampleError::Service { status: 404, .. })));
    }

    #[test]
    fn test_iterable_stream_from_vec() {
        let stream = IterableStream::new(vec![Ok(1), Ok(2)]);
        let values: Vec<u32> = stream.map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![1, 2]);
    }
}
