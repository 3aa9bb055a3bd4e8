//! HTTP Client
//!
//! Async HTTP plumbing shared by the blocking and non-blocking clients:
//! JSON round trips and Server-Sent Events streams. No retries.

use crate::api::{parse_sse_line, ChatCompletionsOptions, CompletionsOptions, SseEvent};
use crate::config::{Operation, ServiceEndpoint};
use crate::error::{Result, SampleError};
use async_stream::stream;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP client bound to one service endpoint
#[derive(Clone)]
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,

    /// Where requests go and how they authenticate
    endpoint: Arc<ServiceEndpoint>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| SampleError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: Arc::new(endpoint),
        })
    }

    /// URL and body for a text completions call
    pub fn completions_request(
        &self,
        deployment: &str,
        mut options: CompletionsOptions,
        stream: bool,
    ) -> (String, CompletionsOptions) {
        options.stream = stream.then_some(true);
        options.model = self.endpoint.body_model(deployment);
        (
            self.endpoint.operation_url(deployment, Operation::Completions),
            options,
        )
    }

    /// URL and body for a chat completions call
    pub fn chat_request(
        &self,
        deployment: &str,
        mut options: ChatCompletionsOptions,
        stream: bool,
    ) -> (String, ChatCompletionsOptions) {
        options.stream = stream.then_some(true);
        options.model = self.endpoint.body_model(deployment);
        (
            self.endpoint.operation_url(deployment, Operation::ChatCompletions),
            options,
        )
    }

    fn headers(&self, accept: &'static str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(accept));

        let (name, value) = self.endpoint.auth_header()?;
        headers.insert(name, value);
        Ok(headers)
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json<T, R>(&self, url: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(url, "POST");

        let response = self
            .client
            .post(url)
            .headers(self.headers("application/json")?)
            .json(body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            SampleError::Response(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                truncate(&body, 500)
            ))
        })
    }

    /// POST a JSON body and decode the SSE response as a stream of fragments
    pub async fn post_stream<T, R>(&self, url: &str, body: &T) -> Result<BoxStream<'static, Result<R>>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned + Send + 'static,
    {
        debug!(url, "POST (stream)");

        let response = self
            .client
            .post(url)
            .headers(self.headers("text/event-stream")?)
            .json(body)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(sse_events(response.bytes_stream()).boxed())
    }
}

/// Split a byte stream into SSE lines and decode each `data:` payload.
/// Ends at `[DONE]`, at end of body, or after the first error.
fn sse_events<S, R>(bytes: S) -> impl futures::Stream<Item = Result<R>> + Send
where
    S: futures::Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    R: DeserializeOwned + Send + 'static,
{
    stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        let mut finished = false;

        while !finished {
            match bytes.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    yield Err(SampleError::from(e));
                    break;
                }
                None => {
                    // Flush a last line that had no trailing newline
                    if !buffer.is_empty() {
                        buffer.push(b'\n');
                    }
                    finished = true;
                }
            }

            while let Some(line) = take_line(&mut buffer) {
                match parse_sse_line::<R>(&line) {
                    Ok(Some(SseEvent::Data(fragment))) => {
                        yield Ok(fragment);
                    }
                    Ok(Some(SseEvent::Done)) => {
                        finished = true;
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        finished = true;
                        break;
                    }
                }
            }
        }
    }
}

/// Remove and return the next complete line from the buffer
fn take_line(buffer: &mut Vec<u8>) -> Option<String> {
    let end = buffer.iter().position(|b| *b == b'\n')?;
    let line: Vec<u8> = buffer.drain(..=end).collect();
    Some(String::from_utf8_lossy(&line).into_owned())
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-success response into an error
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

fn error_for_status(status: StatusCode, body: &str) -> SampleError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| truncate(body, 500).to_string());

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return SampleError::Auth(message);
    }

    SampleError::Service {
        status: status.as_u16(),
        message,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
