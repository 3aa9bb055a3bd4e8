//! Client Builder
//!
//! Configures an endpoint and credential once and builds either client.

use crate::client::blocking::OpenAiClient;
use crate::client::http::HttpClient;
use crate::client::nonblocking::OpenAiAsyncClient;
use crate::config::endpoint::DEFAULT_API_VERSION;
use crate::config::loader::DEFAULT_TIMEOUT;
use crate::config::{KeyCredential, SampleConfig, ServiceEndpoint};
use crate::error::{Result, SampleError};
use std::time::Duration;
use tokio::runtime::Builder;

/// Workers on the non-blocking client's runtime
const ASYNC_WORKER_THREADS: usize = 2;

/// Builder for `OpenAiClient` and `OpenAiAsyncClient`
#[derive(Debug, Clone)]
pub struct OpenAiClientBuilder {
    endpoint: Option<String>,
    credential: Option<KeyCredential>,
    api_version: Option<String>,
    service: Option<ServiceEndpoint>,
    timeout: Duration,
}

impl Default for OpenAiClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            credential: None,
            api_version: None,
            service: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OpenAiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration
    pub fn from_config(config: &SampleConfig) -> Self {
        Self::new()
            .service_endpoint(config.endpoint.clone())
            .timeout(config.request_timeout)
    }

    /// Azure resource endpoint URL
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Azure key
    pub fn credential(mut self, credential: KeyCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Azure REST API version
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Use a fully resolved endpoint; takes precedence over the Azure setters
    pub fn service_endpoint(mut self, service: ServiceEndpoint) -> Self {
        self.service = Some(service);
        self
    }

    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the blocking client
    pub fn build_client(&self) -> Result<OpenAiClient> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SampleError::Internal(format!("Failed to create runtime: {}", e)))?;

        Ok(OpenAiClient::new(self.http_client()?, runtime))
    }

    /// Build the non-blocking client. It owns the runtime its callbacks run on.
    pub fn build_async_client(&self) -> Result<OpenAiAsyncClient> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(ASYNC_WORKER_THREADS)
            .thread_name("openai-async")
            .enable_all()
            .build()
            .map_err(|e| SampleError::Internal(format!("Failed to create runtime: {}", e)))?;

        Ok(OpenAiAsyncClient::new(self.http_client()?, runtime))
    }

    fn http_client(&self) -> Result<HttpClient> {
        HttpClient::new(self.resolve()?, self.timeout)
    }

    fn resolve(&self) -> Result<ServiceEndpoint> {
        if let Some(service) = &self.service {
            return Ok(service.clone());
        }

        let endpoint = self
            .endpoint
            .clone()
            .ok_or_else(|| SampleError::Config("An endpoint is required".to_string()))?;
        let credential = self
            .credential
            .clone()
            .ok_or_else(|| SampleError::Config("A credential is required".to_string()))?;
        let api_version = self
            .api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Ok(ServiceEndpoint::azure(endpoint, credential, api_version))
    }
}
