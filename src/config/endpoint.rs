//! Service Endpoint
//!
//! Where requests go and how they are authenticated.

use crate::error::{Result, SampleError};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use std::fmt;

/// Default Azure OpenAI REST API version
pub const DEFAULT_API_VERSION: &str = "2023-05-15";

/// Base URL of the public OpenAI API
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// An opaque API key. Never shown in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyCredential(String);

impl KeyCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyCredential(****)")
    }
}

/// Which flavor of the service the endpoint speaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceFlavor {
    /// Azure OpenAI: deployment in the path, `api-key` header, `api-version` query
    Azure { api_version: String },

    /// Public OpenAI: model in the body, bearer token
    OpenAi,
}

/// Operations the sample calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Completions,
    ChatCompletions,
}

impl Operation {
    fn path(self) -> &'static str {
        match self {
            Operation::Completions => "completions",
            Operation::ChatCompletions => "chat/completions",
        }
    }
}

/// Endpoint URL plus credential
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    base_url: String,
    credential: KeyCredential,
    flavor: ServiceFlavor,
}

impl ServiceEndpoint {
    /// An Azure OpenAI resource endpoint
    pub fn azure(
        base_url: impl Into<String>,
        credential: KeyCredential,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
            flavor: ServiceFlavor::Azure {
                api_version: api_version.into(),
            },
        }
    }

    /// The public OpenAI API, optionally at a custom base URL
    pub fn openai(credential: KeyCredential, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            credential,
            flavor: ServiceFlavor::OpenAi,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn flavor(&self) -> &ServiceFlavor {
        &self.flavor
    }

    /// Full URL for an operation against a deployment (Azure) or model (OpenAI)
    pub fn operation_url(&self, deployment: &str, operation: Operation) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.flavor {
            ServiceFlavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                base,
                deployment,
                operation.path(),
                api_version
            ),
            ServiceFlavor::OpenAi => format!("{}/{}", base, operation.path()),
        }
    }

    /// Model name to put in the request body, if the flavor wants one
    pub fn body_model(&self, deployment: &str) -> Option<String> {
        match self.flavor {
            ServiceFlavor::Azure { .. } => None,
            ServiceFlavor::OpenAi => Some(deployment.to_string()),
        }
    }

    /// The authentication header for every request
    pub fn auth_header(&self) -> Result<(HeaderName, HeaderValue)> {
        let (name, value) = match self.flavor {
            ServiceFlavor::Azure { .. } => (
                HeaderName::from_static("api-key"),
                HeaderValue::from_str(self.credential.key()),
            ),
            ServiceFlavor::OpenAi => (
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.credential.key())),
            ),
        };

        let mut value =
            value.map_err(|e| SampleError::Config(format!("Invalid API key format: {}", e)))?;
        value.set_sensitive(true);
        Ok((name, value))
    }
}
