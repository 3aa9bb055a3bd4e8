//! Configuration Loader
//!
//! Reads the sample configuration from the process environment, optionally
//! seeded from a `.env` file.

use crate::config::endpoint::{KeyCredential, ServiceEndpoint, DEFAULT_API_VERSION};
use crate::error::{Result, SampleError};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_KEY_ENV: &str = "AZURE_OPENAI_KEY";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const API_VERSION_ENV: &str = "AZURE_OPENAI_API_VERSION";
pub const COMPLETIONS_DEPLOYMENT_ENV: &str = "AZURE_OPENAI_COMPLETIONS_DEPLOYMENT";
pub const CHAT_DEPLOYMENT_ENV: &str = "AZURE_OPENAI_CHAT_DEPLOYMENT";
pub const ASYNC_WAIT_ENV: &str = "OPENAI_SAMPLE_ASYNC_WAIT_SECS";
pub const TIMEOUT_ENV: &str = "OPENAI_SAMPLE_TIMEOUT_SECS";

pub const DEFAULT_COMPLETIONS_DEPLOYMENT: &str = "text-davinci-003";
pub const DEFAULT_CHAT_DEPLOYMENT: &str = "gpt-35-turbo";
pub const DEFAULT_ASYNC_WAIT: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything the sample needs to run
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Where to send requests and with which key
    pub endpoint: ServiceEndpoint,

    /// Deployment (or model) used for text completions
    pub completions_deployment: String,

    /// Deployment (or model) used for chat completions
    pub chat_deployment: String,

    /// Upper bound on how long each non-blocking step may run
    pub async_wait: Duration,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

/// Configuration loader over a key/value lookup
pub struct ConfigLoader {
    config: SampleConfig,
}

impl ConfigLoader {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        // A missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read variables from a specific `.env` file, falling back to the
    /// process environment for anything the file does not set
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            SampleError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut vars = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                SampleError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            vars.insert(key, value);
        }

        Self::from_lookup(|name| vars.get(name).cloned().or_else(|| std::env::var(name).ok()))
    }

    /// Build the configuration from an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint = match (get(AZURE_KEY_ENV), get(OPENAI_KEY_ENV)) {
            (Some(key), _) => {
                let url = get(ENDPOINT_ENV).ok_or_else(|| {
                    SampleError::Config(format!(
                        "{} is set but {} is missing",
                        AZURE_KEY_ENV, ENDPOINT_ENV
                    ))
                })?;
                let api_version =
                    get(API_VERSION_ENV).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
                ServiceEndpoint::azure(url, KeyCredential::new(key), api_version)
            }
            (None, Some(key)) => ServiceEndpoint::openai(KeyCredential::new(key), get(ENDPOINT_ENV)),
            (None, None) => {
                return Err(SampleError::Config(format!(
                    "No API key found. Set {} and {}, or {}",
                    AZURE_KEY_ENV, ENDPOINT_ENV, OPENAI_KEY_ENV
                )))
            }
        };

        let config = SampleConfig {
            endpoint,
            completions_deployment: get(COMPLETIONS_DEPLOYMENT_ENV)
                .unwrap_or_else(|| DEFAULT_COMPLETIONS_DEPLOYMENT.to_string()),
            chat_deployment: get(CHAT_DEPLOYMENT_ENV)
                .unwrap_or_else(|| DEFAULT_CHAT_DEPLOYMENT.to_string()),
            async_wait: parse_secs(ASYNC_WAIT_ENV, get(ASYNC_WAIT_ENV))?
                .unwrap_or(DEFAULT_ASYNC_WAIT),
            request_timeout: parse_secs(TIMEOUT_ENV, get(TIMEOUT_ENV))?
                .unwrap_or(DEFAULT_TIMEOUT),
        };

        Ok(Self { config })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> SampleConfig {
        self.config
    }
}

fn parse_secs(name: &str, value: Option<String>) -> Result<Option<Duration>> {
    value
        .map(|v| {
            v.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                SampleError::Config(format!("{} must be a whole number of seconds: {}", name, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::endpoint::ServiceFlavor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_azure_defaults() {
        let loader = ConfigLoader::from_lookup(lookup(&[
            (AZURE_KEY_ENV, "key"),
            (ENDPOINT_ENV, "https://res.openai.azure.com"),
        ]))
        .unwrap();

        let config = loader.config();
        assert_eq!(config.endpoint.base_url(), "https://res.openai.azure.com");
        assert_eq!(
            config.endpoint.flavor(),
            &ServiceFlavor::Azure {
                api_version: DEFAULT_API_VERSION.to_string()
            }
        );
        assert_eq!(config.completions_deployment, "text-davinci-003");
        assert_eq!(config.chat_deployment, "gpt-35-turbo");
        assert_eq!(config.async_wait, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = ConfigLoader::from_lookup(lookup(&[
            (AZURE_KEY_ENV, "key"),
            (ENDPOINT_ENV, "https://res.openai.azure.com"),
            (API_VERSION_ENV, "2024-02-01"),
            (COMPLETIONS_DEPLOYMENT_ENV, "my-instruct"),
            (CHAT_DEPLOYMENT_ENV, "my-chat"),
            (ASYNC_WAIT_ENV, "3"),
        ]))
        .unwrap()
        .into_config();

        assert_eq!(config.completions_deployment, "my-instruct");
        assert_eq!(config.chat_deployment, "my-chat");
        assert_eq!(config.async_wait, Duration::from_secs(3));
        assert!(config
            .endpoint
            .operation_url("my-chat", crate::config::Operation::ChatCompletions)
            .ends_with("api-version=2024-02-01"));
    }

    #[test]
    fn test_azure_key_without_endpoint() {
        let result = ConfigLoader::from_lookup(lookup(&[(AZURE_KEY_ENV, "key")]));
        assert!(matches!(result, Err(SampleError::Config(_))));
    }

    #[test]
    fn test_openai_fallback() {
        let config = ConfigLoader::from_lookup(lookup(&[(OPENAI_KEY_ENV, "sk-test"), (AZURE_KEY_ENV, "")]))
            .unwrap()
            .into_config();
        assert_eq!(config.endpoint.flavor(), &ServiceFlavor::OpenAi);
        assert_eq!(config.endpoint.base_url(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_missing_key() {
        assert!(ConfigLoader::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_bad_wait_value() {
        let result = ConfigLoader::from_lookup(lookup(&[
            (OPENAI_KEY_ENV, "sk-test"),
            (ASYNC_WAIT_ENV, "ten"),
        ]));
        assert!(matches!(result, Err(SampleError::Config(_))));
    }

    #[test]
    fn test_load_from_env_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "AZURE_OPENAI_KEY=file-key").unwrap();
        writeln!(file, "AZURE_OPENAI_ENDPOINT=https://file.openai.azure.com").unwrap();
        writeln!(file, "AZURE_OPENAI_CHAT_DEPLOYMENT=file-chat").unwrap();

        let config = ConfigLoader::from_path(file.path()).unwrap().into_config();
        assert_eq!(config.endpoint.base_url(), "https://file.openai.azure.com");
        assert_eq!(config.chat_deployment, "file-chat");
    }

    #[test]
    fn test_missing_env_file() {
        let result = ConfigLoader::from_path("/definitely/not/here/.env");
        assert!(matches!(result, Err(SampleError::Config(_))));
    }
}
