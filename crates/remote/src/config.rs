//! Remote client and batch loading configuration

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// HTTP remote resource API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the resource API, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Bearer token sent as `Authorization`
    pub api_token: Option<String>,
    pub user_agent: String,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Appended to collection paths, e.g. `json` -> `/profiles.json`
    pub format_extension: Option<String>,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
            api_token: None,
            user_agent: format!("elif-remote/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
            format_extension: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("REMOTE_API_URL").map_err(|_| ConfigError::MissingRequired {
            field: "base_url".to_string(),
            hint: "REMOTE_API_URL environment variable is required".to_string(),
        })?;

        let mut config = Self::new(base_url);

        if let Ok(timeout) = env::var("REMOTE_API_TIMEOUT") {
            config.timeout_secs = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                field: "timeout_secs".to_string(),
                value: timeout,
                expected: "a number of seconds".to_string(),
            })?;
        }

        config.api_token = env::var("REMOTE_API_TOKEN").ok();

        if let Ok(user_agent) = env::var("REMOTE_API_USER_AGENT") {
            config.user_agent = user_agent;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|_| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            value: self.base_url.clone(),
            expected: "an absolute URL".to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.base_url.clone(),
                expected: "an http or https URL".to_string(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".to_string(),
                value: "0".to_string(),
                expected: "a timeout greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_format_extension(mut self, extension: impl Into<String>) -> Self {
        self.format_extension = Some(extension.into());
        self
    }
}

/// Configuration for batch resolution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Split the key set into requests of at most this many keys.
    /// `None` sends every key for an association in one request.
    pub max_batch_size: Option<usize>,
    /// Fetch requested associations concurrently
    pub parallel_execution: bool,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size.max(1));
        self
    }

    pub fn with_parallel_execution(mut self, parallel: bool) -> Self {
        self.parallel_execution = parallel;
        self
    }

    /// Effective chunk size; a zero size set outside the builder means unchunked
    pub fn chunk_size(&self) -> Option<usize> {
        self.max_batch_size.filter(|size| *size > 0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_batch_size".to_string(),
                value: "0".to_string(),
                expected: "a batch size greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
