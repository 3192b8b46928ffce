use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::{apply_scope, ParamValue, QueryParams, RemoteClient};
use crate::associations::{inference, Scope};
use crate::config::RemoteConfig;
use crate::entity::{json_kind, RemoteEntity};
use crate::error::{RemoteError, RemoteResult};

/// `RemoteClient` for a REST resource API using reqwest
#[derive(Clone)]
pub struct HttpRemoteClient {
    config: RemoteConfig,
    client: Client,
}

impl HttpRemoteClient {
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(Self::build_headers(&config)?)
            .build()
            .map_err(|e| {
                RemoteError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn build_headers(config: &RemoteConfig) -> RemoteResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| RemoteError::configuration(format!("Invalid API token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                RemoteError::configuration(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                RemoteError::configuration(format!("Invalid value for header '{}': {}", name, e))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// `{base_url}/{collection}{.ext}`
    fn collection_url(&self, target_type: &str) -> String {
        let mut url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            inference::collection_name_for(target_type)
        );
        if let Some(ext) = &self.config.format_extension {
            url.push('.');
            url.push_str(ext.trim_start_matches('.'));
        }
        url
    }

    fn decode_collection(target_type: &str, body: JsonValue) -> RemoteResult<Vec<RemoteEntity>> {
        match body {
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| RemoteEntity::from_json(target_type, item))
                .collect(),
            JsonValue::Object(_) => Ok(vec![RemoteEntity::from_json(target_type, body)?]),
            other => Err(RemoteError::decode(format!(
                "expected an array or object of '{}', got {}",
                target_type,
                json_kind(&other)
            ))),
        }
    }
}

/// Flatten params Rails-style: sets become repeated `key[]=value` pairs
pub fn query_pairs(params: &QueryParams) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            ParamValue::Scalar(value) => pairs.push((key.clone(), value.to_string())),
            ParamValue::Set(values) => {
                let key = format!("{}[]", key);
                pairs.extend(values.iter().map(|value| (key.clone(), value.to_string())));
            }
        }
    }
    pairs
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn fetch(
        &self,
        target_type: &str,
        scope: Scope,
        params: &QueryParams,
    ) -> RemoteResult<Vec<RemoteEntity>> {
        let url = self.collection_url(target_type);
        debug!("GET {} (scope: {}, {} params)", url, scope, params.len());

        let response = self
            .client
            .get(&url)
            .query(&query_pairs(params))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::not_found(target_type));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                resource: target_type.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body: JsonValue = response.json().await?;
        let entities = Self::decode_collection(target_type, body)?;
        Ok(apply_scope(scope, entities))
    }
}
