use crate::config::ServiceConfig;
use crate::domain::model::Expression;
use crate::domain::ports::ComputeService;
use crate::utils::error::{EvalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP implementation of [`ComputeService`]: POSTs the serialized expression
/// to the evaluation endpoint and decodes the JSON reply.
#[derive(Debug, Clone)]
pub struct HttpComputeService {
    client: Client,
    endpoint: String,
    headers: Option<HashMap<String, String>>,
    timeout: Option<Duration>,
}

impl HttpComputeService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            headers: None,
            timeout: None,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            headers: config.headers.clone(),
            timeout: config.timeout_seconds.map(Duration::from_secs),
        }
    }
}

#[async_trait]
impl ComputeService for HttpComputeService {
    async fn get_info(&self, expr: &Expression) -> Result<Value> {
        let mut request = self.client.post(&self.endpoint).json(expr.as_json());

        if let Some(headers) = &self.headers {
            for (key, value) in headers {
                request = request.header(key.as_str(), value.as_str());
            }
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Sending evaluate request to: {}", self.endpoint);
        let response = request.send().await?;
        tracing::debug!("Evaluate response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            // keep the body verbatim so callers can classify the failure
            let message = response.text().await.unwrap_or_default();
            return Err(EvalError::ServiceError {
                message: format!("evaluate request failed with status {}: {}", status, message),
            });
        }

        Ok(response.json().await?)
    }
}
