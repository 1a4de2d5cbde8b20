//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use uuid::Uuid;

use super::Transport;
use crate::config::Config;
use crate::errors::{error_message, SyncError};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP transport talking to the StudyHub REST backend.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| SyncError::Validation(format!("Invalid API token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the body, mapping non-success statuses to errors.
    /// An empty success body decodes as `null`.
    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<Value, SyncError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%method, path, request_id = %request_id, "Sending request");

        let response = request
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::debug!(%method, path, request_id = %request_id, status = status.as_u16(), "Request failed: {}", message);
            return Err(SyncError::from_status(status, message));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, SyncError> {
        let request = self.client.get(self.url(path)).query(query);
        self.send(Method::GET, path, request).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, SyncError> {
        let request = self.client.post(self.url(path)).json(&body);
        self.send(Method::POST, path, request).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, SyncError> {
        let request = self.client.put(self.url(path)).json(&body);
        self.send(Method::PUT, path, request).await
    }

    async fn delete(&self, path: &str) -> Result<(), SyncError> {
        let request = self.client.delete(self.url(path));
        self.send(Method::DELETE, path, request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let config = Config {
            api_url: "http://localhost:3001/api/".to_string(),
            ..Config::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/documents/doc1"),
            "http://localhost:3001/api/documents/doc1"
        );
    }

    #[test]
    fn test_rejects_unprintable_token() {
        let config = Config {
            api_token: Some("bad\ntoken".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            HttpTransport::new(&config),
            Err(SyncError::Validation(_))
        ));
    }
}
