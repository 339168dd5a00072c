// nichegen/src/client/transport.rs

//! The HTTP seam of the API client.

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;

/// One GET request, fully described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
  /// The endpoint name relative to the API host, e.g. `search`.
  pub endpoint: String,
  pub url: String,
  pub headers: Vec<(String, String)>,
  pub query: Vec<(String, String)>,
}

impl ApiRequest {
  pub fn query_value(&self, key: &str) -> Option<&str> {
    self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }
}

/// Performs a single attempt of an API request. Retrying is the caller's job.
#[async_trait]
pub trait ApiTransport: Send + Sync {
  async fn get_json(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

/// `reqwest`-backed transport used against the real API.
#[derive(Clone)]
pub struct ReqwestTransport {
  client: Client,
}

impl ReqwestTransport {
  pub fn new(timeout: Duration) -> Result<Self, ApiError> {
    let client = ClientBuilder::new().timeout(timeout).gzip(true).build()?;
    Ok(Self { client })
  }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
  async fn get_json(&self, request: &ApiRequest) -> Result<Value, ApiError> {
    let mut builder = self.client.get(&request.url).query(&request.query);
    for (name, value) in &request.headers {
      builder = builder.header(name.as_str(), value.as_str());
    }

    let response = builder.send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Status { status });
    }
    Ok(response.json::<Value>().await?)
  }
}
