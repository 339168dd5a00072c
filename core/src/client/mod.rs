// nichegen/src/client/mod.rs

//! Client for the RapidAPI product endpoints.
//!
//! `ApiClient::call` owns the retry policy: one attempt plus up to
//! `max_retries` retries, a fixed `retry_delay` between attempts, and no
//! distinction between error kinds. The HTTP work and the pause are injected
//! through [`ApiTransport`] and [`Delay`].

pub mod delay;
pub mod transport;

pub use delay::{Delay, TokioDelay};
pub use transport::{ApiRequest, ApiTransport, ReqwestTransport};

use crate::config::GeneratorConfig;
use crate::envelope::{self, RawProduct, ResponseEnvelope};
use crate::error::ApiError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub const SEARCH_ENDPOINT: &str = "search";
pub const PRODUCT_ENDPOINT: &str = "product";

pub struct ApiClient {
  transport: Arc<dyn ApiTransport>,
  delay: Arc<dyn Delay>,
  headers: Vec<(String, String)>,
  api_host: String,
  region: String,
  max_retries: u32,
  retry_delay: Duration,
}

impl ApiClient {
  /// Client talking to the real API over `reqwest`.
  pub fn from_config(config: &GeneratorConfig) -> Result<Self, ApiError> {
    let transport = ReqwestTransport::new(config.request_timeout)?;
    Ok(Self::with_parts(config, Arc::new(transport), Arc::new(TokioDelay)))
  }

  pub fn with_parts(config: &GeneratorConfig, transport: Arc<dyn ApiTransport>, delay: Arc<dyn Delay>) -> Self {
    Self {
      transport,
      delay,
      headers: vec![
        ("X-RapidAPI-Key".to_string(), config.api_key.clone()),
        ("X-RapidAPI-Host".to_string(), config.api_host.clone()),
      ],
      api_host: config.api_host.clone(),
      region: config.region.clone(),
      max_retries: config.max_retries,
      retry_delay: config.retry_delay,
    }
  }

  fn request(&self, endpoint: &str, params: &[(&str, String)]) -> ApiRequest {
    ApiRequest {
      endpoint: endpoint.to_string(),
      url: format!("https://{}/{}", self.api_host, endpoint),
      headers: self.headers.clone(),
      query: params.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect(),
    }
  }

  /// GETs `endpoint` with `params`, retrying any failure.
  ///
  /// `Err(ApiError::RetriesExhausted)` is the "no data" outcome; an `Ok` body
  /// may still be empty.
  #[instrument(name = "ApiClient::call", skip(self, params))]
  pub async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
    let request = self.request(endpoint, params);
    let mut retries_done: u32 = 0;

    loop {
      match self.transport.get_json(&request).await {
        Ok(body) => {
          debug!(attempt = retries_done + 1, "API call succeeded.");
          return Ok(body);
        }
        Err(e) if retries_done < self.max_retries => {
          retries_done += 1;
          warn!("API call failed, retrying ({}/{}): {}", retries_done, self.max_retries, e);
          self.delay.pause(self.retry_delay).await;
        }
        Err(e) => {
          error!("API call failed after {} retries: {}", self.max_retries, e);
          return Err(ApiError::RetriesExhausted {
            endpoint: endpoint.to_string(),
            retries: self.max_retries,
            last_error: Box::new(e),
          });
        }
      }
    }
  }

  /// Searches products by keyword. Any failure is logged and yields an empty list.
  #[instrument(name = "ApiClient::search_products", skip(self))]
  pub async fn search_products(&self, keyword: &str, limit: usize) -> Vec<RawProduct> {
    info!("Searching for products: {}", keyword);
    let params = [
      ("q", keyword.to_string()),
      ("domain", self.region.clone()),
      ("limit", limit.to_string()),
    ];

    let body = match self.call(SEARCH_ENDPOINT, &params).await {
      Ok(body) => body,
      Err(e) => {
        error!(error = %e, "No data returned from search API for keyword: {}", keyword);
        return Vec::new();
      }
    };

    let envelope = ResponseEnvelope::classify(body);
    debug!(envelope = envelope.variant_name(), "Search response classified.");
    let products = envelope.into_products();
    info!("Found {} products for {}", products.len(), keyword);
    products
  }

  /// Fetches the full record for one ASIN, or `None` when nothing usable came back.
  #[instrument(name = "ApiClient::product_details", skip(self))]
  pub async fn product_details(&self, asin: &str) -> Option<RawProduct> {
    info!("Fetching details for ASIN: {}", asin);
    let params = [("asin", asin.to_string()), ("domain", self.region.clone())];

    match self.call(PRODUCT_ENDPOINT, &params).await {
      Ok(body) => {
        let detail = envelope::extract_product_detail(body);
        if detail.is_none() {
          warn!("Unusable detail response for ASIN: {}", asin);
        }
        detail
      }
      Err(e) => {
        warn!(error = %e, "No data returned for ASIN: {}", asin);
        None
      }
    }
  }
}
