// nichegen/src/config.rs

use crate::error::{GenError, GenResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "amazon-real-time-api.p.rapidapi.com";
pub const DEFAULT_AFFILIATE_TAG: &str = "scconnec0d-20";
pub const DEFAULT_REGION: &str = "US";

/// Everything a generation run needs, built once at startup and passed down
/// by reference. No component reads the process environment on its own.
#[derive(Clone)]
pub struct GeneratorConfig {
  pub api_key: String,
  pub api_host: String,
  pub affiliate_tag: String,
  /// Marketplace passed as the `domain` query parameter.
  pub region: String,

  pub niches_path: PathBuf,
  pub template_path: PathBuf,
  pub output_dir: PathBuf,

  /// Retries after the first failed attempt of an API call.
  pub max_retries: u32,
  pub retry_delay: Duration,
  pub request_timeout: Duration,

  /// `limit` sent to the search endpoint.
  pub search_limit: usize,
  /// Candidates considered per niche, regardless of how many the API returned.
  pub max_products: usize,
  /// Pause after every candidate product, to stay under upstream rate limits.
  pub product_delay: Duration,
}

impl GeneratorConfig {
  /// Defaults for everything except the API key.
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key: api_key.into(),
      api_host: DEFAULT_API_HOST.to_string(),
      affiliate_tag: DEFAULT_AFFILIATE_TAG.to_string(),
      region: DEFAULT_REGION.to_string(),
      niches_path: PathBuf::from("niches.csv"),
      template_path: PathBuf::from("template.html"),
      output_dir: PathBuf::from("sites"),
      max_retries: 3,
      retry_delay: Duration::from_secs(2),
      request_timeout: Duration::from_secs(30),
      search_limit: 10,
      max_products: 10,
      product_delay: Duration::from_millis(500),
    }
  }

  /// Loads `.env` if present, then reads the environment.
  ///
  /// `RAPIDAPI_KEY` is required; `RAPIDAPI_HOST`, `AFFILIATE_TAG`, `NICHES_FILE`,
  /// `TEMPLATE_FILE` and `OUTPUT_DIR` override the defaults when set.
  pub fn from_env() -> GenResult<Self> {
    dotenvy::dotenv().ok();

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let api_key = get_env("RAPIDAPI_KEY").ok_or(GenError::MissingApiKey)?;
    let mut config = Self::new(api_key);

    if let Some(host) = get_env("RAPIDAPI_HOST") {
      config.api_host = host;
    }
    if let Some(tag) = get_env("AFFILIATE_TAG") {
      config.affiliate_tag = tag;
    }
    if let Some(path) = get_env("NICHES_FILE") {
      config.niches_path = PathBuf::from(path);
    }
    if let Some(path) = get_env("TEMPLATE_FILE") {
      config.template_path = PathBuf::from(path);
    }
    if let Some(path) = get_env("OUTPUT_DIR") {
      config.output_dir = PathBuf::from(path);
    }

    config.validate()?;
    tracing::info!(affiliate_tag = %config.affiliate_tag, api_host = %config.api_host, "Generator configuration loaded.");
    Ok(config)
  }

  pub fn validate(&self) -> GenResult<()> {
    if self.api_key.trim().is_empty() {
      return Err(GenError::MissingApiKey);
    }
    if self.api_host.trim().is_empty() {
      return Err(GenError::Config("api_host must not be empty".to_string()));
    }
    if self.max_products == 0 {
      return Err(GenError::Config("max_products must be at least 1".to_string()));
    }
    Ok(())
  }
}

// The API key never shows up in logs.
impl std::fmt::Debug for GeneratorConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeneratorConfig")
      .field("api_key", &"[REDACTED]")
      .field("api_host", &self.api_host)
      .field("affiliate_tag", &self.affiliate_tag)
      .field("region", &self.region)
      .field("niches_path", &self.niches_path)
      .field("template_path", &self.template_path)
      .field("output_dir", &self.output_dir)
      .field("max_retries", &self.max_retries)
      .field("retry_delay", &self.retry_delay)
      .field("request_timeout", &self.request_timeout)
      .field("search_limit", &self.search_limit)
      .field("max_products", &self.max_products)
      .field("product_delay", &self.product_delay)
      .finish()
  }
}
