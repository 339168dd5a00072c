// nichegen/src/error.rs
use anyhow::Error as AnyhowError;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  StepHandlerMissing { step_name: String },

  #[error("Error in step handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("API client error: {0}")]
  Api(#[from] ApiError),

  #[error("RAPIDAPI_KEY environment variable not set")]
  MissingApiKey,

  #[error("Failed to read niche list {path}: {source}")]
  NicheList {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("No niches found in {path}")]
  NoNiches { path: PathBuf },

  #[error("Failed to read template {path}: {source}")]
  Template {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Not a usable site directory name: '{slug}'")]
  InvalidSlug { slug: String },

  #[error("I/O error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to scan {path} during validation: {source}")]
  Validation {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("No sites were generated successfully ({failed} niches failed)")]
  NoSitesGenerated { failed: usize },
}

impl From<AnyhowError> for GenError {
  fn from(err: AnyhowError) -> Self {
    GenError::HandlerError { source: err }
  }
}

impl GenError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    GenError::Io {
      path: path.into(),
      source,
    }
  }
}

/// Failure of a single upstream API call.
///
/// Only `RetriesExhausted` ever leaves `ApiClient::call`; the other variants describe
/// individual attempts and end up as its `last_error`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("request failed: {0}")]
  Transport(String),

  #[error("unexpected status {status}")]
  Status { status: StatusCode },

  #[error("invalid JSON body: {0}")]
  Decode(String),

  #[error("API call to '{endpoint}' failed after {retries} retries: {last_error}")]
  RetriesExhausted {
    endpoint: String,
    retries: u32,
    #[source]
    last_error: Box<ApiError>,
  },
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      return ApiError::Decode(err.to_string());
    }
    match err.status() {
      Some(status) => ApiError::Status { status },
      None => ApiError::Transport(err.to_string()),
    }
  }
}

pub type GenResult<T, E = GenError> = std::result::Result<T, E>;
