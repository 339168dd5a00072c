// nichegen/src/niche.rs

use crate::error::{GenError, GenResult};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// One niche to generate: a display name and the search keyword behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicheRequest {
  pub niche: String,
  pub keyword: String,
}

impl NicheRequest {
  pub fn new(niche: impl Into<String>, keyword: impl Into<String>) -> Self {
    Self {
      niche: niche.into(),
      keyword: keyword.into(),
    }
  }

  pub fn slug(&self) -> String {
    crate::slug::slugify(&self.niche)
  }
}

#[derive(Debug, Deserialize)]
struct NicheRow {
  #[serde(default)]
  niche: Option<String>,
  #[serde(default)]
  keyword: Option<String>,
}

/// Reads niches from CSV with a header row.
///
/// Only the `niche` and `keyword` columns are used; rows lacking either (or
/// that cannot be decoded) are skipped.
pub fn read_niches(path: &Path) -> GenResult<Vec<NicheRequest>> {
  let to_err = |source: csv::Error| GenError::NicheList {
    path: path.to_path_buf(),
    source,
  };

  let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(to_err)?;
  reader.headers().map_err(to_err)?;

  let mut niches = Vec::new();
  for (line, row) in reader.deserialize::<NicheRow>().enumerate() {
    let row = match row {
      Ok(row) => row,
      Err(e) if e.is_io_error() => return Err(to_err(e)),
      Err(e) => {
        debug!(line = line + 2, error = %e, "Skipping undecodable niche row.");
        continue;
      }
    };
    match (row.niche, row.keyword) {
      (Some(niche), Some(keyword)) if !niche.trim().is_empty() && !keyword.trim().is_empty() => {
        niches.push(NicheRequest { niche, keyword });
      }
      _ => debug!(line = line + 2, "Skipping niche row without niche or keyword."),
    }
  }

  info!("Loaded {} niches from {}", niches.len(), path.display());
  Ok(niches)
}
