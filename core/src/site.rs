// nichegen/src/site.rs

//! The on-disk side of a run: template loading and `<output>/<slug>/index.html`.

use crate::error::{GenError, GenResult};
use crate::slug::is_usable;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const INDEX_FILE: &str = "index.html";

pub fn load_template(path: &Path) -> GenResult<String> {
  fs::read_to_string(path).map_err(|source| GenError::Template {
    path: path.to_path_buf(),
    source,
  })
}

/// Writes rendered pages under one output root.
#[derive(Debug, Clone)]
pub struct SiteWriter {
  root: PathBuf,
}

impl SiteWriter {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Creates the output root if needed.
  pub fn prepare(&self) -> GenResult<()> {
    fs::create_dir_all(&self.root).map_err(|e| GenError::io(&self.root, e))
  }

  pub fn site_path(&self, slug: &str) -> PathBuf {
    self.root.join(slug).join(INDEX_FILE)
  }

  /// Creates `<root>/<slug>/` and (over)writes its `index.html`.
  ///
  /// The slug must name exactly one directory below the root.
  pub fn write_site(&self, slug: &str, html: &str) -> GenResult<PathBuf> {
    if !is_usable(slug) {
      return Err(GenError::InvalidSlug { slug: slug.to_string() });
    }

    let dir = self.root.join(slug);
    fs::create_dir_all(&dir).map_err(|e| GenError::io(&dir, e))?;

    let file = self.site_path(slug);
    fs::write(&file, html).map_err(|e| GenError::io(&file, e))?;
    info!("Generated site: {}", file.display());
    Ok(file)
  }
}
