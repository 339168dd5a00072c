// nichegen/src/validate.rs

//! Post-generation content checks over an output tree.
//!
//! Three independent checks, all read-only:
//!  - no ASIN referenced more than once across the generated pages,
//!  - no product data record with a blank `brand`,
//!  - no `<img>` without non-blank alt text.

use crate::error::{GenError, GenResult};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Data files in `<root>/data` that never hold product listings.
const NON_PRODUCT_DATA_FILES: &[&str] = &["prices.json", "reviews.json"];

/// `data-asin="..."` attributes and `/dp/...` links.
static ASIN_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
  [
    Regex::new(r#"data-asin="([A-Z0-9]{10})""#).expect("data-asin pattern is valid"),
    Regex::new(r"/dp/([A-Z0-9]{10})").expect("/dp/ pattern is valid"),
  ]
});

static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img selector is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
  DuplicateAsins,
  BlankBrands,
  MissingAltText,
}

impl CheckKind {
  pub fn label(self) -> &'static str {
    match self {
      CheckKind::DuplicateAsins => "duplicate ASINs",
      CheckKind::BlankBrands => "blank brand fields",
      CheckKind::MissingAltText => "missing alt text",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
  DuplicateAsin { asin: String, files: Vec<PathBuf> },
  BlankBrand { asin: String, source: String },
  MissingAltText { file: PathBuf, images: Vec<String> },
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Violation::DuplicateAsin { asin, files } => {
        let files = files.iter().map(|p| p.display().to_string()).collect::<Vec<_>>();
        write!(f, "Duplicate ASIN {} found in: {}", asin, files.join(", "))
      }
      Violation::BlankBrand { asin, source } => write!(f, "Product {} in {} has blank brand field", asin, source),
      Violation::MissingAltText { file, images } => {
        write!(f, "{}: {} images without alt text", file.display(), images.len())
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
  pub kind: CheckKind,
  pub violations: Vec<Violation>,
}

impl CheckResult {
  pub fn passed(&self) -> bool {
    self.violations.is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
  pub checks: Vec<CheckResult>,
}

impl ValidationReport {
  pub fn passed(&self) -> bool {
    self.checks.iter().all(CheckResult::passed)
  }

  pub fn violations(&self) -> impl Iterator<Item = &Violation> {
    self.checks.iter().flat_map(|c| c.violations.iter())
  }
}

/// Runs every check against the output tree at `root`.
pub fn validate_sites(root: &Path) -> GenResult<ValidationReport> {
  info!("Starting validation checks in {}", root.display());
  let niche_dirs = niche_dirs(root)?;

  let checks = vec![
    check_duplicate_asins(&niche_dirs)?,
    check_blank_brands(root)?,
    check_missing_alt_text(&niche_dirs)?,
  ];

  for check in &checks {
    if check.passed() {
      info!("No {} found", check.kind.label());
    } else {
      warn!("Found {} {} violations", check.violations.len(), check.kind.label());
      for v in &check.violations {
        warn!("  {}", v);
      }
    }
  }
  Ok(ValidationReport { checks })
}

fn scan_err(path: &Path) -> impl FnOnce(std::io::Error) -> GenError + '_ {
  move |source| GenError::Validation {
    path: path.to_path_buf(),
    source,
  }
}

/// Visible subdirectories of `root`, sorted by name.
fn niche_dirs(root: &Path) -> GenResult<Vec<PathBuf>> {
  let mut dirs = Vec::new();
  for entry in fs::read_dir(root).map_err(scan_err(root))? {
    let entry = entry.map_err(scan_err(root))?;
    let path = entry.path();
    let hidden = entry.file_name().to_string_lossy().starts_with('.');
    if path.is_dir() && !hidden {
      dirs.push(path);
    }
  }
  dirs.sort();
  Ok(dirs)
}

/// Files in `dir` with the given extension, sorted. A missing `dir` yields none.
fn files_with_extension(dir: &Path, extension: &str) -> GenResult<Vec<PathBuf>> {
  if !dir.is_dir() {
    return Ok(Vec::new());
  }
  let mut files = Vec::new();
  for entry in fs::read_dir(dir).map_err(scan_err(dir))? {
    let path = entry.map_err(scan_err(dir))?.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

fn read_page(path: &Path) -> GenResult<String> {
  fs::read_to_string(path).map_err(scan_err(path))
}

/// ASINs referenced by `data-asin="..."` attributes and `/dp/...` links, in page order per pattern.
pub fn asins_in_page(html: &str) -> Vec<String> {
  ASIN_PATTERNS
    .iter()
    .flat_map(|pattern| pattern.captures_iter(html).map(|c| c[1].to_string()))
    .collect()
}

pub fn check_duplicate_asins(niche_dirs: &[PathBuf]) -> GenResult<CheckResult> {
  let mut occurrences: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

  for dir in niche_dirs {
    let index = dir.join("index.html");
    if !index.is_file() {
      continue;
    }
    let content = read_page(&index)?;
    for asin in asins_in_page(&content) {
      occurrences.entry(asin).or_default().push(index.clone());
    }
  }

  let violations = occurrences
    .into_iter()
    .filter(|(_, files)| files.len() > 1)
    .map(|(asin, files)| Violation::DuplicateAsin { asin, files })
    .collect();
  Ok(CheckResult {
    kind: CheckKind::DuplicateAsins,
    violations,
  })
}

fn is_blank_brand(product: &Value) -> bool {
  match product.get("brand") {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(_) => false,
  }
}

fn product_asin(product: &Value) -> String {
  match product.get("asin") {
    Some(Value::String(s)) => s.clone(),
    Some(other) => other.to_string(),
    None => "unknown".to_string(),
  }
}

fn read_json(path: &Path) -> GenResult<Option<Value>> {
  let text = read_page(path)?;
  match serde_json::from_str(&text) {
    Ok(value) => Ok(Some(value)),
    Err(e) => {
      debug!(path = %path.display(), error = %e, "Ignoring unparsable JSON file.");
      Ok(None)
    }
  }
}

/// Checks API dumps in `<root>/data/*.json` (`data.results[]`) and the
/// `niche -> [product]` map in `<root>/src/data/products.json`.
pub fn check_blank_brands(root: &Path) -> GenResult<CheckResult> {
  let mut violations = Vec::new();

  for file in files_with_extension(&root.join("data"), "json")? {
    let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if NON_PRODUCT_DATA_FILES.contains(&name.as_str()) {
      continue;
    }
    let Some(Value::Object(dump)) = read_json(&file)? else {
      continue;
    };
    let results = dump
      .get("data")
      .and_then(|d| d.get("results"))
      .and_then(Value::as_array)
      .map(Vec::as_slice)
      .unwrap_or_default();
    for product in results.iter().filter(|p| is_blank_brand(p)) {
      violations.push(Violation::BlankBrand {
        asin: product_asin(product),
        source: name.clone(),
      });
    }
  }

  let products_json = root.join("src").join("data").join("products.json");
  if products_json.is_file() {
    if let Some(Value::Object(by_niche)) = read_json(&products_json)? {
      for (niche, products) in &by_niche {
        let products = products.as_array().map(Vec::as_slice).unwrap_or_default();
        for product in products.iter().filter(|p| is_blank_brand(p)) {
          violations.push(Violation::BlankBrand {
            asin: product_asin(product),
            source: niche.clone(),
          });
        }
      }
    }
  }

  Ok(CheckResult {
    kind: CheckKind::BlankBrands,
    violations,
  })
}

/// `src` of every `<img>` in `html` whose alt text is absent or blank.
pub fn images_missing_alt(html: &str) -> Vec<String> {
  let document = Html::parse_document(html);
  document
    .select(&IMG_SELECTOR)
    .filter(|img| img.value().attr("alt").map_or(true, |alt| alt.trim().is_empty()))
    .map(|img| img.value().attr("src").unwrap_or("unknown").to_string())
    .collect()
}

pub fn check_missing_alt_text(niche_dirs: &[PathBuf]) -> GenResult<CheckResult> {
  let mut violations = Vec::new();

  for dir in niche_dirs {
    let mut pages = Vec::new();
    let index = dir.join("index.html");
    if index.is_file() {
      pages.push(index);
    }
    pages.extend(files_with_extension(&dir.join("blog"), "html")?);

    for page in pages {
      let images = images_missing_alt(&read_page(&page)?);
      if !images.is_empty() {
        violations.push(Violation::MissingAltText { file: page, images });
      }
    }
  }

  Ok(CheckResult {
    kind: CheckKind::MissingAltText,
    violations,
  })
}
