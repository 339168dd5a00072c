// nichegen/src/generator.rs

//! The per-niche pipeline and the run loop over all niches.
//!
//! Each niche runs through four steps on its own `ContextData<NicheCtxData>`:
//!
//! ```text
//! search  -> no results          => Stop (niche skipped)
//! extract -> no valid products   => Stop (niche skipped)
//! render
//! write   -> <output>/<slug>/index.html
//! ```
//!
//! A stopped or failed niche is counted and the run moves on to the next one.

use crate::client::{ApiClient, Delay, TokioDelay};
use crate::config::GeneratorConfig;
use crate::core::{ContextData, PipelineControl, PipelineResult};
use crate::envelope::RawProduct;
use crate::error::{GenError, GenResult};
use crate::extract::{self, Product};
use crate::niche::{self, NicheRequest};
use crate::pipeline::Pipeline;
use crate::render;
use crate::site::{self, SiteWriter};
use crate::slug::is_usable;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

pub const STEP_SEARCH: &str = "search";
pub const STEP_EXTRACT: &str = "extract";
pub const STEP_RENDER: &str = "render";
pub const STEP_WRITE: &str = "write";

/// Where a niche currently is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NicheStage {
  Start,
  Searching,
  NoResults,
  Extracting,
  NoValidProducts,
  Rendering,
  Written,
}

/// Per-niche pipeline state.
#[derive(Debug, Clone)]
pub struct NicheCtxData {
  pub request: NicheRequest,
  pub slug: String,
  pub stage: NicheStage,
  /// Raw search results, consumed by the extract step.
  pub candidates: Vec<RawProduct>,
  /// Accepted products in acceptance order.
  pub products: Vec<Product>,
  pub html: Option<String>,
  pub written_to: Option<PathBuf>,
}

impl NicheCtxData {
  pub fn new(request: NicheRequest) -> Self {
    Self {
      slug: request.slug(),
      request,
      stage: NicheStage::Start,
      candidates: Vec::new(),
      products: Vec::new(),
      html: None,
      written_to: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NicheOutcome {
  Written { path: PathBuf, products: usize },
  Skipped { stage: NicheStage },
}

impl NicheOutcome {
  pub fn is_written(&self) -> bool {
    matches!(self, NicheOutcome::Written { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub succeeded: usize,
  pub failed: usize,
  pub output_dir: PathBuf,
}

impl RunSummary {
  /// A run succeeds when at least one site was written.
  pub fn into_result(self) -> GenResult<Self> {
    if self.succeeded == 0 {
      Err(GenError::NoSitesGenerated { failed: self.failed })
    } else {
      Ok(self)
    }
  }
}

#[derive(Debug, Clone)]
struct ExtractSettings {
  affiliate_tag: String,
  max_products: usize,
  product_delay: Duration,
}

/// Generates one site per niche with a shared client, template and writer.
pub struct SiteGenerator {
  writer: SiteWriter,
  pipeline: Pipeline<NicheCtxData, GenError>,
}

impl SiteGenerator {
  pub fn new(config: &GeneratorConfig, client: Arc<ApiClient>, delay: Arc<dyn Delay>, template: String) -> Self {
    let writer = SiteWriter::new(&config.output_dir);
    let template = Arc::new(template);
    let settings = Arc::new(ExtractSettings {
      affiliate_tag: config.affiliate_tag.clone(),
      max_products: config.max_products,
      product_delay: config.product_delay,
    });
    let search_limit = config.search_limit;

    let mut pipeline = Pipeline::<NicheCtxData, GenError>::with_steps(&[STEP_SEARCH, STEP_EXTRACT, STEP_RENDER, STEP_WRITE]);

    let search_client = client.clone();
    pipeline.on_root(STEP_SEARCH, move |ctx| {
      let client = search_client.clone();
      async move { search_step(ctx, client, search_limit).await }
    });

    pipeline.on_root(STEP_EXTRACT, move |ctx| {
      let (client, delay, settings) = (client.clone(), delay.clone(), settings.clone());
      async move { extract_step(ctx, client, delay, settings).await }
    });

    pipeline.on_root(STEP_RENDER, move |ctx| {
      let template = template.clone();
      async move { render_step(ctx, template).await }
    });

    let step_writer = writer.clone();
    pipeline.on_root(STEP_WRITE, move |ctx| {
      let writer = step_writer.clone();
      async move { write_step(ctx, writer).await }
    });

    Self { writer, pipeline }
  }

  /// Runs the pipeline for one niche.
  ///
  /// `Ok(Skipped)` covers the expected dead ends (no results, no valid
  /// products); `Err` is anything unexpected, e.g. the page could not be written.
  /// A niche whose name yields no slug fails here, before any API call.
  #[instrument(name = "SiteGenerator::generate_site", skip_all, fields(niche = %request.niche))]
  pub async fn generate_site(&self, request: &NicheRequest) -> GenResult<NicheOutcome> {
    let ctx = ContextData::new(NicheCtxData::new(request.clone()));
    let slug = ctx.read().slug.clone();
    if !is_usable(&slug) {
      return Err(GenError::InvalidSlug { slug });
    }

    {
      let data = ctx.read();
      info!("Generating site for: {}", data.request.niche);
      info!("Keyword: {}", data.request.keyword);
      info!("Slug: {}", data.slug);
    }

    let result = self.pipeline.run(ctx.clone()).await?;

    let data = ctx.read();
    match (result, data.written_to.clone()) {
      (PipelineResult::Completed, Some(path)) => Ok(NicheOutcome::Written {
        path,
        products: data.products.len(),
      }),
      _ => Ok(NicheOutcome::Skipped { stage: data.stage }),
    }
  }

  /// Generates every niche in order. Failures are logged and counted, never propagated.
  pub async fn run(&self, niches: &[NicheRequest]) -> RunSummary {
    let mut succeeded = 0;
    let mut failed = 0;

    for request in niches {
      match self.generate_site(request).await {
        Ok(outcome) if outcome.is_written() => succeeded += 1,
        Ok(_) => failed += 1,
        Err(e) => {
          error!(error = %e, "Error generating site for {}", request.niche);
          failed += 1;
        }
      }
    }

    let summary = RunSummary {
      succeeded,
      failed,
      output_dir: self.writer.root().to_path_buf(),
    };
    info!("Generation Summary");
    info!("Successfully generated: {} sites", summary.succeeded);
    info!("Failed: {} sites", summary.failed);
    info!("Output directory: {}", summary.output_dir.display());
    summary
  }
}

/// Full run from configuration: preconditions, then every niche in the list.
///
/// Missing key, unreadable niche list or template, an empty niche list and an
/// uncreatable output root are fatal and reported before any API call.
pub async fn run_from_config(config: &GeneratorConfig) -> GenResult<RunSummary> {
  config.validate()?;
  info!("Affiliate Tag: {}", config.affiliate_tag);

  let writer = SiteWriter::new(&config.output_dir);
  writer.prepare()?;

  let niches = niche::read_niches(&config.niches_path)?;
  if niches.is_empty() {
    return Err(GenError::NoNiches {
      path: config.niches_path.clone(),
    });
  }

  let template = site::load_template(&config.template_path)?;
  let client = Arc::new(ApiClient::from_config(config)?);
  let generator = SiteGenerator::new(config, client, Arc::new(TokioDelay), template);

  Ok(generator.run(&niches).await)
}

async fn search_step(ctx: ContextData<NicheCtxData>, client: Arc<ApiClient>, limit: usize) -> GenResult<PipelineControl> {
  let (niche, keyword) = {
    let mut data = ctx.write();
    data.stage = NicheStage::Searching;
    (data.request.niche.clone(), data.request.keyword.clone())
  };

  let found = client.search_products(&keyword, limit).await;

  let mut data = ctx.write();
  if found.is_empty() {
    error!("No products found for {}, skipping...", niche);
    data.stage = NicheStage::NoResults;
    return Ok(PipelineControl::Stop);
  }
  data.candidates = found;
  Ok(PipelineControl::Continue)
}

async fn extract_step(
  ctx: ContextData<NicheCtxData>,
  client: Arc<ApiClient>,
  delay: Arc<dyn Delay>,
  settings: Arc<ExtractSettings>,
) -> GenResult<PipelineControl> {
  let (niche, mut candidates) = {
    let mut data = ctx.write();
    data.stage = NicheStage::Extracting;
    (data.request.niche.clone(), std::mem::take(&mut data.candidates))
  };
  candidates.truncate(settings.max_products);

  let mut accepted = Vec::with_capacity(candidates.len());
  let mut skipped = 0;
  for raw in &candidates {
    match resolve_candidate(&client, raw, &settings.affiliate_tag).await {
      Some(product) => {
        info!("Added product: {}...", product.title.chars().take(50).collect::<String>());
        accepted.push(product);
      }
      None => skipped += 1,
    }
    delay.pause(settings.product_delay).await;
  }

  let mut data = ctx.write();
  if accepted.is_empty() {
    error!("No valid products found for {}, skipping...", niche);
    data.stage = NicheStage::NoValidProducts;
    return Ok(PipelineControl::Stop);
  }
  info!(skipped, "Successfully processed {} products", accepted.len());
  data.products = accepted;
  Ok(PipelineControl::Continue)
}

/// Direct extraction first, then one detail lookup by ASIN if that was not enough.
async fn resolve_candidate(client: &ApiClient, raw: &RawProduct, affiliate_tag: &str) -> Option<Product> {
  let Some(asin) = extract::raw_asin(raw) else {
    warn!("Product missing ASIN, skipping...");
    return None;
  };

  if let Some(product) = extract::extract(raw, affiliate_tag) {
    return Some(product);
  }

  info!("Fetching full details for {}", asin);
  let product = match client.product_details(&asin).await {
    Some(details) => extract::extract(&details, affiliate_tag),
    None => None,
  };
  if product.is_none() {
    warn!("Skipping product with ASIN: {}", asin);
  }
  product
}

async fn render_step(ctx: ContextData<NicheCtxData>, template: Arc<String>) -> GenResult<PipelineControl> {
  let mut data = ctx.write();
  data.stage = NicheStage::Rendering;
  let html = render::render(&template, &data.request.niche, &data.products);
  data.html = Some(html);
  Ok(PipelineControl::Continue)
}

async fn write_step(ctx: ContextData<NicheCtxData>, writer: SiteWriter) -> GenResult<PipelineControl> {
  let (slug, html) = {
    let data = ctx.read();
    (data.slug.clone(), data.html.clone().unwrap_or_default())
  };

  let path = writer.write_site(&slug, &html)?;

  let mut data = ctx.write();
  data.written_to = Some(path);
  data.stage = NicheStage::Written;
  Ok(PipelineControl::Continue)
}
