// nichegen/src/lib.rs

//! nichegen: turns product-search API results into static affiliate niche pages.
//!
//! For every `(niche, keyword)` row of a niche list the generator
//!  - searches the product API for the keyword (with bounded retries),
//!  - normalizes whatever response envelope comes back,
//!  - extracts up to ten display-ready products, fetching full details when a
//!    search record is incomplete,
//!  - renders the HTML template and writes `<output>/<slug>/index.html`.
//!
//! The per-niche flow runs as a named-step [`Pipeline`] over a shared
//! [`ContextData`]; the run loop keeps going when a single niche fails.
//! [`validate::validate_sites`] checks a finished output tree afterwards.

pub mod core;
pub mod pipeline;
pub mod error;

pub mod client;
pub mod config;
pub mod envelope;
pub mod extract;
pub mod generator;
pub mod niche;
pub mod render;
pub mod site;
pub mod slug;
pub mod validate;

// --- Re-exports for the Public API ---

pub use crate::core::{ContextData, Handler, PipelineControl, PipelineResult, SkipCondition, StepDef};
pub use crate::pipeline::Pipeline;

pub use crate::client::{ApiClient, ApiTransport, Delay, ReqwestTransport, TokioDelay};
pub use crate::config::GeneratorConfig;
pub use crate::envelope::{RawProduct, ResponseEnvelope};
pub use crate::extract::Product;
pub use crate::generator::{run_from_config, NicheOutcome, RunSummary, SiteGenerator};
pub use crate::niche::NicheRequest;
pub use crate::validate::{validate_sites, ValidationReport};

pub use crate::error::{ApiError, GenError, GenResult};
