// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use nichegen::client::ApiRequest;
use nichegen::{ApiClient, ApiError, ApiTransport, ContextData, Delay, GenError, GeneratorConfig, PipelineControl};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

// --- Tracing ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Engine test context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Engine error: {0}")]
  Engine(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<GenError> for TestError {
  fn from(err: GenError) -> Self {
    TestError::Engine(format!("{:?}", err))
  }
}

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> nichegen::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> nichegen::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

// --- Scripted API transport ---

/// What the stub answers for one attempt.
#[derive(Clone, Debug)]
pub enum Reply {
  Json(Value),
  Fail(&'static str),
}

/// Replies are scripted per key. `search:<q>` and `product:<ASIN>` target one
/// keyword or ASIN and take precedence over the plain endpoint name.
/// Once a key's script runs out its last reply repeats; unscripted keys fail.
#[derive(Default)]
pub struct StubTransport {
  scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
  requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn script(self, key: &str, replies: Vec<Reply>) -> Self {
    self.scripts.lock().insert(key.to_string(), replies.into());
    self
  }

  pub fn search(self, body: Value) -> Self {
    self.script("search", vec![Reply::Json(body)])
  }

  pub fn detail(self, asin: &str, reply: Reply) -> Self {
    self.script(&format!("product:{}", asin), vec![reply])
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.requests.lock().clone()
  }

  pub fn calls_to(&self, endpoint: &str) -> usize {
    self.requests.lock().iter().filter(|r| r.endpoint == endpoint).count()
  }

  pub fn search_for(self, keyword: &str, body: Value) -> Self {
    self.script(&format!("search:{}", keyword), vec![Reply::Json(body)])
  }

  fn specific_key(request: &ApiRequest) -> Option<String> {
    let id = request.query_value("q").or_else(|| request.query_value("asin"))?;
    Some(format!("{}:{}", request.endpoint, id))
  }
}

#[async_trait]
impl ApiTransport for StubTransport {
  async fn get_json(&self, request: &ApiRequest) -> Result<Value, ApiError> {
    self.requests.lock().push(request.clone());

    let reply = {
      let mut scripts = self.scripts.lock();
      let key = match Self::specific_key(request) {
        Some(key) if scripts.contains_key(&key) => key,
        _ => request.endpoint.clone(),
      };
      match scripts.get_mut(&key) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
      }
    };

    match reply {
      Some(Reply::Json(body)) => Ok(body),
      Some(Reply::Fail(msg)) => Err(ApiError::Transport(msg.to_string())),
      None => Err(ApiError::Transport(format!("no scripted reply for {}", request.endpoint))),
    }
  }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingDelay {
  pauses: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
  pub fn pauses(&self) -> Vec<Duration> {
    self.pauses.lock().clone()
  }

  pub fn count_of(&self, duration: Duration) -> usize {
    self.pauses.lock().iter().filter(|d| **d == duration).count()
  }
}

#[async_trait]
impl Delay for RecordingDelay {
  async fn pause(&self, duration: Duration) {
    self.pauses.lock().push(duration);
  }
}

// --- Fixtures ---

pub const TEST_TAG: &str = "test-20";

pub const TEMPLATE: &str = "<!DOCTYPE html>
<html>
<head>
<title>{{NICHE_TITLE}}</title>
<meta name=\"description\" content=\"{{META_DESCRIPTION}}\">
</head>
<body>
<h1>{{NICHE_TITLE}}</h1>
<main>{{PRODUCTS}}</main>
</body>
</html>
";

pub fn test_config(output_dir: &Path) -> GeneratorConfig {
  let mut config = GeneratorConfig::new("test-key");
  config.affiliate_tag = TEST_TAG.to_string();
  config.output_dir = output_dir.to_path_buf();
  config
}

pub fn stub_client(config: &GeneratorConfig, transport: Arc<StubTransport>, delay: Arc<RecordingDelay>) -> Arc<ApiClient> {
  Arc::new(ApiClient::with_parts(config, transport, delay))
}

/// A search-schema product with every field the extractor needs.
pub fn complete_product(asin: &str, title: &str) -> Value {
  json!({
    "asin": asin,
    "title": title,
    "image": format!("https://m.media-amazon.com/images/I/{}.jpg", asin),
    "price": "$49.99",
    "original_price": "$79.99",
  })
}
