// nichegen/src/client/delay.rs

use async_trait::async_trait;
use std::time::Duration;

/// Source of the deliberate pauses: retry backoff and the per-product rate limit.
#[async_trait]
pub trait Delay: Send + Sync {
  async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
  async fn pause(&self, duration: Duration) {
    if !duration.is_zero() {
      tokio::time::sleep(duration).await;
    }
  }
}
