use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;

use crate::error::InvokeError;

use super::config::ResilienceConfig;
use super::traits::{Completion, ModelInvoker};

/// Resilient wrapper that retries transient failures using exponential backoff.
///
/// Only connectivity, rate-limit and service-unavailable errors are retried;
/// anything else is returned to the caller on the first occurrence.
pub struct ResilientInvoker {
    inner: Box<dyn ModelInvoker>,
    cfg: ResilienceConfig,
}

impl ResilientInvoker {
    /// Creates a new resilient wrapper around an existing invoker.
    pub fn new(inner: Box<dyn ModelInvoker>, cfg: ResilienceConfig) -> Self {
        Self { inner, cfg }
    }

    fn backoff_delay(&self, attempt_index: usize) -> Duration {
        let mut delay = self
            .cfg
            .min_wait_ms
            .max(1)
            .saturating_mul(1u64 << attempt_index.min(16));
        delay = delay.min(self.cfg.max_wait_ms);
        if self.cfg.jitter && delay > self.cfg.min_wait_ms {
            delay = rand::thread_rng().gen_range(self.cfg.min_wait_ms..=delay);
        }
        Duration::from_millis(delay)
    }
}

#[async_trait]
impl ModelInvoker for ResilientInvoker {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<Completion, InvokeError> {
        let attempts = self.cfg.max_attempts.max(1);
        let mut idx = 0usize;

        loop {
            match self.inner.invoke(model, prompt, temperature).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => {
                    if idx + 1 >= attempts {
                        return Err(InvokeError::RetryExceeded {
                            attempts,
                            last_error: err.to_string(),
                        });
                    }
                    let delay = self.backoff_delay(idx);
                    log::debug!(
                        "transient failure from {model} (attempt {}/{attempts}): {err}; retrying in {delay:?}",
                        idx + 1
                    );
                    sleep(delay).await;
                    idx += 1;
                }
            }
        }
    }
}
