//! Deadline and retry policy applied around completion calls.

use std::time::Duration;

use tracing::warn;

use crate::client::{CompletionRequest, CompletionService};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};

/// Deadline and retry budget for completion calls.
#[derive(Debug, Clone, PartialEq)]
pub struct CallPolicy {
    /// Deadline for one attempt.
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retry_attempts: u32,
    /// Sleep before the first retry; doubled for each later one.
    pub initial_backoff: Duration,
    /// Upper bound on a single sleep.
    pub max_backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl CallPolicy {
    /// Policy described by an agent configuration.
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            timeout: config.timeout(),
            retry_attempts: config.retry_attempts,
            ..Default::default()
        }
    }

    /// Single attempt, no retries.
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            timeout,
            retry_attempts: 0,
            ..Default::default()
        }
    }

    /// Set the backoff bounds.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Sleep before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run a completion under the deadline, retrying transient failures.
    ///
    /// Non-transient errors (parse, configuration) are returned at once.
    pub async fn complete(
        &self,
        service: &dyn CompletionService,
        request: &CompletionRequest,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            let outcome = match tokio::time::timeout(self.timeout, service.complete(request)).await
            {
                Ok(result) => result,
                Err(_) => Err(AgentError::Timeout(self.timeout.as_millis() as u64)),
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.retry_attempts => {
                    attempt += 1;
                    let delay = self.backoff_for(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Completion failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
