use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::Duration,
};

use crate::{
    foundation::error::{ForgeError, ForgeResult},
    provider::backend::{GenerateRequest, Generated, ImageProvider, ProviderKind},
};

/// Timeout and retry budget for blocking provider calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wall-clock budget for a single attempt.
    pub timeout: Duration,
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 2,
            backoff_base: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << retry.min(16))
    }
}

/// Wraps a provider with a per-attempt timeout, bounded retries and a run-wide circuit breaker.
///
/// Once an attempt exceeds the timeout the provider is marked unhealthy and every later call
/// fails fast for the remainder of the run. Errors are never retried past `max_retries`.
pub struct GuardedProvider {
    inner: Arc<dyn ImageProvider>,
    policy: RetryPolicy,
    tripped: AtomicBool,
}

impl GuardedProvider {
    pub fn new(inner: Arc<dyn ImageProvider>, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            tripped: AtomicBool::new(false),
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    fn attempt(&self, req: &GenerateRequest) -> ForgeResult<Generated> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let req = req.clone();
        std::thread::Builder::new()
            .name(format!("provider-{}", self.inner.name()))
            .spawn(move || {
                let _ = tx.send(inner.generate_image(&req));
            })
            .map_err(|e| ForgeError::generation(format!("spawn provider call: {e}")))?;

        match rx.recv_timeout(self.policy.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.tripped.store(true, Ordering::Release);
                tracing::warn!(
                    provider = self.inner.name(),
                    timeout_ms = self.policy.timeout.as_millis() as u64,
                    "provider exceeded its timeout budget; marking unhealthy for this run"
                );
                Err(ForgeError::generation(format!(
                    "{} timed out after {:?}",
                    self.inner.name(),
                    self.policy.timeout
                )))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ForgeError::generation(format!(
                "{} worker exited without a result",
                self.inner.name()
            ))),
        }
    }
}

impl ImageProvider for GuardedProvider {
    fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    fn health_check(&self) -> bool {
        !self.is_tripped() && self.inner.health_check()
    }

    fn generate_image(&self, req: &GenerateRequest) -> ForgeResult<Generated> {
        let mut retry = 0;
        loop {
            if self.is_tripped() {
                return Err(ForgeError::generation(format!(
                    "{} is unhealthy for the remainder of this run",
                    self.inner.name()
                )));
            }
            match self.attempt(req) {
                Ok(out) => return Ok(out),
                Err(e) if self.is_tripped() || retry >= self.policy.max_retries => return Err(e),
                Err(e) => {
                    let delay = self.policy.backoff_for(retry);
                    tracing::warn!(
                        provider = self.inner.name(),
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "provider call failed; retrying"
                    );
                    std::thread::sleep(delay);
                    retry += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/guard.rs"]
mod tests;
