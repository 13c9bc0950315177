use std::sync::atomic::AtomicU32;

use super::*;
use crate::foundation::core::CanvasSize;

struct Flaky {
    calls: AtomicU32,
    fail_first: u32,
    delay: Duration,
}

impl ImageProvider for Flaky {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Firefly
    }

    fn health_check(&self) -> bool {
        true
    }

    fn generate_image(&self, req: &GenerateRequest) -> ForgeResult<Generated> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        if n < self.fail_first {
            return Err(ForgeError::generation("transient"));
        }
        Ok(Generated {
            image: image::RgbImage::new(req.size.width, req.size.height),
            metadata: serde_json::Map::new(),
        })
    }
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        timeout: Duration::from_millis(500),
        max_retries,
        backoff_base: Duration::from_millis(1),
    }
}

fn req() -> GenerateRequest {
    GenerateRequest::new("p", CanvasSize::new(4, 4).unwrap(), Some(1))
}

#[test]
fn retries_transient_failures_within_budget() {
    let inner = Arc::new(Flaky {
        calls: AtomicU32::new(0),
        fail_first: 2,
        delay: Duration::ZERO,
    });
    let guarded = GuardedProvider::new(inner.clone(), fast_policy(2));
    let out = guarded.generate_image(&req()).unwrap();
    assert_eq!(out.image.dimensions(), (4, 4));
    assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    assert!(guarded.health_check());
}

#[test]
fn gives_up_after_max_retries() {
    let inner = Arc::new(Flaky {
        calls: AtomicU32::new(0),
        fail_first: 10,
        delay: Duration::ZERO,
    });
    let guarded = GuardedProvider::new(inner.clone(), fast_policy(1));
    assert!(matches!(
        guarded.generate_image(&req()).unwrap_err(),
        ForgeError::Generation(_)
    ));
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn timeout_trips_provider_for_rest_of_run() {
    let inner = Arc::new(Flaky {
        calls: AtomicU32::new(0),
        fail_first: 0,
        delay: Duration::from_millis(300),
    });
    let policy = RetryPolicy {
        timeout: Duration::from_millis(20),
        max_retries: 3,
        backoff_base: Duration::from_millis(1),
    };
    let guarded = GuardedProvider::new(inner.clone(), policy);
    assert!(guarded.generate_image(&req()).is_err());
    assert!(guarded.is_tripped());
    assert!(!guarded.health_check());
    // Fails fast without another call to the inner provider.
    assert!(guarded.generate_image(&req()).is_err());
    assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn backoff_doubles() {
    let p = RetryPolicy {
        backoff_base: Duration::from_millis(100),
        ..RetryPolicy::default()
    };
    assert_eq!(p.backoff_for(0), Duration::from_millis(100));
    assert_eq!(p.backoff_for(2), Duration::from_millis(400));
}
