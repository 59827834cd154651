//! Time related collaborators of the registry.
//!
//! The registry never reads the system clock or sleeps directly, so tests
//! can swap in a fixed date and skip the simulated latency.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

/// Stands in for the round trip to a registration service.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        rocket::tokio::time::sleep(duration).await;
    }
}

#[derive(Clone)]
pub struct RegistryRuntime {
    pub sleeper: Arc<dyn Sleeper>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for RegistryRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(DefaultClock),
        }
    }
}
