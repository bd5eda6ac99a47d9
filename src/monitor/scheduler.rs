use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::FutureExt;

use super::engine::{MonitorEngine, TickReport};
use crate::notify::Notifier;
use crate::runtime::StatusSource;

pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Source of the current time and of delays between ticks.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

#[async_trait]
impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }
}

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives the engine at a fixed interval until the process is terminated.
pub struct Scheduler<S, N, C> {
    engine: MonitorEngine<S, N>,
    clock: C,
    interval: Duration,
}

impl<S, N, C> Scheduler<S, N, C>
where
    S: StatusSource,
    N: Notifier,
    C: Clock,
{
    pub fn new(engine: MonitorEngine<S, N>, clock: C) -> Self {
        Self {
            engine,
            clock,
            interval: POLL_INTERVAL,
        }
    }

    pub fn engine(&self) -> &MonitorEngine<S, N> {
        &self.engine
    }

    /// Runs a single tick and logs whatever went wrong in it. Returns the
    /// report when the tick completed.
    pub async fn run_once(&mut self) -> Option<TickReport> {
        let now = self.clock.now();
        let started = std::time::Instant::now();

        let result = AssertUnwindSafe(self.engine.tick(now)).catch_unwind().await;

        let report = match result {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                log::error!("Monitoring tick failed: {e}");
                return None;
            }
            Err(_) => {
                log::error!("Monitoring tick panicked, continuing with the next one");
                return None;
            }
        };

        for (name, e) in report.failures() {
            log::error!("Error while monitoring '{name}': {e}");
        }
        log::debug!(
            "Tick took {:?}, {} notification(s) sent",
            started.elapsed(),
            report.notifications()
        );
        Some(report)
    }

    pub async fn run(mut self) {
        log::info!("Polling every {:?}", self.interval);
        loop {
            self.run_once().await;
            self.clock.sleep(self.interval).await;
        }
    }
}
