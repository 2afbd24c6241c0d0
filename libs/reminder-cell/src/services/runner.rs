use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::models::ScanSummary;
use crate::services::scanner::ReminderScanner;

/// Runs a `ReminderScanner` now and then once per interval until shut down.
pub struct ReminderRunner {
    scanner: Arc<ReminderScanner>,
    period: Duration,
    is_shutdown: RwLock<bool>,
    last_summary: RwLock<Option<ScanSummary>>,
    scans_completed: RwLock<u64>,
}

impl ReminderRunner {
    pub fn new(scanner: Arc<ReminderScanner>, period: Duration) -> Self {
        Self {
            scanner,
            period,
            is_shutdown: RwLock::new(false),
            last_summary: RwLock::new(None),
            scans_completed: RwLock::new(0),
        }
    }

    /// Scans with the local calendar date until `shutdown` is called.
    pub async fn start(&self) {
        self.start_with_clock(|| Local::now().date_naive()).await
    }

    /// Like `start`, with `today` supplying the scan date on every tick.
    pub async fn start_with_clock<F>(&self, today: F)
    where
        F: Fn() -> NaiveDate + Send + Sync,
    {
        info!("Reminder runner started, scanning every {:?}", self.period);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.wait_for_shutdown() => break,
            }

            if *self.is_shutdown.read().await {
                break;
            }

            match self.scanner.scan(today()).await {
                Ok(summary) => {
                    *self.last_summary.write().await = Some(summary);
                }
                Err(e) => {
                    error!("Reminder scan failed: {}", e);
                }
            }
            *self.scans_completed.write().await += 1;
        }

        info!("Reminder runner stopped");
    }

    pub async fn shutdown(&self) {
        debug!("Reminder runner shutdown requested");
        *self.is_shutdown.write().await = true;
    }

    pub async fn last_summary(&self) -> Option<ScanSummary> {
        *self.last_summary.read().await
    }

    /// Scans attempted so far, failed ones included.
    pub async fn scans_completed(&self) -> u64 {
        *self.scans_completed.read().await
    }

    async fn wait_for_shutdown(&self) {
        loop {
            if *self.is_shutdown.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
