//! Cleanup schedule: runs the pass on a fixed interval after a start delay.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tokio::time::MissedTickBehavior;
use tracing;

use tollgate_core::config::cleaner::CleanerConfig;

use crate::cleaner::TicketCleaner;

/// Drives [`TicketCleaner`] on the configured schedule.
///
/// Every node runs one of these; the cluster lock inside the cleaner
/// decides which node actually sweeps on a given tick.
#[derive(Debug)]
pub struct CleanerRunner {
    cleaner: Arc<TicketCleaner>,
    start_delay: Duration,
    repeat_interval: Duration,
}

impl CleanerRunner {
    pub fn new(cleaner: Arc<TicketCleaner>, config: &CleanerConfig) -> Self {
        Self {
            cleaner,
            start_delay: Duration::from_secs(config.start_delay_seconds),
            repeat_interval: Duration::from_secs(config.repeat_interval_seconds.max(1)),
        }
    }

    /// Run until the shutdown signal flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Ticket cleanup schedule started: start_delay={}s, repeat_interval={}s",
            self.start_delay.as_secs(),
            self.repeat_interval.as_secs()
        );

        let mut ticker = time::interval_at(
            time::Instant::now() + self.start_delay,
            self.repeat_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Ticket cleanup schedule received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.cleaner.clean().await {
                        tracing::error!("Cleanup pass failed, keeping the schedule: {}", e);
                    }
                }
            }
        }

        tracing::info!("Ticket cleanup schedule stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use tollgate_core::result::AppResult;
    use tollgate_registry::TicketRegistry;
    use tollgate_ticket::{Ticket, TicketId};

    use crate::lock::MemoryClusterLock;

    /// Counts registry scans; each cleanup pass performs exactly one.
    #[derive(Debug, Default)]
    struct CountingRegistry {
        scans: AtomicUsize,
    }

    impl CountingRegistry {
        fn scans(&self) -> usize {
            self.scans.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TicketRegistry for CountingRegistry {
        async fn add_ticket(&self, _ticket: Ticket) -> AppResult<()> {
            Ok(())
        }

        async fn fetch_ticket(&self, _id: &TicketId) -> AppResult<Option<Ticket>> {
            Ok(None)
        }

        async fn update_ticket(&self, ticket: Ticket) -> AppResult<Ticket> {
            Ok(ticket)
        }

        async fn delete_single(&self, _id: &TicketId) -> AppResult<bool> {
            Ok(false)
        }

        async fn get_tickets(&self) -> AppResult<Vec<Ticket>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn delete_all(&self) -> AppResult<u64> {
            Ok(0)
        }
    }

    fn runner_with(
        registry: Arc<CountingRegistry>,
        config: &CleanerConfig,
    ) -> CleanerRunner {
        let cleaner = Arc::new(TicketCleaner::new(
            registry,
            Arc::new(MemoryClusterLock::new()),
            config,
        ));
        CleanerRunner::new(cleaner, config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_delay_then_repeat() {
        let config = CleanerConfig {
            start_delay_seconds: 5,
            repeat_interval_seconds: 120,
            ..CleanerConfig::default()
        };
        let registry = Arc::new(CountingRegistry::default());
        let runner = runner_with(registry.clone(), &config);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(registry.scans(), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(registry.scans(), 1);

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(registry.scans(), 2);

        tx.send(true).ok();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_first_pass() {
        let config = CleanerConfig {
            start_delay_seconds: 30,
            ..CleanerConfig::default()
        };
        let registry = Arc::new(CountingRegistry::default());
        let runner = runner_with(registry.clone(), &config);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        tx.send(true).ok();
        time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("runner should stop on shutdown")
            .unwrap();
        assert_eq!(registry.scans(), 0);
    }
}
