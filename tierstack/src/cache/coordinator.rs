use super::cascade::Cascade;
use super::window::LatencyWindow;
use crate::config::HierarchyConfig;
use crate::core::error::Result;
use crate::core::tier::{DelayInterrupt, Tier};
use crate::core::types::{Entry, ReadOutcome, StatSnapshot, TierConfig};
use crate::worker::{DEFAULT_WORKERS, WorkerPool};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Multi-tier cache coordinator
///
/// Owns the tiers (index 0 is the fastest), the worker pool running writes
/// and promotions, and the rolling read/write latency windows.
pub struct Coordinator {
    tiers: Arc<Vec<Tier>>,
    read_window: Arc<LatencyWindow>,
    write_window: Arc<LatencyWindow>,
    pool: WorkerPool,
    interrupt: DelayInterrupt,
}

impl Coordinator {
    /// Build a hierarchy with the default worker count and window size
    pub fn new(tiers: Vec<TierConfig>) -> Result<Self> {
        Self::with_config(&HierarchyConfig {
            tiers,
            workers: DEFAULT_WORKERS,
            ..Default::default()
        })
    }

    /// Build a hierarchy from a validated configuration
    ///
    /// Fails with `CacheError::Runtime` outside a tokio runtime.
    pub fn with_config(config: &HierarchyConfig) -> Result<Self> {
        config.validate()?;

        let interrupt = DelayInterrupt::new();
        let tiers = config
            .tiers
            .iter()
            .enumerate()
            .map(|(level, tier)| Tier::new(level, *tier, interrupt.clone()))
            .collect::<Vec<_>>();

        info!(
            "Initializing cache hierarchy with {} tier(s), {} worker(s)",
            tiers.len(),
            config.workers
        );

        Ok(Self {
            tiers: Arc::new(tiers),
            read_window: Arc::new(LatencyWindow::new(config.latency_window)),
            write_window: Arc::new(LatencyWindow::new(config.latency_window)),
            pool: WorkerPool::new(config.workers)?,
            interrupt,
        })
    }

    /// Read through the hierarchy, fastest tier first
    ///
    /// Every tier probed adds its read latency, hit or miss. A hit below
    /// tier 0 schedules a promotion into the faster tiers.
    pub async fn read(&self, key: &str) -> Result<ReadOutcome> {
        let mut latency_ms = 0;
        let mut found = None;

        for (level, tier) in self.tiers.iter().enumerate() {
            latency_ms += tier.read_latency_ms();
            if let Some(value) = tier.get(key).await? {
                found = Some((level, value));
                break;
            }
            debug!("Tier L{} MISS for key: {}", level + 1, key);
        }

        self.read_window.record(latency_ms);

        let Some((level, value)) = found else {
            debug!("Key not present in any tier: {}", key);
            return Ok(ReadOutcome {
                value: None,
                level: None,
                latency_ms,
            });
        };

        debug!("Tier L{} HIT for key: {}", level + 1, key);
        if level > 0 {
            if let Err(e) = self.promote(key, &value, level) {
                warn!(key, error = %e, "Promotion not scheduled");
            }
        }

        Ok(ReadOutcome {
            value: Some(value),
            level: Some(level),
            latency_ms,
        })
    }

    /// Queue a write; the caller does not wait for it
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        let tiers = Arc::clone(&self.tiers);
        let window = Arc::clone(&self.write_window);
        let cascade = Cascade::write(Entry::new(key, value), tiers.len());

        self.pool
            .submit(Box::pin(Self::write_task(tiers, window, cascade)))
    }

    /// Queue a copy of `key` into every tier in `[0, up_to)`
    ///
    /// Entries displaced inside that range cascade within it; an entry
    /// pushed out of tier `up_to - 1` is dropped. Tier `up_to` is never
    /// written.
    pub fn promote(&self, key: &str, value: &str, up_to: usize) -> Result<()> {
        let up_to = up_to.min(self.tiers.len());
        let tiers = Arc::clone(&self.tiers);
        let window = Arc::clone(&self.write_window);
        let entry = Entry::new(key, value);

        self.pool
            .submit(Box::pin(Self::promote_task(tiers, window, entry, up_to)))
    }

    /// Snapshot of tier occupancy and recent average latencies
    pub fn stat(&self) -> StatSnapshot {
        StatSnapshot {
            tiers: self.tiers.iter().map(Tier::usage).collect(),
            avg_read_ms: self.read_window.average(),
            avg_write_ms: self.write_window.average(),
        }
    }

    /// Samples kept per latency window
    pub fn latency_window(&self) -> usize {
        self.read_window.limit()
    }

    /// Index of the fastest tier holding `key`
    pub fn level_of_key(&self, key: &str) -> Option<usize> {
        self.tiers.iter().position(|tier| tier.contains_key(key))
    }

    /// Stop accepting background work; one-way
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.pool.is_running()
    }

    /// Abort every simulated delay currently in flight
    pub fn interrupt(&self) {
        warn!("Interrupting in-flight tier operations");
        self.interrupt.interrupt();
    }

    /// Wait for queued writes and promotions to finish
    pub async fn wait_idle(&self) {
        self.pool.wait_idle().await;
    }

    /// Background tasks queued or executing
    pub fn pending_tasks(&self) -> usize {
        self.pool.pending()
    }

    pub fn tier(&self, level: usize) -> Option<&Tier> {
        self.tiers.get(level)
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Width of the background worker pool
    pub fn workers(&self) -> usize {
        self.pool.width()
    }

    async fn write_task(
        tiers: Arc<Vec<Tier>>,
        window: Arc<LatencyWindow>,
        cascade: Cascade,
    ) -> Result<()> {
        let key = cascade.entry().key.clone();
        let report = cascade.run(&tiers).await?;
        debug!("Write of {} finished in {}ms", key, report.latency_ms);
        window.record(report.latency_ms);
        Ok(())
    }

    async fn promote_task(
        tiers: Arc<Vec<Tier>>,
        window: Arc<LatencyWindow>,
        entry: Entry,
        up_to: usize,
    ) -> Result<()> {
        let mut latency_ms = 0;
        for level in 0..up_to {
            let report = Cascade::promote(entry.clone(), level, up_to)
                .run(&tiers)
                .await?;
            latency_ms += report.latency_ms;
        }
        debug!(
            "Promoted {} into L1..L{} in {}ms",
            entry.key, up_to, latency_ms
        );
        window.record(latency_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CacheError;

    fn coordinator(tiers: &[(usize, u64, u64)]) -> Coordinator {
        Coordinator::new(
            tiers
                .iter()
                .map(|&(cap, read, write)| TierConfig::new(cap, read, write))
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_miss_costs_every_tier() {
        let cache = coordinator(&[(1, 10, 5), (2, 20, 15)]);

        let outcome = cache.read("missing").await.unwrap();
        assert!(!outcome.found());
        assert_eq!(outcome.level, None);
        assert_eq!(outcome.latency_ms, 30);
        assert_eq!(cache.stat().avg_read_ms, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_then_read_from_first_tier() {
        let cache = coordinator(&[(2, 10, 5), (2, 20, 15)]);
        cache.write("k", "v").unwrap();
        cache.wait_idle().await;

        let outcome = cache.read("k").await.unwrap();
        assert_eq!(outcome.value.as_deref(), Some("v"));
        assert_eq!(outcome.level, Some(0));
        assert_eq!(outcome.latency_ms, 10);
        assert_eq!(cache.stat().avg_write_ms, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_of_key() {
        let cache = coordinator(&[(1, 1, 1), (1, 1, 1)]);
        cache.write("a", "1").unwrap();
        cache.wait_idle().await;
        cache.write("b", "2").unwrap();
        cache.wait_idle().await;

        assert_eq!(cache.level_of_key("b"), Some(0));
        assert_eq!(cache.level_of_key("a"), Some(1));
        assert_eq!(cache.level_of_key("c"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_promote_clamps_range() {
        let cache = coordinator(&[(2, 1, 1)]);
        cache.promote("k", "v", 5).unwrap();
        cache.wait_idle().await;

        assert!(cache.tiers()[0].contains_key("k"));
    }

    #[tokio::test]
    async fn test_write_after_shutdown_is_rejected() {
        let cache = coordinator(&[(1, 0, 0)]);
        cache.shutdown();

        assert!(!cache.is_running());
        assert!(matches!(cache.write("k", "v"), Err(CacheError::PoolStopped)));
    }

    #[test]
    fn test_construction_outside_runtime_fails() {
        let result = Coordinator::new(vec![TierConfig::new(1, 0, 0)]);
        assert!(matches!(result, Err(CacheError::Runtime(_))));
    }

    #[tokio::test]
    async fn test_reports_worker_width() {
        let config = HierarchyConfig {
            tiers: vec![TierConfig::new(1, 0, 0)],
            workers: 3,
            ..Default::default()
        };
        let cache = Coordinator::with_config(&config).unwrap();
        assert_eq!(cache.workers(), 3);
    }

    #[tokio::test]
    async fn test_empty_hierarchy_is_rejected() {
        assert!(matches!(
            Coordinator::new(Vec::new()),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
