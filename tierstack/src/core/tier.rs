use super::error::{CacheError, Result, TierOp};
use super::lru::LruStore;
use super::types::{Entry, TierConfig, TierUsage};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Shared signal that aborts simulated delays currently in flight
///
/// Only delays already waiting when `interrupt` is called are aborted;
/// delays started afterwards run normally.
#[derive(Debug, Clone, Default)]
pub struct DelayInterrupt {
    notify: Arc<Notify>,
}

impl DelayInterrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.notify.notify_waiters();
    }
}

/// One level of the cache hierarchy
///
/// Storage sits behind the tier's own mutex. The simulated service time is
/// awaited before the lock is taken, so a delayed task never holds it.
#[derive(Debug)]
pub struct Tier {
    level: usize,
    config: TierConfig,
    store: Mutex<LruStore>,
    interrupt: DelayInterrupt,
}

impl Tier {
    pub fn new(level: usize, config: TierConfig, interrupt: DelayInterrupt) -> Self {
        debug!(
            "Tier L{}: capacity={}, read={}ms, write={}ms",
            level + 1,
            config.capacity,
            config.read_latency_ms,
            config.write_latency_ms
        );

        Self {
            level,
            config,
            store: Mutex::new(LruStore::new(config.capacity)),
            interrupt,
        }
    }

    /// Read a value after the read delay; a hit becomes most-recently-used
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        self.simulate(self.config.read_latency_ms, TierOp::Read)
            .await?;

        let mut store = self.store.lock();
        Ok(store.get(key).map(str::to_owned))
    }

    /// Insert or update after the write delay
    ///
    /// Returns `false` when the tier now holds one entry more than its
    /// capacity. The surplus stays until `evict_least_recently_used`.
    pub async fn put(&self, key: &str, value: &str) -> Result<bool> {
        self.simulate(self.config.write_latency_ms, TierOp::Write)
            .await?;

        let mut store = self.store.lock();
        Ok(store.put(key.to_string(), value.to_string()))
    }

    /// Insert after the write delay and resolve any overflow in the same
    /// critical section, returning the displaced entry
    pub async fn put_and_evict(&self, entry: Entry) -> Result<Option<Entry>> {
        self.simulate(self.config.write_latency_ms, TierOp::Write)
            .await?;

        let mut store = self.store.lock();
        if store.put(entry.key, entry.value) {
            return Ok(None);
        }
        let evicted = store.evict_lru();
        if let Some(evicted) = &evicted {
            debug!("Tier L{} EVICT: {}", self.level + 1, evicted.key);
        }
        Ok(evicted)
    }

    /// Remove the least-recently-used entry when over capacity
    pub fn evict_least_recently_used(&self) -> Option<Entry> {
        self.store.lock().evict_lru()
    }

    /// Whether `key` is currently bound to exactly `value`
    ///
    /// Costs no simulated time and leaves recency untouched.
    pub fn holds(&self, key: &str, value: &str) -> bool {
        self.store.lock().peek(key) == Some(value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.lock().contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.store.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn read_latency_ms(&self) -> u64 {
        self.config.read_latency_ms
    }

    pub fn write_latency_ms(&self) -> u64 {
        self.config.write_latency_ms
    }

    pub fn is_over_capacity(&self) -> bool {
        self.store.lock().is_over_capacity()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    pub fn usage(&self) -> TierUsage {
        TierUsage {
            occupancy: self.size(),
            capacity: self.config.capacity,
        }
    }

    async fn simulate(&self, latency_ms: u64, op: TierOp) -> Result<()> {
        if latency_ms == 0 {
            return Ok(());
        }

        let interrupted = self.interrupt.notify.notified();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(latency_ms)) => Ok(()),
            _ = interrupted => Err(CacheError::Interrupted {
                tier: self.level,
                op,
            }),
        }
    }
}
