use serde::{Deserialize, Serialize};

/// Key/value pair held by a tier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Configuration for a single tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Maximum number of entries
    pub capacity: usize,
    /// Simulated read service time in milliseconds
    #[serde(default)]
    pub read_latency_ms: u64,
    /// Simulated write service time in milliseconds
    #[serde(default)]
    pub write_latency_ms: u64,
}

impl TierConfig {
    pub fn new(capacity: usize, read_latency_ms: u64, write_latency_ms: u64) -> Self {
        Self {
            capacity,
            read_latency_ms,
            write_latency_ms,
        }
    }
}

/// Occupancy of one tier at snapshot time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierUsage {
    pub occupancy: usize,
    pub capacity: usize,
}

/// Statistics for the whole hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatSnapshot {
    /// Per-tier usage, fastest tier first
    pub tiers: Vec<TierUsage>,
    /// Mean of the recent read latencies (0 when none recorded)
    pub avg_read_ms: u64,
    /// Mean of the recent write latencies (0 when none recorded)
    pub avg_write_ms: u64,
}

/// Result of a synchronous read through the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Value found, if any
    pub value: Option<String>,
    /// Index of the tier that answered
    pub level: Option<usize>,
    /// Simulated latency of every tier probed
    pub latency_ms: u64,
}

impl ReadOutcome {
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}
