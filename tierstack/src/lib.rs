pub mod cache;
pub mod config;
pub mod core;
pub mod worker;

// Re-export commonly used types
pub use cache::{Cascade, CascadeReport, Coordinator, LatencyWindow};
pub use config::{HierarchyConfig, LoggingConfig};
pub use crate::core::{
    CacheError, DelayInterrupt, Entry, LruStore, ReadOutcome, Result, StatSnapshot, Tier,
    TierConfig, TierOp, TierUsage,
};
pub use worker::WorkerPool;
