pub mod error;
pub mod lru;
pub mod tier;
pub mod types;

pub use error::{CacheError, Result, TierOp};
pub use lru::LruStore;
pub use tier::{DelayInterrupt, Tier};
pub use types::{Entry, ReadOutcome, StatSnapshot, TierConfig, TierUsage};
