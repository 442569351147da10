//! Cache Module
//!
//! Coordinates the tier hierarchy:
//! - Coordinator: reads, writes, promotion and statistics
//! - Cascade: eviction propagation toward slower tiers
//! - Window: rolling latency samples

pub mod cascade;
pub mod coordinator;
pub mod window;

pub use cascade::{Cascade, CascadeReport, Step};
pub use coordinator::Coordinator;
pub use window::{DEFAULT_WINDOW, LatencyWindow};
