//! Background worker pool
//!
//! Executes write cascades and promotions off the caller's task.

pub mod pool;

pub use pool::{DEFAULT_WORKERS, Task, WorkerPool};
