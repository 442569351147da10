use thiserror::Error;

/// Tier operation that owns a simulated delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOp {
    Read,
    Write,
}

impl std::fmt::Display for TierOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Main error type for cache hierarchy operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Simulated {op} delay interrupted at tier L{}", .tier + 1)]
    Interrupted { tier: usize, op: TierOp },

    #[error("Worker pool stopped - task rejected")]
    PoolStopped,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task panicked: {0}")]
    TaskPanicked(String),

    #[error("Tokio runtime unavailable: {0}")]
    Runtime(String),
}

impl CacheError {
    /// Whether the failure aborted a single operation only
    ///
    /// None of the variants poison the coordinator; this separates the
    /// per-operation failures from lifecycle and setup errors.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Interrupted { .. } | Self::TaskPanicked(_))
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_message_uses_one_based_level() {
        let err = CacheError::Interrupted {
            tier: 1,
            op: TierOp::Read,
        };
        assert_eq!(err.to_string(), "Simulated read delay interrupted at tier L2");
        assert!(err.is_transient());
    }

    #[test]
    fn test_pool_stopped_is_not_transient() {
        let err = CacheError::PoolStopped;
        assert!(!err.is_transient());
        assert!(err.to_string().contains("stopped"));
    }
}
