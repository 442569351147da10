use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cache::window::DEFAULT_WINDOW;
use crate::core::error::{CacheError, Result};
use crate::core::types::TierConfig;
use crate::worker::DEFAULT_WORKERS;

/// Cache hierarchy configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HierarchyConfig {
    /// Tiers, fastest first
    pub tiers: Vec<TierConfig>,
    /// Worker pool width
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Samples kept per latency window
    #[serde(default = "default_window")]
    pub latency_window: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                TierConfig::new(2, 10, 5),
                TierConfig::new(4, 20, 15),
                TierConfig::new(8, 40, 30),
            ],
            workers: DEFAULT_WORKERS,
            latency_window: DEFAULT_WINDOW,
            logging: LoggingConfig::default(),
        }
    }
}

impl HierarchyConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CacheError::Config(format!("{}: {}", path.display(), e)))?;
        let config: HierarchyConfig =
            serde_yaml::from_str(&content).map_err(|e| CacheError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Build from per-tier columns of capacities and latencies
    pub fn from_columns(capacities: &[usize], read_ms: &[u64], write_ms: &[u64]) -> Result<Self> {
        if capacities.len() != read_ms.len() || capacities.len() != write_ms.len() {
            return Err(CacheError::InvalidConfig(format!(
                "column lengths differ: {} capacities, {} read times, {} write times",
                capacities.len(),
                read_ms.len(),
                write_ms.len()
            )));
        }

        let config = Self {
            tiers: capacities
                .iter()
                .zip(read_ms)
                .zip(write_ms)
                .map(|((&capacity, &read), &write)| TierConfig::new(capacity, read, write))
                .collect(),
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the construction contract
    pub fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(CacheError::InvalidConfig(
                "at least one tier is required".to_string(),
            ));
        }
        if let Some(level) = self.tiers.iter().position(|tier| tier.capacity == 0) {
            return Err(CacheError::InvalidConfig(format!(
                "tier L{} has zero capacity",
                level + 1
            )));
        }
        if self.workers == 0 {
            return Err(CacheError::InvalidConfig(
                "workers must be greater than zero".to_string(),
            ));
        }
        if self.latency_window == 0 {
            return Err(CacheError::InvalidConfig(
                "latency_window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = HierarchyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.workers, 4);
        assert_eq!(config.latency_window, 5);
    }

    #[test]
    fn test_from_columns() {
        let config = HierarchyConfig::from_columns(&[1, 2], &[10, 20], &[5, 15]).unwrap();
        assert_eq!(
            config.tiers,
            vec![TierConfig::new(1, 10, 5), TierConfig::new(2, 20, 15)]
        );
    }

    #[test]
    fn test_from_columns_rejects_mismatched_lengths() {
        let err = HierarchyConfig::from_columns(&[1, 2], &[10], &[5, 15]).unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = HierarchyConfig::from_columns(&[1, 0], &[1, 1], &[1, 1]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: tier L2 has zero capacity"
        );
    }

    #[test]
    fn test_from_file_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "tiers:\n  - capacity: 1\n    read_latency_ms: 10\n    write_latency_ms: 5\n  - capacity: 2\n    read_latency_ms: 20\n"
        )
        .unwrap();

        let config = HierarchyConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tiers[1], TierConfig::new(2, 20, 0));
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tiers: not-a-list").unwrap();

        let err = HierarchyConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = HierarchyConfig::from_file("/nonexistent/tierstack.yml").unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }
}
