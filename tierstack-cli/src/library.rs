use anyhow::{Context, Result};
use colored::Colorize;
use std::time::{Duration, Instant};
use tierstack::{Coordinator, HierarchyConfig, ReadOutcome, StatSnapshot};
use tracing::{error, info};

/// User-facing wrapper that times operations and renders their results
pub struct CacheLibrary {
    coordinator: Coordinator,
}

impl CacheLibrary {
    pub fn new(config: &HierarchyConfig) -> Result<Self> {
        let coordinator =
            Coordinator::with_config(config).context("Failed to initialize cache hierarchy")?;
        Ok(Self { coordinator })
    }

    /// Queue a write; failures are reported, not returned
    pub fn put(&self, key: &str, value: &str) {
        match self.coordinator.write(key, value) {
            Ok(()) => info!("{}", "OK (queued)".green()),
            Err(e) => error!(error = %e, "{}", format!("Error during write operation: {}", e).red()),
        }
    }

    /// Read through the hierarchy and report the outcome
    pub async fn get(&self, key: &str) -> Option<String> {
        let start = Instant::now();
        match self.coordinator.read(key).await {
            Ok(outcome) => {
                info!("{}", render_read(&outcome, start.elapsed()));
                outcome.value
            }
            Err(e) => {
                error!(error = %e, "{}", format!("Error during read operation: {}", e).red());
                None
            }
        }
    }

    pub fn display_stats(&self) {
        let window = self.coordinator.latency_window();
        info!("{}", render_stats(&self.coordinator.stat(), window));
    }

    /// Stop accepting writes and let queued ones finish
    pub async fn shutdown(&self) {
        self.coordinator.shutdown();
        self.coordinator.wait_idle().await;
        info!("Cache system shut down successfully.");
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }
}

pub fn render_read(outcome: &ReadOutcome, elapsed: Duration) -> String {
    match (&outcome.value, outcome.level) {
        (Some(value), Some(level)) => format!(
            "\"{}\" [Found in L{} Cache] [Read Time: {} ms] {}",
            value,
            level + 1,
            outcome.latency_ms,
            format!("({:.2?})", elapsed).dimmed()
        ),
        _ => format!(
            "{} [Read Time: {} ms]",
            "Key Not Present".yellow(),
            outcome.latency_ms
        ),
    }
}

pub fn render_stats(stat: &StatSnapshot, window: usize) -> String {
    let mut lines = vec!["Current Cache Usage:".bold().to_string()];
    for (level, usage) in stat.tiers.iter().enumerate() {
        lines.push(format!(
            "L{}: {}/{}",
            level + 1,
            usage.occupancy,
            usage.capacity
        ));
    }
    lines.push(format!(
        "Average READ Time (last {} operations): {} ms",
        window, stat.avg_read_ms
    ));
    lines.push(format!(
        "Average WRITE Time (last {} operations): {} ms",
        window, stat.avg_write_ms
    ));
    lines.join("\n")
}
