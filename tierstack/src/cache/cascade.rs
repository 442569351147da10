//! Eviction cascade
//!
//! A cascade carries one entry down the hierarchy. Each step puts the
//! entry into the current tier; an entry displaced by that put becomes the
//! payload of the next step, one tier slower. Every step takes exactly one
//! tier lock, so a displaced entry may briefly be in no tier at all.

use crate::core::error::Result;
use crate::core::tier::Tier;
use crate::core::types::Entry;
use tracing::debug;

/// Outcome of a finished cascade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Simulated write latency of every tier touched
    pub latency_ms: u64,
    /// Entry that fell out of the hierarchy, if any
    pub dropped: Option<Entry>,
    /// Stopped because a tier already held the identical entry
    pub short_circuited: bool,
}

/// Result of a single cascade step
#[derive(Debug)]
pub enum Step {
    Next(Cascade),
    Done(CascadeReport),
}

/// In-flight cascade state, moved into each successive step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cascade {
    entry: Entry,
    level: usize,
    end: usize,
    latency_ms: u64,
}

impl Cascade {
    /// Top-level write: tier 0 down to the slowest tier
    pub fn write(entry: Entry, tier_count: usize) -> Self {
        Self {
            entry,
            level: 0,
            end: tier_count,
            latency_ms: 0,
        }
    }

    /// Promotion into `level`, confined to tiers below `boundary`
    ///
    /// An entry displaced from the tier just above `boundary` is dropped;
    /// the boundary tier itself is never written.
    pub fn promote(entry: Entry, level: usize, boundary: usize) -> Self {
        Self {
            entry,
            level,
            end: boundary,
            latency_ms: 0,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Drive the cascade to completion
    pub async fn run(self, tiers: &[Tier]) -> Result<CascadeReport> {
        let mut cascade = self;
        loop {
            match cascade.step(tiers).await? {
                Step::Next(next) => cascade = next,
                Step::Done(report) => return Ok(report),
            }
        }
    }

    /// Apply the entry to the current tier
    pub async fn step(self, tiers: &[Tier]) -> Result<Step> {
        let Self {
            entry,
            level,
            end,
            mut latency_ms,
        } = self;

        let Some(tier) = tiers.get(level).filter(|_| level < end) else {
            return Ok(Step::Done(CascadeReport {
                latency_ms,
                dropped: Some(entry),
                short_circuited: false,
            }));
        };

        if tier.holds(&entry.key, &entry.value) {
            debug!("Tier L{} already holds {}, cascade stops", level + 1, entry.key);
            return Ok(Step::Done(CascadeReport {
                latency_ms,
                dropped: None,
                short_circuited: true,
            }));
        }

        let displaced = tier.put_and_evict(entry).await?;
        latency_ms += tier.write_latency_ms();

        let Some(displaced) = displaced else {
            return Ok(Step::Done(CascadeReport {
                latency_ms,
                ..Default::default()
            }));
        };

        let next = level + 1;
        if next < end {
            return Ok(Step::Next(Self {
                entry: displaced,
                level: next,
                end,
                latency_ms,
            }));
        }

        debug!(
            "Final eviction at tier L{}: {} -> {}",
            level + 1,
            displaced.key,
            displaced.value
        );
        Ok(Step::Done(CascadeReport {
            latency_ms,
            dropped: Some(displaced),
            short_circuited: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tier::DelayInterrupt;
    use crate::core::types::TierConfig;

    fn tiers(capacities: &[usize]) -> Vec<Tier> {
        let interrupt = DelayInterrupt::new();
        capacities
            .iter()
            .enumerate()
            .map(|(level, &cap)| {
                Tier::new(level, TierConfig::new(cap, 10, 5 * (level as u64 + 1)), interrupt.clone())
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_without_overflow_touches_one_tier() {
        let tiers = tiers(&[2, 2]);
        let report = Cascade::write(Entry::new("a", "1"), tiers.len())
            .run(&tiers)
            .await
            .unwrap();

        assert_eq!(report.latency_ms, 5);
        assert_eq!(report.dropped, None);
        assert!(tiers[0].contains_key("a"));
        assert!(!tiers[1].contains_key("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_moves_lru_to_next_tier() {
        let tiers = tiers(&[1, 2]);
        Cascade::write(Entry::new("a", "1"), 2).run(&tiers).await.unwrap();

        let report = Cascade::write(Entry::new("b", "2"), 2)
            .run(&tiers)
            .await
            .unwrap();

        assert_eq!(report.latency_ms, 5 + 10);
        assert_eq!(tiers[0].keys(), vec!["b"]);
        assert_eq!(tiers[1].keys(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_hands_displaced_entry_forward() {
        let tiers = tiers(&[1, 1]);
        Cascade::write(Entry::new("a", "1"), 2).run(&tiers).await.unwrap();

        let step = Cascade::write(Entry::new("b", "2"), 2)
            .step(&tiers)
            .await
            .unwrap();
        let Step::Next(next) = step else {
            panic!("expected the cascade to continue");
        };

        assert_eq!(next.level(), 1);
        assert_eq!(next.entry(), &Entry::new("a", "1"));
        // Between the two steps "a" is in neither tier
        assert!(!tiers[0].contains_key("a"));
        assert!(!tiers[1].contains_key("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_tier_overflow_drops_entry() {
        let tiers = tiers(&[1]);
        Cascade::write(Entry::new("x", "1"), 1).run(&tiers).await.unwrap();

        let report = Cascade::write(Entry::new("y", "2"), 1)
            .run(&tiers)
            .await
            .unwrap();

        assert_eq!(report.dropped, Some(Entry::new("x", "1")));
        assert_eq!(tiers[0].keys(), vec!["y"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_entry_short_circuits() {
        let tiers = tiers(&[1, 1]);
        Cascade::write(Entry::new("a", "1"), 2).run(&tiers).await.unwrap();

        let report = Cascade::write(Entry::new("a", "1"), 2)
            .run(&tiers)
            .await
            .unwrap();

        assert!(report.short_circuited);
        assert_eq!(report.latency_ms, 0);
        assert_eq!(tiers[0].size(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_circuit_applies_at_reached_tier() {
        let tiers = tiers(&[1, 2]);
        Cascade::write(Entry::new("a", "1"), 2).run(&tiers).await.unwrap();
        tiers[1].put("a", "1").await.unwrap();
        tiers[1].put("z", "9").await.unwrap();

        // "a" is displaced from L1 and found identical in L2
        let report = Cascade::write(Entry::new("b", "2"), 2)
            .run(&tiers)
            .await
            .unwrap();

        assert!(report.short_circuited);
        assert_eq!(report.latency_ms, 5);
        // L2 recency untouched: "a" is still least recent
        assert_eq!(tiers[1].keys(), vec!["a", "z"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_promotion_drops_entry_displaced_at_boundary() {
        let tiers = tiers(&[1, 2]);
        tiers[0].put("b", "2").await.unwrap();
        tiers[1].put("a", "1").await.unwrap();
        tiers[1].put("c", "3").await.unwrap();
        let boundary_before = tiers[1].keys();

        let report = Cascade::promote(Entry::new("a", "1"), 0, 1)
            .run(&tiers)
            .await
            .unwrap();

        assert_eq!(report.dropped, Some(Entry::new("b", "2")));
        assert_eq!(report.latency_ms, 5);
        assert_eq!(tiers[0].keys(), vec!["a"]);
        assert_eq!(tiers[1].keys(), boundary_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_promotion_cascades_inside_range_only() {
        let tiers = tiers(&[1, 1, 1]);
        tiers[0].put("x", "1").await.unwrap();
        tiers[1].put("y", "2").await.unwrap();
        tiers[2].put("k", "v").await.unwrap();

        // Into L1: "x" moves to L2, "y" falls out at the boundary
        let report = Cascade::promote(Entry::new("k", "v"), 0, 2)
            .run(&tiers)
            .await
            .unwrap();

        assert_eq!(report.dropped, Some(Entry::new("y", "2")));
        assert_eq!(report.latency_ms, 5 + 10);
        assert_eq!(tiers[0].keys(), vec!["k"]);
        assert_eq!(tiers[1].keys(), vec!["x"]);
        assert_eq!(tiers[2].keys(), vec!["k"]);
    }
}
