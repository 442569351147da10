use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default number of samples kept per window
pub const DEFAULT_WINDOW: usize = 5;

/// Rolling FIFO of the most recent latency samples
#[derive(Debug)]
pub struct LatencyWindow {
    samples: Mutex<VecDeque<u64>>,
    limit: usize,
}

impl LatencyWindow {
    pub fn new(limit: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(limit)),
            limit,
        }
    }

    /// Append a sample, dropping the oldest beyond the limit
    pub fn record(&self, latency_ms: u64) {
        let mut samples = self.samples.lock();
        samples.push_back(latency_ms);
        while samples.len() > self.limit {
            samples.pop_front();
        }
    }

    /// Mean over the samples actually held; 0 when empty
    pub fn average(&self) -> u64 {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return 0;
        }
        samples.iter().sum::<u64>() / samples.len() as u64
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Samples from oldest to newest
    pub fn samples(&self) -> Vec<u64> {
        self.samples.lock().iter().copied().collect()
    }
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average_is_zero() {
        let window = LatencyWindow::default();
        assert_eq!(window.average(), 0);
        assert!(window.is_empty());
    }

    #[test]
    fn test_average_divides_by_sample_count() {
        let window = LatencyWindow::default();
        window.record(10);
        window.record(20);

        assert_eq!(window.len(), 2);
        assert_eq!(window.average(), 15);
    }

    #[test]
    fn test_drops_oldest_beyond_limit() {
        let window = LatencyWindow::default();
        for sample in [100, 200, 10, 20, 30, 40, 50] {
            window.record(sample);
        }

        assert_eq!(window.samples(), vec![10, 20, 30, 40, 50]);
        assert_eq!(window.average(), 30);
    }

    #[test]
    fn test_concurrent_records_stay_bounded() {
        let window = std::sync::Arc::new(LatencyWindow::new(3));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let window = std::sync::Arc::clone(&window);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        window.record(i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(window.len(), 3);
    }
}
