//! Run-wide statistics for the separation pipeline.
//!
//! This module defines the `SeparationStats` structure tracking how a
//! batch run went (pages processed, failures, which text source carried
//! each page) and the `StatsManager` helper that coordinates
//! thread-safe updates from concurrent page tasks.

use std::fmt;
use std::sync::Mutex;

/// Statistics for a separation run.
#[derive(Debug, Clone, Default)]
pub struct SeparationStats {
    /// Total pages processed (successes and failures).
    pub pages_processed: usize,
    /// Pages that failed outright (unreadable input).
    pub pages_failed: usize,
    /// Pages whose text layer came from the hosted vision service.
    pub vision_pages: usize,
    /// Pages that fell back to a local source.
    pub fallback_pages: usize,
    /// Pages packaged with at least one recorded degradation.
    pub degraded_pages: usize,
}

impl SeparationStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Success rate as a percentage (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        if self.pages_processed == 0 {
            0.0
        } else {
            let successes = self.pages_processed - self.pages_failed;
            (successes as f64 / self.pages_processed as f64) * 100.0
        }
    }
}

impl fmt::Display for SeparationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Separation statistics:")?;
        writeln!(f, "  Pages processed: {}", self.pages_processed)?;
        writeln!(
            f,
            "  Failed: {} ({:.1}% success)",
            self.pages_failed,
            self.success_rate()
        )?;
        writeln!(f, "  Vision service: {}", self.vision_pages)?;
        writeln!(f, "  Local fallback: {}", self.fallback_pages)?;
        writeln!(f, "  Degraded: {}", self.degraded_pages)?;
        Ok(())
    }
}

/// Thread-safe manager for updating statistics from page tasks.
#[derive(Debug, Default)]
pub struct StatsManager {
    stats: Mutex<SeparationStats>,
}

impl StatsManager {
    /// Creates a new manager with zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current statistics snapshot.
    pub fn snapshot(&self) -> SeparationStats {
        self.stats.lock().unwrap().clone()
    }

    /// Records a failed page.
    pub fn record_failure(&self) {
        let mut stats = self.stats.lock().unwrap();
        stats.pages_processed += 1;
        stats.pages_failed += 1;
    }

    /// Records a packaged page.
    pub fn record_page(&self, used_vision: bool, used_fallback: bool, degraded: bool) {
        let mut stats = self.stats.lock().unwrap();
        stats.pages_processed += 1;
        if used_vision {
            stats.vision_pages += 1;
        }
        if used_fallback {
            stats.fallback_pages += 1;
        }
        if degraded {
            stats.degraded_pages += 1;
        }
    }

    /// Resets the tracked statistics to their default state.
    pub fn reset(&self) {
        let mut stats = self.stats.lock().unwrap();
        *stats = SeparationStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_zero_pages() {
        assert_eq!(SeparationStats::default().success_rate(), 0.0);
    }

    #[test]
    fn manager_counts_pages_and_outcomes() {
        let manager = StatsManager::new();
        manager.record_page(true, false, false);
        manager.record_page(false, true, true);
        manager.record_failure();

        let stats = manager.snapshot();
        assert_eq!(stats.pages_processed, 3);
        assert_eq!(stats.pages_failed, 1);
        assert_eq!(stats.vision_pages, 1);
        assert_eq!(stats.fallback_pages, 1);
        assert_eq!(stats.degraded_pages, 1);
        assert!((stats.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn manager_resets_metrics() {
        let manager = StatsManager::new();
        manager.record_page(true, false, false);
        manager.reset();
        assert_eq!(manager.snapshot().pages_processed, 0);
    }

    #[test]
    fn display_formats_metrics() {
        let stats = SeparationStats {
            pages_processed: 4,
            pages_failed: 1,
            vision_pages: 2,
            fallback_pages: 1,
            degraded_pages: 1,
        };
        let display = stats.to_string();
        assert!(display.contains("Pages processed: 4"));
        assert!(display.contains("Vision service: 2"));
    }
}
