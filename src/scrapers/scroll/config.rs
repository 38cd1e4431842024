//! Scroll convergence tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Thresholds and pauses for the scroll controller.
///
/// Defaults are empirically tuned against infinite-scroll grids; they are
/// exposed so they can be adjusted per target as source pages drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Run the scroll loop at all. When false the dynamic strategy
    /// snapshots the page right after the first-paint wait.
    pub enabled: bool,
    /// Pixels advanced per iteration.
    pub step_px: u64,
    /// Distance from the bottom that counts as "at the bottom".
    pub bottom_margin_px: u64,
    /// Scroll-to-bottom retries per bottom burst.
    pub bottom_retries: u32,
    /// Consecutive stalls at the bottom before converging.
    pub bottom_stall_threshold: u32,
    /// Consecutive stalls anywhere before converging.
    pub idle_stall_threshold: u32,
    /// Hard iteration ceiling.
    pub max_attempts: u32,
    /// Confirmation passes after convergence.
    pub final_passes: u32,
    pub scroll_pause_ms: u64,
    pub event_pause_ms: u64,
    pub bottom_pause_ms: u64,
    pub bottom_event_pause_ms: u64,
    /// Log progress every N attempts.
    pub progress_interval: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            step_px: 500,
            bottom_margin_px: 100,
            bottom_retries: 5,
            bottom_stall_threshold: 5,
            idle_stall_threshold: 10,
            max_attempts: 500,
            final_passes: 10,
            scroll_pause_ms: 1000,
            event_pause_ms: 500,
            bottom_pause_ms: 2000,
            bottom_event_pause_ms: 1500,
            progress_interval: 20,
        }
    }
}

impl ScrollConfig {
    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn event_pause(&self) -> Duration {
        Duration::from_millis(self.event_pause_ms)
    }

    pub fn bottom_pause(&self) -> Duration {
        Duration::from_millis(self.bottom_pause_ms)
    }

    pub fn bottom_event_pause(&self) -> Duration {
        Duration::from_millis(self.bottom_event_pause_ms)
    }
}
