//! Scroll-driven loading for infinite-scroll pages.
//!
//! There is no reliable "done" signal on these pages, so the controller
//! keeps scrolling until the item count and page extent stop moving.
//! The loop stalls out either at the bottom of the page (after a burst of
//! scroll-to-bottom retries) or anywhere after a longer run of idle
//! iterations, and it never runs past `max_attempts`.

mod clock;
mod config;
mod state;

pub use clock::{poll_until, Clock, PollSpec, TokioClock, VirtualClock};
pub use config::ScrollConfig;
pub use state::{Growth, ScrollPhase, ScrollState};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::outcome::FetchFault;

/// Scroll position and page size, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageMetrics {
    pub offset: u64,
    pub extent: u64,
    pub viewport: u64,
}

impl PageMetrics {
    /// Largest offset the page can scroll to.
    pub fn max_offset(&self) -> u64 {
        self.extent.saturating_sub(self.viewport)
    }

    /// Whether the viewport is within `margin` pixels of the bottom.
    pub fn at_bottom(&self, margin: u64) -> bool {
        self.offset + margin >= self.max_offset()
    }
}

/// An interactive, scrollable document.
#[async_trait]
pub trait ScrollSurface: Send + Sync {
    /// Number of elements currently matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize, FetchFault>;
    async fn metrics(&self) -> Result<PageMetrics, FetchFault>;
    async fn scroll_to(&self, offset: u64) -> Result<(), FetchFault>;
    async fn scroll_to_bottom(&self) -> Result<(), FetchFault>;
    /// Fire `scroll` and `wheel` events so lazy loaders notice.
    async fn dispatch_scroll_events(&self) -> Result<(), FetchFault>;
    /// Current rendered HTML.
    async fn snapshot(&self) -> Result<String, FetchFault>;
}

/// How the scroll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Converged,
    /// Attempt ceiling hit; the snapshot may be incomplete.
    Exhausted,
}

#[derive(Debug)]
pub struct ScrollReport {
    pub outcome: ScrollOutcome,
    pub attempts: u32,
    /// Item count at snapshot time.
    pub final_count: usize,
    pub snapshot: String,
}

/// Drives one surface until its content stops growing.
pub struct ScrollController<'a> {
    config: &'a ScrollConfig,
    clock: &'a dyn Clock,
    item_selector: &'a str,
}

impl<'a> ScrollController<'a> {
    pub fn new(config: &'a ScrollConfig, clock: &'a dyn Clock, item_selector: &'a str) -> Self {
        Self {
            config,
            clock,
            item_selector,
        }
    }

    /// Scroll until convergence or exhaustion, then snapshot the page.
    pub async fn run<S>(&self, surface: &S) -> Result<ScrollReport, FetchFault>
    where
        S: ScrollSurface + ?Sized,
    {
        let baseline = surface.count(self.item_selector).await?;
        let initial = surface.metrics().await?;
        let mut state = ScrollState::new(baseline, initial.extent);
        info!("Starting scroll with {} items", baseline);

        while state.attempts < self.config.max_attempts {
            state.attempts += 1;
            self.iterate(surface, &mut state).await?;
            if state.is_terminal() {
                break;
            }
        }

        let outcome = if state.phase == ScrollPhase::Converged {
            info!(
                "Converged after {} attempts with {} items",
                state.attempts, state.observed
            );
            ScrollOutcome::Converged
        } else {
            state.phase = ScrollPhase::Exhausted;
            warn!(
                "Scroll ceiling of {} attempts reached with {} items, result may be incomplete",
                self.config.max_attempts, state.observed
            );
            ScrollOutcome::Exhausted
        };

        let final_count = self.confirm(surface).await?;
        let snapshot = surface.snapshot().await?;
        debug!("Snapshot is {} bytes", snapshot.len());

        Ok(ScrollReport {
            outcome,
            attempts: state.attempts,
            final_count,
            snapshot,
        })
    }

    /// One scroll step plus measurement and the convergence checks.
    async fn iterate<S>(&self, surface: &S, state: &mut ScrollState) -> Result<(), FetchFault>
    where
        S: ScrollSurface + ?Sized,
    {
        let before = surface.metrics().await?;
        let target = (before.offset + self.config.step_px).min(before.max_offset());

        surface.scroll_to(target).await?;
        self.clock.sleep(self.config.scroll_pause()).await;
        surface.dispatch_scroll_events().await?;
        self.clock.sleep(self.config.event_pause()).await;

        let count = surface.count(self.item_selector).await?;
        let after = surface.metrics().await?;

        if state.observe(count, after.extent) == Growth::Items {
            debug!("Scroll {}: grew to {} items", state.attempts, state.observed);
        }
        if state.attempts % self.config.progress_interval.max(1) == 0 {
            info!(
                "Scroll {}: {} items, {} stalls",
                state.attempts, state.observed, state.stalls
            );
        }

        if after.at_bottom(self.config.bottom_margin_px) {
            self.bottom_burst(surface, state).await?;
            if state.stalls >= self.config.bottom_stall_threshold {
                info!(
                    "No new content at the bottom after {} stalls ({} items)",
                    state.stalls, state.observed
                );
                state.phase = ScrollPhase::Converged;
                return Ok(());
            }
        }

        if state.stalls >= self.config.idle_stall_threshold {
            info!(
                "No change for {} iterations ({} items)",
                state.stalls, state.observed
            );
            state.phase = ScrollPhase::Converged;
        }

        Ok(())
    }

    /// Repeated scroll-to-bottom to coax out trailing loads. Stops at the
    /// first retry that brings nothing new.
    async fn bottom_burst<S>(&self, surface: &S, state: &mut ScrollState) -> Result<(), FetchFault>
    where
        S: ScrollSurface + ?Sized,
    {
        for retry in 0..self.config.bottom_retries {
            surface.scroll_to_bottom().await?;
            self.clock.sleep(self.config.bottom_pause()).await;
            surface.dispatch_scroll_events().await?;
            self.clock.sleep(self.config.bottom_event_pause()).await;

            let count = surface.count(self.item_selector).await?;
            if count <= state.observed {
                break;
            }
            let metrics = surface.metrics().await?;
            state.observe(count, metrics.extent);
            info!(
                "Extra load at the bottom (retry {}): {} items",
                retry + 1,
                state.observed
            );
        }
        Ok(())
    }

    /// Final scroll-to-bottom passes before the snapshot.
    async fn confirm<S>(&self, surface: &S) -> Result<usize, FetchFault>
    where
        S: ScrollSurface + ?Sized,
    {
        for pass in 0..self.config.final_passes {
            surface.scroll_to_bottom().await?;
            self.clock.sleep(self.config.bottom_pause()).await;
            surface.dispatch_scroll_events().await?;
            self.clock.sleep(self.config.bottom_event_pause()).await;

            if pass % 3 == 0 {
                let count = surface.count(self.item_selector).await?;
                debug!(
                    "Confirmation pass {}/{}: {} items",
                    pass + 1,
                    self.config.final_passes,
                    count
                );
            }
        }
        surface.count(self.item_selector).await
    }
}
