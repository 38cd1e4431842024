//! Per-fetch scroll bookkeeping.

/// Where the scroll loop currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Growing,
    Stalling,
    Converged,
    Exhausted,
}

/// What one measurement changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// More items than ever seen before.
    Items,
    /// Item count flat but the page extent moved.
    Extent,
    /// Neither moved: one stall.
    None,
}

/// Mutable state owned by the controller for one dynamic fetch.
///
/// `observed` is a high-water mark. A lower reading is treated as a
/// measurement race and never resets the stall counter.
#[derive(Debug, Clone)]
pub struct ScrollState {
    pub observed: usize,
    pub stalls: u32,
    pub attempts: u32,
    pub extent: u64,
    pub phase: ScrollPhase,
}

impl ScrollState {
    pub fn new(baseline: usize, extent: u64) -> Self {
        Self {
            observed: baseline,
            stalls: 0,
            attempts: 0,
            extent,
            phase: ScrollPhase::Growing,
        }
    }

    /// Fold one (item count, page extent) measurement into the state.
    pub fn observe(&mut self, count: usize, extent: u64) -> Growth {
        if count > self.observed {
            self.observed = count;
            self.extent = extent;
            self.stalls = 0;
            self.phase = ScrollPhase::Growing;
            Growth::Items
        } else if extent == self.extent {
            self.stalls += 1;
            self.phase = ScrollPhase::Stalling;
            Growth::None
        } else {
            self.extent = extent;
            Growth::Extent
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, ScrollPhase::Converged | ScrollPhase::Exhausted)
    }
}
