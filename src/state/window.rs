//! Price window definitions and the tiered partitioner
//!
//! The search space is unbounded in price, but a single search only pages
//! through a limited number of results. Discovery therefore walks a sequence of
//! narrow price windows whose width grows as listings thin out.

use std::fmt;

/// Windows move in 20k steps below this low bound
const FINE_TIER_LIMIT: u64 = 400_000;
const FINE_STEP: u64 = 20_000;

/// Leaving the fine tier on this high bound re-crawls [350k, 400k] once
const GAP_TRIGGER_HIGH: u64 = 420_000;
const GAP_WINDOW: (u64, u64) = (350_000, 400_000);

/// Windows move in 50k steps below this low bound
const MID_TIER_LIMIT: u64 = 1_000_000;
const MID_STEP: u64 = 50_000;

/// Above the mid tier the low bound freezes and the high bound jumps once
const OPEN_STEP: u64 = 3_950_000;

/// Windows reaching this high bound end the walk
pub const PRICE_CEILING: u64 = 5_000_000;

/// Inclusive price bounds used as a search filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceWindow {
    low: u64,
    high: u64,
}

impl PriceWindow {
    /// Creates a window; bounds given in the wrong order are swapped
    pub fn new(low: u64, high: u64) -> Self {
        if low <= high {
            Self { low, high }
        } else {
            Self {
                low: high,
                high: low,
            }
        }
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }

    fn shifted(&self, step: u64) -> Self {
        Self::new(
            self.low.saturating_add(step),
            self.high.saturating_add(step),
        )
    }
}

impl fmt::Display for PriceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Position of the discovery walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCursor {
    /// This window is the next one to crawl
    Open(PriceWindow),

    /// Every price tier has been crawled
    Terminal,
}

impl WindowCursor {
    pub fn window(&self) -> Option<PriceWindow> {
        match self {
            Self::Open(window) => Some(*window),
            Self::Terminal => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

impl fmt::Display for WindowCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(window) => write!(f, "{}", window),
            Self::Terminal => write!(f, "terminal"),
        }
    }
}

/// Computes the window that follows `window`
///
/// # Tiers
///
/// | Condition | Next window |
/// |-----------|-------------|
/// | low < 400k | both bounds +20k |
/// | high == 420k | fixed [350k, 400k] |
/// | low < 1M | both bounds +50k |
/// | otherwise | high +3.95M once, then `Terminal` |
///
/// The open tier emits a single wide window: a window that is already wider
/// than a mid-tier step, or whose high bound reached the ceiling, is the last.
///
/// # Examples
///
/// ```
/// use immo_harvest::state::{advance, PriceWindow, WindowCursor};
///
/// let next = advance(&PriceWindow::new(380_000, 400_000));
/// assert_eq!(next, WindowCursor::Open(PriceWindow::new(400_000, 420_000)));
/// ```
pub fn advance(window: &PriceWindow) -> WindowCursor {
    let (low, high) = (window.low(), window.high());

    if low < FINE_TIER_LIMIT {
        return WindowCursor::Open(window.shifted(FINE_STEP));
    }

    if high == GAP_TRIGGER_HIGH {
        return WindowCursor::Open(PriceWindow::new(GAP_WINDOW.0, GAP_WINDOW.1));
    }

    if low < MID_TIER_LIMIT {
        return WindowCursor::Open(window.shifted(MID_STEP));
    }

    if high >= PRICE_CEILING || high - low > MID_STEP {
        return WindowCursor::Terminal;
    }

    WindowCursor::Open(PriceWindow::new(low, high.saturating_add(OPEN_STEP)))
}
