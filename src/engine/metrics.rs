//! Builder metrics.
//!
//! Two views are exposed:
//!
//! - [`PoolStats`]: cumulative counters of the grouping pool owned by an
//!   [`Ast`](crate::Ast), available at any time through `Ast::pool_stats`.
//! - [`ParseMetrics`]: what a single `Ast::parse_with_metrics` call did
//!   (elapsed time, input consumed, pool traffic during the call).
//!
//! Counters are plain integers; nothing here is collected unless asked for.

use std::ops::Sub;
use std::time::Duration;

// --- Pool --------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Groupings created because the pool was empty.
    pub allocated: usize,
    /// Groupings taken from the pool instead of being allocated.
    pub reused: usize,
    /// Groupings returned to the pool.
    pub retired: usize,
    /// Groupings released while the pool was full.
    pub dropped: usize,
}

impl Sub for PoolStats {
    type Output = PoolStats;

    fn sub(self, earlier: PoolStats) -> PoolStats {
        PoolStats {
            allocated: self.allocated - earlier.allocated,
            reused: self.reused - earlier.reused,
            retired: self.retired - earlier.retired,
            dropped: self.dropped - earlier.dropped,
        }
    }
}

// --- Parse -------------------------------------------------------------------

/// Timing and pool traffic of one parse.
#[derive(Debug, Default, Clone)]
pub struct ParseMetrics {
    /// Wall time spent inside the root parser.
    pub duration: Duration,
    /// Whether the root parser matched.
    pub matched: bool,
    /// Bytes consumed from the scanner.
    pub consumed: usize,
    /// Pool counters accumulated during this parse only.
    pub pool: PoolStats,
}
