//! Temporal smoothing
//!
//! Rolling per-metric windows that knock frame-level jitter out of the raw
//! geometry metrics, plus strict-debounce counters for each threshold
//! crossing. Counters reset the first frame a condition clears; skipped
//! frames (invalid landmarks) leave both windows and counters untouched so
//! camera noise cannot masquerade as recovery.

mod smoother;
mod window;

pub use smoother::{CrossingCounts, CrossingThresholds, Debounce, SmoothedSample, TemporalSmoother};
pub use window::MetricWindow;
