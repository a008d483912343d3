//! Session aggregation
//!
//! Accumulates alert events into one driving-session summary and shapes
//! the records the wider system persists. No storage happens here: the
//! engine only emits; sinks own the medium.

mod aggregator;
mod records;

pub use aggregator::{HeadDownPolicy, SessionAggregator, SessionSummary};
pub use records::{AlertRecord, SessionRecord, SessionStatus};
