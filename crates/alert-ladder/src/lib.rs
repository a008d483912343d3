//! Alert escalation
//!
//! Three independent signal ladders (eyes, mouth, head) climb a four-step
//! scale as their condition persists and step back down through a recovery
//! window once it clears. The fused alert level is the maximum across
//! ladders; events fire on level increases only, never per frame.

mod event;
mod ladder;
mod machine;

pub use event::{AlertEvent, AlertLevel, AlertType};
pub use machine::{AlertStateMachine, LadderConfig};
