//! Drowsiness Inference & Alert Escalation Engine
//!
//! Orchestrates the full per-frame pipeline:
//! landmark frame -> geometry metrics -> temporal smoothing ->
//! {calibration | alert ladders} -> alert event -> session aggregation.
//!
//! The engine owns decisions only. Cameras, landmark detection, UI, audio
//! and storage are external collaborators; alert and session records reach
//! them through non-blocking sinks so a slow consumer can never stall
//! frame processing.

pub mod bus;
pub mod config;
mod orchestrator;

pub use bus::EventBus;
pub use config::EngineConfig;
pub use orchestrator::DrowsinessEngine;

use calibration::CalibrationError;
use thiserror::Error;
use uuid::Uuid;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no active session")]
    SessionNotActive,

    #[error("session {0} is already active")]
    SessionAlreadyActive(Uuid),

    /// Out-of-order or duplicate frame timestamp. The frame was discarded
    /// without touching any counter.
    #[error("frame timestamp {got} ms is not after the last accepted {last} ms")]
    NonMonotonicTimestamp { last: u64, got: u64 },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}
