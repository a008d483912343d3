//! Per-user calibration
//!
//! Watches an initial observation window (eyes open, neutral face) and
//! derives user-specific detection thresholds from the observed baseline
//! instead of shipping one-size-fits-all constants.

mod calibrator;
mod profile;
mod stats;

pub use calibrator::{CalibrationConfig, Calibrator, CalibratorState};
pub use profile::ThresholdProfile;
pub use stats::SampleStats;

use thiserror::Error;

/// Calibration error types
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// Too few valid frames landed inside the observation window. The
    /// caller must restart calibration; monitoring may not start from a
    /// partial baseline.
    #[error("insufficient calibration samples: collected {collected}, need {required}")]
    InsufficientSamples { collected: u32, required: u32 },

    /// The observed baseline produced thresholds no real face would have
    /// (e.g. eyes closed for the whole window).
    #[error("implausible calibration baseline: {0}")]
    ImplausibleBaseline(String),

    /// A threshold profile violated its invariants.
    #[error("invalid threshold profile: {0}")]
    InvalidProfile(String),
}
