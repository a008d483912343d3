//! Alert event types

use serde::{Deserialize, Serialize};

/// Which signal drove an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Eyes closed, the most safety-critical signal.
    Drowsy,
    /// Sustained open mouth (yawning).
    Yawn,
    /// Head tilted past the pitch threshold.
    HeadDown,
}

impl AlertType {
    /// Wire/storage name, matching the alert-history schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drowsy => "DROWSY",
            Self::Yawn => "YAWN",
            Self::HeadDown => "HEAD_DOWN",
        }
    }
}

/// Alert severity ladder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum AlertLevel {
    #[default]
    None,
    /// Level 1: gentle warning.
    Warning,
    /// Level 2: alarm.
    Alarm,
    /// Level 3: siren.
    Critical,
}

impl AlertLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Warning => 1,
            Self::Alarm => 2,
            Self::Critical => 3,
        }
    }

    pub(crate) fn from_step(step: u8) -> Self {
        match step {
            0 => Self::None,
            1 => Self::Warning,
            2 => Self::Alarm,
            _ => Self::Critical,
        }
    }
}

/// One edge-triggered alert, created when the fused level increases.
///
/// Carries the smoothed metric snapshot that drove the transition and the
/// time spent building up to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub alert_type: AlertType,
    pub level: AlertLevel,
    pub ear: f32,
    pub mar: f32,
    pub head_pitch_deg: f32,
    pub head_yaw_deg: f32,
    /// Seconds the triggering condition had held when the level was reached.
    pub duration_seconds: f64,
    /// Frame-clock timestamp of the triggering frame (milliseconds).
    pub timestamp_ms: u64,
}
