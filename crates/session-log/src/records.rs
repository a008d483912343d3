//! Emitted record shapes
//!
//! Field sets match the alert-history and driving-session schemas already
//! defined by the wider system; the engine emits exactly these columns.

use alert_ladder::AlertEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Ended => "ENDED",
        }
    }
}

/// One alert-history row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub user_id: i64,
    pub alert_type: String,
    pub alert_level: u8,
    pub ear_value: f64,
    pub mar_value: f64,
    pub head_pitch: f64,
    pub head_yaw: f64,
    pub duration_seconds: f64,
    pub timestamp_ms: i64,
}

impl AlertRecord {
    pub fn from_event(user_id: i64, event: &AlertEvent) -> Self {
        Self {
            user_id,
            alert_type: event.alert_type.as_str().to_string(),
            alert_level: event.level.as_u8(),
            ear_value: event.ear as f64,
            mar_value: event.mar as f64,
            head_pitch: event.head_pitch_deg as f64,
            head_yaw: event.head_yaw_deg as f64,
            duration_seconds: event.duration_seconds,
            timestamp_ms: event.timestamp_ms as i64,
        }
    }
}

/// One driving-session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_alerts: u32,
    pub drowsy_count: u32,
    pub yawn_count: u32,
    pub status: SessionStatus,
}
