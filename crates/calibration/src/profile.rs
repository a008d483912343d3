//! Threshold profile

use crate::CalibrationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user detection thresholds.
///
/// Created by a calibration run (or loaded from persisted settings) and
/// handed to the engine at session start. Never patched field by field;
/// a new calibration run replaces the whole profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdProfile {
    /// Eyes count as closed below this EAR.
    pub ear_threshold: f32,
    /// Mouth counts as a yawn candidate above this MAR.
    pub mar_threshold: f32,
    /// Head counts as tilted beyond this |pitch| in degrees.
    pub head_pitch_threshold: f32,
    /// Consecutive condition frames required to reach levels 1, 2, 3.
    pub consecutive_frames_required: [u32; 3],
    pub created_at: DateTime<Utc>,
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self {
            // Stock constants for an uncalibrated user, ~30 fps capture:
            // level 1 after ~0.67 s, level 2 after 2.5 s, level 3 after 5 s.
            ear_threshold: 0.25,
            mar_threshold: 0.70,
            head_pitch_threshold: 30.0,
            consecutive_frames_required: [20, 75, 150],
            created_at: Utc::now(),
        }
    }
}

impl ThresholdProfile {
    /// Check the profile invariants: positive finite thresholds and
    /// level-ordered frame requirements.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (name, value) in [
            ("ear_threshold", self.ear_threshold),
            ("mar_threshold", self.mar_threshold),
            ("head_pitch_threshold", self.head_pitch_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalibrationError::InvalidProfile(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        let [l1, l2, l3] = self.consecutive_frames_required;
        if l1 == 0 {
            return Err(CalibrationError::InvalidProfile(
                "level-1 frame requirement must be at least 1".into(),
            ));
        }
        if l1 > l2 || l2 > l3 {
            return Err(CalibrationError::InvalidProfile(format!(
                "frame requirements must be level-ordered, got [{l1}, {l2}, {l3}]"
            )));
        }
        Ok(())
    }
}
