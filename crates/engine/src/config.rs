//! Engine configuration

use crate::EngineError;
use alert_ladder::LadderConfig;
use calibration::CalibrationConfig;
use serde::{Deserialize, Serialize};
use session_log::HeadDownPolicy;
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smoothing window length in frames (~0.4 s at 30 fps).
    pub smoothing_window: usize,

    /// Clear frames needed per one-step alert downgrade.
    pub recovery_frames: u32,

    /// How HEAD_DOWN alerts feed the session counters.
    pub head_down_policy: HeadDownPolicy,

    /// Calibration run parameters.
    pub calibration: CalibrationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 12,
            recovery_frames: 10,
            head_down_policy: HeadDownPolicy::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a config file, with `DROWSYGUARD_*` environment overrides
    /// (e.g. `DROWSYGUARD_RECOVERY_FRAMES=15`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let cfg = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(::config::Environment::with_prefix("DROWSYGUARD").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Stricter escalation: shorter windows, faster warnings.
    pub fn strict() -> Self {
        Self {
            calibration: CalibrationConfig {
                consecutive_frames_required: [15, 60, 120],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// More lenient escalation for bumpy capture conditions.
    pub fn lenient() -> Self {
        Self {
            recovery_frames: 8,
            calibration: CalibrationConfig {
                consecutive_frames_required: [30, 90, 180],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub(crate) fn ladder(&self) -> LadderConfig {
        LadderConfig {
            recovery_frames: self.recovery_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recovery_shorter_than_escalation() {
        let cfg = EngineConfig::default();
        assert!(cfg.recovery_frames < cfg.calibration.consecutive_frames_required[0]);
    }

    #[test]
    fn test_presets_stay_level_ordered() {
        for cfg in [EngineConfig::strict(), EngineConfig::lenient()] {
            let [l1, l2, l3] = cfg.calibration.consecutive_frames_required;
            assert!(l1 <= l2 && l2 <= l3);
        }
    }

    #[test]
    fn test_roundtrips_through_serde() {
        let cfg = EngineConfig::strict();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recovery_frames, cfg.recovery_frames);
        assert_eq!(
            back.calibration.consecutive_frames_required,
            cfg.calibration.consecutive_frames_required
        );
    }
}
