//! Calibration state machine

use crate::profile::ThresholdProfile;
use crate::stats::SampleStats;
use crate::CalibrationError;
use chrono::Utc;
use face_geometry::MetricSample;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Calibration run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Observation window length in frames (~5 s at 30 fps).
    pub window_frames: u32,
    /// Minimum valid samples the window must yield.
    pub min_valid_samples: u32,
    /// EAR threshold = baseline mean scaled by this factor.
    pub ear_margin: f32,
    /// MAR threshold = baseline mean + this many standard deviations.
    pub mar_sigma: f32,
    /// Head pitch threshold used when the window shows no real pitch
    /// variance (degrees).
    pub default_head_pitch_deg: f32,
    /// Pitch standard deviation needed before the observed pose is
    /// trusted over the default.
    pub min_pitch_std_deg: f32,
    /// Escalation frame requirements copied into the produced profile.
    pub consecutive_frames_required: [u32; 3],
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_frames: 150,
            min_valid_samples: 90,
            ear_margin: 0.8,
            mar_sigma: 2.0,
            default_head_pitch_deg: 30.0,
            min_pitch_std_deg: 2.0,
            consecutive_frames_required: [20, 75, 150],
        }
    }
}

/// Calibrator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibratorState {
    Calibrating,
    Done,
}

/// Collects baseline EAR/MAR/pitch samples over a fixed frame window and
/// turns them into a [`ThresholdProfile`].
///
/// The window is measured in frames, so invalid frames advance it too
/// (via [`Calibrator::observe_gap`]), so a noisy camera runs the window out
/// and fails with `InsufficientSamples` instead of stalling forever.
#[derive(Debug)]
pub struct Calibrator {
    config: CalibrationConfig,
    state: CalibratorState,
    frames_seen: u32,
    ear_samples: Vec<f32>,
    mar_samples: Vec<f32>,
    pitch_samples: Vec<f32>,
}

impl Calibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            state: CalibratorState::Calibrating,
            frames_seen: 0,
            ear_samples: Vec::with_capacity(config.window_frames as usize),
            mar_samples: Vec::with_capacity(config.window_frames as usize),
            pitch_samples: Vec::with_capacity(config.window_frames as usize),
            config,
        }
    }

    /// Fold one valid sample into the observation window.
    ///
    /// Returns the finished profile once the window completes.
    pub fn observe(
        &mut self,
        sample: &MetricSample,
    ) -> Result<Option<ThresholdProfile>, CalibrationError> {
        if self.state == CalibratorState::Done {
            return Ok(None);
        }
        self.ear_samples.push(sample.ear);
        self.mar_samples.push(sample.mar);
        self.pitch_samples.push(sample.head_pitch_deg);
        self.advance()
    }

    /// Advance the window past an invalid frame without sampling it.
    pub fn observe_gap(&mut self) -> Result<Option<ThresholdProfile>, CalibrationError> {
        if self.state == CalibratorState::Done {
            return Ok(None);
        }
        self.advance()
    }

    fn advance(&mut self) -> Result<Option<ThresholdProfile>, CalibrationError> {
        self.frames_seen += 1;
        if self.frames_seen < self.config.window_frames {
            return Ok(None);
        }
        let profile = self.finish()?;
        self.state = CalibratorState::Done;
        Ok(Some(profile))
    }

    fn finish(&self) -> Result<ThresholdProfile, CalibrationError> {
        let collected = self.ear_samples.len() as u32;
        if collected < self.config.min_valid_samples {
            return Err(CalibrationError::InsufficientSamples {
                collected,
                required: self.config.min_valid_samples,
            });
        }

        let ear = SampleStats::compute(&self.ear_samples);
        let mar = SampleStats::compute(&self.mar_samples);
        let pitch = SampleStats::compute(&self.pitch_samples);
        debug!(
            ear_mean = ear.mean,
            mar_mean = mar.mean,
            pitch_std = pitch.std_dev,
            "calibration window complete"
        );

        // Alert slightly below the user's open-eye baseline.
        let ear_threshold = ear.mean * self.config.ear_margin;
        let mar_threshold = mar.mean + self.config.mar_sigma * mar.std_dev;

        // Only trust the observed pose when the window actually moved;
        // a statue-still user gives no information about their pitch range.
        let head_pitch_threshold = if pitch.std_dev >= self.config.min_pitch_std_deg {
            (pitch.mean.abs() + 3.0 * pitch.std_dev).clamp(20.0, 45.0)
        } else {
            self.config.default_head_pitch_deg
        };

        let profile = ThresholdProfile {
            ear_threshold,
            mar_threshold,
            head_pitch_threshold,
            consecutive_frames_required: self.config.consecutive_frames_required,
            created_at: Utc::now(),
        };

        profile.validate().map_err(|err| {
            CalibrationError::ImplausibleBaseline(format!(
                "baseline over {collected} samples produced an unusable profile: {err}"
            ))
        })?;

        info!(
            ear_threshold,
            mar_threshold, head_pitch_threshold, "calibration produced threshold profile"
        );
        Ok(profile)
    }

    pub fn state(&self) -> CalibratorState {
        self.state
    }

    /// Fraction of the observation window consumed so far.
    pub fn progress(&self) -> f32 {
        (self.frames_seen as f32 / self.config.window_frames.max(1) as f32).min(1.0)
    }

    /// Throw away the collected window and start over.
    pub fn restart(&mut self) {
        self.frames_seen = 0;
        self.ear_samples.clear();
        self.mar_samples.clear();
        self.pitch_samples.clear();
        self.state = CalibratorState::Calibrating;
    }
}
