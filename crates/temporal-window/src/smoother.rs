//! Metric smoothing and threshold-crossing debounce

use crate::window::MetricWindow;
use face_geometry::MetricSample;
use serde::{Deserialize, Serialize};

/// Strict consecutive-frame counter pair for one condition.
///
/// `active` counts frames the condition has held, `clear` counts frames it
/// has been absent. Either count resets the first frame the other side
/// starts. No partial credit, so alert timing stays predictable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debounce {
    pub active: u32,
    pub clear: u32,
}

impl Debounce {
    pub fn update(&mut self, met: bool) {
        if met {
            self.active += 1;
            self.clear = 0;
        } else {
            self.active = 0;
            self.clear += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Threshold values the smoother tracks crossings against.
/// Derived from a calibrated threshold profile at session start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossingThresholds {
    /// Eyes count as closed while smoothed EAR is below this.
    pub ear_below: f32,
    /// Mouth counts as open while smoothed MAR is above this.
    pub mar_above: f32,
    /// Head counts as tilted while |smoothed pitch| exceeds this (degrees).
    pub pitch_beyond_deg: f32,
}

/// Consecutive-frame counters for the three monitored conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossingCounts {
    pub eyes_closed: Debounce,
    pub mouth_open: Debounce,
    pub head_tilted: Debounce,
}

/// Smoothed view of one metric sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothedSample {
    pub timestamp_ms: u64,
    pub ear: f32,
    pub mar: f32,
    pub pitch_deg: f32,
    pub yaw_deg: f32,
}

/// Rolling smoother over the raw metric stream.
///
/// EAR and MAR use a moving average; pitch and yaw use a median window
/// because rigid-fit pose estimates spike on single frames.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    ear: MetricWindow,
    mar: MetricWindow,
    pitch: MetricWindow,
    yaw: MetricWindow,
    thresholds: CrossingThresholds,
    counts: CrossingCounts,
}

impl TemporalSmoother {
    /// Default window length, ~0.4 s at 30 fps.
    pub const DEFAULT_WINDOW: usize = 12;

    pub fn new(window: usize, thresholds: CrossingThresholds) -> Self {
        Self {
            ear: MetricWindow::new(window),
            mar: MetricWindow::new(window),
            pitch: MetricWindow::new(window),
            yaw: MetricWindow::new(window),
            thresholds,
            counts: CrossingCounts::default(),
        }
    }

    /// Fold one valid sample in and return the smoothed view.
    ///
    /// Invalid frames must simply not be pushed: the windows keep their
    /// contents and the crossing counters neither advance nor reset.
    pub fn push(&mut self, sample: &MetricSample) -> SmoothedSample {
        self.ear.push(sample.ear);
        self.mar.push(sample.mar);
        self.pitch.push(sample.head_pitch_deg);
        self.yaw.push(sample.head_yaw_deg);

        let smoothed = SmoothedSample {
            timestamp_ms: sample.timestamp_ms,
            ear: self.ear.mean(),
            mar: self.mar.mean(),
            pitch_deg: self.pitch.median(),
            yaw_deg: self.yaw.median(),
        };

        self.counts
            .eyes_closed
            .update(smoothed.ear < self.thresholds.ear_below);
        self.counts
            .mouth_open
            .update(smoothed.mar > self.thresholds.mar_above);
        self.counts
            .head_tilted
            .update(smoothed.pitch_deg.abs() > self.thresholds.pitch_beyond_deg);

        smoothed
    }

    pub fn counts(&self) -> &CrossingCounts {
        &self.counts
    }

    pub fn thresholds(&self) -> &CrossingThresholds {
        &self.thresholds
    }

    pub fn reset(&mut self) {
        self.ear.clear();
        self.mar.clear();
        self.pitch.clear();
        self.yaw.clear();
        self.counts = CrossingCounts::default();
    }
}
