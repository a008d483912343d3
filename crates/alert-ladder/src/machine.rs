//! Fused alert state machine

use crate::event::{AlertEvent, AlertLevel, AlertType};
use crate::ladder::SignalLadder;
use serde::{Deserialize, Serialize};
use temporal_window::{CrossingCounts, SmoothedSample};
use tracing::info;

/// Ladder behaviour knobs shared by all three signals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Clear frames required per one-step downgrade. Kept shorter than the
    /// level-1 escalation window so genuine recovery downgrades quickly
    /// while boundary flicker cannot toggle the level.
    pub recovery_frames: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self { recovery_frames: 10 }
    }
}

/// Decision engine fusing the three signal ladders into one alert level.
///
/// The reported level is the maximum across ladders. Exactly one
/// [`AlertEvent`] is emitted per fused level increase; decreases and
/// steady frames emit nothing.
#[derive(Debug)]
pub struct AlertStateMachine {
    required: [u32; 3],
    config: LadderConfig,
    eyes: SignalLadder,
    mouth: SignalLadder,
    head: SignalLadder,
    fused_level: u8,
}

impl AlertStateMachine {
    pub fn new(required: [u32; 3], config: LadderConfig) -> Self {
        Self {
            required,
            config,
            eyes: SignalLadder::new("eyes"),
            mouth: SignalLadder::new("mouth"),
            head: SignalLadder::new("head"),
            fused_level: 0,
        }
    }

    /// Advance all ladders with one smoothed frame and its crossing counts.
    ///
    /// Returns at most one event. Skipped (invalid) frames must simply not
    /// be passed in; the ladders then hold their position.
    pub fn update(
        &mut self,
        sample: &SmoothedSample,
        counts: &CrossingCounts,
    ) -> Option<AlertEvent> {
        let ts = sample.timestamp_ms;
        let recovery = self.config.recovery_frames;
        self.eyes
            .update(&counts.eyes_closed, &self.required, recovery, ts);
        self.mouth
            .update(&counts.mouth_open, &self.required, recovery, ts);
        self.head
            .update(&counts.head_tilted, &self.required, recovery, ts);

        let fused = self
            .eyes
            .level()
            .max(self.mouth.level())
            .max(self.head.level());

        let event = if fused > self.fused_level {
            // Tie-break by safety priority: eyes > head > mouth.
            let (alert_type, ladder) = if self.eyes.level() == fused {
                (AlertType::Drowsy, &self.eyes)
            } else if self.head.level() == fused {
                (AlertType::HeadDown, &self.head)
            } else {
                (AlertType::Yawn, &self.mouth)
            };

            let event = AlertEvent {
                alert_type,
                level: AlertLevel::from_step(fused),
                ear: sample.ear,
                mar: sample.mar,
                head_pitch_deg: sample.pitch_deg,
                head_yaw_deg: sample.yaw_deg,
                duration_seconds: ladder.streak_seconds(ts),
                timestamp_ms: ts,
            };
            info!(
                alert_type = alert_type.as_str(),
                level = fused,
                duration_s = event.duration_seconds,
                "alert level increased"
            );
            Some(event)
        } else {
            None
        };

        self.fused_level = fused;
        event
    }

    /// Current fused alert level (0..=3).
    pub fn fused_level(&self) -> u8 {
        self.fused_level
    }

    /// Drop all ladders back to normal, e.g. when a session starts.
    pub fn reset(&mut self) {
        self.eyes.reset();
        self.mouth.reset();
        self.head.reset();
        self.fused_level = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temporal_window::{CrossingThresholds, TemporalSmoother};

    const REQUIRED: [u32; 3] = [3, 6, 9];

    fn machine(recovery_frames: u32) -> AlertStateMachine {
        AlertStateMachine::new(REQUIRED, LadderConfig { recovery_frames })
    }

    fn smoother() -> TemporalSmoother {
        TemporalSmoother::new(
            1,
            CrossingThresholds {
                ear_below: 0.25,
                mar_above: 0.70,
                pitch_beyond_deg: 30.0,
            },
        )
    }

    fn step(
        m: &mut AlertStateMachine,
        s: &mut TemporalSmoother,
        ts: u64,
        ear: f32,
        mar: f32,
        pitch: f32,
    ) -> Option<AlertEvent> {
        let smoothed = s.push(&face_geometry::MetricSample {
            ear,
            mar,
            head_pitch_deg: pitch,
            head_yaw_deg: 0.0,
            timestamp_ms: ts,
        });
        m.update(&smoothed, s.counts())
    }

    #[test]
    fn test_no_event_one_frame_short() {
        let mut m = machine(2);
        let mut s = smoother();
        for i in 0..2 {
            assert!(step(&mut m, &mut s, i * 33, 0.1, 0.4, 0.0).is_none());
        }
        assert!(step(&mut m, &mut s, 99, 0.3, 0.4, 0.0).is_none());
        assert_eq!(m.fused_level(), 0);
    }

    #[test]
    fn test_exactly_one_event_at_threshold() {
        let mut m = machine(2);
        let mut s = smoother();
        let mut events = Vec::new();
        for i in 0..5 {
            events.extend(step(&mut m, &mut s, i * 33, 0.1, 0.4, 0.0));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alert_type, AlertType::Drowsy);
        assert_eq!(events[0].level, AlertLevel::Warning);
        assert_eq!(events[0].timestamp_ms, 2 * 33);
    }

    #[test]
    fn test_escalation_never_skips_levels() {
        let mut m = machine(2);
        let mut s = smoother();
        let mut levels = Vec::new();
        for i in 0..12 {
            if let Some(ev) = step(&mut m, &mut s, i * 33, 0.1, 0.4, 0.0) {
                levels.push(ev.level);
            }
        }
        assert_eq!(
            levels,
            vec![AlertLevel::Warning, AlertLevel::Alarm, AlertLevel::Critical]
        );
    }

    #[test]
    fn test_hysteresis_holds_level_through_single_clear_frame() {
        let mut m = machine(3);
        let mut s = smoother();
        for i in 0..6 {
            step(&mut m, &mut s, i * 33, 0.1, 0.4, 0.0);
        }
        assert_eq!(m.fused_level(), 2);

        step(&mut m, &mut s, 198, 0.35, 0.4, 0.0);
        assert_eq!(m.fused_level(), 2);

        step(&mut m, &mut s, 231, 0.35, 0.4, 0.0);
        step(&mut m, &mut s, 264, 0.35, 0.4, 0.0);
        assert_eq!(m.fused_level(), 1);
    }

    #[test]
    fn test_eyes_win_tie_over_mouth() {
        let mut m = machine(2);
        let mut s = smoother();
        let mut events = Vec::new();
        for i in 0..3 {
            events.extend(step(&mut m, &mut s, i * 33, 0.1, 0.9, 0.0));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alert_type, AlertType::Drowsy);
    }

    #[test]
    fn test_head_wins_tie_over_mouth() {
        let mut m = machine(2);
        let mut s = smoother();
        let mut events = Vec::new();
        for i in 0..3 {
            events.extend(step(&mut m, &mut s, i * 33, 0.3, 0.9, 45.0));
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].alert_type, AlertType::HeadDown);
    }

    #[test]
    fn test_no_event_when_second_signal_matches_level() {
        let mut m = machine(2);
        let mut s = smoother();
        // Eyes escalate to level 1 first.
        for i in 0..3 {
            step(&mut m, &mut s, i * 33, 0.1, 0.4, 0.0);
        }
        assert_eq!(m.fused_level(), 1);
        // Mouth joins at level 1 later: fused max unchanged, no new event.
        let mut events = Vec::new();
        for i in 3..6 {
            events.extend(step(&mut m, &mut s, i * 33, 0.1, 0.9, 0.0));
        }
        assert!(events.is_empty());
        assert_eq!(m.fused_level(), 1);
    }

    #[test]
    fn test_duration_reflects_streak_buildup() {
        let mut m = machine(2);
        let mut s = smoother();
        let mut event = None;
        for i in 0..3 {
            event = step(&mut m, &mut s, 1000 + i * 33, 0.1, 0.4, 0.0).or(event);
        }
        let event = event.unwrap();
        assert!((event.duration_seconds - 0.066).abs() < 1e-9);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Whatever the eye-closure pattern, the fused level moves at
            /// most one step per frame and stays on the 0..=3 ladder.
            #[test]
            fn fused_level_never_jumps(seq in proptest::collection::vec(any::<bool>(), 1..200)) {
                let mut m = machine(2);
                let mut s = smoother();
                let mut prev = 0u8;
                for (i, closed) in seq.iter().enumerate() {
                    let ear = if *closed { 0.1 } else { 0.3 };
                    step(&mut m, &mut s, i as u64 * 33, ear, 0.4, 0.0);
                    let cur = m.fused_level();
                    prop_assert!(cur <= 3);
                    prop_assert!(cur.abs_diff(prev) <= 1);
                    prev = cur;
                }
            }
        }
    }

    #[test]
    fn test_reset_returns_to_normal() {
        let mut m = machine(2);
        let mut s = smoother();
        for i in 0..6 {
            step(&mut m, &mut s, i * 33, 0.1, 0.4, 0.0);
        }
        assert!(m.fused_level() > 0);
        m.reset();
        assert_eq!(m.fused_level(), 0);
    }
}
