//! Per-frame pipeline orchestration
//!
//! One engine instance runs at most one session at a time. A session
//! either starts with a stored threshold profile or opens with a
//! calibration phase that produces one, then switches to monitoring.

use crate::bus::EventBus;
use crate::config::EngineConfig;
use crate::EngineError;
use alert_ladder::{AlertEvent, AlertStateMachine};
use calibration::{Calibrator, ThresholdProfile};
use chrono::Utc;
use face_geometry::{compute_sample, LandmarkFrame};
use session_log::{AlertRecord, SessionAggregator, SessionRecord, SessionSummary};
use temporal_window::{CrossingThresholds, TemporalSmoother};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where the active session is in its lifecycle.
enum Phase {
    Calibrating(Calibrator),
    Monitoring {
        profile: ThresholdProfile,
        smoother: TemporalSmoother,
        machine: AlertStateMachine,
    },
}

struct ActiveSession {
    id: Uuid,
    user_id: i64,
    phase: Phase,
    aggregator: SessionAggregator,
    last_timestamp_ms: Option<u64>,
}

/// Drowsiness inference engine.
///
/// Synchronous per frame: callers drive it from their capture loop and
/// read emitted records from the subscribed channels.
pub struct DrowsinessEngine {
    config: EngineConfig,
    bus: EventBus,
    active: Option<ActiveSession>,
    last_summary: Option<SessionSummary>,
}

impl DrowsinessEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            bus: EventBus::new(),
            active: None,
            last_summary: None,
        }
    }

    /// Register a consumer for alert-history records.
    pub fn subscribe_alerts(&mut self) -> mpsc::UnboundedReceiver<AlertRecord> {
        self.bus.subscribe_alerts()
    }

    /// Register a consumer for session records.
    pub fn subscribe_sessions(&mut self) -> mpsc::UnboundedReceiver<SessionRecord> {
        self.bus.subscribe_sessions()
    }

    /// Open a monitoring session for one user.
    ///
    /// With a stored profile the session starts monitoring immediately;
    /// without one it opens in the calibration phase. Fails while another
    /// session is active.
    pub fn start_session(
        &mut self,
        user_id: i64,
        profile: Option<ThresholdProfile>,
    ) -> Result<Uuid, EngineError> {
        if let Some(session) = &self.active {
            return Err(EngineError::SessionAlreadyActive(session.id));
        }

        let id = Uuid::new_v4();
        let phase = match profile {
            Some(profile) => {
                profile.validate()?;
                info!(session = %id, user_id, "session started with stored profile");
                monitoring_phase(&self.config, profile)
            }
            None => {
                info!(session = %id, user_id, "session started, calibrating");
                Phase::Calibrating(Calibrator::new(self.config.calibration.clone()))
            }
        };

        self.active = Some(ActiveSession {
            id,
            user_id,
            phase,
            aggregator: SessionAggregator::new(id, user_id, self.config.head_down_policy),
            last_timestamp_ms: None,
        });
        Ok(id)
    }

    /// Feed one landmark frame through the pipeline.
    ///
    /// Returns the alert event this frame triggered, if any. Frames with
    /// unusable geometry are treated as gaps: windows and counters hold
    /// their position and no event can fire.
    pub fn process_frame(
        &mut self,
        frame: &LandmarkFrame,
    ) -> Result<Option<AlertEvent>, EngineError> {
        let session = self.active.as_mut().ok_or(EngineError::SessionNotActive)?;

        if let Some(last) = session.last_timestamp_ms {
            if frame.timestamp_ms <= last {
                return Err(EngineError::NonMonotonicTimestamp {
                    last,
                    got: frame.timestamp_ms,
                });
            }
        }
        session.last_timestamp_ms = Some(frame.timestamp_ms);

        let sample = match compute_sample(frame) {
            Ok(sample) => Some(sample),
            Err(err) => {
                debug!(sequence = frame.sequence, %err, "unusable frame, skipping");
                None
            }
        };

        let completed = match (&mut session.phase, &sample) {
            (Phase::Calibrating(cal), Some(sample)) => match cal.observe(sample) {
                Ok(done) => done,
                Err(err) => {
                    warn!(session = %session.id, %err, "calibration failed, restarting window");
                    cal.restart();
                    return Err(err.into());
                }
            },
            (Phase::Calibrating(cal), None) => match cal.observe_gap() {
                Ok(done) => done,
                Err(err) => {
                    warn!(session = %session.id, %err, "calibration failed, restarting window");
                    cal.restart();
                    return Err(err.into());
                }
            },
            (Phase::Monitoring { .. }, _) => None,
        };

        if let Some(profile) = completed {
            session.phase = monitoring_phase(&self.config, profile);
            return Ok(None);
        }

        let event = match (&mut session.phase, sample) {
            (
                Phase::Monitoring {
                    smoother, machine, ..
                },
                Some(sample),
            ) => {
                let smoothed = smoother.push(&sample);
                machine.update(&smoothed, smoother.counts())
            }
            _ => None,
        };

        if let Some(event) = &event {
            session.aggregator.record_alert(event);
            self.bus
                .publish_alert(&AlertRecord::from_event(session.user_id, event));
        }
        Ok(event)
    }

    /// Close the active session and emit its record.
    ///
    /// Idempotent: calling again after the session ended returns the same
    /// frozen summary without emitting another record.
    pub fn end_session(&mut self) -> Result<SessionSummary, EngineError> {
        if let Some(mut session) = self.active.take() {
            let summary = session.aggregator.finalize(Utc::now());
            self.bus.publish_session(&summary.to_record());
            self.last_summary = Some(summary.clone());
            return Ok(summary);
        }
        self.last_summary
            .clone()
            .ok_or(EngineError::SessionNotActive)
    }

    /// Threshold profile in force, once monitoring has begun.
    pub fn threshold_profile(&self) -> Option<&ThresholdProfile> {
        match &self.active.as_ref()?.phase {
            Phase::Monitoring { profile, .. } => Some(profile),
            Phase::Calibrating(_) => None,
        }
    }

    /// Fraction of the calibration window consumed, while calibrating.
    pub fn calibration_progress(&self) -> Option<f32> {
        match &self.active.as_ref()?.phase {
            Phase::Calibrating(cal) => Some(cal.progress()),
            Phase::Monitoring { .. } => None,
        }
    }

    /// Id of the active session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Current fused alert level (0 while calibrating or idle).
    pub fn fused_level(&self) -> u8 {
        match self.active.as_ref().map(|s| &s.phase) {
            Some(Phase::Monitoring { machine, .. }) => machine.fused_level(),
            _ => 0,
        }
    }
}

fn monitoring_phase(config: &EngineConfig, profile: ThresholdProfile) -> Phase {
    let thresholds = CrossingThresholds {
        ear_below: profile.ear_threshold,
        mar_above: profile.mar_threshold,
        pitch_beyond_deg: profile.head_pitch_threshold,
    };
    let machine = AlertStateMachine::new(profile.consecutive_frames_required, config.ladder());
    Phase::Monitoring {
        smoother: TemporalSmoother::new(config.smoothing_window, thresholds),
        machine,
        profile,
    }
}
