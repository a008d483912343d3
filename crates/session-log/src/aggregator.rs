//! Session aggregator

use crate::records::{SessionRecord, SessionStatus};
use alert_ladder::{AlertEvent, AlertType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// How HEAD_DOWN alerts feed the session counters.
///
/// In this domain a dropping head signals fatigue, so it counts toward
/// drowsiness by default; deployments that treat it as distraction can
/// keep it out of the drowsy counter instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadDownPolicy {
    #[default]
    CountAsDrowsy,
    CountAsDistraction,
}

/// Summary of one monitoring session.
///
/// Counters only grow while the session is active; after finalization the
/// summary is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_alerts: u32,
    pub drowsy_count: u32,
    pub yawn_count: u32,
    pub status: SessionStatus,
}

impl SessionSummary {
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            user_id: self.user_id,
            start_time: self.start_time,
            end_time: self.end_time,
            total_alerts: self.total_alerts,
            drowsy_count: self.drowsy_count,
            yawn_count: self.yawn_count,
            status: self.status,
        }
    }
}

/// Accumulates alert events for the lifetime of one session.
#[derive(Debug)]
pub struct SessionAggregator {
    summary: SessionSummary,
    policy: HeadDownPolicy,
}

impl SessionAggregator {
    pub fn new(session_id: Uuid, user_id: i64, policy: HeadDownPolicy) -> Self {
        Self {
            summary: SessionSummary {
                session_id,
                user_id,
                start_time: Utc::now(),
                end_time: None,
                total_alerts: 0,
                drowsy_count: 0,
                yawn_count: 0,
                status: SessionStatus::Active,
            },
            policy,
        }
    }

    /// Count one alert event.
    pub fn record_alert(&mut self, event: &AlertEvent) {
        if self.summary.status == SessionStatus::Ended {
            warn!(
                session = %self.summary.session_id,
                "alert arrived after session finalization, ignoring"
            );
            return;
        }

        self.summary.total_alerts += 1;
        match event.alert_type {
            AlertType::Drowsy => self.summary.drowsy_count += 1,
            AlertType::Yawn => self.summary.yawn_count += 1,
            AlertType::HeadDown => {
                if self.policy == HeadDownPolicy::CountAsDrowsy {
                    self.summary.drowsy_count += 1;
                }
            }
        }
    }

    /// Close the session. Safe to call more than once: the first call
    /// freezes the summary, later calls return the frozen copy.
    pub fn finalize(&mut self, end_time: DateTime<Utc>) -> SessionSummary {
        if self.summary.status == SessionStatus::Active {
            self.summary.end_time = Some(end_time);
            self.summary.status = SessionStatus::Ended;
            info!(
                session = %self.summary.session_id,
                total_alerts = self.summary.total_alerts,
                drowsy = self.summary.drowsy_count,
                yawn = self.summary.yawn_count,
                "session finalized"
            );
        }
        self.summary.clone()
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_ladder::AlertLevel;

    fn event(alert_type: AlertType) -> AlertEvent {
        AlertEvent {
            alert_type,
            level: AlertLevel::Warning,
            ear: 0.2,
            mar: 0.4,
            head_pitch_deg: 0.0,
            head_yaw_deg: 0.0,
            duration_seconds: 0.7,
            timestamp_ms: 0,
        }
    }

    fn aggregator(policy: HeadDownPolicy) -> SessionAggregator {
        SessionAggregator::new(Uuid::new_v4(), 42, policy)
    }

    #[test]
    fn test_counts_by_type() {
        let mut agg = aggregator(HeadDownPolicy::CountAsDrowsy);
        agg.record_alert(&event(AlertType::Drowsy));
        agg.record_alert(&event(AlertType::Drowsy));
        agg.record_alert(&event(AlertType::Yawn));
        let s = agg.summary();
        assert_eq!(s.total_alerts, 3);
        assert_eq!(s.drowsy_count, 2);
        assert_eq!(s.yawn_count, 1);
    }

    #[test]
    fn test_head_down_counts_as_drowsy_by_default() {
        let mut agg = aggregator(HeadDownPolicy::default());
        agg.record_alert(&event(AlertType::HeadDown));
        assert_eq!(agg.summary().drowsy_count, 1);
        assert_eq!(agg.summary().total_alerts, 1);
    }

    #[test]
    fn test_head_down_distraction_policy() {
        let mut agg = aggregator(HeadDownPolicy::CountAsDistraction);
        agg.record_alert(&event(AlertType::HeadDown));
        assert_eq!(agg.summary().drowsy_count, 0);
        assert_eq!(agg.summary().total_alerts, 1);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut agg = aggregator(HeadDownPolicy::default());
        agg.record_alert(&event(AlertType::Drowsy));

        let first = agg.finalize(Utc::now());
        assert_eq!(first.status, SessionStatus::Ended);
        assert!(first.end_time.is_some());

        let second = agg.finalize(Utc::now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_mutation_after_finalization() {
        let mut agg = aggregator(HeadDownPolicy::default());
        agg.finalize(Utc::now());
        agg.record_alert(&event(AlertType::Drowsy));
        assert_eq!(agg.summary().total_alerts, 0);
    }
}
