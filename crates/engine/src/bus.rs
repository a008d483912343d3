//! Non-blocking record fan-out
//!
//! Alert and session records leave the engine through unbounded channels
//! so that a slow or dead consumer can never stall frame processing.
//! Closed sinks are pruned on the next publish.

use session_log::{AlertRecord, SessionRecord};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Fan-out hub for the records the engine emits.
#[derive(Debug, Default)]
pub struct EventBus {
    alert_sinks: Vec<mpsc::UnboundedSender<AlertRecord>>,
    session_sinks: Vec<mpsc::UnboundedSender<SessionRecord>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer for alert records.
    pub fn subscribe_alerts(&mut self) -> mpsc::UnboundedReceiver<AlertRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.alert_sinks.push(tx);
        debug!(sinks = self.alert_sinks.len(), "alert sink registered");
        rx
    }

    /// Register a consumer for session records.
    pub fn subscribe_sessions(&mut self) -> mpsc::UnboundedReceiver<SessionRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.session_sinks.push(tx);
        debug!(sinks = self.session_sinks.len(), "session sink registered");
        rx
    }

    /// Deliver one alert record to every live sink.
    pub fn publish_alert(&mut self, record: &AlertRecord) {
        let before = self.alert_sinks.len();
        self.alert_sinks.retain(|tx| tx.send(record.clone()).is_ok());
        if self.alert_sinks.len() < before {
            warn!(
                dropped = before - self.alert_sinks.len(),
                "pruned closed alert sinks"
            );
        }
    }

    /// Deliver one session record to every live sink.
    pub fn publish_session(&mut self, record: &SessionRecord) {
        let before = self.session_sinks.len();
        self.session_sinks
            .retain(|tx| tx.send(record.clone()).is_ok());
        if self.session_sinks.len() < before {
            warn!(
                dropped = before - self.session_sinks.len(),
                "pruned closed session sinks"
            );
        }
    }
}
