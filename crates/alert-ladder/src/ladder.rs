//! Single-signal escalation ladder

use temporal_window::Debounce;
use tracing::debug;

/// Four-step ladder (0 = normal, 3 = critical) for one monitored signal.
///
/// Escalates one step when the condition's consecutive-frame count reaches
/// the requirement for the next level; steps back down one level per full
/// recovery window of clear frames. Levels never jump.
#[derive(Debug)]
pub(crate) struct SignalLadder {
    name: &'static str,
    level: u8,
    /// Recovery steps already taken during the current clear streak.
    down_steps: u32,
    /// Frame timestamp at which the current condition streak began.
    streak_started_ms: Option<u64>,
}

impl SignalLadder {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            level: 0,
            down_steps: 0,
            streak_started_ms: None,
        }
    }

    /// Advance the ladder with this frame's debounce counts.
    pub(crate) fn update(
        &mut self,
        counts: &Debounce,
        required: &[u32; 3],
        recovery_frames: u32,
        timestamp_ms: u64,
    ) {
        if counts.active > 0 {
            if counts.active == 1 {
                self.streak_started_ms = Some(timestamp_ms);
            }
            self.down_steps = 0;

            if self.level < 3 && counts.active >= required[self.level as usize] {
                self.level += 1;
                debug!(
                    signal = self.name,
                    level = self.level,
                    streak = counts.active,
                    "signal escalated"
                );
            }
        } else {
            self.streak_started_ms = None;

            let recovery = recovery_frames.max(1);
            if self.level > 0 && counts.clear >= recovery * (self.down_steps + 1) {
                self.level -= 1;
                self.down_steps += 1;
                debug!(
                    signal = self.name,
                    level = self.level,
                    clear = counts.clear,
                    "signal recovered one step"
                );
            }
        }
    }

    pub(crate) fn level(&self) -> u8 {
        self.level
    }

    /// Seconds the current condition streak has lasted as of `timestamp_ms`.
    pub(crate) fn streak_seconds(&self, timestamp_ms: u64) -> f64 {
        match self.streak_started_ms {
            Some(start) => timestamp_ms.saturating_sub(start) as f64 / 1000.0,
            None => 0.0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.level = 0;
        self.down_steps = 0;
        self.streak_started_ms = None;
    }
}
