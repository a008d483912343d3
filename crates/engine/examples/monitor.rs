//! Scripted monitoring demo.
//!
//! Feeds a synthetic landmark stream through the engine: a calibration
//! phase on an alert baseline, a drowsy episode that escalates, recovery,
//! and a yawn, then prints the records the sinks received.
//!
//! Run with: cargo run -p engine --example monitor

use anyhow::Result;
use calibration::CalibrationConfig;
use engine::{DrowsinessEngine, EngineConfig};
use face_geometry::{Landmark, LandmarkFrame};

/// Synthetic frontal frame: eye half-height h sets EAR = h / 5, lip
/// vertical half-height v sets MAR = v / 10.
fn frame(timestamp_ms: u64, sequence: u32, h: f32, v: f32) -> LandmarkFrame {
    let eye = |cx: f32, cy: f32| {
        [
            Landmark::new(cx - 5.0, cy),
            Landmark::new(cx - 2.0, cy - h),
            Landmark::new(cx + 2.0, cy - h),
            Landmark::new(cx + 5.0, cy),
            Landmark::new(cx + 2.0, cy + h),
            Landmark::new(cx - 2.0, cy + h),
        ]
    };
    let lip = |x: f32| (Landmark::new(x, 15.0 - v), Landmark::new(x, 15.0 + v));

    LandmarkFrame {
        left_eye: eye(-22.5, -17.0),
        right_eye: eye(22.5, -17.0),
        mouth_left: Landmark::new(-15.0, 15.0),
        mouth_right: Landmark::new(15.0, 15.0),
        lip_verticals: [lip(-3.0), lip(0.0), lip(3.0)],
        nose_tip: Landmark::new(0.0, 0.0),
        chin: Landmark::new(0.0, 33.0),
        left_eye_outer: Landmark::new(-22.5, -17.0),
        right_eye_outer: Landmark::new(22.5, -17.0),
        timestamp_ms,
        sequence,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut engine = DrowsinessEngine::new(EngineConfig {
        smoothing_window: 3,
        calibration: CalibrationConfig {
            window_frames: 60,
            min_valid_samples: 40,
            consecutive_frames_required: [10, 30, 60],
            ..Default::default()
        },
        ..Default::default()
    });
    let mut alerts = engine.subscribe_alerts();
    let mut sessions = engine.subscribe_sessions();

    let session_id = engine.start_session(1001, None)?;
    println!("session {session_id} started, calibrating...");

    // Script: (frames, eye half-height, lip half-height)
    let script: &[(u32, f32, f32)] = &[
        (60, 1.5, 4.5),  // calibration baseline, EAR 0.30
        (30, 1.5, 4.5),  // alert driving
        (70, 0.4, 4.5),  // eyes drift shut, escalates through the levels
        (40, 1.5, 4.5),  // recovery
        (25, 1.5, 9.0),  // long yawn
        (30, 1.5, 4.5),  // alert again
    ];

    let mut seq: u32 = 0;
    for &(count, h, v) in script {
        for _ in 0..count {
            seq += 1;
            let f = frame(seq as u64 * 33, seq, h, v);
            if let Some(event) = engine.process_frame(&f)? {
                println!(
                    "[{:>7} ms] {} level {} after {:.2}s (ear {:.3}, mar {:.3})",
                    event.timestamp_ms,
                    event.alert_type.as_str(),
                    event.level.as_u8(),
                    event.duration_seconds,
                    event.ear,
                    event.mar,
                );
            }
        }
    }

    let summary = engine.end_session()?;
    println!(
        "session ended: {} alerts ({} drowsy, {} yawns)",
        summary.total_alerts, summary.drowsy_count, summary.yawn_count
    );

    println!("\nalert-history records:");
    while let Ok(record) = alerts.try_recv() {
        println!("  {}", serde_json::to_string(&record)?);
    }
    println!("session records:");
    while let Ok(record) = sessions.try_recv() {
        println!("  {}", serde_json::to_string(&record)?);
    }
    Ok(())
}
