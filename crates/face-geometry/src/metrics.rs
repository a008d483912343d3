//! EAR / MAR computation

use crate::frame::{Landmark, LandmarkFrame};
use crate::{pose, GeometryError};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Smallest horizontal span (pixels) a ratio may be normalized by.
/// Anything narrower is a degenerate detection, not a real face.
pub const MIN_SPAN: f32 = 1e-3;

/// Per-frame metric sample derived from one landmark frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricSample {
    /// Eye aspect ratio, averaged over both eyes. Always >= 0.
    pub ear: f32,
    /// Mouth aspect ratio. Always >= 0.
    pub mar: f32,
    /// Head pitch in degrees, clamped to [-90, 90].
    pub head_pitch_deg: f32,
    /// Head yaw in degrees, clamped to [-90, 90].
    pub head_yaw_deg: f32,
    /// Capture timestamp of the source frame (milliseconds).
    pub timestamp_ms: u64,
}

/// Compute the metric sample for one frame.
///
/// Fails when required landmarks are missing, coordinates are not finite,
/// or the face geometry is degenerate. The caller decides whether to skip
/// the frame or reuse the previous sample.
pub fn compute_sample(frame: &LandmarkFrame) -> Result<MetricSample, GeometryError> {
    frame.validate()?;

    let left = eye_aspect_ratio(&frame.left_eye)?;
    let right = eye_aspect_ratio(&frame.right_eye)?;
    let ear = (left + right) / 2.0;

    let mar = mouth_aspect_ratio(frame)?;
    let head = pose::solve_head_pose(frame)?;
    trace!(
        sequence = frame.sequence,
        ear,
        mar,
        pitch = head.pitch_deg,
        "frame metrics computed"
    );

    Ok(MetricSample {
        ear,
        mar,
        head_pitch_deg: head.pitch_deg,
        head_yaw_deg: head.yaw_deg,
        timestamp_ms: frame.timestamp_ms,
    })
}

/// EAR = (|p2-p6| + |p3-p5|) / (2 |p1-p4|) for one eye ring.
pub fn eye_aspect_ratio(eye: &[Landmark; 6]) -> Result<f32, GeometryError> {
    let horizontal = eye[0].distance_to(&eye[3]);
    if horizontal < MIN_SPAN {
        return Err(GeometryError::DegenerateSpan {
            region: "eye",
            span: horizontal,
            min: MIN_SPAN,
        });
    }

    let vertical_1 = eye[1].distance_to(&eye[5]);
    let vertical_2 = eye[2].distance_to(&eye[4]);
    Ok((vertical_1 + vertical_2) / (2.0 * horizontal))
}

/// Multi-point MAR: three inner-lip verticals over twice the mouth width.
/// The three verticals make the ratio robust against talking and smiling.
pub fn mouth_aspect_ratio(frame: &LandmarkFrame) -> Result<f32, GeometryError> {
    let horizontal = frame.mouth_left.distance_to(&frame.mouth_right);
    if horizontal < MIN_SPAN {
        return Err(GeometryError::DegenerateSpan {
            region: "mouth",
            span: horizontal,
            min: MIN_SPAN,
        });
    }

    let vertical_sum: f32 = frame
        .lip_verticals
        .iter()
        .map(|(top, bottom)| top.distance_to(bottom))
        .sum();

    Ok(vertical_sum / (2.0 * horizontal))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Synthetic frontal frame: eye half-height and lip vertical half-height
    /// control EAR (= h / 5) and MAR (= v / 10). Pose anchors sit exactly on
    /// the projected canonical template, so pitch/yaw come out near zero.
    pub(crate) fn synthetic_frame(timestamp_ms: u64, sequence: u32, h: f32, v: f32) -> LandmarkFrame {
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

    pub(crate) fn neutral_frame(timestamp_ms: u64, sequence: u32) -> LandmarkFrame {
        synthetic_frame(timestamp_ms, sequence, 1.5, 4.5)
    }

    #[test]
    fn test_ear_known_value() {
        let frame = synthetic_frame(0, 0, 1.5, 4.5);
        let ear = eye_aspect_ratio(&frame.left_eye).unwrap();
        assert!((ear - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_mar_known_value() {
        let frame = synthetic_frame(0, 0, 1.5, 4.5);
        let mar = mouth_aspect_ratio(&frame).unwrap();
        assert!((mar - 0.45).abs() < 1e-5);
    }

    #[test]
    fn test_closed_eye_lowers_ear() {
        let open = compute_sample(&synthetic_frame(0, 0, 1.5, 4.5)).unwrap();
        let closed = compute_sample(&synthetic_frame(33, 1, 0.4, 4.5)).unwrap();
        assert!(closed.ear < open.ear);
        assert!(closed.ear < 0.25);
    }

    #[test]
    fn test_degenerate_eye_span_rejected() {
        let mut frame = neutral_frame(0, 0);
        for p in frame.left_eye.iter_mut() {
            p.x = 0.0;
            p.y = 0.0;
        }
        assert!(matches!(
            compute_sample(&frame),
            Err(GeometryError::DegenerateSpan { region: "eye", .. })
        ));
    }

    #[test]
    fn test_degenerate_mouth_span_rejected() {
        let mut frame = neutral_frame(0, 0);
        frame.mouth_right = frame.mouth_left;
        assert!(matches!(
            mouth_aspect_ratio(&frame),
            Err(GeometryError::DegenerateSpan { region: "mouth", .. })
        ));
    }

    #[test]
    fn test_frontal_pose_near_zero() {
        let sample = compute_sample(&neutral_frame(0, 0)).unwrap();
        assert!(sample.head_pitch_deg.abs() < 1.0);
        assert!(sample.head_yaw_deg.abs() < 1.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// EAR and MAR never go negative and never divide by a span
            /// below the minimum, whatever the eye/mouth opening is.
            #[test]
            fn ratios_are_non_negative(h in 0.0f32..50.0, v in 0.0f32..50.0) {
                let frame = synthetic_frame(0, 0, h, v);
                let sample = compute_sample(&frame).unwrap();
                prop_assert!(sample.ear >= 0.0);
                prop_assert!(sample.mar >= 0.0);
                prop_assert!(sample.ear.is_finite());
                prop_assert!(sample.mar.is_finite());
            }

            /// Collapsing the eye ring onto a single point must surface a
            /// degenerate-span error instead of a division blow-up.
            #[test]
            fn collapsed_eye_never_divides(x in -100.0f32..100.0, y in -100.0f32..100.0) {
                let mut frame = neutral_frame(0, 0);
                for p in frame.right_eye.iter_mut() {
                    p.x = x;
                    p.y = y;
                }
                prop_assert!(
                    matches!(
                        eye_aspect_ratio(&frame.right_eye),
                        Err(GeometryError::DegenerateSpan { .. })
                    ),
                    "expected DegenerateSpan error"
                );
            }
        }
    }
}
