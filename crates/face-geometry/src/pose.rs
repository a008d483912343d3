//! Head pose from a rigid weak-perspective fit
//!
//! Fits the six pose-anchor landmarks against a canonical 3D face template
//! under a scaled-orthographic camera model and extracts Euler angles from
//! the recovered rotation. Degenerate solves are reported as errors so the
//! caller can treat the frame as invalid instead of acting on garbage.

use crate::frame::LandmarkFrame;
use crate::GeometryError;
use ndarray::{arr2, Array2};
use serde::{Deserialize, Serialize};

/// Estimated head orientation (Euler angles, degrees).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Up/down tilt. Positive = head down under the template convention.
    pub pitch_deg: f32,
    /// Left/right rotation.
    pub yaw_deg: f32,
    /// Side tilt.
    pub roll_deg: f32,
}

/// Generic 3D face model centered at the nose tip, in camera coordinates
/// (x right, y down, z toward the camera). Row order must match the anchor
/// order used in [`solve_head_pose`].
const TEMPLATE: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],          // nose tip
    [0.0, 330.0, -65.0],      // chin
    [-225.0, -170.0, -135.0], // eye outer corner, image left
    [225.0, -170.0, -135.0],  // eye outer corner, image right
    [-150.0, 150.0, -125.0],  // mouth corner, image left
    [150.0, 150.0, -125.0],   // mouth corner, image right
];

/// Angles outside this band mean the solve collapsed numerically.
const MAX_ANGLE_DEG: f32 = 90.0;

const MIN_ROW_NORM: f64 = 1e-9;

/// Solve head pitch/yaw/roll from the frame's six pose anchors.
pub fn solve_head_pose(frame: &LandmarkFrame) -> Result<HeadPose, GeometryError> {
    let anchors = [
        &frame.nose_tip,
        &frame.chin,
        &frame.left_eye_outer,
        &frame.right_eye_outer,
        &frame.mouth_left,
        &frame.mouth_right,
    ];

    // Center both point sets on their centroids.
    let n = anchors.len() as f64;
    let cx = anchors.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let cy = anchors.iter().map(|p| p.y as f64).sum::<f64>() / n;

    let mut image = [[0.0f64; 6]; 2];
    for (i, p) in anchors.iter().enumerate() {
        image[0][i] = p.x as f64 - cx;
        image[1][i] = p.y as f64 - cy;
    }

    let tx = TEMPLATE.iter().map(|p| p[0]).sum::<f64>() / n;
    let ty = TEMPLATE.iter().map(|p| p[1]).sum::<f64>() / n;
    let tz = TEMPLATE.iter().map(|p| p[2]).sum::<f64>() / n;

    let mut model = [[0.0f64; 6]; 3];
    for (i, p) in TEMPLATE.iter().enumerate() {
        model[0][i] = p[0] - tx;
        model[1][i] = p[1] - ty;
        model[2][i] = p[2] - tz;
    }

    let x2: Array2<f64> = arr2(&image);
    let x3: Array2<f64> = arr2(&model);

    // Least-squares 2x3 projection: M = x2 x3^T (x3 x3^T)^-1.
    let cov = x3.dot(&x3.t());
    let inv = invert_3x3(&cov).ok_or(GeometryError::PoseSolve("singular template covariance"))?;
    let m = x2.dot(&x3.t()).dot(&inv);

    let mut r1 = [m[[0, 0]], m[[0, 1]], m[[0, 2]]];
    let mut r2 = [m[[1, 0]], m[[1, 1]], m[[1, 2]]];

    let n1 = norm(&r1);
    let n2 = norm(&r2);
    if !n1.is_finite() || !n2.is_finite() || n1 < MIN_ROW_NORM || n2 < MIN_ROW_NORM {
        return Err(GeometryError::PoseSolve("degenerate projection"));
    }
    scale(&mut r1, 1.0 / n1);
    scale(&mut r2, 1.0 / n2);

    // Gram-Schmidt: force the second rotation row orthogonal to the first.
    let d = dot(&r1, &r2);
    for i in 0..3 {
        r2[i] -= d * r1[i];
    }
    let n2 = norm(&r2);
    if n2 < MIN_ROW_NORM {
        return Err(GeometryError::PoseSolve("collinear projection rows"));
    }
    scale(&mut r2, 1.0 / n2);

    let r3 = cross(&r1, &r2);
    let r = [r1, r2, r3];

    // Euler extraction, XYZ convention shared with the reference template.
    let sy = (r[0][0] * r[0][0] + r[1][0] * r[1][0]).sqrt();
    let (pitch, yaw, roll) = if sy > 1e-6 {
        (
            r[2][1].atan2(r[2][2]),
            (-r[2][0]).atan2(sy),
            r[1][0].atan2(r[0][0]),
        )
    } else {
        ((-r[1][2]).atan2(r[1][1]), (-r[2][0]).atan2(sy), 0.0)
    };

    let pitch_deg = pitch.to_degrees() as f32;
    let yaw_deg = yaw.to_degrees() as f32;
    let roll_deg = roll.to_degrees() as f32;
    if !pitch_deg.is_finite() || !yaw_deg.is_finite() || !roll_deg.is_finite() {
        return Err(GeometryError::PoseSolve("non-finite angles"));
    }

    Ok(HeadPose {
        pitch_deg: pitch_deg.clamp(-MAX_ANGLE_DEG, MAX_ANGLE_DEG),
        yaw_deg: yaw_deg.clamp(-MAX_ANGLE_DEG, MAX_ANGLE_DEG),
        roll_deg: roll_deg.clamp(-MAX_ANGLE_DEG, MAX_ANGLE_DEG),
    })
}

fn invert_3x3(m: &Array2<f64>) -> Option<Array2<f64>> {
    let a = |i: usize, j: usize| m[[i, j]];

    let det = a(0, 0) * (a(1, 1) * a(2, 2) - a(1, 2) * a(2, 1))
        - a(0, 1) * (a(1, 0) * a(2, 2) - a(1, 2) * a(2, 0))
        + a(0, 2) * (a(1, 0) * a(2, 1) - a(1, 1) * a(2, 0));

    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }

    let inv = arr2(&[
        [
            (a(1, 1) * a(2, 2) - a(1, 2) * a(2, 1)) / det,
            (a(0, 2) * a(2, 1) - a(0, 1) * a(2, 2)) / det,
            (a(0, 1) * a(1, 2) - a(0, 2) * a(1, 1)) / det,
        ],
        [
            (a(1, 2) * a(2, 0) - a(1, 0) * a(2, 2)) / det,
            (a(0, 0) * a(2, 2) - a(0, 2) * a(2, 0)) / det,
            (a(0, 2) * a(1, 0) - a(0, 0) * a(1, 2)) / det,
        ],
        [
            (a(1, 0) * a(2, 1) - a(1, 1) * a(2, 0)) / det,
            (a(0, 1) * a(2, 0) - a(0, 0) * a(2, 1)) / det,
            (a(0, 0) * a(1, 1) - a(0, 1) * a(1, 0)) / det,
        ],
    ]);
    Some(inv)
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn scale(v: &mut [f64; 3], s: f64) {
    for x in v.iter_mut() {
        *x *= s;
    }
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
