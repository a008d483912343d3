//! Landmark frame types

use crate::GeometryError;
use serde::{Deserialize, Serialize};

/// A single 2D facial landmark in image coordinates (x right, y down).
///
/// The upstream detector marks points it could not locate as not visible
/// instead of omitting them, so every frame has a fixed shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub visible: bool,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            visible: true,
        }
    }

    /// A point the detector failed to locate.
    pub fn hidden() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            visible: false,
        }
    }

    /// Euclidean distance to another landmark.
    pub fn distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn check(&self, name: &'static str) -> Result<(), GeometryError> {
        if !self.visible {
            return Err(GeometryError::MissingLandmark(name));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(GeometryError::NonFiniteCoordinate(name));
        }
        Ok(())
    }
}

/// One frame of facial landmarks from the external detector.
///
/// Eye rings follow the EAR convention: index 0 and 3 are the horizontal
/// corners, 1 and 2 the upper lid, 4 and 5 the lower lid (so that
/// `EAR = (|p2-p6| + |p3-p5|) / (2 |p1-p4|)` with 1-based names).
/// "Left"/"right" are in image space, i.e. the camera's view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub left_eye: [Landmark; 6],
    pub right_eye: [Landmark; 6],
    /// Mouth corners, also the horizontal reference for MAR.
    pub mouth_left: Landmark,
    pub mouth_right: Landmark,
    /// Inner-lip (top, bottom) pairs: left, centre, right vertical.
    pub lip_verticals: [(Landmark, Landmark); 3],
    /// Pose anchors.
    pub nose_tip: Landmark,
    pub chin: Landmark,
    pub left_eye_outer: Landmark,
    pub right_eye_outer: Landmark,
    /// Monotonic capture timestamp (milliseconds).
    pub timestamp_ms: u64,
    /// Capture sequence number.
    pub sequence: u32,
}

impl LandmarkFrame {
    /// Verify that every landmark the metrics need is present and finite.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for p in &self.left_eye {
            p.check("left_eye")?;
        }
        for p in &self.right_eye {
            p.check("right_eye")?;
        }
        self.mouth_left.check("mouth_left")?;
        self.mouth_right.check("mouth_right")?;
        for (top, bottom) in &self.lip_verticals {
            top.check("lip_vertical_top")?;
            bottom.check("lip_vertical_bottom")?;
        }
        self.nose_tip.check("nose_tip")?;
        self.chin.check("chin")?;
        self.left_eye_outer.check("left_eye_outer")?;
        self.right_eye_outer.check("right_eye_outer")?;
        Ok(())
    }
}
