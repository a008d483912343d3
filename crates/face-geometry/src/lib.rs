//! Facial geometry metrics
//!
//! Turns one landmark frame into one metric sample:
//! - Eye Aspect Ratio (EAR): low values mean closed eyes
//! - Mouth Aspect Ratio (MAR): high values mean an open mouth
//! - Head pitch/yaw from a rigid fit against a canonical face template
//!
//! Landmark detection itself happens upstream; this crate only consumes
//! the points it is handed.

pub mod frame;
pub mod metrics;
pub mod pose;

pub use frame::{Landmark, LandmarkFrame};
pub use metrics::{compute_sample, MetricSample, MIN_SPAN};
pub use pose::HeadPose;

use thiserror::Error;

/// Geometry error types
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("required landmark not visible: {0}")]
    MissingLandmark(&'static str),

    #[error("landmark {0} has a non-finite coordinate")]
    NonFiniteCoordinate(&'static str),

    #[error("{region} span {span} is below the minimum {min}")]
    DegenerateSpan {
        region: &'static str,
        span: f32,
        min: f32,
    },

    #[error("head pose solve failed: {0}")]
    PoseSolve(&'static str),
}
