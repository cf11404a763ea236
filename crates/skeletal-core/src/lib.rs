//! Rotation and transform math shared by the skeletal animation layer.
//!
//! Everything here is a pure function over small `Copy` values, so pose evaluation
//! never needs shared scratch storage and can run on whichever thread drives the frame.

pub mod interpolate;
pub mod matrix;
pub mod partial;
pub mod rotation;

pub use partial::{Axis, PartialVec3};
pub use rotation::EulerAngles;
