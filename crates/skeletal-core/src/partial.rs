//! Vectors whose components may individually be unset.
//!
//! Keyframe data frequently names only some axes of a joint's scale, rotation or
//! translation. A [`PartialVec3`] keeps that distinction until the value is
//! completed against bind-pose defaults or resolved for composition.

use glam::Vec3;
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
    #[strum(serialize = "z")]
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartialVec3 {
    #[cfg_attr(feature = "serde", serde(default))]
    pub x: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub y: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: Option<f32>,
}

impl PartialVec3 {
    pub const UNSET: Self = Self {
        x: None,
        y: None,
        z: None,
    };

    pub const fn new(x: Option<f32>, y: Option<f32>, z: Option<f32>) -> Self {
        Self { x, y, z }
    }

    pub const fn from_vec3(value: Vec3) -> Self {
        Self {
            x: Some(value.x),
            y: Some(value.y),
            z: Some(value.z),
        }
    }

    pub fn get(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set(&mut self, axis: Axis, value: Option<f32>) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }

    pub fn with(mut self, axis: Axis, value: f32) -> Self {
        self.set(axis, Some(value));
        self
    }

    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some() && self.z.is_some()
    }

    pub fn is_unset(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }

    /// Fills every unset component from `defaults`. Set components are kept.
    pub fn complete_with(&mut self, defaults: Vec3) {
        for axis in Axis::iter() {
            if self.get(axis).is_none() {
                self.set(axis, Some(defaults[axis.index()]));
            }
        }
    }

    /// A full vector, substituting `defaults` for unset components.
    pub fn resolve_or(&self, defaults: Vec3) -> Vec3 {
        Vec3::new(
            self.x.unwrap_or(defaults.x),
            self.y.unwrap_or(defaults.y),
            self.z.unwrap_or(defaults.z),
        )
    }

    pub fn to_vec3(&self) -> Option<Vec3> {
        Some(Vec3::new(self.x?, self.y?, self.z?))
    }
}

impl From<Vec3> for PartialVec3 {
    fn from(value: Vec3) -> Self {
        Self::from_vec3(value)
    }
}
