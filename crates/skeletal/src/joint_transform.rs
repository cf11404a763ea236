//! Partial local transforms for a single joint at a single point in time.

use awsm_skeletal_core::{
    interpolate::{lerp_optional, lerp_partial, nlerp_quat, nlerp_quat_normalized},
    matrix::compose_tsr,
    rotation::{euler_to_matrix, euler_to_quat, quat_to_euler, quat_to_matrix},
    Axis, EulerAngles, PartialVec3,
};
use glam::{Mat4, Quat, Vec3};
use strum::IntoEnumIterator;

/// Bind-pose values substituted for unset components by [`JointTransform::complete`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindDefaults {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for BindDefaults {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BindDefaults {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            scale,
            rotation,
            translation,
        }
    }

    pub fn from_joint_transform(transform: &JointTransform) -> Self {
        if transform.matrix.is_some() {
            return Self::from_matrix(&transform.to_matrix());
        }

        Self {
            scale: transform.scale.resolve_or(Vec3::ONE),
            rotation: transform.rotation_quat(),
            translation: transform.translation.resolve_or(Vec3::ZERO),
        }
    }
}

/// A joint's local transform, any part of which may be unset.
///
/// Rotation is held either as a quaternion or as a ZYX Euler triple in degrees;
/// when both are present the quaternion wins and the two are not required to agree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JointTransform {
    pub scale: PartialVec3,
    pub rotation: PartialVec3,
    pub quaternion: Option<Quat>,
    pub translation: PartialVec3,
    /// Raw matrix supplied by the loader, concatenated after the composed components.
    pub matrix: Option<Mat4>,
    pub visible: bool,
}

impl Default for JointTransform {
    fn default() -> Self {
        Self {
            scale: PartialVec3::UNSET,
            rotation: PartialVec3::UNSET,
            quaternion: None,
            translation: PartialVec3::UNSET,
            matrix: None,
            visible: true,
        }
    }
}

enum RotationSource {
    Quaternion(Quat),
    Euler(PartialVec3),
}

impl JointTransform {
    /// A complete transform from scale, rotation and translation.
    pub fn new(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            scale: scale.into(),
            quaternion: Some(rotation),
            translation: translation.into(),
            ..Default::default()
        }
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix: Some(matrix),
            ..Default::default()
        }
    }

    pub fn of_scale(scale: Vec3) -> Self {
        Self {
            scale: scale.into(),
            ..Default::default()
        }
    }

    pub fn of_rotation(rotation: EulerAngles) -> Self {
        Self {
            rotation: rotation.to_vec3().into(),
            ..Default::default()
        }
    }

    pub fn of_quaternion(rotation: Quat) -> Self {
        Self {
            quaternion: Some(rotation),
            ..Default::default()
        }
    }

    pub fn of_location(translation: Vec3) -> Self {
        Self {
            translation: translation.into(),
            ..Default::default()
        }
    }

    pub fn with_scale_axis(mut self, axis: Axis, value: f32) -> Self {
        self.scale.set(axis, Some(value));
        self
    }

    /// Sets one Euler angle, in degrees.
    pub fn with_rotation_axis(mut self, axis: Axis, degrees: f32) -> Self {
        self.rotation.set(axis, Some(degrees));
        self
    }

    pub fn with_translation_axis(mut self, axis: Axis, value: f32) -> Self {
        self.translation.set(axis, Some(value));
        self
    }

    pub fn with_quaternion(mut self, rotation: Quat) -> Self {
        self.quaternion = Some(rotation);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn has_rotation(&self) -> bool {
        self.quaternion.is_some() || self.rotation.is_complete()
    }

    /// Either a raw matrix was supplied, or every scale, rotation and translation component is set.
    pub fn is_complete(&self) -> bool {
        self.matrix.is_some()
            || (self.scale.is_complete() && self.has_rotation() && self.translation.is_complete())
    }

    /// Fills every unset component from the bind pose.
    ///
    /// A transform with no rotation at all takes the bind quaternion; one with a
    /// partial Euler triple keeps its angles and takes the missing ones from the
    /// bind rotation expressed as Euler angles.
    ///
    /// A raw matrix already describes the whole local transform, so a transform
    /// carrying one is left as is.
    pub fn complete(&mut self, defaults: &BindDefaults) {
        if self.matrix.is_some() {
            return;
        }

        self.scale.complete_with(defaults.scale);
        self.translation.complete_with(defaults.translation);

        if self.quaternion.is_none() {
            if self.rotation.is_unset() {
                self.quaternion = Some(defaults.rotation);
            } else {
                self.rotation
                    .complete_with(quat_to_euler(defaults.rotation).to_vec3());
            }
        }
    }

    /// Overlays every component set on `other` onto `self`.
    pub fn merge(&mut self, other: &JointTransform) {
        for axis in Axis::iter() {
            if let Some(value) = other.scale.get(axis) {
                self.scale.set(axis, Some(value));
            }
            if let Some(value) = other.rotation.get(axis) {
                self.rotation.set(axis, Some(value));
            }
            if let Some(value) = other.translation.get(axis) {
                self.translation.set(axis, Some(value));
            }
        }
        if other.quaternion.is_some() {
            self.quaternion = other.quaternion;
        }
        if other.matrix.is_some() {
            self.matrix = other.matrix;
        }
        self.visible = other.visible;
    }

    /// The rotation as a quaternion, treating unset Euler angles as 0.
    pub fn rotation_quat(&self) -> Quat {
        match self.quaternion {
            Some(rotation) => rotation,
            None => euler_to_quat(EulerAngles::from_vec3(self.rotation.resolve_or(Vec3::ZERO))),
        }
    }

    pub fn rotation_matrix(&self) -> Mat4 {
        match self.quaternion {
            Some(rotation) => quat_to_matrix(rotation),
            None => euler_to_matrix(EulerAngles::from_vec3(self.rotation.resolve_or(Vec3::ZERO))),
        }
    }

    /// The composed local matrix: `Translate * Scale * Rotate`, followed by the raw matrix if any.
    ///
    /// Unset components contribute identity (scale 1, rotation 0, translation 0).
    pub fn to_matrix(&self) -> Mat4 {
        let composed = compose_tsr(
            self.translation.resolve_or(Vec3::ZERO),
            self.scale.resolve_or(Vec3::ONE),
            self.rotation_matrix(),
        );

        match self.matrix {
            Some(matrix) => composed * matrix,
            None => composed,
        }
    }

    /// Blends two transforms straight into a local matrix.
    ///
    /// Scale and translation are blended per axis, rotation by quaternion nlerp when
    /// either side carries a quaternion and by per-angle Euler lerp otherwise. At
    /// `progression == 0` the first frame passes through, so components it leaves unset
    /// stay at identity instead of picking up the second frame's values.
    ///
    /// This is a general small-transform blend; nothing here is specific to skeletons.
    pub fn interpolate(first: &Self, second: &Self, progression: f32) -> Mat4 {
        let scale = lerp_partial(&first.scale, &second.scale, progression).resolve_or(Vec3::ONE);
        let translation = lerp_partial(&first.translation, &second.translation, progression)
            .resolve_or(Vec3::ZERO);
        let rotation = Self::interpolate_rotation(first, second, progression);

        let composed = compose_tsr(translation, scale, rotation);

        match Self::interpolate_raw_matrix(first.matrix, second.matrix, progression) {
            Some(matrix) => composed * matrix,
            None => composed,
        }
    }

    /// Blends each of the nine scalar channels with its own bracket and progression.
    ///
    /// Experimental: the clip sampler always uses [`JointTransform::interpolate`] with
    /// a single progression. Rotation channels are blended as Euler angles; a frame that
    /// only carries a quaternion contributes its Euler decomposition.
    pub fn interpolate_channels(brackets: &ChannelBrackets) -> Mat4 {
        let scale = blend_channel(&brackets.scale, |frame, axis| frame.scale.get(axis));
        let translation =
            blend_channel(&brackets.translation, |frame, axis| frame.translation.get(axis));
        let rotation = blend_channel(&brackets.rotation, |frame, axis| match frame.quaternion {
            Some(rotation) => Some(quat_to_euler(rotation).to_vec3()[axis.index()]),
            None => frame.rotation.get(axis),
        });

        compose_tsr(
            translation.resolve_or(Vec3::ZERO),
            scale.resolve_or(Vec3::ONE),
            euler_to_matrix(EulerAngles::from_vec3(rotation.resolve_or(Vec3::ZERO))),
        )
    }

    fn rotation_source(&self) -> RotationSource {
        match self.quaternion {
            Some(rotation) => RotationSource::Quaternion(rotation),
            None => RotationSource::Euler(self.rotation),
        }
    }

    fn interpolate_rotation(first: &Self, second: &Self, progression: f32) -> Mat4 {
        if progression == 0.0 {
            return first.rotation_matrix();
        }

        let euler_quat = |euler: &PartialVec3| {
            euler_to_quat(EulerAngles::from_vec3(euler.resolve_or(Vec3::ZERO)))
        };

        match (first.rotation_source(), second.rotation_source()) {
            (RotationSource::Quaternion(a), RotationSource::Quaternion(b)) => {
                quat_to_matrix(nlerp_quat(a, b, progression))
            }
            (RotationSource::Quaternion(a), RotationSource::Euler(b)) if b.is_unset() => {
                quat_to_matrix(a)
            }
            (RotationSource::Euler(a), RotationSource::Quaternion(b)) if a.is_unset() => {
                quat_to_matrix(b)
            }
            (RotationSource::Quaternion(a), RotationSource::Euler(b)) => {
                quat_to_matrix(nlerp_quat(a, euler_quat(&b), progression))
            }
            (RotationSource::Euler(a), RotationSource::Quaternion(b)) => {
                quat_to_matrix(nlerp_quat(euler_quat(&a), b, progression))
            }
            (RotationSource::Euler(a), RotationSource::Euler(b)) => euler_to_matrix(
                EulerAngles::from_vec3(lerp_partial(&a, &b, progression).resolve_or(Vec3::ZERO)),
            ),
        }
    }

    // raw matrices are decomposed, blended, and recomposed; one-sided ones are held
    fn interpolate_raw_matrix(
        first: Option<Mat4>,
        second: Option<Mat4>,
        progression: f32,
    ) -> Option<Mat4> {
        if progression == 0.0 {
            return first;
        }

        match (first, second) {
            (Some(a), Some(b)) => Some(blend_matrix(&a, &b, progression)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}

/// Decomposes both matrices, blends the parts, and recomposes.
pub(crate) fn blend_matrix(first: &Mat4, second: &Mat4, progression: f32) -> Mat4 {
    let (scale_a, rotation_a, translation_a) = first.to_scale_rotation_translation();
    let (scale_b, rotation_b, translation_b) = second.to_scale_rotation_translation();
    Mat4::from_scale_rotation_translation(
        scale_a.lerp(scale_b, progression),
        nlerp_quat_normalized(rotation_a, rotation_b, progression),
        translation_a.lerp(translation_b, progression),
    )
}

fn blend_channel(
    channel: &[ChannelBracket<'_>; 3],
    pick: impl Fn(&JointTransform, Axis) -> Option<f32>,
) -> PartialVec3 {
    let mut result = PartialVec3::UNSET;
    for (bracket, axis) in channel.iter().zip(Axis::iter()) {
        result.set(
            axis,
            lerp_optional(
                pick(bracket.first, axis),
                pick(bracket.second, axis),
                bracket.progression,
            ),
        );
    }
    result
}

/// One `(frameA, frameB, progression)` bracket for a single scalar channel.
#[derive(Debug, Clone, Copy)]
pub struct ChannelBracket<'a> {
    pub first: &'a JointTransform,
    pub second: &'a JointTransform,
    pub progression: f32,
}

impl<'a> ChannelBracket<'a> {
    pub fn new(first: &'a JointTransform, second: &'a JointTransform, progression: f32) -> Self {
        Self {
            first,
            second,
            progression,
        }
    }
}

/// Per-axis brackets for [`JointTransform::interpolate_channels`].
#[derive(Debug, Clone, Copy)]
pub struct ChannelBrackets<'a> {
    pub scale: [ChannelBracket<'a>; 3],
    pub rotation: [ChannelBracket<'a>; 3],
    pub translation: [ChannelBracket<'a>; 3],
}

impl<'a> ChannelBrackets<'a> {
    /// Every channel shares the same bracket; equivalent to a single-progression blend
    /// for Euler-only frames.
    pub fn uniform(bracket: ChannelBracket<'a>) -> Self {
        Self {
            scale: [bracket; 3],
            rotation: [bracket; 3],
            translation: [bracket; 3],
        }
    }
}
