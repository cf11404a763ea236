use glam::{Quat, Vec4};

use crate::partial::PartialVec3;

pub fn lerp_f32(first: f32, second: f32, t: f32) -> f32 {
    first + t * (second - first)
}

/// Normalized-linear quaternion blend without the final normalization.
///
/// If the quaternions lie in opposite hemispheres the second one is negated first
/// so the blend follows the shorter arc. The result is *not* renormalized: it is
/// exact at `t = 0` and `t = 1` and slightly short in between, which callers
/// accept in exchange for skipping the square root. Chaining many blends will
/// drift away from unit length.
pub fn nlerp_quat(first: Quat, second: Quat, t: f32) -> Quat {
    let second = if first.dot(second) < 0.0 {
        -second
    } else {
        second
    };

    Quat::from_vec4(Vec4::from(first).lerp(Vec4::from(second), t))
}

/// Same as [`nlerp_quat`] but normalizes the result, for callers that chain blends.
pub fn nlerp_quat_normalized(first: Quat, second: Quat, t: f32) -> Quat {
    let blended = nlerp_quat(first, second, t);
    let length = blended.length();
    if length > f32::EPSILON {
        blended / length
    } else {
        first
    }
}

/// Blends one optional scalar channel.
///
/// At `t == 0` the first value passes through untouched, even when unset.
/// Otherwise a value set on only one side is held rather than blended towards zero.
pub fn lerp_optional(first: Option<f32>, second: Option<f32>, t: f32) -> Option<f32> {
    if t == 0.0 {
        return first;
    }

    match (first, second) {
        (Some(a), Some(b)) => Some(lerp_f32(a, b, t)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Per-component [`lerp_optional`] of two partial vectors.
pub fn lerp_partial(first: &PartialVec3, second: &PartialVec3, t: f32) -> PartialVec3 {
    PartialVec3::new(
        lerp_optional(first.x, second.x, t),
        lerp_optional(first.y, second.y, t),
        lerp_optional(first.z, second.z, t),
    )
}
