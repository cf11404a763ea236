//! Conversions between rotation matrices, unit quaternions and Euler triples.
//!
//! Euler triples are always in degrees and always use ZYX composition,
//! i.e. `R = Rz(z) * Ry(y) * Rx(x)`.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

use crate::matrix::normalized_basis;

// tolerance for detecting the axis-aligned half turns in quat_to_euler
const HALF_TURN_EPSILON: f32 = 1.0e-5;

/// A rotation expressed as three angles in degrees, composed Z * Y * X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EulerAngles {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerAngles {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_vec3(degrees: Vec3) -> Self {
        Self::new(degrees.x, degrees.y, degrees.z)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn from_quat(rotation: Quat) -> Self {
        quat_to_euler(rotation)
    }

    pub fn to_quat(self) -> Quat {
        euler_to_quat(self)
    }

    pub fn to_matrix(self) -> Mat4 {
        euler_to_matrix(self)
    }

    /// Per-component linear blend. No wrapping is done, so 350 -> 10 travels the long way.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::from_vec3(self.to_vec3().lerp(other.to_vec3(), t))
    }
}

/// Extracts the rotation of a (possibly scaled) transform as a quaternion.
///
/// The three basis columns are normalized first, so positive uniform or
/// non-uniform scale does not bias the result. Reflections and shear are not
/// compensated for; a mirrored basis yields an arbitrary but finite quaternion.
pub fn quat_from_matrix(matrix: &Mat4) -> Quat {
    quat_from_rotation(&normalized_basis(matrix))
}

/// Shepperd's method: pick the largest of the four diagonal combinations
/// as the divisor to keep the extraction numerically stable.
pub fn quat_from_rotation(m: &Mat3) -> Quat {
    // glam is column-major, name the entries by (row, column)
    let (m00, m01, m02) = (m.x_axis.x, m.y_axis.x, m.z_axis.x);
    let (m10, m11, m12) = (m.x_axis.y, m.y_axis.y, m.z_axis.y);
    let (m20, m21, m22) = (m.x_axis.z, m.y_axis.z, m.z_axis.z);

    let trace = m00 + m11 + m22;

    if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        Quat::from_xyzw((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s)
    } else if m00 > m11 && m00 > m22 {
        let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
        Quat::from_xyzw(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
    } else if m11 > m22 {
        let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
        Quat::from_xyzw((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
    } else {
        let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
        Quat::from_xyzw((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
    }
}

/// Builds a 4x4 rotation matrix from a quaternion.
///
/// The quaternion is used as-is: a non-unit input produces a scaled/skewed basis,
/// which is the expected outcome for the un-normalized results of [`crate::interpolate::nlerp_quat`].
pub fn quat_to_matrix(q: Quat) -> Mat4 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);

    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy), 0.0),
        Vec4::new(2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx), 0.0),
        Vec4::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy), 0.0),
        Vec4::W,
    )
}

/// Converts a quaternion into ZYX Euler angles in degrees.
///
/// Half turns around a single principal axis are answered directly, since the
/// general decomposition lands on an equivalent but surprising triple there
/// (a half turn about Y comes out as `(180, 0, 180)`). Any NaN produced by the
/// trigonometry is replaced with 0.
pub fn quat_to_euler(q: Quat) -> EulerAngles {
    if let Some(half_turn) = axis_aligned_half_turn(q) {
        return half_turn;
    }

    let (x, y, z, w) = (q.x, q.y, q.z, q.w);

    let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
    let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
    let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

    EulerAngles::new(
        nan_to_zero(roll.to_degrees()),
        nan_to_zero(pitch.to_degrees()),
        nan_to_zero(yaw.to_degrees()),
    )
}

pub fn euler_to_quat(euler: EulerAngles) -> Quat {
    Quat::from_rotation_z(euler.z.to_radians())
        * Quat::from_rotation_y(euler.y.to_radians())
        * Quat::from_rotation_x(euler.x.to_radians())
}

pub fn euler_to_matrix(euler: EulerAngles) -> Mat4 {
    Mat4::from_rotation_z(euler.z.to_radians())
        * Mat4::from_rotation_y(euler.y.to_radians())
        * Mat4::from_rotation_x(euler.x.to_radians())
}

fn axis_aligned_half_turn(q: Quat) -> Option<EulerAngles> {
    if q.w.abs() > HALF_TURN_EPSILON {
        return None;
    }

    let is_unit = |v: f32| (v.abs() - 1.0).abs() <= HALF_TURN_EPSILON;
    let is_zero = |v: f32| v.abs() <= HALF_TURN_EPSILON;
    let half_turn = |v: f32| 180.0_f32.copysign(v);

    if is_unit(q.x) && is_zero(q.y) && is_zero(q.z) {
        Some(EulerAngles::new(half_turn(q.x), 0.0, 0.0))
    } else if is_zero(q.x) && is_unit(q.y) && is_zero(q.z) {
        Some(EulerAngles::new(0.0, half_turn(q.y), 0.0))
    } else if is_zero(q.x) && is_zero(q.y) && is_unit(q.z) {
        Some(EulerAngles::new(0.0, 0.0, half_turn(q.z)))
    } else {
        None
    }
}

fn nan_to_zero(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}
