//! Small matrix helpers for joint transforms.

use glam::{Mat3, Mat4, Vec3};

/// Composes a local joint matrix as `Translate * Scale * Rotate`.
///
/// Rotation is innermost, so a vertex is rotated, then scaled along the
/// parent-facing axes, then translated.
pub fn compose_tsr(translation: Vec3, scale: Vec3, rotation: Mat4) -> Mat4 {
    Mat4::from_translation(translation) * Mat4::from_scale(scale) * rotation
}

/// The upper 3x3 of `matrix` with each basis column scaled to unit length.
///
/// Degenerate (zero length) columns are left untouched.
pub fn normalized_basis(matrix: &Mat4) -> Mat3 {
    let normalize = |column: Vec3| {
        let length = column.length();
        if length > f32::EPSILON {
            column / length
        } else {
            column
        }
    };

    Mat3::from_cols(
        normalize(matrix.x_axis.truncate()),
        normalize(matrix.y_axis.truncate()),
        normalize(matrix.z_axis.truncate()),
    )
}

/// Inverts `matrix`, or returns `None` when it is singular or the result is not finite.
pub fn try_inverse(matrix: &Mat4) -> Option<Mat4> {
    let determinant = matrix.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        return None;
    }

    let inverse = matrix.inverse();
    if inverse.is_finite() {
        Some(inverse)
    } else {
        None
    }
}

/// Transforms normals consistently with `matrix` (inverse-transpose of the upper 3x3).
///
/// Falls back to the plain upper 3x3 when it cannot be inverted.
pub fn normal_matrix(matrix: &Mat4) -> Mat3 {
    let basis = Mat3::from_mat4(*matrix);
    let determinant = basis.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        basis
    } else {
        basis.inverse().transpose()
    }
}
