use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::{
    animation::{AnimationClip, KeyFrame},
    config::{JointMatrixSpace, SkinnedModelConfig},
    joint_transform::JointTransform,
    skeleton::{JointDesc, Skeleton, SkeletonData},
    skin::{AwsmSkinError, SkinnedModel},
};

const EPSILON: f32 = 1.0e-5;

// root(0) -> arm(1) -> hand(2)
fn arm_skeleton() -> Skeleton {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("root").with_index(0))
        .and_then(|b| {
            b.with_joint(
                JointDesc::new("arm")
                    .with_parent(0)
                    .with_index(1)
                    .with_bind_matrix(Mat4::from_translation(Vec3::Y)),
            )
        })
        .and_then(|b| {
            b.with_joint(
                JointDesc::new("hand")
                    .with_parent(1)
                    .with_index(2)
                    .with_bind_matrix(Mat4::from_translation(Vec3::Y)),
            )
        })
        .and_then(|b| b.build())
        .unwrap();

    Skeleton::new(Arc::new(data))
}

fn triangle() -> Vec<Vec3> {
    vec![Vec3::ZERO, Vec3::X, Vec3::Y]
}

fn wave_clip() -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        Some("wave".to_string()),
        vec![
            KeyFrame::new(0.0).with_joint("arm", JointTransform::of_location(Vec3::Y)),
            KeyFrame::new(1.0).with_joint("arm", JointTransform::of_location(Vec3::X)),
        ],
    ))
}

fn skinnable_model() -> SkinnedModel {
    SkinnedModel::new(arm_skeleton(), triangle())
        .with_joint_indices(vec![[0, 0, 0, 0], [1, 0, 0, 0], [2, 0, 0, 0]])
        .and_then(|model| model.with_weights(vec![[1.0, 0.0, 0.0, 0.0]; 3]))
        .unwrap()
}

#[test]
fn joint_matrices_start_as_identity() {
    let mut model = SkinnedModel::new(arm_skeleton(), triangle());
    assert_eq!(model.bone_count(), 3);

    let matrices = model.joint_transforms();
    assert_eq!(matrices.len(), 3);
    assert!(matrices.iter().all(|matrix| *matrix == Mat4::IDENTITY));
}

#[test]
fn update_skin_writes_model_space_transforms() {
    let mut model = skinnable_model();
    assert_eq!(model.update_skin(), 3);

    let matrices = model.joint_transforms();
    let hand = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
    assert!(matrices[2].abs_diff_eq(hand, EPSILON));

    // nothing moved, nothing written
    assert_eq!(model.update_skin(), 0);
}

#[test]
fn bind_relative_space_is_identity_at_rest() {
    let mut model = SkinnedModel::new(arm_skeleton(), triangle()).with_config(
        SkinnedModelConfig::default().with_joint_matrix_space(JointMatrixSpace::BindRelative),
    );
    model.update_skin();

    for matrix in model.joint_transforms() {
        assert!(matrix.abs_diff_eq(Mat4::IDENTITY, EPSILON));
    }
}

#[test]
fn out_of_range_bone_index_is_skipped() {
    let mut model = SkinnedModel::new(arm_skeleton(), triangle()).with_bone_count(2);
    let hand = model.skeleton().key("hand").unwrap();
    model.skeleton_mut().update_world();

    let before = model.joint_transforms().to_vec();
    assert!(!model.update_animated_transform(hand));
    assert_eq!(model.joint_transforms(), before.as_slice());
    assert_eq!(model.joint_transforms().len(), 2);
}

#[test]
fn structural_joints_are_skipped() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("camera_mount"))
        .and_then(|b| b.build())
        .unwrap();
    let mut model = SkinnedModel::new(Skeleton::new(Arc::new(data)), triangle());
    let mount = model.skeleton().key("camera_mount").unwrap();

    assert!(!model.update_animated_transform(mount));
    assert!(model.joint_transforms().is_empty());
}

#[test]
fn skinning_needs_clip_weights_and_indices() {
    let mut model = SkinnedModel::new(arm_skeleton(), triangle())
        .with_joint_indices(vec![[0, 0, 0, 0]; 3])
        .unwrap();
    model.set_animation(wave_clip()).unwrap();
    assert!(!model.is_skinnable());

    let mut model = SkinnedModel::new(arm_skeleton(), triangle())
        .with_weights(vec![[1.0, 0.0, 0.0, 0.0]; 3])
        .unwrap();
    model.set_animation(wave_clip()).unwrap();
    assert!(!model.is_skinnable());

    let mut model = skinnable_model();
    assert!(!model.is_skinnable());
    model.set_animation(wave_clip()).unwrap();
    assert!(model.is_skinnable());

    model.set_animation(Arc::new(AnimationClip::new(None, Vec::new()))).unwrap();
    assert!(!model.is_skinnable());
}

#[test]
fn clips_for_other_skeletons_are_rejected() {
    let mut model = skinnable_model();
    let clip = Arc::new(AnimationClip::new(
        Some("tail_wag".to_string()),
        vec![KeyFrame::new(0.0).with_joint("tail", JointTransform::of_location(Vec3::X))],
    ));

    assert!(matches!(
        model.set_animation(clip),
        Err(AwsmSkinError::UnrelatedClip { clip }) if clip == "tail_wag"
    ));
    assert!(model.animation().is_none());
}

#[test]
fn bind_shape_applies_once() {
    let mut model = SkinnedModel::new(arm_skeleton(), triangle())
        .with_normals(vec![Vec3::Z; 3])
        .unwrap();

    let bind_shape =
        Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)) * Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
    model.set_bind_shape_matrix(bind_shape).unwrap();

    assert!(model.positions()[1].abs_diff_eq(Vec3::new(2.0, 0.0, 1.0), EPSILON));
    assert!(model.normals().unwrap()[0].abs_diff_eq(Vec3::Z, EPSILON));
    assert!(model.bind_shape_applied());

    assert!(matches!(
        model.set_bind_shape_matrix(bind_shape),
        Err(AwsmSkinError::BindShapeAlreadyApplied)
    ));
    assert!(model.positions()[1].abs_diff_eq(Vec3::new(2.0, 0.0, 1.0), EPSILON));
}

#[test]
fn normals_use_the_inverse_transpose() {
    let mut model = SkinnedModel::new(arm_skeleton(), triangle())
        .with_normals(vec![Vec3::new(1.0, 1.0, 0.0).normalize(); 3])
        .unwrap();

    // squash x: a 45 degree normal tilts towards x
    model
        .set_bind_shape_matrix(Mat4::from_scale(Vec3::new(0.5, 1.0, 1.0)))
        .unwrap();

    let normal = model.normals().unwrap()[0];
    assert!(normal.abs_diff_eq(Vec3::new(2.0, 1.0, 0.0).normalize(), EPSILON));
}

#[test]
fn vertex_buffers_must_match_positions() {
    let result =
        SkinnedModel::new(arm_skeleton(), triangle()).with_weights(vec![[1.0, 0.0, 0.0, 0.0]]);
    assert!(matches!(
        result,
        Err(AwsmSkinError::VertexCountMismatch {
            expected: 3,
            actual: 1,
            ..
        })
    ));
}

#[test]
fn gpu_views_are_flat() {
    let mut model = skinnable_model();

    assert_eq!(model.joint_matrices_bytes().len(), 3 * 16 * 4);
    assert_eq!(model.joint_indices().unwrap(), &[0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
    assert_eq!(model.weights().unwrap().len(), 12);
}
