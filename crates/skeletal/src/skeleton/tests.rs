use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::{
    animation::Pose,
    joint_transform::JointTransform,
    skeleton::{AwsmSkeletonError, JointDesc, Skeleton, SkeletonData},
};

const EPSILON: f32 = 1.0e-5;

fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

// root -> child
fn chain(root_local: Mat4, child_local: Mat4) -> SkeletonData {
    SkeletonData::builder()
        .with_joint(JointDesc::new("root").with_bind_matrix(root_local))
        .and_then(|builder| {
            builder.with_joint(
                JointDesc::new("child")
                    .with_parent(0)
                    .with_bind_matrix(child_local),
            )
        })
        .and_then(|builder| builder.build())
        .unwrap()
}

#[test]
fn child_world_is_parent_world_times_local() {
    let data = chain(translate(1.0, 0.0, 0.0), translate(0.0, 2.0, 0.0));
    let mut skeleton = Skeleton::new(Arc::new(data));
    skeleton.update_world();

    let child = skeleton.key("child").unwrap();
    let world = skeleton.world(child).unwrap();
    assert!(world.abs_diff_eq(translate(1.0, 2.0, 0.0), EPSILON));
}

#[test]
fn composition_order_matters() {
    let root_local = translate(1.0, 0.0, 0.0) * Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let child_local = translate(0.0, 2.0, 0.0);

    let mut skeleton = Skeleton::new(Arc::new(chain(Mat4::IDENTITY, Mat4::IDENTITY)));
    let root = skeleton.key("root").unwrap();
    let child = skeleton.key("child").unwrap();
    skeleton.set_local(root, root_local).unwrap();
    skeleton.set_local(child, child_local).unwrap();
    skeleton.update_world();

    let world = *skeleton.world(child).unwrap();
    let swapped = child_local * root_local;

    assert!(world.abs_diff_eq(root_local * child_local, EPSILON));
    assert!(!world.abs_diff_eq(swapped, EPSILON));
    assert!(world
        .w_axis
        .truncate()
        .abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), EPSILON));
}

#[test]
fn parent_change_propagates_to_clean_children() {
    let mut skeleton = Skeleton::new(Arc::new(chain(Mat4::IDENTITY, translate(0.0, 1.0, 0.0))));
    skeleton.update_world();
    let first_pass = skeleton.take_updated();
    assert_eq!(first_pass.len(), 2);

    let root = skeleton.key("root").unwrap();
    let child = skeleton.key("child").unwrap();
    skeleton.set_local(root, translate(0.0, 0.0, 5.0)).unwrap();
    assert!(skeleton.has_pending_changes());
    skeleton.update_world();

    assert!(skeleton
        .world(child)
        .unwrap()
        .abs_diff_eq(translate(0.0, 1.0, 5.0), EPSILON));
    assert_eq!(skeleton.take_updated(), vec![root, child]);
    assert!(!skeleton.has_pending_changes());
}

#[test]
fn clean_tree_updates_nothing() {
    let mut skeleton = Skeleton::new(Arc::new(chain(Mat4::IDENTITY, Mat4::IDENTITY)));
    skeleton.update_world();
    skeleton.take_updated();

    skeleton.update_world();
    assert!(skeleton.take_updated().is_empty());
}

#[test]
fn only_the_dirty_subtree_is_recomputed() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("hips"))
        .and_then(|b| b.with_joint(JointDesc::new("left").with_parent(0)))
        .and_then(|b| b.with_joint(JointDesc::new("right").with_parent(0)))
        .and_then(|b| b.build())
        .unwrap();
    let mut skeleton = Skeleton::new(Arc::new(data));
    skeleton.update_world();
    skeleton.take_updated();

    let left = skeleton.key("left").unwrap();
    skeleton.set_local(left, translate(1.0, 0.0, 0.0)).unwrap();
    skeleton.update_world();

    assert_eq!(skeleton.take_updated(), vec![left]);
}

#[test]
fn apply_pose_skips_unknown_names() {
    let mut skeleton = Skeleton::new(Arc::new(chain(Mat4::IDENTITY, Mat4::IDENTITY)));
    let mut pose = Pose::default();
    pose.insert_local("child", translate(3.0, 0.0, 0.0));
    pose.insert_local("tail", translate(9.0, 9.0, 9.0));

    assert_eq!(skeleton.apply_pose(&pose), 1);
    skeleton.update_world();

    let child = skeleton.key("child").unwrap();
    assert!(skeleton
        .world(child)
        .unwrap()
        .abs_diff_eq(translate(3.0, 0.0, 0.0), EPSILON));
}

#[test]
fn reset_restores_bind_locals() {
    let mut skeleton = Skeleton::new(Arc::new(chain(translate(0.0, 1.0, 0.0), Mat4::IDENTITY)));
    let root = skeleton.key("root").unwrap();
    skeleton.set_local(root, translate(7.0, 0.0, 0.0)).unwrap();
    skeleton.update_world();

    skeleton.reset_to_bind_pose();
    skeleton.update_world();

    assert!(skeleton
        .world(root)
        .unwrap()
        .abs_diff_eq(translate(0.0, 1.0, 0.0), EPSILON));
}

#[test]
fn bind_model_accumulates_from_the_root() {
    let data = chain(translate(1.0, 0.0, 0.0), translate(0.0, 2.0, 0.0));
    let child = &data.joints()[data.find("child").unwrap()];

    assert!(child.bind_model.abs_diff_eq(translate(1.0, 2.0, 0.0), EPSILON));
    assert!(child
        .inverse_bind
        .abs_diff_eq(translate(-1.0, -2.0, 0.0), EPSILON));
}

#[test]
fn singular_bind_falls_back_to_identity_inverse() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("flat").with_bind_matrix(Mat4::from_scale(Vec3::ZERO)))
        .and_then(|b| b.build())
        .unwrap();

    assert_eq!(data.joints()[0].inverse_bind, Mat4::IDENTITY);
}

#[test]
fn supplied_inverse_bind_wins() {
    let supplied = translate(4.0, 4.0, 4.0);
    let data = SkeletonData::builder()
        .with_joint(
            JointDesc::new("root")
                .with_bind_matrix(translate(1.0, 0.0, 0.0))
                .with_inverse_bind(supplied),
        )
        .and_then(|b| b.build())
        .unwrap();

    assert_eq!(data.joints()[0].inverse_bind, supplied);
}

#[test]
fn partial_bind_locals_are_completed() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("root").with_bind_local(JointTransform::of_location(
            Vec3::new(0.0, 3.0, 0.0),
        )))
        .and_then(|b| b.build())
        .unwrap();

    let root = &data.joints()[0];
    assert!(root.bind_local.is_complete());
    let defaults = root.bind_defaults();
    assert!(defaults.scale.abs_diff_eq(Vec3::ONE, EPSILON));
    assert!(defaults.rotation.abs_diff_eq(Quat::IDENTITY, EPSILON));
    assert!(defaults
        .translation
        .abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), EPSILON));
}

#[test]
fn multiple_roots_are_allowed() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("body"))
        .and_then(|b| b.with_joint(JointDesc::new("camera_mount")))
        .and_then(|b| b.build())
        .unwrap();

    assert_eq!(data.roots(), &[0, 1]);
    let skeleton = Skeleton::new(Arc::new(data));
    assert_eq!(skeleton.roots().len(), 2);
}

#[test]
fn skin_indices_follow_the_skin_order() {
    let mut data = chain(Mat4::IDENTITY, Mat4::IDENTITY);
    let bone_count = data.assign_skin_indices(&["child", "missing", "root"]);

    assert_eq!(bone_count, 3);
    assert_eq!(data.bone_count(), 3);
    assert_eq!(data.joints()[data.find("child").unwrap()].index, Some(0));
    assert_eq!(data.joints()[data.find("root").unwrap()].index, Some(2));

    // reassigning clears the old slots
    data.assign_skin_indices(&["root"]);
    assert_eq!(data.joints()[data.find("child").unwrap()].index, None);
    assert_eq!(data.bone_count(), 1);
}

#[test]
fn find_matches_id_as_well_as_name() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("Hips").with_id("joint_0"))
        .and_then(|b| b.build())
        .unwrap();

    assert_eq!(data.find("Hips"), Some(0));
    assert_eq!(data.find("joint_0"), Some(0));
    assert_eq!(data.find("Spine"), None);
}

#[test]
fn builder_rejects_forward_parents() {
    let result = SkeletonData::builder().with_joint(JointDesc::new("child").with_parent(3));
    assert!(matches!(
        result,
        Err(AwsmSkeletonError::ParentNotDefined { parent: 3, .. })
    ));
}

#[test]
fn builder_rejects_duplicate_names() {
    let result = SkeletonData::builder()
        .with_joint(JointDesc::new("arm"))
        .and_then(|b| b.with_joint(JointDesc::new("arm")));
    assert!(matches!(result, Err(AwsmSkeletonError::DuplicateJointName(name)) if name == "arm"));
}

#[test]
fn builder_rejects_shared_skin_slots() {
    let result = SkeletonData::builder()
        .with_joint(JointDesc::new("a").with_index(0))
        .and_then(|b| b.with_joint(JointDesc::new("b").with_index(0)))
        .and_then(|b| b.build());
    assert!(matches!(
        result,
        Err(AwsmSkeletonError::DuplicateSkinIndex { index: 0, .. })
    ));
}

#[test]
fn bone_count_covers_the_highest_claimed_slot() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("a").with_index(4))
        .and_then(|b| b.with_joint(JointDesc::new("b").with_parent(0)))
        .and_then(|b| b.build())
        .unwrap();

    assert_eq!(data.bone_count(), 5);
}

#[test]
fn undrained_walks_stay_bounded() {
    let mut skeleton = Skeleton::new(Arc::new(chain(Mat4::IDENTITY, translate(0.0, 1.0, 0.0))));
    let root = skeleton.key("root").unwrap();
    let child = skeleton.key("child").unwrap();

    for frame in 0..1000 {
        skeleton
            .set_local(root, translate(frame as f32, 0.0, 0.0))
            .unwrap();
        skeleton.update_world();
    }

    // every change is still reported, once per joint
    assert_eq!(skeleton.take_updated(), vec![root, child]);
    assert!(skeleton.take_updated().is_empty());
}

#[test]
fn ids_resolve_without_shadowing_names() {
    let data = SkeletonData::builder()
        .with_joint(JointDesc::new("Hips").with_id("joint_0"))
        .and_then(|b| b.with_joint(JointDesc::new("joint_0").with_parent(0).with_id("joint_1")))
        .and_then(|b| b.with_joint(JointDesc::new("Tail").with_parent(1).with_id("joint_1")))
        .and_then(|b| b.build())
        .unwrap();

    // names win over ids, and a repeated id belongs to its first joint
    assert_eq!(data.find("joint_0"), Some(1));
    assert_eq!(data.find("joint_1"), Some(1));

    let mut skeleton = Skeleton::new(Arc::new(data));
    let mut pose = Pose::default();
    pose.insert_local("joint_1", translate(0.0, 4.0, 0.0));
    assert_eq!(skeleton.apply_pose(&pose), 1);

    let second = skeleton.key("joint_0").unwrap();
    assert_eq!(*skeleton.local(second).unwrap(), translate(0.0, 4.0, 0.0));
}
