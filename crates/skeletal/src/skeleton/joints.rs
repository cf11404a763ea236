use std::{collections::HashSet, sync::Arc};

use glam::Mat4;
use indexmap::IndexSet;
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::animation::Pose;

use super::{
    data::{JointData, SkeletonData},
    error::{AwsmSkeletonError, Result},
};

new_key_type! {
    pub struct JointKey;
}

/// Runtime state of one joint: its current animated local matrix.
#[derive(Debug, Clone)]
pub struct Joint {
    data_index: usize,
    index: Option<usize>,
    local: Mat4,
    visible: bool,
}

impl Joint {
    /// Position of this joint's static description in [`SkeletonData::joints`].
    pub fn data_index(&self) -> usize {
        self.data_index
    }

    /// Skin slot, if this joint is part of the skin.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn local(&self) -> &Mat4 {
        &self.local
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}

/// The runtime joint hierarchy for one model.
///
/// Joints are stored in a slotmap arena and linked by key. World (model-space)
/// matrices are derived top-down by [`Skeleton::update_world`], which only
/// recomputes subtrees below a joint whose local matrix changed.
#[derive(Debug, Clone)]
pub struct Skeleton {
    data: Arc<SkeletonData>,
    joints: SlotMap<JointKey, Joint>,
    world_matrices: SecondaryMap<JointKey, Mat4>,
    children: SecondaryMap<JointKey, Vec<JointKey>>,
    parents: SecondaryMap<JointKey, JointKey>,
    roots: Vec<JointKey>,
    // arena index in SkeletonData -> key
    keys: Vec<JointKey>,
    // set from the outside via set_local()
    dirties: HashSet<JointKey>,
    // set internally while walking, drained by the skin, each joint at most once
    updated: IndexSet<JointKey>,
}

impl Skeleton {
    pub fn new(data: Arc<SkeletonData>) -> Self {
        let len = data.len();
        let mut joints = SlotMap::with_capacity_and_key(len);
        let mut world_matrices = SecondaryMap::with_capacity(len);
        let mut children = SecondaryMap::with_capacity(len);
        let mut parents = SecondaryMap::with_capacity(len);
        let mut keys: Vec<JointKey> = Vec::with_capacity(len);
        let mut dirties = HashSet::with_capacity(len);

        // data is parent-before-child, so every parent key exists by the time we need it
        for (data_index, joint_data) in data.joints().iter().enumerate() {
            let local = joint_data.bind_local.to_matrix();
            let key = joints.insert(Joint {
                data_index,
                index: joint_data.index,
                local,
                visible: joint_data.bind_local.visible,
            });

            world_matrices.insert(key, joint_data.bind_model);
            children.insert(key, Vec::new());
            dirties.insert(key);

            if let Some(parent) = joint_data.parent {
                let parent_key = keys[parent];
                parents.insert(key, parent_key);
                if let Some(siblings) = children.get_mut(parent_key) {
                    siblings.push(key);
                }
            }

            keys.push(key);
        }

        let roots = data.roots().iter().map(|root| keys[*root]).collect();

        Self {
            data,
            joints,
            world_matrices,
            children,
            parents,
            roots,
            keys,
            dirties,
            updated: IndexSet::with_capacity(len),
        }
    }

    pub fn data(&self) -> &SkeletonData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn roots(&self) -> &[JointKey] {
        &self.roots
    }

    pub fn key(&self, name: &str) -> Option<JointKey> {
        self.data.find(name).map(|index| self.keys[index])
    }

    pub fn keys(&self) -> &[JointKey] {
        &self.keys
    }

    pub fn joint(&self, key: JointKey) -> Result<&Joint> {
        self.joints
            .get(key)
            .ok_or(AwsmSkeletonError::JointNotFound(key))
    }

    pub fn joint_data(&self, key: JointKey) -> Result<&JointData> {
        let joint = self.joint(key)?;
        self.data
            .joint(joint.data_index)
            .ok_or(AwsmSkeletonError::JointNotFound(key))
    }

    pub fn parent(&self, key: JointKey) -> Option<JointKey> {
        self.parents.get(key).copied()
    }

    pub fn children(&self, key: JointKey) -> &[JointKey] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointKey, &Joint)> {
        self.joints.iter()
    }

    pub fn local(&self, key: JointKey) -> Result<&Mat4> {
        self.joint(key).map(|joint| &joint.local)
    }

    /// Model-space matrix as of the last [`Skeleton::update_world`].
    pub fn world(&self, key: JointKey) -> Result<&Mat4> {
        self.world_matrices
            .get(key)
            .ok_or(AwsmSkeletonError::JointNotFound(key))
    }

    // This is the only way to modify the local matrices (since it must manage the dirty flags)
    // world matrices are updated by calling update_world()
    pub fn set_local(&mut self, key: JointKey, local: Mat4) -> Result<()> {
        match self.joints.get_mut(key) {
            Some(joint) => {
                joint.local = local;
                self.dirties.insert(key);
                Ok(())
            }
            None => Err(AwsmSkeletonError::JointNotFound(key)),
        }
    }

    pub fn set_visible(&mut self, key: JointKey, visible: bool) -> Result<()> {
        let joint = self
            .joints
            .get_mut(key)
            .ok_or(AwsmSkeletonError::JointNotFound(key))?;
        joint.visible = visible;
        Ok(())
    }

    /// Writes every joint named in `pose` and returns how many were applied.
    ///
    /// Joints the pose does not mention keep their current local matrix.
    /// Names that match no joint are skipped.
    pub fn apply_pose(&mut self, pose: &Pose) -> usize {
        let mut applied = 0;
        for (name, pose_joint) in pose.iter() {
            let Some(key) = self.key(name) else {
                tracing::debug!("pose names unknown joint {name}, skipped");
                continue;
            };
            if let Some(joint) = self.joints.get_mut(key) {
                joint.local = pose_joint.local;
                joint.visible = pose_joint.visible;
                self.dirties.insert(key);
                applied += 1;
            }
        }
        applied
    }

    pub fn reset_to_bind_pose(&mut self) {
        for (key, joint) in self.joints.iter_mut() {
            if let Some(joint_data) = self.data.joint(joint.data_index) {
                joint.local = joint_data.bind_local.to_matrix();
                self.dirties.insert(key);
            }
        }
    }

    /// Recomputes world matrices for every dirty joint and everything below it.
    ///
    /// world = parent world * local, with identity above the roots.
    pub fn update_world(&mut self) {
        // See: https://gameprogrammingpatterns.com/dirty-flag.html
        // walk the tree and skip over clean nodes, a dirty node dirties its whole subtree
        let mut stack: Vec<(JointKey, bool)> = self
            .roots
            .iter()
            .rev()
            .map(|root| (*root, false))
            .collect();

        while let Some((key, parent_dirty)) = stack.pop() {
            let dirty = parent_dirty || self.dirties.contains(&key);

            if dirty {
                let local = self.joints[key].local;
                let world = match self.parents.get(key) {
                    Some(parent) => self.world_matrices[*parent] * local,
                    None => local,
                };
                self.world_matrices[key] = world;
                self.updated.insert(key);
            }

            if let Some(children) = self.children.get(key) {
                stack.extend(children.iter().rev().map(|child| (*child, dirty)));
            }
        }

        self.dirties.clear();
    }

    /// Joints whose world matrix changed since the last call, in the order they were first updated.
    pub fn take_updated(&mut self) -> Vec<JointKey> {
        self.updated.drain(..).collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.dirties.is_empty()
    }
}
