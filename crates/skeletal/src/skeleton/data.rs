//! The static joint tree handed over by an asset loader.
//!
//! Joints live in a flat array in parent-before-child order, with parent and
//! children expressed as indices into that array. After [`SkeletonDataBuilder::build`]
//! the only mutation is [`SkeletonData::assign_skin_indices`] at skin-bind time.

use awsm_skeletal_core::matrix::try_inverse;
use glam::Mat4;
use indexmap::IndexMap;

use crate::joint_transform::{BindDefaults, JointTransform};

use super::error::{AwsmSkeletonError, Result};

#[derive(Debug, Clone)]
pub struct JointData {
    pub id: String,
    pub name: String,
    /// Slot in the skinning matrix array and the per-vertex joint-index encoding.
    /// `None` for structural joints that are not part of the skin.
    pub index: Option<usize>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Local bind transform, always complete.
    pub bind_local: JointTransform,
    /// Root-accumulated bind transform.
    pub bind_model: Mat4,
    pub inverse_bind: Mat4,
}

impl JointData {
    pub fn bind_defaults(&self) -> BindDefaults {
        BindDefaults::from_joint_transform(&self.bind_local)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkeletonData {
    joints: Vec<JointData>,
    roots: Vec<usize>,
    by_name: IndexMap<String, usize>,
    by_id: IndexMap<String, usize>,
    bone_count: usize,
}

impl SkeletonData {
    pub fn builder() -> SkeletonDataBuilder {
        SkeletonDataBuilder::default()
    }

    pub fn joints(&self) -> &[JointData] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&JointData> {
        self.joints.get(index)
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Arena index of the joint with this name (or id).
    pub fn find(&self, name: &str) -> Option<usize> {
        self.by_name
            .get(name)
            .or_else(|| self.by_id.get(name))
            .copied()
    }

    /// Number of slots in the skinning matrix array.
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    /// Bind-pose defaults for the named joint, identity when the name is unknown.
    pub fn bind_defaults(&self, name: &str) -> BindDefaults {
        self.find(name)
            .map(|index| self.joints[index].bind_defaults())
            .unwrap_or(BindDefaults::IDENTITY)
    }

    /// Assigns skin indices in the order the skin lists its joints and returns the bone count.
    ///
    /// Any previous assignment is cleared. Names that match no joint keep their slot
    /// (so the per-vertex encoding still lines up) but nothing will ever write to it.
    pub fn assign_skin_indices<S: AsRef<str>>(&mut self, joint_names: &[S]) -> usize {
        for joint in self.joints.iter_mut() {
            joint.index = None;
        }

        for (index, name) in joint_names.iter().enumerate() {
            let name = name.as_ref();
            match self.find(name) {
                Some(joint) => self.joints[joint].index = Some(index),
                None => {
                    tracing::warn!("skin refers to unknown joint {name}, slot {index} stays unused");
                }
            }
        }

        self.bone_count = joint_names.len();
        self.bone_count
    }
}

/// Description of one joint as produced by a loader.
#[derive(Debug, Clone)]
pub struct JointDesc {
    pub id: String,
    pub name: String,
    pub parent: Option<usize>,
    pub index: Option<usize>,
    pub bind_local: JointTransform,
    /// Loader-supplied inverse bind matrix; computed from the bind pose when absent.
    pub inverse_bind: Option<Mat4>,
}

impl JointDesc {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            parent: None,
            index: None,
            bind_local: JointTransform::from_matrix(Mat4::IDENTITY),
            inverse_bind: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_bind_local(mut self, bind_local: JointTransform) -> Self {
        self.bind_local = bind_local;
        self
    }

    pub fn with_bind_matrix(mut self, bind_local: Mat4) -> Self {
        self.bind_local = JointTransform::from_matrix(bind_local);
        self
    }

    pub fn with_inverse_bind(mut self, inverse_bind: Mat4) -> Self {
        self.inverse_bind = Some(inverse_bind);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkeletonDataBuilder {
    joints: Vec<JointDesc>,
}

impl SkeletonDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a joint and returns its arena index. Parents must be added before their children.
    pub fn push(&mut self, joint: JointDesc) -> Result<usize> {
        if let Some(parent) = joint.parent {
            if parent >= self.joints.len() {
                return Err(AwsmSkeletonError::ParentNotDefined {
                    name: joint.name,
                    parent,
                });
            }
        }

        if self.joints.iter().any(|existing| existing.name == joint.name) {
            return Err(AwsmSkeletonError::DuplicateJointName(joint.name));
        }

        self.joints.push(joint);
        Ok(self.joints.len() - 1)
    }

    pub fn with_joint(mut self, joint: JointDesc) -> Result<Self> {
        self.push(joint)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SkeletonData> {
        let mut joints: Vec<JointData> = Vec::with_capacity(self.joints.len());
        let mut roots = Vec::new();
        let mut by_name = IndexMap::with_capacity(self.joints.len());
        let mut by_id = IndexMap::with_capacity(self.joints.len());
        let mut claimed: IndexMap<usize, String> = IndexMap::new();

        for (arena_index, desc) in self.joints.into_iter().enumerate() {
            if let Some(index) = desc.index {
                if let Some(first) = claimed.insert(index, desc.name.clone()) {
                    return Err(AwsmSkeletonError::DuplicateSkinIndex {
                        index,
                        first,
                        second: desc.name,
                    });
                }
            }

            let mut bind_local = desc.bind_local;
            if !bind_local.is_complete() {
                bind_local.complete(&BindDefaults::IDENTITY);
            }

            let parent_model = match desc.parent {
                Some(parent) => {
                    joints[parent].children.push(arena_index);
                    joints[parent].bind_model
                }
                None => {
                    roots.push(arena_index);
                    Mat4::IDENTITY
                }
            };

            let bind_model = parent_model * bind_local.to_matrix();

            let inverse_bind = match desc.inverse_bind {
                Some(inverse_bind) => inverse_bind,
                None => try_inverse(&bind_model).unwrap_or_else(|| {
                    tracing::warn!(
                        "bind transform of joint {} is not invertible, using identity",
                        desc.name
                    );
                    Mat4::IDENTITY
                }),
            };

            by_name.insert(desc.name.clone(), arena_index);
            by_id.entry(desc.id.clone()).or_insert(arena_index);

            joints.push(JointData {
                id: desc.id,
                name: desc.name,
                index: desc.index,
                parent: desc.parent,
                children: Vec::new(),
                bind_local,
                bind_model,
                inverse_bind,
            });
        }

        let bone_count = claimed.keys().max().map_or(0, |max| max + 1);

        Ok(SkeletonData {
            joints,
            roots,
            by_name,
            by_id,
            bone_count,
        })
    }
}
