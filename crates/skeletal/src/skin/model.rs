use std::sync::Arc;

use awsm_skeletal_core::matrix::normal_matrix;
use glam::{Mat4, Vec3};

use crate::{
    animation::AnimationClip,
    config::{JointMatrixSpace, SkinnedModelConfig},
    skeleton::{JointKey, Skeleton},
};

use super::error::{AwsmSkinError, Result};

/// A mesh bound to a skeleton, plus the skinning buffer fed to the GPU.
///
/// Skinning only happens when the model has an attached clip with keyframes,
/// a weight buffer and a joint-index buffer. Without all three it renders as a
/// static mesh and the skinning buffer is never refreshed.
#[derive(Debug, Clone)]
pub struct SkinnedModel {
    skeleton: Skeleton,
    bone_count: usize,
    // allocated on first access
    joint_matrices: Option<Vec<Mat4>>,
    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    joint_indices: Option<Vec<[u32; 4]>>,
    weights: Option<Vec<[f32; 4]>>,
    animation: Option<Arc<AnimationClip>>,
    config: SkinnedModelConfig,
    bind_shape_applied: bool,
}

impl SkinnedModel {
    pub fn new(skeleton: Skeleton, positions: Vec<Vec3>) -> Self {
        Self {
            bone_count: skeleton.data().bone_count(),
            skeleton,
            joint_matrices: None,
            positions,
            normals: None,
            joint_indices: None,
            weights: None,
            animation: None,
            config: SkinnedModelConfig::default(),
            bind_shape_applied: false,
        }
    }

    pub fn with_config(mut self, config: SkinnedModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the skeleton's bone count, e.g. when the skin declares fewer bones
    /// than the skeleton has indexed joints. Slots past it are never written.
    pub fn with_bone_count(mut self, bone_count: usize) -> Self {
        self.bone_count = bone_count;
        self.joint_matrices = None;
        self
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Result<Self> {
        self.check_vertex_count("normals", normals.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    /// Up to four joint indices per vertex, matching the skeleton's skin indices.
    pub fn with_joint_indices(mut self, joint_indices: Vec<[u32; 4]>) -> Result<Self> {
        self.check_vertex_count("joint indices", joint_indices.len())?;
        self.joint_indices = Some(joint_indices);
        Ok(self)
    }

    /// Four weights per vertex. They are expected to sum to 1 but that is not checked.
    pub fn with_weights(mut self, weights: Vec<[f32; 4]>) -> Result<Self> {
        self.check_vertex_count("weights", weights.len())?;
        self.weights = Some(weights);
        Ok(self)
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    pub fn config(&self) -> &SkinnedModelConfig {
        &self.config
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    /// Flat `u32` view of the per-vertex joint indices, four per vertex.
    pub fn joint_indices(&self) -> Option<&[u32]> {
        self.joint_indices
            .as_deref()
            .map(|indices| bytemuck::cast_slice(indices))
    }

    /// Flat `f32` view of the per-vertex weights, four per vertex.
    pub fn weights(&self) -> Option<&[f32]> {
        self.weights
            .as_deref()
            .map(|weights| bytemuck::cast_slice(weights))
    }

    pub fn animation(&self) -> Option<&Arc<AnimationClip>> {
        self.animation.as_ref()
    }

    /// Attaches the clip that drives this model.
    ///
    /// Fails when a non-empty clip names none of the skeleton's joints, which
    /// almost always means it was authored for another skeleton.
    pub fn set_animation(&mut self, clip: Arc<AnimationClip>) -> Result<()> {
        if !clip.is_empty() {
            let data = self.skeleton.data();
            let mut names = clip.joint_names();
            if !names.any(|name| data.find(name).is_some()) {
                return Err(AwsmSkinError::UnrelatedClip {
                    clip: clip.name.clone().unwrap_or_default(),
                });
            }
        }

        self.animation = Some(clip);

        if !self.is_skinnable() {
            tracing::debug!("clip attached to a model that cannot be skinned, rendering it static");
        }

        Ok(())
    }

    pub fn clear_animation(&mut self) {
        self.animation = None;
    }

    /// An initialized clip plus both per-vertex skin buffers.
    pub fn is_skinnable(&self) -> bool {
        self.animation.as_ref().is_some_and(|clip| !clip.is_empty())
            && self.weights.is_some()
            && self.joint_indices.is_some()
    }

    /// The skinning buffer, `bone_count` matrices, identity until written.
    pub fn joint_transforms(&mut self) -> &[Mat4] {
        self.joint_matrices_mut()
    }

    /// The skinning buffer as column-major `f32` bytes, ready for upload.
    pub fn joint_matrices_bytes(&mut self) -> &[u8] {
        bytemuck::cast_slice(&*self.joint_matrices_mut())
    }

    /// Copies one joint's current world matrix into its slot in the skinning buffer.
    ///
    /// Joints outside the skin, or whose index is past `bone_count`, are skipped.
    /// Returns whether a slot was written.
    pub fn update_animated_transform(&mut self, key: JointKey) -> bool {
        let Ok(joint) = self.skeleton.joint(key) else {
            tracing::debug!("no joint {key:?} in this skeleton, skin write skipped");
            return false;
        };

        let Some(index) = joint.index() else {
            return false;
        };

        if index >= self.bone_count {
            tracing::debug!(
                "joint index {index} is outside the skin's {} bones, write skipped",
                self.bone_count
            );
            return false;
        }

        let Ok(world) = self.skeleton.world(key) else {
            return false;
        };

        let matrix = match self.config.joint_matrix_space {
            JointMatrixSpace::ModelSpace => *world,
            JointMatrixSpace::BindRelative => match self.skeleton.joint_data(key) {
                Ok(data) => *world * data.inverse_bind,
                Err(_) => *world,
            },
        };

        self.joint_matrices_mut()[index] = matrix;
        true
    }

    /// Propagates the hierarchy and refreshes every skin slot whose joint moved.
    ///
    /// Returns how many slots were written.
    pub fn update_skin(&mut self) -> usize {
        self.skeleton.update_world();

        self.skeleton
            .take_updated()
            .into_iter()
            .filter(|key| self.update_animated_transform(*key))
            .count()
    }

    /// Pre-multiplies every vertex position (and normal) by `matrix`.
    ///
    /// Load-time only: a second call is an error rather than a double transform.
    pub fn set_bind_shape_matrix(&mut self, matrix: Mat4) -> Result<()> {
        if self.bind_shape_applied {
            return Err(AwsmSkinError::BindShapeAlreadyApplied);
        }

        for position in self.positions.iter_mut() {
            *position = matrix.transform_point3(*position);
        }

        if let Some(normals) = self.normals.as_mut() {
            let normal_matrix = normal_matrix(&matrix);
            for normal in normals.iter_mut() {
                *normal = (normal_matrix * *normal).normalize_or_zero();
            }
        }

        self.bind_shape_applied = true;
        Ok(())
    }

    pub fn bind_shape_applied(&self) -> bool {
        self.bind_shape_applied
    }

    fn joint_matrices_mut(&mut self) -> &mut [Mat4] {
        let bone_count = self.bone_count;
        self.joint_matrices
            .get_or_insert_with(|| vec![Mat4::IDENTITY; bone_count])
    }

    fn check_vertex_count(&self, attribute: &'static str, actual: usize) -> Result<()> {
        if actual != self.positions.len() {
            return Err(AwsmSkinError::VertexCountMismatch {
                attribute,
                expected: self.positions.len(),
                actual,
            });
        }
        Ok(())
    }
}
