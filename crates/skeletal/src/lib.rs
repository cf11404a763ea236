//! Skeletal pose evaluation: partial joint transforms, keyframed clips, the joint
//! hierarchy and the per-bone skinning buffer handed to a renderer.
//!
//! A frame runs in one direction only:
//!
//! clip sample -> local matrices -> hierarchy propagation -> skinning buffer
//!
//! Nothing here parses assets or touches the GPU. Loaders hand over a
//! [`skeleton::SkeletonData`] and clips (or tracks for an
//! [`animation::AnimationAssembler`]), renderers read
//! [`skin::SkinnedModel::joint_transforms`] back out.

pub mod animation;
pub mod config;
pub mod error;
pub mod joint_transform;
pub mod skeleton;
pub mod skin;

pub mod core {
    pub use awsm_skeletal_core::*;
}

pub use config::{AnimatorConfig, AwsmSkeletalLogging, JointMatrixSpace, SkinnedModelConfig};
pub use error::{AwsmError, Result};
pub use joint_transform::{BindDefaults, JointTransform};
