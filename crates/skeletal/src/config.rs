//! Plain configuration structs with builder-style setters.

use crate::animation::AnimationLoopStyle;

/// Logging flags.
#[derive(Clone, Debug, Default)]
pub struct AwsmSkeletalLogging {
    /// Wraps each phase of [`crate::animation::Animator::prepare_frame`] in an `INFO` span.
    pub frame_timings: bool,
}

impl AwsmSkeletalLogging {
    pub fn with_frame_timings(mut self, frame_timings: bool) -> Self {
        self.frame_timings = frame_timings;
        self
    }
}

/// Defaults for clips started through [`crate::animation::Animator::play`].
#[derive(Clone, Debug)]
pub struct AnimatorConfig {
    pub logging: AwsmSkeletalLogging,
    pub default_loop_style: Option<AnimationLoopStyle>,
    pub default_speed: f32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            logging: AwsmSkeletalLogging::default(),
            default_loop_style: Some(AnimationLoopStyle::Loop),
            default_speed: 1.0,
        }
    }
}

impl AnimatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logging(mut self, logging: AwsmSkeletalLogging) -> Self {
        self.logging = logging;
        self
    }

    pub fn with_default_loop_style(mut self, loop_style: Option<AnimationLoopStyle>) -> Self {
        self.default_loop_style = loop_style;
        self
    }

    pub fn with_default_speed(mut self, speed: f32) -> Self {
        self.default_speed = speed;
        self
    }
}

/// What ends up in each slot of the skinning buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JointMatrixSpace {
    /// The joint's animated model-space transform. The inverse bind is left to the shader.
    #[default]
    ModelSpace,
    /// `world * inverse_bind`, a ready-to-use skinning delta.
    BindRelative,
}

#[derive(Clone, Debug, Default)]
pub struct SkinnedModelConfig {
    pub joint_matrix_space: JointMatrixSpace,
}

impl SkinnedModelConfig {
    pub fn with_joint_matrix_space(mut self, joint_matrix_space: JointMatrixSpace) -> Self {
        self.joint_matrix_space = joint_matrix_space;
        self
    }
}
