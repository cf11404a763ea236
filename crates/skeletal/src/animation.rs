mod animations;
mod assembler;
mod clip;
mod error;
mod keyframe;
mod player;
mod pose;

pub use animations::{AnimationKey, AnimationQueue, Animator, FrameReport, PendingAnimation};
pub use assembler::{AnimationAssembler, Channel};
pub use clip::{AnimationClip, Interpolation, KeyFrameBracket};
pub use error::{AwsmAnimationError, Result};
pub use keyframe::KeyFrame;
pub use player::{AnimationLoopStyle, AnimationPlayDirection, AnimationPlayer, AnimationState};
pub use pose::{Pose, PoseJoint};
