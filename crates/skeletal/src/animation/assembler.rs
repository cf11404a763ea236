//! Builds clips out of per-channel keyframe tracks, the shape most loaders emit.
//!
//! Each track animates one scalar (or one quaternion, or one raw matrix) of one joint
//! with its own timestamps. Assembly takes the union of every track's timestamps and
//! resamples each track at each of them, so every keyframe carries a value for every
//! channel that was animated.

use std::{collections::BTreeSet, str::FromStr};

use awsm_skeletal_core::{
    interpolate::{lerp_f32, nlerp_quat_normalized},
    Axis,
};
use glam::{Mat4, Quat};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use strum::{Display, EnumIter, EnumString};

use crate::{
    joint_transform::{blend_matrix, JointTransform},
    skeleton::SkeletonData,
};

use super::{
    clip::{search_bounds, AnimationClip, BinaryBounds, Interpolation},
    error::{AwsmAnimationError, Result},
    keyframe::KeyFrame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Channel {
    #[strum(to_string = "scale.x")]
    ScaleX,
    #[strum(to_string = "scale.y")]
    ScaleY,
    #[strum(to_string = "scale.z")]
    ScaleZ,
    /// Euler angle in degrees.
    #[strum(to_string = "rotation.x")]
    RotationX,
    #[strum(to_string = "rotation.y")]
    RotationY,
    #[strum(to_string = "rotation.z")]
    RotationZ,
    #[strum(to_string = "translation.x", serialize = "location.x")]
    TranslationX,
    #[strum(to_string = "translation.y", serialize = "location.y")]
    TranslationY,
    #[strum(to_string = "translation.z", serialize = "location.z")]
    TranslationZ,
    /// Quaternion, as `x, y, z, w`.
    #[strum(to_string = "rotation", serialize = "quaternion")]
    Rotation,
    /// Raw column-major matrix.
    #[strum(to_string = "matrix", serialize = "transform")]
    Matrix,
}

impl Channel {
    /// Number of floats per key.
    pub fn width(self) -> usize {
        match self {
            Channel::Rotation => 4,
            Channel::Matrix => 16,
            _ => 1,
        }
    }

    pub fn is_scalar(self) -> bool {
        self.width() == 1
    }
}

#[derive(Debug, Clone)]
enum TrackKeys {
    Scalar(Vec<(f32, f32)>),
    Quaternion(Vec<(f32, Quat)>),
    Matrix(Vec<(f32, Mat4)>),
}

impl TrackKeys {
    fn times(&self) -> Vec<f32> {
        match self {
            TrackKeys::Scalar(keys) => keys.iter().map(|(time, _)| *time).collect(),
            TrackKeys::Quaternion(keys) => keys.iter().map(|(time, _)| *time).collect(),
            TrackKeys::Matrix(keys) => keys.iter().map(|(time, _)| *time).collect(),
        }
    }

    fn sort(&mut self) {
        match self {
            TrackKeys::Scalar(keys) => keys.sort_by_key(|(time, _)| OrderedFloat(*time)),
            TrackKeys::Quaternion(keys) => keys.sort_by_key(|(time, _)| OrderedFloat(*time)),
            TrackKeys::Matrix(keys) => keys.sort_by_key(|(time, _)| OrderedFloat(*time)),
        }
    }
}

#[derive(Debug, Clone)]
struct Track {
    channel: Channel,
    keys: TrackKeys,
}

impl Track {
    fn apply(&self, time: f32, interpolation: Interpolation, transform: &mut JointTransform) {
        match &self.keys {
            TrackKeys::Scalar(keys) => {
                let Some(value) = sample_keys(keys, time, interpolation, lerp_f32) else {
                    return;
                };
                match self.channel {
                    Channel::ScaleX => transform.scale.set(Axis::X, Some(value)),
                    Channel::ScaleY => transform.scale.set(Axis::Y, Some(value)),
                    Channel::ScaleZ => transform.scale.set(Axis::Z, Some(value)),
                    Channel::RotationX => transform.rotation.set(Axis::X, Some(value)),
                    Channel::RotationY => transform.rotation.set(Axis::Y, Some(value)),
                    Channel::RotationZ => transform.rotation.set(Axis::Z, Some(value)),
                    Channel::TranslationX => transform.translation.set(Axis::X, Some(value)),
                    Channel::TranslationY => transform.translation.set(Axis::Y, Some(value)),
                    Channel::TranslationZ => transform.translation.set(Axis::Z, Some(value)),
                    Channel::Rotation | Channel::Matrix => {}
                }
            }
            TrackKeys::Quaternion(keys) => {
                transform.quaternion =
                    sample_keys(keys, time, interpolation, nlerp_quat_normalized);
            }
            TrackKeys::Matrix(keys) => {
                transform.matrix = sample_keys(keys, time, interpolation, |a, b, t| {
                    blend_matrix(&a, &b, t)
                });
            }
        }
    }
}

// tracks hold their end values outside their own keyed range
fn sample_keys<T: Copy>(
    keys: &[(f32, T)],
    time: f32,
    interpolation: Interpolation,
    lerp: impl Fn(T, T, f32) -> T,
) -> Option<T> {
    let bounds = search_bounds(keys, time, |(key_time, _)| *key_time)?;

    let value = match bounds {
        BinaryBounds::ExactHit(index) => keys[index].1,
        BinaryBounds::Between(left, right) => match interpolation {
            Interpolation::Step => keys[left].1,
            Interpolation::Linear => {
                let (left_time, left_value) = keys[left];
                let (right_time, right_value) = keys[right];
                lerp(
                    left_value,
                    right_value,
                    (time - left_time) / (right_time - left_time),
                )
            }
        },
    };

    Some(value)
}

#[derive(Debug, Clone, Default)]
pub struct AnimationAssembler {
    name: Option<String>,
    interpolation: Interpolation,
    tracks: IndexMap<String, Vec<Track>>,
}

impl AnimationAssembler {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn joint_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    pub fn add_scalar_track(
        &mut self,
        joint: &str,
        channel: Channel,
        keys: Vec<(f32, f32)>,
    ) -> Result<()> {
        if !channel.is_scalar() {
            return Err(AwsmAnimationError::WrongChannelKind {
                joint: joint.to_string(),
                channel,
                expected: "scalar",
            });
        }
        self.push(joint, channel, TrackKeys::Scalar(keys))
    }

    pub fn add_quaternion_track(&mut self, joint: &str, keys: Vec<(f32, Quat)>) -> Result<()> {
        self.push(joint, Channel::Rotation, TrackKeys::Quaternion(keys))
    }

    pub fn add_matrix_track(&mut self, joint: &str, keys: Vec<(f32, Mat4)>) -> Result<()> {
        self.push(joint, Channel::Matrix, TrackKeys::Matrix(keys))
    }

    /// Adds a track from flat buffers, with the channel given by name (e.g. `"translation.x"`).
    ///
    /// `values` holds [`Channel::width`] floats per timestamp.
    pub fn add_flat_track(
        &mut self,
        joint: &str,
        channel: &str,
        times: &[f32],
        values: &[f32],
    ) -> Result<()> {
        let channel = Channel::from_str(channel)
            .map_err(|_| AwsmAnimationError::UnknownChannel(channel.to_string()))?;
        let width = channel.width();

        if values.len() != times.len() * width {
            return Err(AwsmAnimationError::TrackLengthMismatch {
                joint: joint.to_string(),
                channel,
                times: times.len(),
                values: values.len(),
                width,
            });
        }

        let chunks = times.iter().copied().zip(values.chunks_exact(width));

        let keys = match channel {
            Channel::Rotation => TrackKeys::Quaternion(
                chunks
                    .map(|(time, v)| (time, Quat::from_slice(v)))
                    .collect(),
            ),
            Channel::Matrix => TrackKeys::Matrix(
                chunks
                    .map(|(time, v)| (time, Mat4::from_cols_slice(v)))
                    .collect(),
            ),
            _ => TrackKeys::Scalar(chunks.map(|(time, v)| (time, v[0])).collect()),
        };

        self.push(joint, channel, keys)
    }

    fn push(&mut self, joint: &str, channel: Channel, mut keys: TrackKeys) -> Result<()> {
        if keys.times().iter().any(|time| !time.is_finite()) {
            return Err(AwsmAnimationError::NonFiniteTimestamp {
                joint: joint.to_string(),
                channel,
            });
        }

        keys.sort();

        let tracks = self.tracks.entry(joint.to_string()).or_default();
        if tracks.iter().any(|track| track.channel == channel) {
            tracing::warn!("joint {joint} has more than one {channel} track, the later one wins");
        }
        tracks.push(Track { channel, keys });
        Ok(())
    }

    /// Merges every track into keyframes at the union of their timestamps.
    pub fn build(self) -> AnimationClip {
        let times: BTreeSet<OrderedFloat<f32>> = self
            .tracks
            .values()
            .flatten()
            .flat_map(|track| track.keys.times())
            .map(OrderedFloat)
            .collect();

        let keyframes = times
            .into_iter()
            .map(|OrderedFloat(time)| {
                let mut keyframe = KeyFrame::new(time);
                for (joint, tracks) in self.tracks.iter() {
                    let mut transform = JointTransform::default();
                    for track in tracks {
                        track.apply(time, self.interpolation, &mut transform);
                    }
                    keyframe.pose.insert(joint.clone(), transform);
                }
                keyframe
            })
            .collect();

        AnimationClip::new(self.name, keyframes).with_interpolation(self.interpolation)
    }

    /// [`AnimationAssembler::build`], then completes every keyframe against the bind pose.
    pub fn build_completed(self, skeleton: &SkeletonData) -> AnimationClip {
        let mut clip = self.build();
        clip.complete_with(skeleton);
        clip
    }
}
