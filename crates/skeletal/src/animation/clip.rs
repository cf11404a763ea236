use ordered_float::OrderedFloat;

use crate::{joint_transform::JointTransform, skeleton::SkeletonData};

use super::{
    keyframe::KeyFrame,
    pose::{Pose, PoseJoint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    #[default]
    Linear,
    /// Holds the earlier keyframe until the next one is reached.
    Step,
}

/// An ordered run of keyframes. Duration is the last keyframe's timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "AnimationClipDef")
)]
pub struct AnimationClip {
    pub name: Option<String>,
    duration: f32,
    keyframes: Vec<KeyFrame>,
    interpolation: Interpolation,
}

// deserialized clips go through AnimationClip::new, so the stored duration is ignored
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct AnimationClipDef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    keyframes: Vec<KeyFrame>,
    #[serde(default)]
    interpolation: Interpolation,
}

#[cfg(feature = "serde")]
impl From<AnimationClipDef> for AnimationClip {
    fn from(def: AnimationClipDef) -> Self {
        AnimationClip::new(def.name, def.keyframes).with_interpolation(def.interpolation)
    }
}

/// The two keyframes around a sample time and how far between them it lies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrameBracket {
    pub prev: usize,
    pub next: usize,
    pub progression: f32,
}

impl AnimationClip {
    /// Keyframes are sorted by timestamp; ones with a non-finite timestamp are dropped.
    pub fn new(name: Option<String>, mut keyframes: Vec<KeyFrame>) -> Self {
        keyframes.retain(|keyframe| {
            let finite = keyframe.timestamp.is_finite();
            if !finite {
                tracing::warn!("dropping keyframe with timestamp {}", keyframe.timestamp);
            }
            finite
        });
        keyframes.sort_by_key(|keyframe| OrderedFloat(keyframe.timestamp));

        let duration = keyframes
            .last()
            .map(|keyframe| keyframe.timestamp.max(0.0))
            .unwrap_or(0.0);

        Self {
            name,
            duration,
            keyframes,
            interpolation: Interpolation::Linear,
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn keyframes(&self) -> &[KeyFrame] {
        &self.keyframes
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Every joint name mentioned by any keyframe, in first-seen order.
    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        let mut seen = indexmap::IndexSet::new();
        for keyframe in &self.keyframes {
            for name in keyframe.pose.keys() {
                seen.insert(name.as_str());
            }
        }
        seen.into_iter()
    }

    /// Completes every keyframe against the skeleton's bind pose.
    pub fn complete_with(&mut self, skeleton: &SkeletonData) {
        for keyframe in self.keyframes.iter_mut() {
            keyframe.complete_with(skeleton);
        }
    }

    /// Maps any elapsed time into `[0, duration)`. Clips without length always map to 0.
    pub fn wrap_time(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 || !elapsed.is_finite() {
            0.0
        } else {
            elapsed.rem_euclid(self.duration)
        }
    }

    /// Locates the bracketing keyframes for a time already inside the clip.
    ///
    /// A single keyframe, or a time outside the keyed range, brackets a keyframe
    /// with itself at progression 0.
    pub fn bracket(&self, time: f32) -> Option<KeyFrameBracket> {
        let bounds = self.binary_search_bounds(time)?;

        let bracket = match bounds {
            BinaryBounds::ExactHit(index) => {
                // a hit on the final keyframe is the end of the previous segment,
                // so joints only keyed earlier hold their last value
                if index + 1 < self.keyframes.len() || index == 0 {
                    KeyFrameBracket {
                        prev: index,
                        next: (index + 1).min(self.keyframes.len() - 1),
                        progression: 0.0,
                    }
                } else {
                    KeyFrameBracket {
                        prev: index - 1,
                        next: index,
                        progression: 1.0,
                    }
                }
            }
            BinaryBounds::Between(prev, next) => {
                let prev_time = self.keyframes[prev].timestamp;
                let next_time = self.keyframes[next].timestamp;
                let progression = match self.interpolation {
                    Interpolation::Step => 0.0,
                    Interpolation::Linear => {
                        ((time - prev_time) / (next_time - prev_time)).clamp(0.0, 1.0)
                    }
                };
                KeyFrameBracket {
                    prev,
                    next,
                    progression,
                }
            }
        };

        Some(bracket)
    }

    /// Samples a fresh pose at `elapsed`, wrapping it into the clip first.
    pub fn sample(&self, elapsed: f32) -> Pose {
        let mut pose = Pose::with_capacity(self.keyframes.first().map_or(0, |k| k.pose.len()));
        self.sample_into(elapsed, &mut pose);
        pose
    }

    /// Samples at `elapsed`, wrapping it into the clip first, and writes every joint
    /// present in either bracketing keyframe into `pose`.
    ///
    /// Entries for joints in neither keyframe are left untouched, so they keep whatever
    /// was last written there.
    pub fn sample_into(&self, elapsed: f32, pose: &mut Pose) {
        self.sample_at_into(self.wrap_time(elapsed), pose);
    }

    /// Like [`AnimationClip::sample_into`] but clamps into `[0, duration]` instead of
    /// wrapping, so the end of the clip samples the final keyframe.
    pub fn sample_clamped_into(&self, time: f32, pose: &mut Pose) {
        let time = if time.is_finite() {
            time.clamp(0.0, self.duration)
        } else {
            0.0
        };
        self.sample_at_into(time, pose);
    }

    fn sample_at_into(&self, time: f32, pose: &mut Pose) {
        let Some(bracket) = self.bracket(time) else {
            return;
        };

        let prev = &self.keyframes[bracket.prev];
        let next = &self.keyframes[bracket.next];

        for (name, first) in prev.pose.iter() {
            let second = next.pose.get(name).unwrap_or(first);
            pose.set(name, blend(first, second, bracket.progression));
        }

        if bracket.next != bracket.prev {
            for (name, second) in next.pose.iter() {
                if !prev.pose.contains_key(name) {
                    pose.set(name, blend(second, second, bracket.progression));
                }
            }
        }
    }

    // Returns the keyframe bracketing the given time
    // BinaryBounds::ExactHit(usize) if the time is exactly on a keyframe (or outside the keyed range)
    // BinaryBounds::Between(usize, usize) if the time is between two keyframes
    fn binary_search_bounds(&self, time: f32) -> Option<BinaryBounds> {
        search_bounds(&self.keyframes, time, |keyframe| keyframe.timestamp)
    }
}

fn blend(first: &JointTransform, second: &JointTransform, progression: f32) -> PoseJoint {
    let visible = if progression < 1.0 {
        first.visible
    } else {
        second.visible
    };

    PoseJoint {
        local: JointTransform::interpolate(first, second, progression),
        visible,
    }
}

pub(super) enum BinaryBounds {
    ExactHit(usize),
    Between(usize, usize),
}

/// Bracket search over anything sorted by a timestamp.
pub(super) fn search_bounds<T>(
    items: &[T],
    time: f32,
    timestamp: impl Fn(&T) -> f32,
) -> Option<BinaryBounds> {
    if items.is_empty() {
        return None;
    }

    let bounds = match items.binary_search_by_key(&OrderedFloat(time), |item| {
        OrderedFloat(timestamp(item))
    }) {
        Ok(i) => BinaryBounds::ExactHit(i),
        Err(0) => BinaryBounds::ExactHit(0),
        Err(i) if i >= items.len() => BinaryBounds::ExactHit(items.len() - 1),
        Err(i) => BinaryBounds::Between(i - 1, i),
    };

    Some(bounds)
}
