use indexmap::IndexMap;

use crate::{joint_transform::JointTransform, skeleton::SkeletonData};

/// The partial local transforms of the joints that change at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyFrame {
    pub timestamp: f32,
    pub pose: IndexMap<String, JointTransform>,
}

impl KeyFrame {
    pub fn new(timestamp: f32) -> Self {
        Self {
            timestamp,
            pose: IndexMap::new(),
        }
    }

    pub fn with_joint(mut self, name: impl Into<String>, transform: JointTransform) -> Self {
        self.insert(name, transform);
        self
    }

    /// Adds a joint, merging into any transform already recorded for it.
    pub fn insert(&mut self, name: impl Into<String>, transform: JointTransform) {
        let name = name.into();
        match self.pose.get_mut(&name) {
            Some(existing) => existing.merge(&transform),
            None => {
                self.pose.insert(name, transform);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&JointTransform> {
        self.pose.get(name)
    }

    /// Completes every transform against its joint's bind pose.
    ///
    /// Joints unknown to the skeleton are completed against identity.
    pub fn complete_with(&mut self, skeleton: &SkeletonData) {
        for (name, transform) in self.pose.iter_mut() {
            if skeleton.find(name).is_none() {
                tracing::warn!(
                    "keyframe at {} names unknown joint {name}",
                    self.timestamp
                );
            }
            transform.complete(&skeleton.bind_defaults(name));
        }
    }
}
