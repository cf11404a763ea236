use glam::Mat4;
use indexmap::IndexMap;

/// One joint's sampled local matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseJoint {
    pub local: Mat4,
    pub visible: bool,
}

impl PoseJoint {
    pub fn new(local: Mat4) -> Self {
        Self {
            local,
            visible: true,
        }
    }
}

/// Sampled local matrices by joint name, owned by whoever drives the frame.
///
/// A pose is meant to be reused: [`super::AnimationClip::sample_into`] overwrites the
/// joints it knows about and leaves every other entry alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    joints: IndexMap<String, PoseJoint>,
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            joints: IndexMap::with_capacity(capacity),
        }
    }

    /// Writes one joint, only allocating the name the first time it is seen.
    pub fn set(&mut self, name: &str, joint: PoseJoint) {
        match self.joints.get_mut(name) {
            Some(existing) => *existing = joint,
            None => {
                self.joints.insert(name.to_string(), joint);
            }
        }
    }

    pub fn insert_local(&mut self, name: &str, local: Mat4) {
        self.set(name, PoseJoint::new(local));
    }

    pub fn get(&self, name: &str) -> Option<&PoseJoint> {
        self.joints.get(name)
    }

    pub fn local(&self, name: &str) -> Option<Mat4> {
        self.joints.get(name).map(|joint| joint.local)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PoseJoint)> {
        self.joints
            .iter()
            .map(|(name, joint)| (name.as_str(), joint))
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn clear(&mut self) {
        self.joints.clear();
    }
}
