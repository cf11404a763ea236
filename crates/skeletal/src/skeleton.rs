mod data;
mod error;
mod joints;

pub use data::{JointData, JointDesc, SkeletonData, SkeletonDataBuilder};
pub use error::{AwsmSkeletonError, Result};
pub use joints::{Joint, JointKey, Skeleton};

#[cfg(test)]
mod tests;
