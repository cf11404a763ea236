use thiserror::Error;

use super::joints::JointKey;

pub type Result<T> = std::result::Result<T, AwsmSkeletonError>;

#[derive(Error, Debug)]
pub enum AwsmSkeletonError {
    #[error("[skeleton] joint not found: {0:?}")]
    JointNotFound(JointKey),

    #[error("[skeleton] duplicate joint name: {0}")]
    DuplicateJointName(String),

    #[error("[skeleton] joint {name} refers to parent {parent} which has not been added yet")]
    ParentNotDefined { name: String, parent: usize },

    #[error("[skeleton] skin index {index} is claimed by both {first} and {second}")]
    DuplicateSkinIndex {
        index: usize,
        first: String,
        second: String,
    },
}
