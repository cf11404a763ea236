use thiserror::Error;

use crate::{animation::AwsmAnimationError, skeleton::AwsmSkeletonError, skin::AwsmSkinError};

#[derive(Error, Debug)]
pub enum AwsmError {
    #[error("{0}")]
    Skeleton(#[from] AwsmSkeletonError),

    #[error("{0}")]
    Animation(#[from] AwsmAnimationError),

    #[error("{0}")]
    Skin(#[from] AwsmSkinError),
}

pub type Result<T> = std::result::Result<T, AwsmError>;
