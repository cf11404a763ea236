use thiserror::Error;

use super::models::ModelKey;

pub type Result<T> = std::result::Result<T, AwsmSkinError>;

#[derive(Error, Debug)]
pub enum AwsmSkinError {
    #[error("[skin] model not found: {0:?}")]
    ModelNotFound(ModelKey),

    #[error("[skin] bind shape matrix was already applied")]
    BindShapeAlreadyApplied,

    #[error("[skin] {attribute} has {actual} entries but the mesh has {expected} vertices")]
    VertexCountMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("[skin] clip {clip} animates none of the skeleton's joints")]
    UnrelatedClip { clip: String },
}
