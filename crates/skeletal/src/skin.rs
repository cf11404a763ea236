mod error;
mod model;
mod models;

pub use error::{AwsmSkinError, Result};
pub use model::SkinnedModel;
pub use models::{ModelKey, SkinnedModels};

#[cfg(test)]
mod tests;
