use slotmap::{new_key_type, DenseSlotMap};

use super::{
    error::{AwsmSkinError, Result},
    model::SkinnedModel,
};

new_key_type! {
    pub struct ModelKey;
}

/// Every skinned model attached to the scene.
#[derive(Debug, Clone, Default)]
pub struct SkinnedModels {
    models: DenseSlotMap<ModelKey, SkinnedModel>,
}

impl SkinnedModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: SkinnedModel) -> ModelKey {
        self.models.insert(model)
    }

    pub fn remove(&mut self, key: ModelKey) -> Option<SkinnedModel> {
        self.models.remove(key)
    }

    pub fn get(&self, key: ModelKey) -> Result<&SkinnedModel> {
        self.models.get(key).ok_or(AwsmSkinError::ModelNotFound(key))
    }

    pub fn get_mut(&mut self, key: ModelKey) -> Result<&mut SkinnedModel> {
        self.models
            .get_mut(key)
            .ok_or(AwsmSkinError::ModelNotFound(key))
    }

    pub fn contains(&self, key: ModelKey) -> bool {
        self.models.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelKey, &SkinnedModel)> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
