use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use slotmap::{new_key_type, DenseSlotMap, SecondaryMap};

use crate::{
    config::AnimatorConfig,
    skin::{ModelKey, SkinnedModels},
};

use super::{
    clip::AnimationClip,
    error::{AwsmAnimationError, Result},
    player::{AnimationPlayer, AnimationState},
    pose::Pose,
};

new_key_type! {
    pub struct AnimationKey;
}

#[derive(Debug)]
pub struct PendingAnimation {
    pub model: ModelKey,
    pub player: AnimationPlayer,
}

/// Handle for starting animations from another thread.
///
/// Pushes land in a pending list that [`Animator::prepare_frame`] drains at the
/// start of the next frame. The lock is only held for the push or the drain itself.
#[derive(Debug, Clone, Default)]
pub struct AnimationQueue {
    pending: Arc<Mutex<Vec<PendingAnimation>>>,
}

impl AnimationQueue {
    pub fn push(&self, model: ModelKey, player: AnimationPlayer) {
        self.lock().push(PendingAnimation { model, player });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn drain(&self) -> Vec<PendingAnimation> {
        std::mem::take(&mut *self.lock())
    }

    // poisoning is ignored, a push never leaves the Vec half-written
    fn lock(&self) -> MutexGuard<'_, Vec<PendingAnimation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What one call to [`Animator::prepare_frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Pending animations moved into the active set.
    pub started: usize,
    /// Pending animations dropped because their model was gone or rejected the clip.
    pub dropped: usize,
    /// Players that were playing at the start of the frame.
    pub advanced: usize,
    /// Players that reached their end and were removed.
    pub finished: usize,
    /// Models whose skinning buffer was refreshed.
    pub skinned: usize,
}

/// The active set of players and the models they drive.
#[derive(Debug, Default)]
pub struct Animator {
    config: AnimatorConfig,
    players: DenseSlotMap<AnimationKey, AnimationPlayer>,
    targets: SecondaryMap<AnimationKey, ModelKey>,
    // one reusable pose per player
    poses: SecondaryMap<AnimationKey, Pose>,
    queue: AnimationQueue,
}

impl Animator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn queue(&self) -> AnimationQueue {
        self.queue.clone()
    }

    /// Queues `clip` on `model` with the configured speed and loop style, already playing.
    pub fn play(&self, model: ModelKey, clip: Arc<AnimationClip>) {
        let player = AnimationPlayer::new(clip)
            .with_speed(self.config.default_speed)
            .with_loop_style(self.config.default_loop_style)
            .playing();
        self.queue.push(model, player);
    }

    /// Attaches the player's clip to the model and activates it right away.
    pub fn insert(
        &mut self,
        models: &mut SkinnedModels,
        model: ModelKey,
        player: AnimationPlayer,
    ) -> crate::error::Result<AnimationKey> {
        models
            .get_mut(model)?
            .set_animation(player.clip().clone())?;

        let key = self.players.insert(player);
        self.targets.insert(key, model);
        self.poses.insert(key, Pose::new());
        Ok(key)
    }

    pub fn remove(&mut self, key: AnimationKey) -> Option<AnimationPlayer> {
        self.targets.remove(key);
        self.poses.remove(key);
        self.players.remove(key)
    }

    pub fn player(&self, key: AnimationKey) -> Result<&AnimationPlayer> {
        self.players
            .get(key)
            .ok_or(AwsmAnimationError::MissingKey(key))
    }

    pub fn player_mut(&mut self, key: AnimationKey) -> Result<&mut AnimationPlayer> {
        self.players
            .get_mut(key)
            .ok_or(AwsmAnimationError::MissingKey(key))
    }

    pub fn target(&self, key: AnimationKey) -> Option<ModelKey> {
        self.targets.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = AnimationKey> + '_ {
        self.players.keys()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Runs one frame: drain the queue, advance, sample, propagate, write skins, retire.
    ///
    /// Never fails. Anything that cannot be animated is logged and skipped.
    pub fn prepare_frame(
        &mut self,
        global_time_delta: f32,
        models: &mut SkinnedModels,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        {
            let _maybe_span_guard = if self.config.logging.frame_timings {
                Some(tracing::span!(tracing::Level::INFO, "Animation queue drain").entered())
            } else {
                None
            };

            // the lock is released before anything is inserted
            let pending = self.queue.drain();
            for PendingAnimation { model, player } in pending {
                match self.insert(models, model, player) {
                    Ok(_) => report.started += 1,
                    Err(err) => {
                        tracing::warn!("dropping queued animation: {err}");
                        report.dropped += 1;
                    }
                }
            }
        }

        {
            let _maybe_span_guard = if self.config.logging.frame_timings {
                Some(tracing::span!(tracing::Level::INFO, "Animation advance").entered())
            } else {
                None
            };

            for player in self.players.values_mut() {
                if player.state() == AnimationState::Playing {
                    report.advanced += 1;
                }
                player.update(global_time_delta);
            }
        }

        let mut touched: Vec<ModelKey> = Vec::new();
        let mut orphans: Vec<AnimationKey> = Vec::new();

        {
            let _maybe_span_guard = if self.config.logging.frame_timings {
                Some(tracing::span!(tracing::Level::INFO, "Animation sample").entered())
            } else {
                None
            };

            for (key, player) in self.players.iter() {
                let Some(model_key) = self.targets.get(key).copied() else {
                    orphans.push(key);
                    continue;
                };
                let Ok(model) = models.get_mut(model_key) else {
                    tracing::debug!("model {model_key:?} is gone, dropping its animation");
                    orphans.push(key);
                    continue;
                };
                let Some(pose) = self.poses.get_mut(key) else {
                    orphans.push(key);
                    continue;
                };

                player.sample_into(pose);
                model.skeleton_mut().apply_pose(pose);

                if !touched.contains(&model_key) {
                    touched.push(model_key);
                }
            }
        }

        {
            let _maybe_span_guard = if self.config.logging.frame_timings {
                Some(tracing::span!(tracing::Level::INFO, "Skin update").entered())
            } else {
                None
            };

            for model_key in touched {
                let Ok(model) = models.get_mut(model_key) else {
                    continue;
                };
                if model.is_skinnable() {
                    model.update_skin();
                    report.skinned += 1;
                } else {
                    model.skeleton_mut().update_world();
                }
            }
        }

        for key in orphans {
            self.remove(key);
        }

        let finished: Vec<AnimationKey> = self
            .players
            .iter()
            .filter(|(_, player)| player.is_finished())
            .map(|(key, _)| key)
            .collect();

        for key in finished {
            self.remove(key);
            report.finished += 1;
        }

        report
    }
}
