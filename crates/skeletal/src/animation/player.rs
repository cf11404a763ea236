use std::sync::Arc;

use super::{clip::AnimationClip, pose::Pose};

#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    pub speed: f32,
    pub loop_style: Option<AnimationLoopStyle>,
    // will change with ping-pong as each end is hit
    pub play_direction: AnimationPlayDirection,
    clip: Arc<AnimationClip>,
    state: AnimationState,
    local_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Playing,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationLoopStyle {
    Loop,
    PingPong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPlayDirection {
    Forward,
    Backward,
}

impl AnimationPlayer {
    /// A paused, single-shot player at the start of `clip`.
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            speed: 1.0,
            loop_style: None,
            play_direction: AnimationPlayDirection::Forward,
            clip,
            state: AnimationState::Paused,
            local_time: 0.0,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_loop_style(mut self, loop_style: Option<AnimationLoopStyle>) -> Self {
        self.loop_style = loop_style;
        self
    }

    pub fn playing(mut self) -> Self {
        self.play();
        self
    }

    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn local_time(&self) -> f32 {
        self.local_time
    }

    pub fn is_finished(&self) -> bool {
        self.state == AnimationState::Ended
    }

    pub fn play(&mut self) {
        if self.state != AnimationState::Ended {
            self.state = AnimationState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == AnimationState::Playing {
            self.state = AnimationState::Paused;
        }
    }

    /// Back to the start, paused.
    pub fn rewind(&mut self) {
        self.local_time = 0.0;
        self.play_direction = AnimationPlayDirection::Forward;
        self.state = AnimationState::Paused;
    }

    pub fn seek(&mut self, time: f32) {
        self.local_time = if time.is_finite() {
            time.clamp(0.0, self.clip.duration())
        } else {
            0.0
        };
    }

    pub fn update(&mut self, global_time_delta: f32) {
        if self.state != AnimationState::Playing {
            return;
        }

        let duration = self.clip.duration();

        // nothing to advance through, a zero-length clip is a constant pose
        if duration <= 0.0 {
            self.local_time = 0.0;
            if self.loop_style.is_none() {
                self.state = AnimationState::Ended;
            }
            return;
        }

        let local_time_delta = global_time_delta * self.speed;

        match self.play_direction {
            AnimationPlayDirection::Forward => {
                self.local_time += local_time_delta;
                if self.local_time >= duration {
                    self.reached_end(duration, duration, AnimationPlayDirection::Backward);
                }
            }

            AnimationPlayDirection::Backward => {
                self.local_time -= local_time_delta;
                if self.local_time <= 0.0 {
                    self.reached_end(0.0, duration, AnimationPlayDirection::Forward);
                }
            }
        }
    }

    // `edge` is the end just crossed, ping-pong turns around towards `bounce`
    fn reached_end(&mut self, edge: f32, duration: f32, bounce: AnimationPlayDirection) {
        match self.loop_style {
            Some(AnimationLoopStyle::Loop) => {
                self.local_time = self.local_time.rem_euclid(duration);
            }
            Some(AnimationLoopStyle::PingPong) => {
                self.play_direction = bounce;
                self.local_time = edge;
            }
            None => {
                self.local_time = edge;
                self.state = AnimationState::Ended;
            }
        }
    }

    /// Samples the clip at the current local time.
    ///
    /// Looping players wrap; the others clamp, so a finished single-shot player
    /// keeps showing its final keyframe.
    pub fn sample_into(&self, pose: &mut Pose) {
        match self.loop_style {
            Some(AnimationLoopStyle::Loop) => self.clip.sample_into(self.local_time, pose),
            _ => self.clip.sample_clamped_into(self.local_time, pose),
        }
    }

    pub fn sample(&self) -> Pose {
        let mut pose = Pose::new();
        self.sample_into(&mut pose);
        pose
    }
}
