use thiserror::Error;

use super::{animations::AnimationKey, assembler::Channel};

pub type Result<T> = std::result::Result<T, AwsmAnimationError>;

#[derive(Error, Debug)]
pub enum AwsmAnimationError {
    #[error("[animation] missing animation key {0:?}")]
    MissingKey(AnimationKey),

    #[error("[animation] unknown channel {0}")]
    UnknownChannel(String),

    #[error("[animation] channel {channel} of joint {joint} expects {expected} values")]
    WrongChannelKind {
        joint: String,
        channel: Channel,
        expected: &'static str,
    },

    #[error("[animation] channel {channel} of joint {joint} has a non-finite timestamp")]
    NonFiniteTimestamp { joint: String, channel: Channel },

    #[error(
        "[animation] channel {channel} of joint {joint} has {times} timestamps but {values} values (width {width})"
    )]
    TrackLengthMismatch {
        joint: String,
        channel: Channel,
        times: usize,
        values: usize,
        width: usize,
    },
}
