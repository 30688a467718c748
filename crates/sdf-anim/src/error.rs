use std::io;
use thiserror::Error;

use crate::factory::FactoryStage;

/// Error types for skeleton authoring, animation playback and serialization
#[derive(Error, Debug)]
pub enum AnimError {
    /// I/O Error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A joint handle no longer refers to a live joint
    #[error("Unknown joint: the handle refers to a removed joint")]
    UnknownJoint,

    /// Child index past the end of a joint's children
    #[error("Child index {index} out of range (joint has {count} children)")]
    ChildIndexOutOfRange { index: usize, count: usize },

    /// The root joint has no parent to move to or remove from
    #[error("The root joint has no parent")]
    RootJoint,

    /// Keyframe index past the end of the keyframe list
    #[error("Keyframe index {index} out of range ({count} keyframes)")]
    KeyframeIndexOutOfRange { index: usize, count: usize },

    /// The first and last keyframes cannot be removed
    #[error("Keyframe {0} is a border keyframe and cannot be removed")]
    BorderKeyframe(usize),

    /// Keyframes can only be inserted strictly between 0 and 1
    #[error("Keyframe timestamp {0} must lie strictly between 0 and 1")]
    TimestampOutOfRange(f32),

    /// Operation needs the border keyframes at 0 and 1
    #[error("Border keyframes have not been initialized")]
    MissingBorderKeyframes,

    /// An animation needs at least one interval to be evaluated
    #[error("Animation has {0} keyframes, at least 2 are required")]
    NotEnoughKeyframes(usize),

    /// Keyframe timestamps must never decrease
    #[error("Keyframe timestamps are not sorted")]
    UnsortedKeyframes,

    /// Keyframe timestamps must be finite
    #[error("Invalid keyframe timestamp: {0}")]
    InvalidTimestamp(f32),

    /// Per-joint buffers disagree on the joint count
    #[error("Joint count mismatch: expected {expected}, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    /// The player was advanced before `start`
    #[error("Animation player has not been started")]
    PlayerNotStarted,

    /// Player durations must be positive and finite
    #[error("Invalid animation duration: {0}")]
    InvalidDuration(f32),

    /// Player time steps must be finite and non-negative
    #[error("Invalid time step: {0}")]
    InvalidTimeStep(f32),

    /// Factory operation called in the wrong authoring stage
    #[error("Invalid factory stage: expected {expected}, current stage is {actual}")]
    InvalidStage {
        expected: FactoryStage,
        actual: FactoryStage,
    },

    /// A boolean field held something other than 0 or 1
    #[error("Invalid boolean value: {0}")]
    InvalidBool(u8),

    /// The buffer ends before the declared data does
    #[error("Truncated buffer: {needed} bytes needed, {available} available")]
    TruncatedBuffer { needed: u64, available: u64 },

    /// Declared counts describe more data than can be addressed
    #[error("Declared sizes overflow: {0}")]
    SizeOverflow(String),
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
