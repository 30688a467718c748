//! Finalized keyframes and pose evaluation

use log::warn;

use super::pose::{AnimationPose, interval_alpha};
use crate::error::{AnimError, Result};
use crate::skeleton::BindPose;
use crate::transform::Transform;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Finalized keyframe: world transforms of every joint, canonical order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Keyframe {
    pub timestamp: f32,
    transforms: Box<[Transform]>,
}

impl Keyframe {
    pub fn new(timestamp: f32, transforms: Vec<Transform>) -> Self {
        Self {
            timestamp,
            transforms: transforms.into_boxed_slice(),
        }
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn joint_count(&self) -> usize {
        self.transforms.len()
    }
}

/// Immutable keyframe sequence sorted by timestamp
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Animation {
    joint_count: usize,
    keyframes: Vec<Keyframe>,
}

impl Animation {
    /// Assemble an animation, checking that every keyframe covers
    /// `joint_count` joints, that timestamps are finite and never decrease,
    /// and that the sequence runs from exactly 0 to exactly 1
    pub fn from_keyframes(joint_count: usize, keyframes: Vec<Keyframe>) -> Result<Self> {
        if keyframes.len() < 2 {
            return Err(AnimError::NotEnoughKeyframes(keyframes.len()));
        }
        if let Some(keyframe) = keyframes.iter().find(|k| k.joint_count() != joint_count) {
            return Err(AnimError::JointCountMismatch {
                expected: joint_count,
                actual: keyframe.joint_count(),
            });
        }
        if let Some(keyframe) = keyframes.iter().find(|k| !k.timestamp.is_finite()) {
            warn!("Rejecting animation with timestamp {}", keyframe.timestamp);
            return Err(AnimError::InvalidTimestamp(keyframe.timestamp));
        }
        if keyframes.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
            warn!("Rejecting animation with unsorted keyframe timestamps");
            return Err(AnimError::UnsortedKeyframes);
        }
        let first = keyframes[0].timestamp;
        let last = keyframes[keyframes.len() - 1].timestamp;
        if first != 0.0 || last != 1.0 {
            warn!("Rejecting animation spanning {first}..{last} instead of 0..1");
            return Err(AnimError::MissingBorderKeyframes);
        }
        Ok(Self {
            joint_count,
            keyframes,
        })
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    pub fn keyframe(&self, index: usize) -> Result<&Keyframe> {
        self.keyframes
            .get(index)
            .ok_or(AnimError::KeyframeIndexOutOfRange {
                index,
                count: self.keyframes.len(),
            })
    }

    /// Index of the left keyframe of the interval that contains `time`
    ///
    /// Always in `[0, keyframe_count - 2]`; times past the last keyframe map
    /// to the final interval.
    pub fn find_interval(&self, time: f32) -> Result<usize> {
        let count = self.keyframes.len();
        if count < 2 {
            return Err(AnimError::NotEnoughKeyframes(count));
        }
        // Largest index whose timestamp is <= time
        let left = self
            .keyframes
            .partition_point(|keyframe| keyframe.timestamp <= time)
            .saturating_sub(1);
        Ok(left.min(count - 2))
    }

    /// Write the deformation matrices for normalized `time` into `pose`
    pub fn set_animation_pose(
        &self,
        pose: &mut AnimationPose,
        time: f32,
        bind_pose: &BindPose,
    ) -> Result<()> {
        let left = self.find_interval(time)?;
        self.write_interval(pose, left, time, bind_pose)
    }

    /// Write the pose for `time` using the interval starting at `left`
    pub(crate) fn write_interval(
        &self,
        pose: &mut AnimationPose,
        left: usize,
        time: f32,
        bind_pose: &BindPose,
    ) -> Result<()> {
        let right = self.keyframe(left + 1)?;
        let left = self.keyframe(left)?;
        let alpha = interval_alpha(time, left.timestamp, right.timestamp);
        pose.write_blended(left.transforms(), right.transforms(), alpha, bind_pose)
    }
}
