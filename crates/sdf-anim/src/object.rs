//! Self-contained animated object handed to the renderer

use crate::animation::{Animation, AnimationPlayer, AnimationPose};
use crate::error::{AnimError, Result};
use crate::skeleton::BindPose;

/// Bind pose, baked animation, pose buffer and player of one object
///
/// All per-joint buffers are sized to `joint_count` when the object is
/// created; nothing is reallocated during playback.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationObject {
    joint_count: usize,
    bind_pose: BindPose,
    animation: Animation,
    animation_pose: AnimationPose,
    player: AnimationPlayer,
}

impl AnimationObject {
    /// Assemble an object, checking that both parts agree on the joint count
    pub fn new(bind_pose: BindPose, animation: Animation, player: AnimationPlayer) -> Result<Self> {
        let joint_count = bind_pose.joint_count();
        if animation.joint_count() != joint_count {
            return Err(AnimError::JointCountMismatch {
                expected: joint_count,
                actual: animation.joint_count(),
            });
        }
        Ok(Self {
            joint_count,
            bind_pose,
            animation,
            animation_pose: AnimationPose::new(joint_count),
            player,
        })
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn bind_pose(&self) -> &BindPose {
        &self.bind_pose
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Pose written by the last `update` or `evaluate`
    pub fn animation_pose(&self) -> &AnimationPose {
        &self.animation_pose
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn start(&mut self, duration: f32, looping: bool) -> Result<()> {
        self.player.start(duration, looping)
    }

    pub fn restart(&mut self) {
        self.player.restart();
    }

    /// Advance playback by `dt` seconds and return the refreshed pose
    pub fn update(&mut self, dt: f32) -> Result<&AnimationPose> {
        self.player.update(
            dt,
            &self.bind_pose,
            &self.animation,
            &mut self.animation_pose,
        )?;
        Ok(&self.animation_pose)
    }

    /// Pose at normalized `time`, leaving the player untouched
    pub fn evaluate(&mut self, time: f32) -> Result<&AnimationPose> {
        self.animation
            .set_animation_pose(&mut self.animation_pose, time, &self.bind_pose)?;
        Ok(&self.animation_pose)
    }
}
