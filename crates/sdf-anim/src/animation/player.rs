//! Frame-driven playback clock

use log::trace;

use super::keyframe::Animation;
use super::pose::AnimationPose;
use crate::error::{AnimError, Result};
use crate::skeleton::BindPose;

/// Playback clock over an [`Animation`]
///
/// `current_time` runs in seconds from 0 to `duration`; keyframe timestamps
/// are compared against `current_time / duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlayer {
    current_keyframe_index: usize,
    current_time: f32,
    duration: f32,
    looping: bool,
    started: bool,
}

impl AnimationPlayer {
    /// Player that has not been started yet
    pub fn new() -> Self {
        Self {
            current_keyframe_index: 0,
            current_time: 0.0,
            duration: 0.0,
            looping: false,
            started: false,
        }
    }

    /// Reset the clock and set the playback parameters
    pub fn start(&mut self, duration: f32, looping: bool) -> Result<()> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(AnimError::InvalidDuration(duration));
        }
        self.current_keyframe_index = 0;
        self.current_time = 0.0;
        self.duration = duration;
        self.looping = looping;
        self.started = true;
        Ok(())
    }

    /// Rewind to the first keyframe, keeping duration and loop flag
    pub fn restart(&mut self) {
        self.current_keyframe_index = 0;
        self.current_time = 0.0;
    }

    /// Player state as stored in an object file, rewound to the start
    pub(crate) fn restore(duration: f32, looping: bool) -> Self {
        Self {
            duration,
            looping,
            started: duration.is_finite() && duration > 0.0,
            ..Self::new()
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_done(&self) -> bool {
        !self.looping && self.current_time >= self.duration
    }

    pub fn current_keyframe_index(&self) -> usize {
        self.current_keyframe_index
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// `current_time / duration`
    pub fn normalized_time(&self) -> f32 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Write the pose for the current time, then advance the clock by `dt`
    pub fn update(
        &mut self,
        dt: f32,
        bind_pose: &BindPose,
        animation: &Animation,
        pose: &mut AnimationPose,
    ) -> Result<()> {
        if !self.started {
            return Err(AnimError::PlayerNotStarted);
        }
        if !(dt >= 0.0 && (self.current_time + dt).is_finite()) {
            return Err(AnimError::InvalidTimeStep(dt));
        }
        let count = animation.keyframe_count();
        if count < 2 {
            return Err(AnimError::NotEnoughKeyframes(count));
        }

        animation.write_interval(
            pose,
            self.current_keyframe_index,
            self.normalized_time(),
            bind_pose,
        )?;

        self.current_time += dt;
        self.advance(animation)
    }

    /// Wrap or clamp the clock, then locate the interval containing it
    fn advance(&mut self, animation: &Animation) -> Result<()> {
        let right = animation.keyframe(self.current_keyframe_index + 1)?;
        if self.normalized_time() <= right.timestamp {
            return Ok(());
        }

        let end = animation.keyframe(animation.keyframe_count() - 1)?.timestamp;
        if self.normalized_time() > end {
            if self.looping {
                self.current_time = self.current_time.rem_euclid(self.duration);
                trace!("Looped back to {:.3}s", self.current_time);
            } else {
                self.current_time = self.duration;
                trace!("Reached the end of the animation");
            }
        }

        let index = animation.find_interval(self.normalized_time())?;
        if index != self.current_keyframe_index {
            trace!("Moved to keyframe interval {index}");
            self.current_keyframe_index = index;
        }
        Ok(())
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}
