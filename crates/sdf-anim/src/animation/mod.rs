//! Keyframed animation over a finalized skeleton
//!
//! A [`BuildingAnimation`] holds one full skeleton copy per keyframe while
//! poses are edited. [`BuildingAnimation::build_animation`] bakes it into an
//! [`Animation`] of flat world-space transform buffers, which an
//! [`AnimationPlayer`] samples into an [`AnimationPose`] every frame.

mod building;
mod keyframe;
mod player;
mod pose;

pub use building::{BuildingAnimation, BuildingKeyframe, JointNode};
pub use keyframe::{Animation, Keyframe};
pub use player::AnimationPlayer;
pub use pose::AnimationPose;
