//! Skeleton hierarchy
//!
//! Authoring happens on a [`BuildingSkeleton`], an arena-backed tree that
//! supports inserting and removing joints anywhere. Once authoring is done,
//! [`BuildingSkeleton::build_skeleton_and_bind_pose`] flattens it into a
//! fixed-shape [`Skeleton`] and captures the [`BindPose`] in one pass.
//!
//! ```rust
//! use sdf_anim::skeleton::BuildingSkeleton;
//!
//! let mut building = BuildingSkeleton::new();
//! let root = building.root();
//! let arm = building.add_child(root)?;
//! building.add_child(arm)?;
//!
//! let (skeleton, bind_pose) = building.build_skeleton_and_bind_pose();
//! assert_eq!(skeleton.joint_count(), 3);
//! assert_eq!(bind_pose.joint_count(), 3);
//! # Ok::<(), sdf_anim::AnimError>(())
//! ```

mod bind_pose;
mod building;
mod flat;

pub use bind_pose::BindPose;
pub use building::{BuildingJoint, BuildingJointNode, BuildingSkeleton, JointKey};
pub use flat::{Joint, Skeleton};
