//! Skeletal animation core for signed-distance-field deformation
//!
//! The crate covers the whole path from authoring to playback:
//!
//! - [`skeleton`]: editable joint trees, flattened skeletons and bind poses
//! - [`animation`]: keyframe authoring, baked animations, players and poses
//! - [`AnimationObjectFactory`]: a staged authoring session built on both
//! - [`AnimationObject`]: what a renderer consumes every frame
//! - [`serializer`]: the binary object file format
//!
//! # Example
//!
//! ```rust
//! use sdf_anim::animation::{AnimationPlayer, BuildingAnimation};
//! use sdf_anim::skeleton::BuildingSkeleton;
//! use sdf_anim::AnimationObject;
//!
//! let mut building = BuildingSkeleton::new();
//! let root = building.root();
//! building.add_child(root)?;
//! let (skeleton, bind_pose) = building.build_skeleton_and_bind_pose();
//!
//! let mut animation = BuildingAnimation::from_skeleton(&skeleton);
//! animation.add_keyframe(0.5)?;
//!
//! let mut object = AnimationObject::new(
//!     bind_pose,
//!     animation.build_animation()?,
//!     AnimationPlayer::new(),
//! )?;
//! object.start(2.0, true)?;
//! let pose = object.update(1.0 / 60.0)?;
//! assert_eq!(pose.deformation_matrices().len(), 2);
//! # Ok::<(), sdf_anim::AnimError>(())
//! ```

pub mod animation;
pub mod binary;
pub mod error;
pub mod factory;
pub mod object;
pub mod serializer;
pub mod skeleton;
pub mod transform;
pub mod weight_volume;

pub use animation::{Animation, AnimationPlayer, AnimationPose, BuildingAnimation};
pub use error::{AnimError, Result};
pub use factory::{
    AnimationBuilder, AnimationObjectFactory, FactoryOptions, FactoryStage, SkeletonBuilder,
};
pub use object::AnimationObject;
pub use serializer::{load_animation_objects, save_animation_objects, try_load_animation_objects};
pub use skeleton::{BindPose, BuildingSkeleton, Skeleton};
pub use transform::{EditTransform, Lerp, Transform};
pub use weight_volume::WeightVolume;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
