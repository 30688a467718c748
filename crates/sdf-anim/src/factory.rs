//! Staged authoring session that produces an [`AnimationObject`]
//!
//! The factory walks through a fixed sequence of stages:
//!
//! ```text
//! Idle -> BuildingSkeleton -> SkeletonCompleted -> Animating -> AnimationCompleted -> Idle
//! ```
//!
//! Each editing stage exposes a cursor-based builder. Calling an operation in
//! the wrong stage returns [`AnimError::InvalidStage`] and leaves the session
//! as it was.
//!
//! ```rust
//! use sdf_anim::{AnimationObjectFactory, EditTransform};
//! use glam::Vec3;
//!
//! let mut factory = AnimationObjectFactory::new();
//! factory
//!     .start_building_skeleton()?
//!     .add_child()?
//!     .go_to_child(0)?;
//! factory.complete_skeleton()?;
//!
//! let builder = factory.start_animating()?;
//! builder
//!     .add_and_go_to_keyframe(0.5)?
//!     .go_to_child(0)?
//!     .set_joint_transform(&EditTransform::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 1.0))?;
//! factory.complete_animation()?;
//!
//! let object = factory.complete_object()?;
//! assert_eq!(object.joint_count(), 2);
//! assert_eq!(object.animation().keyframe_count(), 3);
//! # Ok::<(), sdf_anim::AnimError>(())
//! ```

use std::fmt;
use std::mem;

use log::{debug, info};

use crate::animation::{
    Animation, AnimationPlayer, AnimationPose, BuildingAnimation, JointNode,
};
use crate::error::{AnimError, Result};
use crate::object::AnimationObject;
use crate::skeleton::{BindPose, BuildingJointNode, BuildingSkeleton, JointKey, Skeleton};
use crate::transform::EditTransform;
use crate::weight_volume::WeightVolume;

/// Authoring stage of an [`AnimationObjectFactory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryStage {
    Idle,
    BuildingSkeleton,
    SkeletonCompleted,
    Animating,
    AnimationCompleted,
}

impl fmt::Display for FactoryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::BuildingSkeleton => "building skeleton",
            Self::SkeletonCompleted => "skeleton completed",
            Self::Animating => "animating",
            Self::AnimationCompleted => "animation completed",
        };
        f.write_str(name)
    }
}

/// Options for an authoring session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactoryOptions {
    /// Player duration in seconds used by `complete_object`
    pub default_duration: f32,
    /// Whether the finished object's player loops
    pub default_looping: bool,
    /// Place new joints at the end of their parent's weight volume
    pub place_child_at_volume_end: bool,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            default_duration: 1.0,
            default_looping: true,
            place_child_at_volume_end: true,
        }
    }
}

/// Cursor over a [`BuildingSkeleton`], starting at the root joint
#[derive(Debug, Clone)]
pub struct SkeletonBuilder {
    skeleton: BuildingSkeleton,
    current: JointKey,
    place_child_at_volume_end: bool,
}

impl SkeletonBuilder {
    fn new(options: &FactoryOptions) -> Self {
        let skeleton = BuildingSkeleton::new();
        Self {
            current: skeleton.root(),
            skeleton,
            place_child_at_volume_end: options.place_child_at_volume_end,
        }
    }

    pub fn skeleton(&self) -> &BuildingSkeleton {
        &self.skeleton
    }

    pub fn current_joint(&self) -> JointKey {
        self.current
    }

    pub fn set_joint_transform(&mut self, transform: &EditTransform) -> Result<&mut Self> {
        self.skeleton.set_joint_transform(self.current, transform)?;
        Ok(self)
    }

    pub fn joint_transform(&self) -> Result<EditTransform> {
        Ok(self.skeleton.joint(self.current)?.edit_transform())
    }

    pub fn set_joint_weight_volume(&mut self, volume: WeightVolume) -> Result<&mut Self> {
        self.skeleton.set_joint_weight_volume(self.current, volume)?;
        Ok(self)
    }

    pub fn joint_weight_volume(&self) -> Result<WeightVolume> {
        Ok(self.skeleton.joint(self.current)?.weight_volume)
    }

    /// Append a child to the current joint; the cursor stays where it is
    pub fn add_child(&mut self) -> Result<&mut Self> {
        let tip = self.skeleton.joint(self.current)?.weight_volume.end_point();
        let child = self.skeleton.add_child(self.current)?;
        if self.place_child_at_volume_end {
            self.skeleton.joint_mut(child)?.local_transform.position = tip;
        }
        Ok(self)
    }

    /// Remove the current joint with its subtree and move to its parent
    pub fn remove_joint_and_go_to_parent(&mut self) -> Result<&mut Self> {
        let parent = self.skeleton.parent(self.current)?.ok_or(AnimError::RootJoint)?;
        let index = self
            .skeleton
            .joint(parent)?
            .children()
            .iter()
            .position(|&child| child == self.current)
            .ok_or(AnimError::UnknownJoint)?;
        self.skeleton.remove_child(parent, index)?;
        self.current = parent;
        Ok(self)
    }

    pub fn go_to_child(&mut self, index: usize) -> Result<&mut Self> {
        self.current = self.skeleton.child(self.current, index)?;
        Ok(self)
    }

    pub fn go_to_parent(&mut self) -> Result<&mut Self> {
        self.current = self.skeleton.parent(self.current)?.ok_or(AnimError::RootJoint)?;
        Ok(self)
    }

    pub fn child_count(&self) -> Result<usize> {
        self.skeleton.child_count(self.current)
    }

    pub fn has_parent(&self) -> Result<bool> {
        self.skeleton.has_parent(self.current)
    }

    pub fn joint_count(&self) -> usize {
        self.skeleton.joint_count()
    }

    pub fn building_joint_nodes(&self) -> Vec<BuildingJointNode> {
        self.skeleton.joint_nodes(self.current)
    }

    pub fn world_joint_weight_volumes(&self) -> Vec<WeightVolume> {
        self.skeleton.world_weight_volumes()
    }
}

/// Cursor over one keyframe of a [`BuildingAnimation`] and one of its joints
///
/// The joint is addressed by the child indices leading to it from the root.
/// Switching keyframes moves the joint cursor back to the root.
#[derive(Debug, Clone)]
pub struct AnimationBuilder {
    animation: BuildingAnimation,
    bind_pose: BindPose,
    pose: AnimationPose,
    keyframe_index: usize,
    joint_path: Vec<usize>,
}

impl AnimationBuilder {
    fn new(skeleton: &Skeleton, bind_pose: BindPose) -> Self {
        Self {
            animation: BuildingAnimation::from_skeleton(skeleton),
            pose: AnimationPose::new(skeleton.joint_count()),
            bind_pose,
            keyframe_index: 0,
            joint_path: Vec::new(),
        }
    }

    pub fn animation(&self) -> &BuildingAnimation {
        &self.animation
    }

    /// Child indices from the root to the current joint
    pub fn joint_path(&self) -> &[usize] {
        &self.joint_path
    }

    fn current_skeleton(&self) -> Result<&Skeleton> {
        Ok(self.animation.keyframe(self.keyframe_index)?.skeleton())
    }

    fn go_to_keyframe_root(&mut self, index: usize) {
        self.keyframe_index = index;
        self.joint_path.clear();
    }

    pub fn add_and_go_to_keyframe(&mut self, timestamp: f32) -> Result<&mut Self> {
        let index = self.animation.add_keyframe(timestamp)?;
        self.go_to_keyframe_root(index);
        Ok(self)
    }

    /// Remove the current keyframe and move to its left neighbour
    pub fn remove_keyframe_and_go_left(&mut self) -> Result<&mut Self> {
        self.animation.remove_keyframe(self.keyframe_index)?;
        self.go_to_keyframe_root(self.keyframe_index - 1);
        Ok(self)
    }

    pub fn go_to_keyframe(&mut self, index: usize) -> Result<&mut Self> {
        self.animation.keyframe(index)?;
        self.go_to_keyframe_root(index);
        Ok(self)
    }

    pub fn keyframe_count(&self) -> usize {
        self.animation.keyframe_count()
    }

    pub fn keyframe_index(&self) -> usize {
        self.keyframe_index
    }

    pub fn keyframe_time(&self) -> Result<f32> {
        Ok(self.animation.keyframe(self.keyframe_index)?.timestamp())
    }

    pub fn can_keyframe_be_removed(&self) -> bool {
        self.animation.can_remove_keyframe(self.keyframe_index)
    }

    pub fn set_joint_transform(&mut self, transform: &EditTransform) -> Result<&mut Self> {
        self.animation
            .keyframe_mut(self.keyframe_index)?
            .skeleton_mut()
            .joint_at_mut(&self.joint_path)?
            .set_edit_transform(transform);
        Ok(self)
    }

    pub fn joint_transform(&self) -> Result<EditTransform> {
        Ok(self
            .current_skeleton()?
            .joint_at(&self.joint_path)?
            .edit_transform())
    }

    pub fn go_to_child(&mut self, index: usize) -> Result<&mut Self> {
        self.current_skeleton()?
            .joint_at(&self.joint_path)?
            .child(index)?;
        self.joint_path.push(index);
        Ok(self)
    }

    pub fn go_to_parent(&mut self) -> Result<&mut Self> {
        self.joint_path.pop().ok_or(AnimError::RootJoint)?;
        Ok(self)
    }

    pub fn child_count(&self) -> Result<usize> {
        Ok(self
            .current_skeleton()?
            .joint_at(&self.joint_path)?
            .child_count())
    }

    pub fn has_parent(&self) -> bool {
        !self.joint_path.is_empty()
    }

    pub fn joint_count(&self) -> usize {
        self.bind_pose.joint_count()
    }

    pub fn bind_pose(&self) -> &BindPose {
        &self.bind_pose
    }

    /// Preview pose at normalized `time`
    pub fn animation_pose(&mut self, time: f32) -> Result<&AnimationPose> {
        self.animation
            .animation_pose(time, &self.bind_pose, &mut self.pose)?;
        Ok(&self.pose)
    }

    /// Joint positions at normalized `time`, flagging the cursor joint
    pub fn joint_nodes(&self, time: f32) -> Result<Vec<JointNode>> {
        let current = self.current_skeleton()?.index_of(&self.joint_path)?;
        self.animation.joint_nodes(time, current)
    }
}

enum Session {
    Idle,
    BuildingSkeleton(SkeletonBuilder),
    SkeletonCompleted {
        skeleton: Skeleton,
        bind_pose: BindPose,
    },
    Animating(AnimationBuilder),
    AnimationCompleted {
        bind_pose: BindPose,
        animation: Animation,
    },
}

impl Session {
    fn stage(&self) -> FactoryStage {
        match self {
            Self::Idle => FactoryStage::Idle,
            Self::BuildingSkeleton(_) => FactoryStage::BuildingSkeleton,
            Self::SkeletonCompleted { .. } => FactoryStage::SkeletonCompleted,
            Self::Animating(_) => FactoryStage::Animating,
            Self::AnimationCompleted { .. } => FactoryStage::AnimationCompleted,
        }
    }
}

/// Authoring session for one animated object at a time
pub struct AnimationObjectFactory {
    options: FactoryOptions,
    session: Session,
}

impl AnimationObjectFactory {
    pub fn new() -> Self {
        Self::with_options(FactoryOptions::default())
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            options,
            session: Session::Idle,
        }
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    pub fn stage(&self) -> FactoryStage {
        self.session.stage()
    }

    fn stage_error(&self, expected: FactoryStage) -> AnimError {
        AnimError::InvalidStage {
            expected,
            actual: self.stage(),
        }
    }

    /// Drop whatever is being authored and return to `Idle`
    pub fn cancel(&mut self) {
        if self.stage() != FactoryStage::Idle {
            info!("Discarding authoring session in stage {}", self.stage());
        }
        self.session = Session::Idle;
    }

    pub fn start_building_skeleton(&mut self) -> Result<&mut SkeletonBuilder> {
        if !matches!(self.session, Session::Idle) {
            return Err(self.stage_error(FactoryStage::Idle));
        }
        self.session = Session::BuildingSkeleton(SkeletonBuilder::new(&self.options));
        self.skeleton_builder()
    }

    pub fn skeleton_builder(&mut self) -> Result<&mut SkeletonBuilder> {
        match &mut self.session {
            Session::BuildingSkeleton(builder) => Ok(builder),
            other => Err(AnimError::InvalidStage {
                expected: FactoryStage::BuildingSkeleton,
                actual: other.stage(),
            }),
        }
    }

    /// Flatten the authored skeleton and capture its bind pose
    pub fn complete_skeleton(&mut self) -> Result<()> {
        let Session::BuildingSkeleton(builder) = &self.session else {
            return Err(self.stage_error(FactoryStage::BuildingSkeleton));
        };
        let (skeleton, bind_pose) = builder.skeleton.build_skeleton_and_bind_pose();
        debug!("Skeleton completed with {} joints", skeleton.joint_count());
        self.session = Session::SkeletonCompleted {
            skeleton,
            bind_pose,
        };
        Ok(())
    }

    pub fn start_animating(&mut self) -> Result<&mut AnimationBuilder> {
        match mem::replace(&mut self.session, Session::Idle) {
            Session::SkeletonCompleted {
                skeleton,
                bind_pose,
            } => {
                self.session = Session::Animating(AnimationBuilder::new(&skeleton, bind_pose));
                self.animation_builder()
            }
            other => {
                let actual = other.stage();
                self.session = other;
                Err(AnimError::InvalidStage {
                    expected: FactoryStage::SkeletonCompleted,
                    actual,
                })
            }
        }
    }

    pub fn animation_builder(&mut self) -> Result<&mut AnimationBuilder> {
        match &mut self.session {
            Session::Animating(builder) => Ok(builder),
            other => Err(AnimError::InvalidStage {
                expected: FactoryStage::Animating,
                actual: other.stage(),
            }),
        }
    }

    /// Bake the authored keyframes
    pub fn complete_animation(&mut self) -> Result<()> {
        let Session::Animating(builder) = &self.session else {
            return Err(self.stage_error(FactoryStage::Animating));
        };
        let animation = builder.animation.build_animation()?;

        if let Session::Animating(builder) = mem::replace(&mut self.session, Session::Idle) {
            self.session = Session::AnimationCompleted {
                bind_pose: builder.bind_pose,
                animation,
            };
        }
        Ok(())
    }

    /// Hand out the finished object, started with the configured defaults
    pub fn complete_object(&mut self) -> Result<AnimationObject> {
        if !matches!(self.session, Session::AnimationCompleted { .. }) {
            return Err(self.stage_error(FactoryStage::AnimationCompleted));
        }
        let mut player = AnimationPlayer::new();
        player.start(self.options.default_duration, self.options.default_looping)?;

        let Session::AnimationCompleted {
            bind_pose,
            animation,
        } = mem::replace(&mut self.session, Session::Idle)
        else {
            return Err(self.stage_error(FactoryStage::AnimationCompleted));
        };
        let object = AnimationObject::new(bind_pose, animation, player)?;
        info!(
            "Completed animation object: {} joints, {} keyframes",
            object.joint_count(),
            object.animation().keyframe_count()
        );
        Ok(object)
    }
}

impl Default for AnimationObjectFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pretty_assertions::assert_eq;

    fn skeleton_ready() -> AnimationObjectFactory {
        let mut factory = AnimationObjectFactory::new();
        factory
            .start_building_skeleton()
            .unwrap()
            .add_child()
            .unwrap()
            .add_child()
            .unwrap();
        factory.complete_skeleton().unwrap();
        factory
    }

    #[test]
    fn test_stage_progression() {
        let mut factory = AnimationObjectFactory::new();
        assert_eq!(factory.stage(), FactoryStage::Idle);

        factory.start_building_skeleton().unwrap();
        assert_eq!(factory.stage(), FactoryStage::BuildingSkeleton);
        factory.complete_skeleton().unwrap();
        assert_eq!(factory.stage(), FactoryStage::SkeletonCompleted);
        factory.start_animating().unwrap();
        assert_eq!(factory.stage(), FactoryStage::Animating);
        factory.complete_animation().unwrap();
        assert_eq!(factory.stage(), FactoryStage::AnimationCompleted);

        let object = factory.complete_object().unwrap();
        assert_eq!(factory.stage(), FactoryStage::Idle);
        assert_eq!(object.joint_count(), 1);
        assert!(object.player().is_started());
        assert_eq!(object.player().duration(), 1.0);
        assert!(object.player().is_looping());
    }

    #[test]
    fn test_wrong_stage_is_rejected() {
        let mut factory = AnimationObjectFactory::new();
        assert!(matches!(
            factory.complete_skeleton(),
            Err(AnimError::InvalidStage {
                expected: FactoryStage::BuildingSkeleton,
                actual: FactoryStage::Idle,
            })
        ));
        assert!(factory.start_animating().is_err());
        assert!(factory.complete_object().is_err());
        assert_eq!(factory.stage(), FactoryStage::Idle);

        factory.start_building_skeleton().unwrap();
        assert!(factory.start_building_skeleton().is_err());
        assert!(factory.animation_builder().is_err());
        assert_eq!(factory.stage(), FactoryStage::BuildingSkeleton);
    }

    #[test]
    fn test_add_child_placed_at_volume_end() {
        let mut factory = AnimationObjectFactory::new();
        let builder = factory.start_building_skeleton().unwrap();
        builder
            .set_joint_weight_volume(WeightVolume::new(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 5.0))
            .unwrap()
            .add_child()
            .unwrap();

        assert!(!builder.has_parent().unwrap());
        builder.go_to_child(0).unwrap();
        assert!(builder.has_parent().unwrap());
        assert_eq!(
            builder.joint_transform().unwrap().position,
            Vec3::new(0.0, 2.0, 0.0)
        );
    }

    #[test]
    fn test_add_child_at_origin_when_disabled() {
        let options = FactoryOptions {
            place_child_at_volume_end: false,
            ..FactoryOptions::default()
        };
        let mut factory = AnimationObjectFactory::with_options(options);
        let builder = factory.start_building_skeleton().unwrap();
        builder.add_child().unwrap().go_to_child(0).unwrap();
        assert_eq!(builder.joint_transform().unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_remove_joint_and_go_to_parent() {
        let mut factory = AnimationObjectFactory::new();
        let builder = factory.start_building_skeleton().unwrap();
        assert!(matches!(
            builder.remove_joint_and_go_to_parent(),
            Err(AnimError::RootJoint)
        ));

        builder
            .add_child()
            .unwrap()
            .add_child()
            .unwrap()
            .go_to_child(1)
            .unwrap()
            .add_child()
            .unwrap();
        assert_eq!(builder.joint_count(), 4);

        builder.remove_joint_and_go_to_parent().unwrap();
        assert_eq!(builder.joint_count(), 2);
        assert!(!builder.has_parent().unwrap());
        assert_eq!(builder.child_count().unwrap(), 1);
    }

    #[test]
    fn test_skeleton_builder_queries() {
        let mut factory = AnimationObjectFactory::new();
        let builder = factory.start_building_skeleton().unwrap();
        builder.add_child().unwrap().go_to_child(0).unwrap();

        let nodes = builder.building_joint_nodes();
        assert_eq!(nodes.len(), 2);
        assert!(!nodes[0].is_current_joint);
        assert!(nodes[1].is_current_joint);
        assert_eq!(nodes[1].joint_world_position, Vec3::Y);
        assert_eq!(builder.world_joint_weight_volumes().len(), 2);
    }

    #[test]
    fn test_animation_builder_cursor() {
        let mut factory = skeleton_ready();
        let builder = factory.start_animating().unwrap();
        assert_eq!(builder.keyframe_count(), 2);
        assert_eq!(builder.joint_count(), 3);
        assert!(!builder.can_keyframe_be_removed());

        builder.add_and_go_to_keyframe(0.5).unwrap();
        assert_eq!(builder.keyframe_index(), 1);
        assert_eq!(builder.keyframe_time().unwrap(), 0.5);
        assert!(builder.can_keyframe_be_removed());

        builder.go_to_child(1).unwrap();
        assert!(builder.has_parent());
        assert_eq!(builder.child_count().unwrap(), 0);
        assert!(builder.go_to_child(0).is_err());

        let rotated = EditTransform::new(Vec3::Y, Vec3::new(0.0, 0.0, 0.5), 1.0);
        builder.set_joint_transform(&rotated).unwrap();
        assert_eq!(builder.joint_transform().unwrap(), rotated);

        let nodes = builder.joint_nodes(0.5).unwrap();
        assert!(nodes[2].is_current_joint);

        builder.go_to_parent().unwrap();
        assert!(matches!(builder.go_to_parent(), Err(AnimError::RootJoint)));

        builder.remove_keyframe_and_go_left().unwrap();
        assert_eq!(builder.keyframe_index(), 0);
        assert_eq!(builder.keyframe_count(), 2);
        assert!(matches!(
            builder.remove_keyframe_and_go_left(),
            Err(AnimError::BorderKeyframe(0))
        ));
        assert!(builder.go_to_keyframe(5).is_err());
    }

    #[test]
    fn test_animation_preview_pose() {
        let mut factory = skeleton_ready();
        let builder = factory.start_animating().unwrap();
        let pose = builder.animation_pose(0.3).unwrap();

        assert_eq!(pose.joint_count(), 3);
        for matrix in pose.deformation_matrices() {
            assert!(matrix.abs_diff_eq(glam::Mat4::IDENTITY, 1e-5));
        }
    }

    #[test]
    fn test_complete_object_with_bad_duration_keeps_session() {
        let options = FactoryOptions {
            default_duration: 0.0,
            ..FactoryOptions::default()
        };
        let mut factory = AnimationObjectFactory::with_options(options);
        factory.start_building_skeleton().unwrap();
        factory.complete_skeleton().unwrap();
        factory.start_animating().unwrap();
        factory.complete_animation().unwrap();

        assert!(matches!(
            factory.complete_object(),
            Err(AnimError::InvalidDuration(_))
        ));
        assert_eq!(factory.stage(), FactoryStage::AnimationCompleted);

        factory.cancel();
        assert_eq!(factory.stage(), FactoryStage::Idle);
    }
}
