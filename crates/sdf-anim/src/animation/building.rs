//! Editable keyframe list used while an animation is being authored
//!
//! Every [`BuildingKeyframe`] owns a full copy of the skeleton, so editing
//! one keyframe never leaks into its neighbours.

use glam::Vec3;
use log::{debug, warn};

use super::keyframe::{Animation, Keyframe};
use super::pose::{AnimationPose, interval_alpha};
use crate::error::{AnimError, Result};
use crate::skeleton::{BindPose, Skeleton};
use crate::transform::{Lerp, Transform};

/// Keyframe under construction
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingKeyframe {
    timestamp: f32,
    skeleton: Skeleton,
}

impl BuildingKeyframe {
    pub fn new(timestamp: f32, skeleton: Skeleton) -> Self {
        Self {
            timestamp,
            skeleton,
        }
    }

    pub fn timestamp(&self) -> f32 {
        self.timestamp
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }
}

/// World position of one joint at some point in time, for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointNode {
    pub is_current_joint: bool,
    pub joint_world_position: Vec3,
}

/// Time-ordered keyframes with fixed borders at 0 and 1
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingAnimation {
    keyframes: Vec<BuildingKeyframe>,
}

impl BuildingAnimation {
    /// Animation without keyframes; call [`Self::init_border_keyframes`] next
    pub fn new() -> Self {
        Self::default()
    }

    /// Animation seeded with border keyframes posed like `skeleton`
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let mut animation = Self::new();
        animation.init_border_keyframes(skeleton);
        animation
    }

    /// Replace every keyframe with two copies of `skeleton`, at 0 and 1
    pub fn init_border_keyframes(&mut self, skeleton: &Skeleton) {
        self.keyframes.clear();
        self.keyframes.push(BuildingKeyframe::new(0.0, skeleton.clone()));
        self.keyframes.push(BuildingKeyframe::new(1.0, skeleton.clone()));
    }

    fn has_border_keyframes(&self) -> bool {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => {
                self.keyframes.len() >= 2 && first.timestamp == 0.0 && last.timestamp == 1.0
            }
            _ => false,
        }
    }

    /// Insert a keyframe at `timestamp` and return its index
    ///
    /// A keyframe already sitting at exactly `timestamp` is returned as is.
    /// A new keyframe starts as the pose interpolated between its neighbours.
    pub fn add_keyframe(&mut self, timestamp: f32) -> Result<usize> {
        if !(timestamp > 0.0 && timestamp < 1.0) {
            warn!("Rejecting keyframe at {timestamp}");
            return Err(AnimError::TimestampOutOfRange(timestamp));
        }
        if !self.has_border_keyframes() {
            return Err(AnimError::MissingBorderKeyframes);
        }

        if let Some(index) = self
            .keyframes
            .iter()
            .position(|keyframe| keyframe.timestamp == timestamp)
        {
            return Ok(index);
        }

        // Borders at 0 and 1 guarantee 1 <= index <= len - 1
        let index = self
            .keyframes
            .partition_point(|keyframe| keyframe.timestamp < timestamp);
        let left = &self.keyframes[index - 1];
        let right = &self.keyframes[index];
        let alpha = interval_alpha(timestamp, left.timestamp, right.timestamp);

        let blended: Vec<Transform> = left
            .skeleton
            .local_transforms()
            .iter()
            .zip(right.skeleton.local_transforms().iter())
            .map(|(l, r)| l.lerp(r, alpha))
            .collect();

        let mut skeleton = left.skeleton.clone();
        skeleton.set_local_transforms(&blended);
        self.keyframes
            .insert(index, BuildingKeyframe::new(timestamp, skeleton));

        debug!("Inserted keyframe {index} at {timestamp}");
        Ok(index)
    }

    /// Remove an inner keyframe
    pub fn remove_keyframe(&mut self, index: usize) -> Result<()> {
        if !self.can_remove_keyframe(index) {
            let count = self.keyframes.len();
            if index >= count {
                return Err(AnimError::KeyframeIndexOutOfRange { index, count });
            }
            return Err(AnimError::BorderKeyframe(index));
        }
        self.keyframes.remove(index);
        Ok(())
    }

    /// Whether `index` names an inner keyframe
    pub fn can_remove_keyframe(&self, index: usize) -> bool {
        index > 0 && index + 1 < self.keyframes.len()
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    pub fn keyframes(&self) -> &[BuildingKeyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, index: usize) -> Result<&BuildingKeyframe> {
        let count = self.keyframes.len();
        self.keyframes
            .get(index)
            .ok_or(AnimError::KeyframeIndexOutOfRange { index, count })
    }

    pub fn keyframe_mut(&mut self, index: usize) -> Result<&mut BuildingKeyframe> {
        let count = self.keyframes.len();
        self.keyframes
            .get_mut(index)
            .ok_or(AnimError::KeyframeIndexOutOfRange { index, count })
    }

    /// Number of joints of every keyframe skeleton
    pub fn joint_count(&self) -> usize {
        self.keyframes
            .first()
            .map_or(0, |keyframe| keyframe.skeleton.joint_count())
    }

    /// Left and right keyframe indices around `time`, plus the blend factor
    fn bracket(&self, time: f32) -> Result<(usize, usize, f32)> {
        let count = self.keyframes.len();
        if count < 2 {
            return Err(AnimError::NotEnoughKeyframes(count));
        }
        let (left, right) = match self
            .keyframes
            .iter()
            .position(|keyframe| keyframe.timestamp >= time)
        {
            Some(0) => (0, 1),
            Some(right) => (right - 1, right),
            None => (count - 2, count - 1),
        };
        let alpha = interval_alpha(
            time,
            self.keyframes[left].timestamp,
            self.keyframes[right].timestamp,
        );
        Ok((left, right, alpha))
    }

    /// World transforms of both bracketing keyframes and their blend factor
    fn bracket_world(&self, time: f32) -> Result<(Vec<Transform>, Vec<Transform>, f32)> {
        let (left, right, alpha) = self.bracket(time)?;
        Ok((
            self.keyframes[left].skeleton.world_transforms(),
            self.keyframes[right].skeleton.world_transforms(),
            alpha,
        ))
    }

    /// Interpolated world transforms at normalized `time`, canonical order
    pub fn world_transforms_at(&self, time: f32) -> Result<Vec<Transform>> {
        let (left, right, alpha) = self.bracket_world(time)?;
        Ok(left
            .iter()
            .zip(&right)
            .map(|(l, r)| l.lerp(r, alpha))
            .collect())
    }

    /// Write the deformation matrices for normalized `time` into `pose`
    pub fn animation_pose(
        &self,
        time: f32,
        bind_pose: &BindPose,
        pose: &mut AnimationPose,
    ) -> Result<()> {
        let (left, right, alpha) = self.bracket_world(time)?;
        pose.write_blended(&left, &right, alpha, bind_pose)
    }

    /// World joint positions at `time`, flagging `current_index`
    pub fn joint_nodes(&self, time: f32, current_index: usize) -> Result<Vec<JointNode>> {
        Ok(self
            .world_transforms_at(time)?
            .iter()
            .enumerate()
            .map(|(index, world)| JointNode {
                is_current_joint: index == current_index,
                joint_world_position: world.position,
            })
            .collect())
    }

    /// Bake every keyframe into world-space transform buffers
    pub fn build_animation(&self) -> Result<Animation> {
        let keyframes = self
            .keyframes
            .iter()
            .map(|keyframe| Keyframe::new(keyframe.timestamp, keyframe.skeleton.world_transforms()))
            .collect();
        let animation = Animation::from_keyframes(self.joint_count(), keyframes)?;
        debug!(
            "Built animation with {} keyframes of {} joints",
            animation.keyframe_count(),
            animation.joint_count()
        );
        Ok(animation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::BuildingSkeleton;
    use crate::transform::EditTransform;
    use pretty_assertions::assert_eq;

    /// root -> child, both at the origin
    fn two_joint_skeleton() -> (Skeleton, BindPose) {
        let mut building = BuildingSkeleton::new();
        let root = building.root();
        building.add_child(root).unwrap();
        building.build_skeleton_and_bind_pose()
    }

    fn move_root(animation: &mut BuildingAnimation, index: usize, x: f32) {
        animation
            .keyframe_mut(index)
            .unwrap()
            .skeleton_mut()
            .joint_at_mut(&[])
            .unwrap()
            .set_edit_transform(&EditTransform::new(Vec3::new(x, 0.0, 0.0), Vec3::ZERO, 1.0));
    }

    #[test]
    fn test_border_keyframes() {
        let (skeleton, _) = two_joint_skeleton();
        let animation = BuildingAnimation::from_skeleton(&skeleton);

        assert_eq!(animation.keyframe_count(), 2);
        assert_eq!(animation.keyframe(0).unwrap().timestamp(), 0.0);
        assert_eq!(animation.keyframe(1).unwrap().timestamp(), 1.0);
        assert_eq!(animation.joint_count(), 2);
    }

    #[test]
    fn test_add_keyframe_requires_borders() {
        let mut animation = BuildingAnimation::new();
        assert!(matches!(
            animation.add_keyframe(0.5),
            Err(AnimError::MissingBorderKeyframes)
        ));
    }

    #[test]
    fn test_add_keyframe_rejects_borders_and_outside() {
        let (skeleton, _) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        for timestamp in [0.0, 1.0, -0.5, 1.5, f32::NAN] {
            assert!(matches!(
                animation.add_keyframe(timestamp),
                Err(AnimError::TimestampOutOfRange(_))
            ));
        }
        assert_eq!(animation.keyframe_count(), 2);
    }

    #[test]
    fn test_add_keyframe_interpolates_locals() {
        let (skeleton, _) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        move_root(&mut animation, 1, 10.0);

        let index = animation.add_keyframe(0.5).unwrap();
        assert_eq!(index, 1);

        let root = animation.keyframe(1).unwrap().skeleton().root();
        assert_eq!(root.local_transform.position, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_add_keyframe_keeps_sorted_and_dedups() {
        let (skeleton, _) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);

        assert_eq!(animation.add_keyframe(0.75).unwrap(), 1);
        assert_eq!(animation.add_keyframe(0.25).unwrap(), 1);
        assert_eq!(animation.add_keyframe(0.5).unwrap(), 2);
        assert_eq!(animation.add_keyframe(0.5).unwrap(), 2);

        let timestamps: Vec<f32> = animation
            .keyframes()
            .iter()
            .map(BuildingKeyframe::timestamp)
            .collect();
        assert_eq!(timestamps, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_keyframes_are_isolated() {
        let (skeleton, _) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        let index = animation.add_keyframe(0.5).unwrap();
        move_root(&mut animation, index, 3.0);

        for other in [0, 2] {
            let root = animation.keyframe(other).unwrap().skeleton().root();
            assert_eq!(root.local_transform.position, Vec3::ZERO);
        }
    }

    #[test]
    fn test_remove_keyframe() {
        let (skeleton, _) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        animation.add_keyframe(0.5).unwrap();

        assert!(matches!(animation.remove_keyframe(0), Err(AnimError::BorderKeyframe(0))));
        assert!(matches!(animation.remove_keyframe(2), Err(AnimError::BorderKeyframe(2))));
        assert!(matches!(
            animation.remove_keyframe(3),
            Err(AnimError::KeyframeIndexOutOfRange { index: 3, count: 3 })
        ));

        animation.remove_keyframe(1).unwrap();
        assert_eq!(animation.keyframe_count(), 2);
    }

    #[test]
    fn test_world_transforms_compose_then_blend() {
        let (skeleton, _) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        move_root(&mut animation, 1, 10.0);

        let worlds = animation.world_transforms_at(0.5).unwrap();
        assert_eq!(worlds[0].position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(worlds[1].position, Vec3::new(5.0, 0.0, 0.0));

        let past_end = animation.world_transforms_at(2.0).unwrap();
        assert_eq!(past_end[0].position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_joint_nodes_flag_current() {
        let (skeleton, _) = two_joint_skeleton();
        let animation = BuildingAnimation::from_skeleton(&skeleton);
        let nodes = animation.joint_nodes(0.0, 1).unwrap();

        assert_eq!(nodes.len(), 2);
        assert!(!nodes[0].is_current_joint);
        assert!(nodes[1].is_current_joint);
    }

    #[test]
    fn test_build_animation_uses_world_transforms() {
        let (skeleton, _) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        move_root(&mut animation, 1, 4.0);

        let baked = animation.build_animation().unwrap();
        assert_eq!(baked.keyframe_count(), 2);
        assert_eq!(baked.joint_count(), 2);
        let last = baked.keyframe(1).unwrap();
        assert_eq!(last.timestamp, 1.0);
        assert_eq!(last.transforms()[1].position, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_animation_pose_matches_baked_animation() {
        let (skeleton, bind_pose) = two_joint_skeleton();
        let mut animation = BuildingAnimation::from_skeleton(&skeleton);
        move_root(&mut animation, 1, 6.0);

        let mut building_pose = AnimationPose::new(2);
        animation
            .animation_pose(0.5, &bind_pose, &mut building_pose)
            .unwrap();

        let mut baked_pose = AnimationPose::new(2);
        animation
            .build_animation()
            .unwrap()
            .set_animation_pose(&mut baked_pose, 0.5, &bind_pose)
            .unwrap();

        assert_eq!(building_pose, baked_pose);
    }
}
