//! Editable joint hierarchy used while a skeleton is being authored
//!
//! Joints live in an arena and refer to each other through [`JointKey`]s,
//! so removing a subtree never leaves dangling links behind.

use glam::{Mat4, Vec3};
use log::debug;
use slotmap::{SlotMap, new_key_type};

use super::bind_pose::BindPose;
use super::flat::{Joint, Skeleton};
use crate::error::{AnimError, Result};
use crate::transform::{EditTransform, Transform};
use crate::weight_volume::WeightVolume;

new_key_type! {
    /// Handle to a joint of a [`BuildingSkeleton`]
    pub struct JointKey;
}

#[derive(Debug, Clone)]
pub struct BuildingJoint {
    pub local_transform: Transform,
    pub euler_angles: Vec3,
    pub weight_volume: WeightVolume,
    parent: Option<JointKey>,
    children: Vec<JointKey>,
}

impl BuildingJoint {
    fn new(parent: Option<JointKey>) -> Self {
        Self {
            local_transform: Transform::IDENTITY,
            euler_angles: Vec3::ZERO,
            weight_volume: WeightVolume::default(),
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<JointKey> {
        self.parent
    }

    pub fn children(&self) -> &[JointKey] {
        &self.children
    }

    pub fn edit_transform(&self) -> EditTransform {
        EditTransform::new(
            self.local_transform.position,
            self.euler_angles,
            self.local_transform.scale,
        )
    }
}

/// World-space snapshot of one authoring joint, for drawing the skeleton
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingJointNode {
    pub is_current_joint: bool,
    pub joint_world_position: Vec3,
    pub world_weight_volume: WeightVolume,
}

/// Authoring skeleton
///
/// Always has a root; the joint count equals the number of live joints.
#[derive(Debug, Clone)]
pub struct BuildingSkeleton {
    joints: SlotMap<JointKey, BuildingJoint>,
    root: JointKey,
}

impl BuildingSkeleton {
    pub fn new() -> Self {
        let mut joints = SlotMap::with_key();
        let root = joints.insert(BuildingJoint::new(None));
        Self { joints, root }
    }

    pub fn root(&self) -> JointKey {
        self.root
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joint(&self, key: JointKey) -> Result<&BuildingJoint> {
        self.joints.get(key).ok_or(AnimError::UnknownJoint)
    }

    pub fn joint_mut(&mut self, key: JointKey) -> Result<&mut BuildingJoint> {
        self.joints.get_mut(key).ok_or(AnimError::UnknownJoint)
    }

    /// Append a new joint as the last child of `parent`
    pub fn add_child(&mut self, parent: JointKey) -> Result<JointKey> {
        self.joint(parent)?;
        let child = self.joints.insert(BuildingJoint::new(Some(parent)));
        self.joint_mut(parent)?.children.push(child);
        Ok(child)
    }

    /// Remove the subtree rooted at child `index` of `parent`
    ///
    /// Returns how many joints were removed.
    pub fn remove_child(&mut self, parent: JointKey, index: usize) -> Result<usize> {
        let children = &mut self.joint_mut(parent)?.children;
        let count = children.len();
        if index >= count {
            return Err(AnimError::ChildIndexOutOfRange { index, count });
        }
        let removed_root = children.remove(index);

        let mut pending = vec![removed_root];
        let mut removed = 0;
        while let Some(key) = pending.pop() {
            if let Some(joint) = self.joints.remove(key) {
                pending.extend(joint.children);
                removed += 1;
            }
        }

        debug!(
            "Removed {removed} joints, {} remain",
            self.joints.len()
        );
        Ok(removed)
    }

    pub fn set_joint_transform(&mut self, key: JointKey, transform: &EditTransform) -> Result<()> {
        let joint = self.joint_mut(key)?;
        joint.local_transform = transform.to_transform();
        joint.euler_angles = transform.euler_angles;
        Ok(())
    }

    pub fn set_joint_weight_volume(&mut self, key: JointKey, volume: WeightVolume) -> Result<()> {
        self.joint_mut(key)?.weight_volume = volume;
        Ok(())
    }

    pub fn child(&self, key: JointKey, index: usize) -> Result<JointKey> {
        let children = &self.joint(key)?.children;
        children
            .get(index)
            .copied()
            .ok_or(AnimError::ChildIndexOutOfRange {
                index,
                count: children.len(),
            })
    }

    pub fn parent(&self, key: JointKey) -> Result<Option<JointKey>> {
        Ok(self.joint(key)?.parent)
    }

    pub fn child_count(&self, key: JointKey) -> Result<usize> {
        Ok(self.joint(key)?.children.len())
    }

    pub fn has_parent(&self, key: JointKey) -> Result<bool> {
        Ok(self.joint(key)?.parent.is_some())
    }

    /// Keys in canonical (pre-order) joint order
    pub fn pre_order(&self) -> Vec<JointKey> {
        let mut order = Vec::with_capacity(self.joints.len());
        let mut pending = vec![self.root];
        while let Some(key) = pending.pop() {
            order.push(key);
            if let Some(joint) = self.joints.get(key) {
                pending.extend(joint.children.iter().rev());
            }
        }
        order
    }

    /// World matrices in canonical order
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut worlds = Vec::with_capacity(self.joints.len());
        self.visit_world(self.root, &Mat4::IDENTITY, &mut |_, _, world| {
            worlds.push(*world);
        });
        worlds
    }

    /// Weight volumes in world space, canonical order
    pub fn world_weight_volumes(&self) -> Vec<WeightVolume> {
        let mut volumes = Vec::with_capacity(self.joints.len());
        self.visit_world(self.root, &Mat4::IDENTITY, &mut |_, joint, world| {
            volumes.push(joint.weight_volume.transformed(world));
        });
        volumes
    }

    /// Drawable snapshot of every joint, canonical order
    pub fn joint_nodes(&self, current: JointKey) -> Vec<BuildingJointNode> {
        let mut nodes = Vec::with_capacity(self.joints.len());
        self.visit_world(self.root, &Mat4::IDENTITY, &mut |key, joint, world| {
            nodes.push(BuildingJointNode {
                is_current_joint: key == current,
                joint_world_position: world.w_axis.truncate(),
                world_weight_volume: joint.weight_volume.transformed(world),
            });
        });
        nodes
    }

    /// Flatten into a fixed-shape skeleton and capture its bind pose
    ///
    /// Both outputs come from the same pre-order walk, so index `i` of the
    /// bind pose always describes joint `i` of the skeleton.
    pub fn build_skeleton_and_bind_pose(&self) -> (Skeleton, BindPose) {
        let mut bind_pose = BindPose::new(self.joints.len());
        let mut next_index = 0;
        let root = self.build_joint(self.root, &Mat4::IDENTITY, &mut bind_pose, &mut next_index);
        let skeleton = Skeleton::new(root);

        debug_assert_eq!(next_index, skeleton.joint_count());
        debug!(
            "Built skeleton with {} joints",
            skeleton.joint_count()
        );
        (skeleton, bind_pose)
    }

    fn build_joint(
        &self,
        key: JointKey,
        parent_world: &Mat4,
        bind_pose: &mut BindPose,
        next_index: &mut usize,
    ) -> Joint {
        let joint = &self.joints[key];
        let world = *parent_world * joint.local_transform.matrix();

        bind_pose.set_joint(*next_index, &world, &joint.weight_volume);
        *next_index += 1;

        let children = joint
            .children
            .iter()
            .map(|&child| self.build_joint(child, &world, bind_pose, next_index))
            .collect();

        Joint::new(joint.local_transform, joint.euler_angles, children)
    }

    fn visit_world<F>(&self, key: JointKey, parent_world: &Mat4, visit: &mut F)
    where
        F: FnMut(JointKey, &BuildingJoint, &Mat4),
    {
        let Some(joint) = self.joints.get(key) else {
            return;
        };
        let world = *parent_world * joint.local_transform.matrix();
        visit(key, joint, &world);
        for &child in &joint.children {
            self.visit_world(child, &world, visit);
        }
    }
}

impl Default for BuildingSkeleton {
    fn default() -> Self {
        Self::new()
    }
}
