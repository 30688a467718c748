//! Fixed-shape skeleton produced when authoring is completed

use glam::Vec3;

use crate::error::{AnimError, Result};
use crate::transform::{EditTransform, Transform, quat_to_euler};

/// Joint of a finalized skeleton
///
/// The children slice is sized once when the skeleton is built and never
/// grows or shrinks afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub local_transform: Transform,
    /// Angles the local rotation was authored from
    pub euler_angles: Vec3,
    children: Box<[Joint]>,
}

impl Joint {
    pub(crate) fn new(local_transform: Transform, euler_angles: Vec3, children: Vec<Self>) -> Self {
        Self {
            local_transform,
            euler_angles,
            children: children.into_boxed_slice(),
        }
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Result<&Self> {
        let count = self.children.len();
        self.children
            .get(index)
            .ok_or(AnimError::ChildIndexOutOfRange { index, count })
    }

    pub fn child_mut(&mut self, index: usize) -> Result<&mut Self> {
        let count = self.children.len();
        self.children
            .get_mut(index)
            .ok_or(AnimError::ChildIndexOutOfRange { index, count })
    }

    pub fn edit_transform(&self) -> EditTransform {
        EditTransform::new(
            self.local_transform.position,
            self.euler_angles,
            self.local_transform.scale,
        )
    }

    pub fn set_edit_transform(&mut self, transform: &EditTransform) {
        self.local_transform = transform.to_transform();
        self.euler_angles = transform.euler_angles;
    }

    /// Number of joints in this subtree, this joint included
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// Finalized skeleton
///
/// Pre-order traversal (children in insertion order) defines the canonical
/// joint index shared by the bind pose, keyframe buffers and animation poses.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joint_count: usize,
    root: Joint,
}

impl Skeleton {
    pub(crate) fn new(root: Joint) -> Self {
        Self {
            joint_count: root.subtree_len(),
            root,
        }
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn root(&self) -> &Joint {
        &self.root
    }

    /// Follow child indices from the root
    pub fn joint_at(&self, path: &[usize]) -> Result<&Joint> {
        path.iter()
            .try_fold(&self.root, |joint, &index| joint.child(index))
    }

    pub fn joint_at_mut(&mut self, path: &[usize]) -> Result<&mut Joint> {
        path.iter()
            .try_fold(&mut self.root, |joint, &index| joint.child_mut(index))
    }

    /// Local transforms in canonical order
    pub fn local_transforms(&self) -> Vec<Transform> {
        let mut transforms = Vec::with_capacity(self.joint_count);
        collect_local(&self.root, &mut transforms);
        transforms
    }

    /// World transforms in canonical order
    pub fn world_transforms(&self) -> Vec<Transform> {
        let mut transforms = Vec::with_capacity(self.joint_count);
        collect_world(&self.root, &Transform::IDENTITY, &mut transforms);
        transforms
    }

    /// Overwrite every local transform, `transforms` in canonical order
    ///
    /// The stored Euler angles are re-derived from the new rotations.
    pub(crate) fn set_local_transforms(&mut self, transforms: &[Transform]) {
        debug_assert_eq!(transforms.len(), self.joint_count);
        let mut source = transforms.iter();
        assign_local(&mut self.root, &mut source);
    }

    /// Canonical index of the joint reached by `path`
    pub fn index_of(&self, path: &[usize]) -> Result<usize> {
        let mut joint = &self.root;
        let mut index = 0;
        for &child_index in path {
            let child = joint.child(child_index)?;
            index += 1 + joint.children[..child_index]
                .iter()
                .map(Joint::subtree_len)
                .sum::<usize>();
            joint = child;
        }
        Ok(index)
    }
}

fn collect_local(joint: &Joint, out: &mut Vec<Transform>) {
    out.push(joint.local_transform);
    for child in joint.children() {
        collect_local(child, out);
    }
}

fn assign_local<'a, I>(joint: &mut Joint, source: &mut I)
where
    I: Iterator<Item = &'a Transform>,
{
    if let Some(transform) = source.next() {
        joint.local_transform = *transform;
        joint.euler_angles = quat_to_euler(transform.rotation);
    }
    for child in joint.children.iter_mut() {
        assign_local(child, source);
    }
}

fn collect_world(joint: &Joint, parent_world: &Transform, out: &mut Vec<Transform>) {
    let world = parent_world.multiply(&joint.local_transform);
    out.push(world);
    for child in joint.children() {
        collect_world(child, &world, out);
    }
}
