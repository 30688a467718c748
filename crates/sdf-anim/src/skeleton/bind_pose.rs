//! Inverse bind matrices and world weight volumes

use glam::Mat4;

use crate::weight_volume::WeightVolume;

/// Reference pose captured when skeleton authoring is completed
///
/// Both arrays are indexed by canonical joint index and sized once, at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BindPose {
    inverse_world_matrices: Vec<Mat4>,
    world_weight_volumes: Vec<WeightVolume>,
}

impl BindPose {
    pub fn new(joint_count: usize) -> Self {
        Self {
            inverse_world_matrices: vec![Mat4::IDENTITY; joint_count],
            world_weight_volumes: vec![WeightVolume::default(); joint_count],
        }
    }

    pub(crate) fn from_parts(
        inverse_world_matrices: Vec<Mat4>,
        world_weight_volumes: Vec<WeightVolume>,
    ) -> Self {
        debug_assert_eq!(inverse_world_matrices.len(), world_weight_volumes.len());
        Self {
            inverse_world_matrices,
            world_weight_volumes,
        }
    }

    pub fn joint_count(&self) -> usize {
        self.inverse_world_matrices.len()
    }

    pub fn inverse_world_matrices(&self) -> &[Mat4] {
        &self.inverse_world_matrices
    }

    pub fn world_weight_volumes(&self) -> &[WeightVolume] {
        &self.world_weight_volumes
    }

    pub(crate) fn set_joint(&mut self, index: usize, world: &Mat4, local_volume: &WeightVolume) {
        self.inverse_world_matrices[index] = world.inverse();
        self.world_weight_volumes[index] = local_volume.transformed(world);
    }
}
