//! Deformation matrix buffer written during playback

use glam::Mat4;

use crate::error::{AnimError, Result};
use crate::skeleton::BindPose;
use crate::transform::{Lerp, Transform};

/// Per-joint deformation matrices for one point in time
///
/// `deformation_matrices()[i]` = animated world matrix of joint `i` times its
/// inverse bind world matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPose {
    deformation_matrices: Vec<Mat4>,
}

impl AnimationPose {
    pub fn new(joint_count: usize) -> Self {
        Self {
            deformation_matrices: vec![Mat4::IDENTITY; joint_count],
        }
    }

    pub fn joint_count(&self) -> usize {
        self.deformation_matrices.len()
    }

    pub fn deformation_matrices(&self) -> &[Mat4] {
        &self.deformation_matrices
    }

    /// Blend two world-space transform buffers and skin them against the bind pose
    pub(crate) fn write_blended(
        &mut self,
        left: &[Transform],
        right: &[Transform],
        alpha: f32,
        bind_pose: &BindPose,
    ) -> Result<()> {
        let expected = self.joint_count();
        for actual in [left.len(), right.len(), bind_pose.joint_count()] {
            if actual != expected {
                return Err(AnimError::JointCountMismatch { expected, actual });
            }
        }

        let joints = left
            .iter()
            .zip(right)
            .zip(bind_pose.inverse_world_matrices());
        for (out, ((left, right), inverse_bind)) in self.deformation_matrices.iter_mut().zip(joints) {
            *out = left.lerp(right, alpha).matrix() * *inverse_bind;
        }
        Ok(())
    }
}

/// Interpolation factor of `time` inside `[left, right]`, clamped to `[0, 1]`
pub(crate) fn interval_alpha(time: f32, left: f32, right: f32) -> f32 {
    let span = right - left;
    if span <= f32::EPSILON {
        return 0.0;
    }
    ((time - left) / span).clamp(0.0, 1.0)
}
