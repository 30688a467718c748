//! Joint transforms and the interpolation primitives shared by the
//! authoring and playback paths

use glam::{EulerRot, Mat4, Quat, Vec3};
use std::ops::Mul;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Values that can be blended between two keyframes
pub trait Lerp: Clone {
    /// Interpolate from `self` (t = 0) to `other` (t = 1)
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self.slerp(*other, t)
    }
}

/// Affine joint transform with a uniform scale
///
/// `matrix()` applies scale first, then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Transform {
    /// Transform that leaves every point in place
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    pub const fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Build a transform from Euler angles in radians
    ///
    /// The vector is rotated about X first, then Y, then Z.
    pub fn from_euler(position: Vec3, euler_angles: Vec3, scale: f32) -> Self {
        Self::new(position, euler_to_quat(euler_angles), scale)
    }

    /// Pure translation
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// 4x4 matrix of this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    /// Express `child`, given in this transform's space, in the parent space
    pub fn multiply(&self, child: &Self) -> Self {
        Self {
            position: self.position + self.rotation * (self.scale * child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Lerp for Transform {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: Lerp::lerp(&self.position, &other.position, t),
            rotation: Lerp::lerp(&self.rotation, &other.rotation, t),
            scale: Lerp::lerp(&self.scale, &other.scale, t),
        }
    }
}

impl Mul for Transform {
    type Output = Self;

    fn mul(self, child: Self) -> Self {
        self.multiply(&child)
    }
}

/// Transform as an editor enters it: Euler angles instead of a quaternion
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EditTransform {
    pub position: Vec3,
    /// Radians, applied X then Y then Z
    pub euler_angles: Vec3,
    pub scale: f32,
}

impl EditTransform {
    pub const fn new(position: Vec3, euler_angles: Vec3, scale: f32) -> Self {
        Self {
            position,
            euler_angles,
            scale,
        }
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_euler(self.position, self.euler_angles, self.scale)
    }
}

impl Default for EditTransform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, 1.0)
    }
}

pub(crate) fn euler_to_quat(euler_angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, euler_angles.z, euler_angles.y, euler_angles.x)
}

pub(crate) fn quat_to_euler(rotation: Quat) -> Vec3 {
    let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
    Vec3::new(x, y, z)
}
