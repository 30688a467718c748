//! Analytic joint influence volumes

use glam::{Mat4, Vec3};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Capsule-shaped region describing where a joint deforms the surface
///
/// The capsule runs from `start_point` to `start_point + start_to_end`;
/// influence decays with distance at `falloff_rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct WeightVolume {
    pub start_point: Vec3,
    start_to_end: Vec3,
    #[cfg_attr(feature = "serde", serde(skip))]
    length_squared: f32,
    pub falloff_rate: f32,
}

impl WeightVolume {
    pub const DEFAULT_START_TO_END: Vec3 = Vec3::Y;
    pub const DEFAULT_FALLOFF_RATE: f32 = 10.0;

    pub fn new(start_point: Vec3, start_to_end: Vec3, falloff_rate: f32) -> Self {
        Self {
            start_point,
            start_to_end,
            length_squared: start_to_end.length_squared(),
            falloff_rate,
        }
    }

    pub fn start_to_end(&self) -> Vec3 {
        self.start_to_end
    }

    pub fn set_start_to_end(&mut self, start_to_end: Vec3) {
        self.start_to_end = start_to_end;
        self.length_squared = start_to_end.length_squared();
    }

    /// Squared capsule length, cached from `start_to_end`
    pub fn length_squared(&self) -> f32 {
        self.length_squared
    }

    /// Far end of the capsule axis
    pub fn end_point(&self) -> Vec3 {
        self.start_point + self.start_to_end
    }

    /// Move the volume into the space described by `world`
    ///
    /// The start point is transformed as a position, the axis as a direction.
    pub fn transformed(&self, world: &Mat4) -> Self {
        Self::new(
            world.transform_point3(self.start_point),
            world.transform_vector3(self.start_to_end),
            self.falloff_rate,
        )
    }
}

impl Default for WeightVolume {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            Self::DEFAULT_START_TO_END,
            Self::DEFAULT_FALLOFF_RATE,
        )
    }
}
