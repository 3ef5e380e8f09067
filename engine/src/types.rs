/*!
Math aliases and the rigid pose type shared by every engine module.

All math comes from `rapier3d::na` so the types handed to the solver are always the
solver's own nalgebra version.
*/

use rapier3d::na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid pose (isometry) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Convert to nalgebra `Isometry3` for rapier/parry.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_translation(Vec3::zeros())
    }
}
