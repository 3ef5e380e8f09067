//! Randomized throw parameters and the staging row layout.

use rand::Rng;
use rapier3d::na;

use crate::{
    constants::{DIE_SPACING, DIE_STAGING_Y},
    types::{Quat, Vec3},
};

/// Per-die throw: the orientation it leaves the staging row with, its spin and the
/// impulse that launches it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrowPlan {
    pub rotation: Quat,
    pub angular_velocity: Vec3,
    pub impulse: Vec3,
}

impl ThrowPlan {
    /// A fresh random plan.
    ///
    /// Spin is at least 4 rad/s about every axis; the impulse always tosses upward by
    /// 8..12 with a small sideways drift.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let v = random_unit_cube(rng);

        let angular_velocity = v.map(|c| 4.0 * sign(c) + c * 2.0);
        let mut impulse = v.map(|c| c * 0.4 + sign(c) * 0.2);
        impulse.y = 8.0 + 4.0 * rng.random::<f32>();

        Self {
            rotation: random_rotation(rng),
            angular_velocity,
            impulse,
        }
    }

    /// One independent plan per die.
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Self> {
        (0..count).map(|_| Self::random(rng)).collect()
    }

    /// Axis the disguise spin turns about.
    pub fn spin_axis(&self) -> na::Unit<Vec3> {
        na::Unit::try_new(self.angular_velocity, f32::EPSILON).unwrap_or_else(Vec3::y_axis)
    }
}

/// Staging position of slot `index` in a row of `count` dice, centred on the tray.
#[inline]
pub fn slot_position(count: usize, index: usize) -> Vec3 {
    let offset = index as f32 - (count as f32 - 1.0) * 0.5;
    Vec3::new(offset * DIE_SPACING, DIE_STAGING_Y, 0.0)
}

/// `-1`, `0` or `1`; zero stays zero, unlike `f32::signum`.
#[inline]
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn random_unit_cube<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
    )
}

/// Normalized random 4-vector. Near-zero draws are redrawn so normalization stays exact.
fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    loop {
        let q = na::Quaternion::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if q.norm() > 1.0e-3 {
            return Quat::from_quaternion(q);
        }
    }
}
