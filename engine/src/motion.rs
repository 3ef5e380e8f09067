//! Step-toward interpolators for staging poses.
//!
//! Both functions are pure: the same inputs always give the same output, and once a
//! step reports `reached`, feeding its value back with the same target is a no-op.

use crate::types::{Quat, Vec3};

/// Result of a single interpolation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stepped<T> {
    /// Value to use for this frame.
    pub value: T,
    /// Is `value` exactly the target?
    pub reached: bool,
}

impl<T> Stepped<T> {
    #[inline]
    fn reached(value: T) -> Self {
        Self {
            value,
            reached: true,
        }
    }

    #[inline]
    fn moving(value: T) -> Self {
        Self {
            value,
            reached: false,
        }
    }
}

/// Move `current` toward `target` by at most `max_step` along the straight line.
///
/// - If the remaining distance is under `snap_radius`, returns `target` exactly.
/// - Never overshoots: the result is never farther from `target` than `current` was.
#[inline]
pub fn step_position_toward(
    current: Vec3,
    target: Vec3,
    max_step: f32,
    snap_radius: f32,
) -> Stepped<Vec3> {
    let delta = target - current;
    let dist = delta.norm();

    if dist < snap_radius.max(0.0) || dist == 0.0 {
        return Stepped::reached(target);
    }

    let step = max_step.max(0.0).min(dist);
    let dir = delta / dist;

    Stepped::moving(current + dir * step)
}

/// Turn `current` toward `target` by at most `max_angular_step` radians.
///
/// - If the angular distance is under `snap_angle`, returns `target` exactly.
/// - Otherwise slerps by the fraction that caps the step, then re-normalizes.
#[inline]
pub fn step_orientation_toward(
    current: Quat,
    target: Quat,
    max_angular_step: f32,
    snap_angle: f32,
) -> Stepped<Quat> {
    let angle = angular_distance(&current, &target);

    if angle < snap_angle.max(0.0) || angle == 0.0 {
        return Stepped::reached(target);
    }

    let t = (max_angular_step.max(0.0) / angle).min(1.0);
    // `try_slerp` only fails on degenerate half-angle configurations, where the target
    // is an equally good answer.
    let next = current
        .try_slerp(&target, t, f32::EPSILON)
        .unwrap_or(target);

    Stepped::moving(Quat::new_normalize(next.into_inner()))
}

/// Rotation angle (radians, in `[0, PI]`) between two orientations.
///
/// Uses the `atan2` form, which stays exact for nearly identical orientations where an
/// `acos` of the scalar part loses most of its precision.
#[inline]
pub fn angular_distance(a: &Quat, b: &Quat) -> f32 {
    let rel = a.inverse() * b;
    let q = rel.quaternion();
    2.0 * q.imag().norm().atan2(q.scalar().abs())
}
