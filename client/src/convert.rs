//! Engine math (nalgebra) to Bevy math (glam).

use bevy::prelude::*;

#[inline]
pub fn vec3(v: &engine::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn quat(q: &engine::Quat) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

#[inline]
pub fn transform(pose: &engine::Pose) -> Transform {
    Transform::from_translation(vec3(&pose.translation)).with_rotation(quat(&pose.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotations_agree() {
        let q = engine::Quat::from_euler_angles(0.3, 1.2, -0.4);
        let p = engine::Vec3::new(1.0, 2.0, 3.0);

        let expected = vec3(&(q * p));
        let actual = quat(&q) * vec3(&p);
        assert!((expected - actual).length() < 1.0e-5);
    }
}
