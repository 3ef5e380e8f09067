//! Rapier-backed rigid-body world for dice and their tray.
//!
//! [`DiceWorld`] bundles every rapier set the solver needs into one owned value, so a
//! world can be built, stepped and dropped as a unit. The visible session and the
//! headless pre-solver each own a private instance; nothing is shared between them
//! except the tray's [`SharedShape`].
//!
//! Invalid handles are programming errors and panic.

// Re-export Rapier so the host crate can name shapes and handles without depending on
// `rapier3d` directly.
pub use rapier3d;

use rapier3d::prelude::*;

use crate::{
    constants::FIXED_DT,
    rapier::{BodyDef, collider_from_def, rigid_body_from_def},
    types::{Pose, Vec3},
};

/// Linear and angular velocity of a body (m/s, rad/s).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyVelocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl BodyVelocity {
    pub fn zero() -> Self {
        Self {
            linear: Vec3::zeros(),
            angular: Vec3::zeros(),
        }
    }

    /// Linear plus angular speed.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.linear.norm() + self.angular.norm()
    }
}

/// An isolated physics world stepped at [`FIXED_DT`].
pub struct DiceWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl DiceWorld {
    /// An empty world with the given gravity.
    pub fn new(gravity: Vec3) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = FIXED_DT;

        Self {
            gravity,
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Insert a body and its collider at `pose`.
    pub fn create_body(&mut self, def: &BodyDef, pose: Pose) -> RigidBodyHandle {
        let handle = self.bodies.insert(rigid_body_from_def(def, &pose));
        self.colliders
            .insert_with_parent(collider_from_def(def), handle, &mut self.bodies);

        // Mass properties are otherwise only refreshed on the next step, which would
        // swallow an impulse applied right after creation.
        if let Some(body) = self.bodies.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }

        handle
    }

    /// Insert a standard die at `pose`.
    #[inline]
    pub fn create_die(&mut self, pose: Pose) -> RigidBodyHandle {
        self.create_body(&BodyDef::die(), pose)
    }

    /// Advance the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    pub fn pose(&self, handle: RigidBodyHandle) -> Pose {
        let body = self.body(handle);
        Pose::new(*body.translation(), *body.rotation())
    }

    pub fn set_pose(&mut self, handle: RigidBodyHandle, pose: Pose) {
        let body = self.body_mut(handle);
        body.set_translation(pose.translation, true);
        body.set_rotation(pose.rotation, true);
    }

    pub fn velocity(&self, handle: RigidBodyHandle) -> BodyVelocity {
        let body = self.body(handle);
        BodyVelocity {
            linear: *body.linvel(),
            angular: *body.angvel(),
        }
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: BodyVelocity) {
        let body = self.body_mut(handle);
        body.set_linvel(velocity.linear, true);
        body.set_angvel(velocity.angular, true);
    }

    /// Linear plus angular speed of one body.
    #[inline]
    pub fn speed(&self, handle: RigidBodyHandle) -> f32 {
        self.velocity(handle).speed()
    }

    /// Apply an instantaneous impulse at a world-space point.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3, at_point: Vec3) {
        self.body_mut(handle)
            .apply_impulse_at_point(impulse, Point::from(at_point), true);
    }

    #[inline]
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Remove a body together with its colliders.
    pub fn remove(&mut self, handle: RigidBodyHandle) {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .expect("removing a body that is not in this world");
    }

    #[inline]
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body(&self, handle: RigidBodyHandle) -> &RigidBody {
        self.bodies
            .get(handle)
            .expect("body handle does not belong to this world")
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> &mut RigidBody {
        self.bodies
            .get_mut(handle)
            .expect("body handle does not belong to this world")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{DIE_MASS, FALLING_GRAVITY_Y},
        types::Quat,
    };

    fn falling() -> Vec3 {
        Vec3::new(0.0, FALLING_GRAVITY_Y, 0.0)
    }

    #[test]
    fn pose_round_trips() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let h = world.create_die(Pose::default());

        let pose = Pose::new(
            Vec3::new(1.0, 2.0, -3.0),
            Quat::from_axis_angle(&Vec3::z_axis(), 0.4),
        );
        world.set_pose(h, pose);

        let read = world.pose(h);
        assert!((read.translation - pose.translation).norm() < 1.0e-6);
        assert!(read.rotation.angle_to(&pose.rotation) < 1.0e-5);
    }

    #[test]
    fn zero_gravity_keeps_a_resting_die_in_place() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let start = Vec3::new(0.0, 3.0, 0.0);
        let h = world.create_die(Pose::from_translation(start));

        for _ in 0..30 {
            world.step();
        }

        assert!((world.pose(h).translation - start).norm() < 1.0e-6);
    }

    #[test]
    fn falling_gravity_pulls_a_die_down() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let h = world.create_die(Pose::from_translation(Vec3::new(0.0, 3.0, 0.0)));
        world.set_gravity(falling());
        assert_eq!(world.gravity(), falling());

        for _ in 0..30 {
            world.step();
        }

        assert!(world.pose(h).translation.y < 2.0);
        assert!(world.velocity(h).linear.y < 0.0);
    }

    #[test]
    fn impulse_at_centre_sets_linear_velocity() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let centre = Vec3::new(0.0, 3.0, 0.0);
        let h = world.create_die(Pose::from_translation(centre));

        let impulse = Vec3::new(0.5, 8.0, -0.25);
        world.apply_impulse(h, impulse, centre);

        let v = world.velocity(h);
        assert!((v.linear - impulse / DIE_MASS).norm() < 1.0e-4);
        assert!(v.angular.norm() < 1.0e-4);
    }

    #[test]
    fn velocity_round_trips_and_feeds_speed() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let h = world.create_die(Pose::default());

        let v = BodyVelocity {
            linear: Vec3::new(3.0, 0.0, 4.0),
            angular: Vec3::new(0.0, 2.0, 0.0),
        };
        world.set_velocity(h, v);

        assert_eq!(world.velocity(h), v);
        assert!((world.speed(h) - 7.0).abs() < 1.0e-5);
    }

    #[test]
    fn remove_drops_the_body() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let a = world.create_die(Pose::default());
        let b = world.create_die(Pose::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(world.body_count(), 2);

        world.remove(a);

        assert_eq!(world.body_count(), 1);
        assert!(!world.contains(a));
        assert!(world.contains(b));
    }

    #[test]
    #[should_panic]
    fn stale_handle_panics() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let h = world.create_die(Pose::default());
        world.remove(h);
        let _ = world.pose(h);
    }
}
