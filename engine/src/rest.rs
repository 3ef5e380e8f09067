//! Debounced rest detection over a fixed set of bodies.

use rapier3d::prelude::RigidBodyHandle;

use crate::{
    constants::{REST_CONFIRMATIONS, REST_SPEED_EPS, REST_STEP_CAP},
    rapier_world::DiceWorld,
};

/// Declares the dice settled once they stay slow for [`REST_CONFIRMATIONS`] polls in a
/// row, or once [`REST_STEP_CAP`] steps have elapsed and that many more polls pass.
///
/// One instance per roll; it is never rewound.
#[derive(Clone, Debug, Default)]
pub struct RestDetector {
    steps: u32,
    confirmations: u32,
}

impl RestDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one step's combined speed for `count` bodies. Returns `true` once settled.
    pub fn observe(&mut self, total_speed: f32, count: usize) -> bool {
        self.steps = self.steps.saturating_add(1);

        let mean = if count == 0 {
            0.0
        } else {
            total_speed / count as f32
        };

        if self.steps >= REST_STEP_CAP || mean < REST_SPEED_EPS {
            self.confirmations = self.confirmations.saturating_add(1);
        } else {
            self.confirmations = 0;
        }

        self.is_settled()
    }

    /// Poll the given bodies of `world`.
    pub fn check(&mut self, world: &DiceWorld, bodies: &[RigidBodyHandle]) -> bool {
        let total: f32 = bodies.iter().map(|&h| world.speed(h)).sum();
        self.observe(total, bodies.len())
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.confirmations >= REST_CONFIRMATIONS
    }

    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pose, Vec3};

    #[test]
    fn still_bodies_settle_after_the_confirmation_count() {
        let mut world = DiceWorld::new(Vec3::zeros());
        let dice: Vec<_> = (0..3)
            .map(|i| world.create_die(Pose::from_translation(Vec3::new(i as f32 * 2.0, 1.0, 0.0))))
            .collect();

        let mut rest = RestDetector::new();
        for _ in 1..REST_CONFIRMATIONS {
            world.step();
            assert!(!rest.check(&world, &dice));
        }
        world.step();
        assert!(rest.check(&world, &dice));
    }

    #[test]
    fn fast_bodies_only_settle_through_the_cap() {
        let mut rest = RestDetector::new();
        let last_unsettled = REST_STEP_CAP + REST_CONFIRMATIONS - 2;

        for _ in 0..last_unsettled {
            assert!(!rest.observe(30.0, 3));
        }
        assert!(rest.observe(30.0, 3));
        assert_eq!(rest.steps(), REST_STEP_CAP + REST_CONFIRMATIONS - 1);
    }

    #[test]
    fn a_single_bounce_resets_confirmations() {
        let mut rest = RestDetector::new();
        for _ in 0..REST_CONFIRMATIONS - 1 {
            rest.observe(0.0, 2);
        }
        assert!(!rest.observe(5.0, 2));
        for _ in 0..REST_CONFIRMATIONS - 1 {
            assert!(!rest.observe(0.0, 2));
        }
        assert!(rest.observe(0.0, 2));
    }

    #[test]
    fn mean_speed_is_per_body() {
        // 0.015 summed over three bodies is 0.005 each: under the threshold.
        let mut rest = RestDetector::new();
        for _ in 0..REST_CONFIRMATIONS {
            rest.observe(0.015, 3);
        }
        assert!(rest.is_settled());
    }
}
