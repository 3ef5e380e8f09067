//! The disguise spin dice turn through while a throw is being prepared.

use rapier3d::na;

use crate::{
    constants::{LOADING_SPIN_STEP, LOADING_TURN_EPS},
    motion::angular_distance,
    types::{Quat, Vec3},
};

/// Accumulated spin of one die about a fixed axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadingSpin {
    axis: na::Unit<Vec3>,
    rotation: Quat,
    steps: u32,
}

impl LoadingSpin {
    /// A spin starting at identity.
    pub fn new(axis: na::Unit<Vec3>) -> Self {
        Self {
            axis,
            rotation: Quat::identity(),
            steps: 0,
        }
    }

    /// Turn by one [`LOADING_SPIN_STEP`]. Returns `true` on the frame a full turn
    /// completes; the spin then restarts from identity.
    pub fn advance(&mut self) -> bool {
        let step = Quat::from_axis_angle(&self.axis, LOADING_SPIN_STEP);
        self.rotation = Quat::new_normalize((self.rotation * step).into_inner());
        self.steps += 1;

        let full_turn = angular_distance(&self.rotation, &Quat::identity()) < LOADING_TURN_EPS;
        if full_turn {
            self.rotation = Quat::identity();
            self.steps = 0;
        }
        full_turn
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }
}
