use rapier3d::prelude::*;

use crate::{
    constants::{
        CONTACT_FRICTION, CONTACT_RESTITUTION, DIE_ANGULAR_DAMPING, DIE_LINEAR_DAMPING, DIE_MASS,
        DIE_SIZE,
    },
    types::{Pose, Vec3},
};

/// Canonical, solver-agnostic definition of a body the dice world can hold.
#[derive(Clone)]
pub struct BodyDef {
    /// Collider shape parameters.
    pub shape: BodyShapeDef,
    /// Total mass in kg. Zero makes the body fixed (static).
    pub mass: f32,
    /// Contact material.
    pub material: Material,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Continuous collision detection for fast movers.
    pub ccd: bool,
}

impl BodyDef {
    /// A standard die: a uniform cube of `DIE_SIZE`.
    pub fn die() -> Self {
        let half = DIE_SIZE * 0.5;
        Self {
            shape: BodyShapeDef::Cuboid {
                half_extents: Vec3::new(half, half, half),
            },
            mass: DIE_MASS,
            material: Material::default(),
            linear_damping: DIE_LINEAR_DAMPING,
            angular_damping: DIE_ANGULAR_DAMPING,
            ccd: true,
        }
    }

    /// A fixed body built from an already-assembled shape (e.g. the tray compound).
    pub fn fixed(shape: SharedShape) -> Self {
        Self {
            shape: BodyShapeDef::Shared(shape),
            mass: 0.0,
            material: Material::default(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            ccd: false,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Contact material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: CONTACT_FRICTION,
            restitution: CONTACT_RESTITUTION,
        }
    }
}

/// Supported body shapes.
#[derive(Clone)]
pub enum BodyShapeDef {
    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Several cuboids, each placed by its own pose relative to the body.
    Compound(Vec<(Pose, Vec3)>),

    /// A shape assembled elsewhere and shared by reference between worlds.
    Shared(SharedShape),
}

impl BodyShapeDef {
    /// Build the parry shape for this definition.
    pub fn to_shared_shape(&self) -> SharedShape {
        match self {
            BodyShapeDef::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }

            BodyShapeDef::Compound(parts) => SharedShape::compound(
                parts
                    .iter()
                    .map(|(pose, half)| (pose.iso(), SharedShape::cuboid(half.x, half.y, half.z)))
                    .collect(),
            ),

            BodyShapeDef::Shared(shape) => shape.clone(),
        }
    }
}

/// Build a Rapier collider from a `BodyDef`.
///
/// The collider sits at the body origin (identity local transform); the body's pose places it.
pub fn collider_from_def(def: &BodyDef) -> Collider {
    let builder = ColliderBuilder::new(def.shape.to_shared_shape())
        .friction(def.material.friction)
        .restitution(def.material.restitution);

    if def.is_fixed() {
        builder.build()
    } else {
        builder.mass(def.mass).build()
    }
}

/// Build the Rapier rigid body (without collider) for a `BodyDef` at `pose`.
pub fn rigid_body_from_def(def: &BodyDef, pose: &Pose) -> RigidBody {
    let builder = if def.is_fixed() {
        RigidBodyBuilder::fixed()
    } else {
        RigidBodyBuilder::dynamic()
            .linear_damping(def.linear_damping)
            .angular_damping(def.angular_damping)
            .ccd_enabled(def.ccd)
    };

    let mut body = builder.translation(pose.translation).build();
    body.set_rotation(pose.rotation, false);
    body
}
