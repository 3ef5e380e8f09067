//! Die faces, top-face detection and the face-alignment delta.
//!
//! # Face frame
//! Every face value owns a fixed outward normal in the die's local frame:
//!
//! | face | normal |
//! |------|--------|
//! | 1    | +Y     |
//! | 2    | -Z     |
//! | 3    | +X     |
//! | 4    | -X     |
//! | 5    | +Z     |
//! | 6    | -Y     |
//!
//! [`FACES`] is the enumeration order. Top-face ties resolve to the first face in it.

use crate::{
    error::RollError,
    types::{Quat, Vec3},
};
use rapier3d::na;

/// A face value of a six-sided die.
///
/// The discriminant is the pip count.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
}

/// Fixed face enumeration order.
pub const FACES: [Face; 6] = [
    Face::One,
    Face::Two,
    Face::Three,
    Face::Four,
    Face::Five,
    Face::Six,
];

impl Face {
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Outward unit normal of this face in the die's local frame.
    pub fn local_normal(self) -> Vec3 {
        match self {
            Face::One => Vec3::new(0.0, 1.0, 0.0),
            Face::Two => Vec3::new(0.0, 0.0, -1.0),
            Face::Three => Vec3::new(1.0, 0.0, 0.0),
            Face::Four => Vec3::new(-1.0, 0.0, 0.0),
            Face::Five => Vec3::new(0.0, 0.0, 1.0),
            Face::Six => Vec3::new(0.0, -1.0, 0.0),
        }
    }
}

impl TryFrom<u8> for Face {
    type Error = RollError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Face::One),
            2 => Ok(Face::Two),
            3 => Ok(Face::Three),
            4 => Ok(Face::Four),
            5 => Ok(Face::Five),
            6 => Ok(Face::Six),
            other => Err(RollError::InvalidFace(other)),
        }
    }
}

impl From<Face> for u8 {
    fn from(face: Face) -> Self {
        face.value()
    }
}

/// The face pointing most directly at world +Y for a die with the given orientation.
pub fn top_face(rotation: &Quat) -> Face {
    let up = Vec3::y();
    highest_face(FACES.map(|face| (face, (rotation * face.local_normal()).dot(&up))))
}

/// First face with the highest score. Strict comparison keeps the earlier face on ties.
fn highest_face(scored: impl IntoIterator<Item = (Face, f32)>) -> Face {
    let mut best = Face::One;
    let mut best_dot = f32::NEG_INFINITY;

    for (face, dot) in scored {
        if dot > best_dot {
            best_dot = dot;
            best = face;
        }
    }

    best
}

/// Orientation delta that makes a die resting on `natural` render `target` on top.
///
/// This is the rotation carrying the natural face's normal onto the target face's
/// normal, inverted: right-multiplied onto the rendered orientation it rotates the mesh,
/// not the face frame. `delta * target.local_normal() == natural.local_normal()`.
pub fn alignment_delta(natural: Face, target: Face) -> Quat {
    shortest_rotation(&natural.local_normal(), &target.local_normal()).inverse()
}

/// Shortest-arc rotation from unit vector `from` onto unit vector `to`.
///
/// Opposite vectors have no unique shortest arc; they get a half turn about a fixed
/// perpendicular axis.
fn shortest_rotation(from: &Vec3, to: &Vec3) -> Quat {
    if let Some(q) = Quat::rotation_between(from, to) {
        return q;
    }

    let axis = if from.x.abs() > from.z.abs() {
        Vec3::new(-from.y, from.x, 0.0)
    } else {
        Vec3::new(0.0, -from.z, from.y)
    };

    Quat::from_axis_angle(&na::Unit::new_normalize(axis), std::f32::consts::PI)
}
