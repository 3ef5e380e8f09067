//! The dice tray: a fixed compound of boxes (floor, raised walls, chamfered corners).
//!
//! The compound shape is assembled once by [`Tray::new`] and shared by reference into
//! every world that needs it, so roster resizes and pre-solves never rebuild it.

use std::f32::consts::{FRAC_PI_4, SQRT_2};

use rapier3d::prelude::{RigidBodyHandle, SharedShape};

use crate::{
    constants::{TRAY_CHAMFER, TRAY_SIZE, TRAY_WALL},
    rapier::{BodyDef, BodyShapeDef},
    rapier_world::DiceWorld,
    types::{Pose, Quat, Vec3},
};

/// One box of the tray, placed relative to the tray origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrayPiece {
    pub half_extents: Vec3,
    pub pose: Pose,
}

impl TrayPiece {
    /// `size` is the full box size; `yaw` turns the box about +Y.
    fn new(size: [f32; 3], position: [f32; 3], yaw: f32) -> Self {
        Self {
            half_extents: Vec3::new(size[0], size[1], size[2]) * 0.5,
            pose: Pose::new(
                Vec3::new(position[0], position[1], position[2]),
                Quat::from_axis_angle(&Vec3::y_axis(), yaw),
            ),
        }
    }
}

/// The fixed tray body definition plus the boxes it was built from (for rendering).
#[derive(Clone)]
pub struct Tray {
    pieces: Vec<TrayPiece>,
    shape: SharedShape,
}

impl Tray {
    pub fn new() -> Self {
        let pieces = tray_pieces();
        let shape = BodyShapeDef::Compound(
            pieces
                .iter()
                .map(|piece| (piece.pose, piece.half_extents))
                .collect(),
        )
        .to_shared_shape();

        Self { pieces, shape }
    }

    #[inline]
    pub fn pieces(&self) -> &[TrayPiece] {
        &self.pieces
    }

    #[inline]
    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    /// Insert the tray as a fixed body at the world origin.
    pub fn insert_into(&self, world: &mut DiceWorld) -> RigidBodyHandle {
        world.create_body(&BodyDef::fixed(self.shape.clone()), Pose::default())
    }

    /// Height of the floor's top surface.
    #[inline]
    pub fn floor_top(&self) -> f32 {
        TRAY_WALL
    }
}

impl Default for Tray {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed box list: floor, a raised second layer, vertical walls and a top rim,
/// each with chamfered corners.
pub fn tray_pieces() -> Vec<TrayPiece> {
    let [sx, sy, sz] = TRAY_SIZE;
    let w = TRAY_WALL;
    let chamfer = TRAY_CHAMFER;

    let leg = chamfer / SQRT_2;
    let (hx, hy, hz) = (sx * 0.5, sy * 0.5, sz * 0.5);

    let mid_y = w * 0.5;
    let layer_y = mid_y + w;
    let wall_y = mid_y + hy;
    let top_y = sy - w * 0.5;

    let cut = chamfer - w * SQRT_2;
    let inner_x = sx - leg * 2.0;
    let inner_z = sz - leg * 2.0;

    // Corner insets for the second layer, the walls and the rim.
    let layer_in = leg * 0.5 + w / SQRT_2 + w * 0.5;
    let wall_in = leg * 0.5 + w / (2.0 * SQRT_2) + w * 0.5;
    let rim_in = leg * 0.5 + w * (SQRT_2 + 1.0) * 0.25;
    let rim_corner = w * (1.0 + SQRT_2 - 1.0 / SQRT_2);

    let wall_h = sy - w * 3.0;
    let q = FRAC_PI_4;

    vec![
        // floor
        TrayPiece::new([inner_x, w, sz], [0.0, mid_y, 0.0], 0.0),
        TrayPiece::new([leg, w, inner_z], [-hx + leg * 0.5, mid_y, 0.0], 0.0),
        TrayPiece::new([leg, w, inner_z], [hx - leg * 0.5, mid_y, 0.0], 0.0),
        TrayPiece::new([chamfer, w, chamfer], [-hx + leg, mid_y, -hz + leg], q),
        TrayPiece::new([chamfer, w, chamfer], [-hx + leg, mid_y, hz - leg], q),
        TrayPiece::new([chamfer, w, chamfer], [hx - leg, mid_y, -hz + leg], q),
        TrayPiece::new([chamfer, w, chamfer], [hx - leg, mid_y, hz - leg], q),
        // second layer
        TrayPiece::new([w * 2.0, w, inner_z], [-hx + w * 2.0, layer_y, 0.0], 0.0),
        TrayPiece::new([inner_x, w, w * 2.0], [0.0, layer_y, -hz + w * 2.0], 0.0),
        TrayPiece::new([w * 2.0, w, cut], [-hx + layer_in, layer_y, hz - layer_in], q),
        TrayPiece::new([w * 2.0, w, cut], [-hx + layer_in, layer_y, -hz + layer_in], -q),
        TrayPiece::new([w * 2.0, w, inner_z], [hx - w * 2.0, layer_y, 0.0], 0.0),
        TrayPiece::new([inner_x, w, w * 2.0], [0.0, layer_y, hz - w * 2.0], 0.0),
        TrayPiece::new([w * 2.0, w, cut], [hx - layer_in, layer_y, hz - layer_in], -q),
        TrayPiece::new([w * 2.0, w, cut], [hx - layer_in, layer_y, -hz + layer_in], q),
        // vertical walls
        TrayPiece::new([w, wall_h, inner_z], [-hx + w * 1.5, wall_y, 0.0], 0.0),
        TrayPiece::new([inner_x, wall_h, w], [0.0, wall_y, -hz + w * 1.5], 0.0),
        TrayPiece::new([w, wall_h, cut], [-hx + wall_in, wall_y, hz - wall_in], q),
        TrayPiece::new([w, wall_h, cut], [-hx + wall_in, wall_y, -hz + wall_in], -q),
        TrayPiece::new([w, wall_h, inner_z], [hx - w * 1.5, wall_y, 0.0], 0.0),
        TrayPiece::new([inner_x, wall_h, w], [0.0, wall_y, hz - w * 1.5], 0.0),
        TrayPiece::new([w, wall_h, cut], [hx - wall_in, wall_y, hz - wall_in], -q),
        TrayPiece::new([w, wall_h, cut], [hx - wall_in, wall_y, -hz + wall_in], q),
        // top rim
        TrayPiece::new([w * 2.0, w, inner_z], [-hx + w, top_y, 0.0], 0.0),
        TrayPiece::new([inner_x, w, w * 2.0], [0.0, top_y, -hz + w], 0.0),
        TrayPiece::new([w * 2.0, w, inner_z], [hx - w, top_y, 0.0], 0.0),
        TrayPiece::new([inner_x, w, w * 2.0], [0.0, top_y, hz - w], 0.0),
        TrayPiece::new([rim_corner, w, chamfer], [-hx + rim_in, top_y, hz - rim_in], q),
        TrayPiece::new([rim_corner, w, chamfer], [-hx + rim_in, top_y, -hz + rim_in], -q),
        TrayPiece::new([rim_corner, w, chamfer], [hx - rim_in, top_y, hz - rim_in], -q),
        TrayPiece::new([rim_corner, w, chamfer], [hx - rim_in, top_y, -hz + rim_in], q),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DIE_SIZE, FALLING_GRAVITY_Y};

    #[test]
    fn compound_holds_every_piece() {
        let tray = Tray::new();
        assert_eq!(tray.pieces().len(), 31);
        let compound = tray.shape().as_compound().unwrap();
        assert_eq!(compound.shapes().len(), tray.pieces().len());
    }

    #[test]
    fn pieces_stay_inside_the_outer_size() {
        let [sx, sy, sz] = TRAY_SIZE;
        for piece in tray_pieces() {
            let t = piece.pose.translation;
            assert!(t.x.abs() <= sx * 0.5, "{piece:?}");
            assert!(t.y >= 0.0 && t.y <= sy, "{piece:?}");
            assert!(t.z.abs() <= sz * 0.5, "{piece:?}");
            assert!(piece.half_extents.iter().all(|h| *h > 0.0), "{piece:?}");
        }
    }

    #[test]
    fn clones_share_the_compound() {
        let tray = Tray::new();
        let copy = tray.clone();
        assert!(std::sync::Arc::ptr_eq(&tray.shape().0, &copy.shape().0));
    }

    #[test]
    fn dropped_die_lands_on_the_floor() {
        let tray = Tray::new();
        let mut world = DiceWorld::new(Vec3::new(0.0, FALLING_GRAVITY_Y, 0.0));
        tray.insert_into(&mut world);
        let die = world.create_die(Pose::from_translation(Vec3::new(0.0, DIE_SIZE * 4.0, 0.0)));

        for _ in 0..300 {
            world.step();
        }

        let resting_y = tray.floor_top() + DIE_SIZE * 0.5;
        let y = world.pose(die).translation.y;
        assert!((y - resting_y).abs() < 0.05, "die rests at {y}, expected {resting_y}");
    }
}
