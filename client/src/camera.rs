use bevy::prelude::*;
use engine::CAMERA_POSITION;

use crate::{
    convert,
    roll::{Roll, has_roll},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, apply_framing.run_if(has_roll));
}

fn add_camera(mut commands: Commands) {
    let [x, y, z] = CAMERA_POSITION;
    commands.spawn((
        Camera3d::default(),
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Projection::Perspective(PerspectiveProjection {
            near: 0.1,
            far: 100.0,
            ..default()
        }),
        Transform::from_xyz(x, y, z).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Apply the session's field of view and look target. The camera itself never moves.
fn apply_framing(
    roll: NonSend<Roll>,
    camera: Single<(&mut Transform, &mut Projection), With<Camera3d>>,
) {
    let (mut transform, mut projection) = camera.into_inner();
    let framing = roll.framing();

    if let Projection::Perspective(perspective) = &mut *projection {
        perspective.fov = framing.fov_deg().to_radians();
    }
    transform.look_at(convert::vec3(&framing.look_target()), Vec3::Y);
}
