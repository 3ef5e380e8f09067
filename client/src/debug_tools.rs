//! Debug/performance tooling for native dev builds.
//!
//! F3 toggles wireframes of the tray colliders and the camera's look target.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use engine::DIE_SIZE;
use iyes_perf_ui::prelude::*;

use crate::{
    convert,
    roll::{Roll, has_roll},
};

#[derive(Resource, Default)]
struct ShowColliders(bool);

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.init_resource::<ShowColliders>();
    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, (toggle_colliders, draw_colliders.run_if(has_roll)).chain());
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn toggle_colliders(keys: Res<ButtonInput<KeyCode>>, mut show: ResMut<ShowColliders>) {
    if keys.just_pressed(KeyCode::F3) {
        show.0 = !show.0;
    }
}

fn draw_colliders(show: Res<ShowColliders>, roll: NonSend<Roll>, mut gizmos: Gizmos) {
    if !show.0 {
        return;
    }

    for piece in roll.tray().pieces() {
        let transform = convert::transform(&piece.pose)
            .with_scale(convert::vec3(&piece.half_extents) * 2.0);
        gizmos.cuboid(transform, Color::srgb(0.2, 0.9, 0.4));
    }
    for pose in roll.rendered_poses() {
        let transform = convert::transform(&pose).with_scale(Vec3::splat(DIE_SIZE));
        gizmos.cuboid(transform, Color::srgb(0.9, 0.7, 0.2));
    }
    gizmos.sphere(
        convert::vec3(&roll.framing().look_target()),
        DIE_SIZE * 0.2,
        Color::srgb(0.9, 0.2, 0.2),
    );
}
