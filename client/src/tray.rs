//! Static scenery: the tray boxes, a backdrop and the lights.

use bevy::prelude::*;
use engine::tray_pieces;

use crate::convert;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ClearColor(Color::srgb(0.12, 0.13, 0.16)));
    app.add_systems(Startup, setup);
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let felt = materials.add(StandardMaterial {
        base_color: Color::linear_rgb(0.05, 0.22, 0.12),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..default()
    });

    // Pieces share a material; meshes differ by size.
    for piece in tray_pieces() {
        let size = convert::vec3(&piece.half_extents) * 2.0;
        commands.spawn((
            Name::new("Tray piece"),
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(felt.clone()),
            convert::transform(&piece.pose),
        ));
    }

    commands.spawn((
        Name::new("Table"),
        Transform::from_xyz(0.0, -0.5, 0.0),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(200.0, 200.0).build())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.18, 0.12, 0.08),
            perceptual_roughness: 0.9,
            ..default()
        })),
    ));

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 10_000.0,
            ..default()
        },
        Transform::from_xyz(-4.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            shadows_enabled: false,
            intensity: 2_000_000.0,
            range: 60.0,
            ..default()
        },
        Transform::from_xyz(6.0, 14.0, 6.0),
    ));
}
