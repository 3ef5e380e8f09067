//! One mesh per die slot, posed from the session every frame.

use bevy::prelude::*;
use engine::{DIE_SIZE, FACES, Face};

use crate::{
    convert,
    roll::{Roll, has_roll},
};

/// Marks the entity drawing slot `.0`.
#[derive(Component, Clone, Copy, Debug)]
pub struct Die(pub usize);

#[derive(Resource)]
struct DieAssets {
    body: Handle<Mesh>,
    body_material: Handle<StandardMaterial>,
    pip: Handle<Mesh>,
    pip_material: Handle<StandardMaterial>,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, load_assets);
    app.add_systems(PostUpdate, sync_dice.run_if(has_roll));
}

fn load_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(DieAssets {
        body: meshes.add(Cuboid::from_length(DIE_SIZE)),
        body_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.95, 0.94, 0.9),
            perceptual_roughness: 0.4,
            ..default()
        }),
        pip: meshes.add(Sphere::new(DIE_SIZE * 0.08)),
        pip_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.08, 0.08, 0.1),
            perceptual_roughness: 0.6,
            ..default()
        }),
    });
}

/// Spawn, despawn and pose die entities so they mirror the session's slots.
fn sync_dice(
    mut commands: Commands,
    roll: NonSend<Roll>,
    assets: Res<DieAssets>,
    mut dice: Query<(Entity, &Die, &mut Transform)>,
) {
    let mut drawn = vec![false; roll.die_count()];

    for (entity, die, mut transform) in &mut dice {
        match roll.rendered_pose(die.0) {
            Some(pose) if !drawn[die.0] => {
                *transform = convert::transform(&pose);
                drawn[die.0] = true;
            }
            _ => commands.entity(entity).despawn(),
        }
    }

    for (index, _) in drawn.iter().enumerate().filter(|(_, seen)| !**seen) {
        let Some(pose) = roll.rendered_pose(index) else {
            continue;
        };
        commands
            .spawn((
                Name::new(format!("Die {index}")),
                Die(index),
                Mesh3d(assets.body.clone()),
                MeshMaterial3d(assets.body_material.clone()),
                convert::transform(&pose),
            ))
            .with_children(|parent| {
                for face in FACES {
                    for offset in pip_offsets(face) {
                        parent.spawn((
                            Mesh3d(assets.pip.clone()),
                            MeshMaterial3d(assets.pip_material.clone()),
                            Transform::from_translation(offset),
                        ));
                    }
                }
            });
    }
}

/// Pip centres on `face`, in the die's local frame, slightly sunk into the surface.
fn pip_offsets(face: Face) -> Vec<Vec3> {
    let normal = convert::vec3(&face.local_normal());
    let u = if normal.x.abs() > 0.5 { Vec3::Y } else { Vec3::X };
    let v = normal.cross(u);
    let spacing = DIE_SIZE * 0.25;
    let centre = normal * DIE_SIZE * 0.47;

    let grid: &[(f32, f32)] = match face {
        Face::One => &[(0.0, 0.0)],
        Face::Two => &[(-1.0, -1.0), (1.0, 1.0)],
        Face::Three => &[(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)],
        Face::Four => &[(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)],
        Face::Five => &[(-1.0, -1.0), (-1.0, 1.0), (0.0, 0.0), (1.0, -1.0), (1.0, 1.0)],
        Face::Six => &[
            (-1.0, -1.0),
            (-1.0, 0.0),
            (-1.0, 1.0),
            (1.0, -1.0),
            (1.0, 0.0),
            (1.0, 1.0),
        ],
    };

    grid.iter()
        .map(|&(a, b)| centre + (u * a + v * b) * spacing)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pip_count_matches_face_value() {
        for face in FACES {
            assert_eq!(pip_offsets(face).len(), face.value() as usize);
        }
    }

    #[test]
    fn pips_sit_on_their_face() {
        for face in FACES {
            let normal = convert::vec3(&face.local_normal());
            for pip in pip_offsets(face) {
                assert!((pip.dot(normal) - DIE_SIZE * 0.47).abs() < 1.0e-5);
                assert!(pip.abs().max_element() <= DIE_SIZE * 0.5);
            }
        }
    }
}
