//! Text overlay: the target roster, the phase and the final read-out.

use std::fmt::Write;

use bevy::prelude::*;
use engine::{Phase, SessionSnapshot};

use crate::{input::SelectedSlot, roll::LatestSnapshot};

#[derive(Component)]
struct HudText;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_hud);
    app.add_systems(Update, refresh_hud);
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("HUD"),
        HudText,
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn refresh_hud(
    latest: Res<LatestSnapshot>,
    selected: Res<SelectedSlot>,
    mut text: Single<&mut Text, With<HudText>>,
) {
    let Some(snapshot) = latest.get() else {
        return;
    };
    let body = describe(&snapshot, selected.0);
    if text.0 != body {
        text.0 = body;
    }
}

fn describe(snapshot: &SessionSnapshot, selected: usize) -> String {
    let mut out = String::from("Target:");
    for (index, value) in snapshot.roster.iter().enumerate() {
        if index == selected && snapshot.phase == Phase::Config {
            let _ = write!(out, " [{value}]");
        } else {
            let _ = write!(out, " {value}");
        }
    }

    let status = match snapshot.phase {
        Phase::Config => "ready",
        Phase::Loading if snapshot.roll_unavailable => "roll unavailable (T retry, R reset)",
        Phase::Loading => "loading",
        Phase::Animation => "rolling",
        Phase::Final => "done",
    };
    let _ = write!(out, "\nStatus: {status}");

    if snapshot.is_final {
        let faces: Vec<String> = snapshot.faces.iter().map(u8::to_string).collect();
        let _ = write!(out, "\nRolled: {}", faces.join(" "));
    }

    out.push_str("\n\nSpace roll  R reset  +/- dice  arrows select/face");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: Phase) -> SessionSnapshot {
        SessionSnapshot {
            roster: vec![2, 5, 3],
            phase,
            is_loading: phase == Phase::Loading,
            is_animating: phase == Phase::Animation,
            is_final: phase == Phase::Final,
            faces: if phase == Phase::Final { vec![2, 5, 3] } else { Vec::new() },
            face_results: Vec::new(),
            presolve_ready: false,
            roll_unavailable: false,
        }
    }

    #[test]
    fn marks_selection_only_while_configuring() {
        assert!(describe(&snapshot(Phase::Config), 1).starts_with("Target: 2 [5] 3\n"));
        assert!(describe(&snapshot(Phase::Animation), 1).starts_with("Target: 2 5 3\n"));
    }

    #[test]
    fn final_shows_read_out() {
        let text = describe(&snapshot(Phase::Final), 0);
        assert!(text.contains("Status: done"));
        assert!(text.contains("Rolled: 2 5 3"));
    }

    #[test]
    fn unavailable_roll_is_called_out() {
        let mut snap = snapshot(Phase::Loading);
        snap.roll_unavailable = true;
        assert!(describe(&snap, 0).contains("roll unavailable"));
    }
}
