use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use log::debug;

use crate::roll::{Roll, has_roll};

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RollAction {
    Roll,
    Reset,
    Retry,
    AddDie,
    RemoveDie,
    SelectPrev,
    SelectNext,
    FaceUp,
    FaceDown,
}

/// Slot the face and remove actions apply to.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct SelectedSlot(pub usize);

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<RollAction>::default());

    app.register_type::<RollAction>();

    let mut input_map = InputMap::<RollAction>::default();
    input_map
        .insert(RollAction::Roll, KeyCode::Space)
        .insert(RollAction::Reset, KeyCode::KeyR)
        .insert(RollAction::Retry, KeyCode::KeyT)
        .insert(RollAction::AddDie, KeyCode::Equal)
        .insert(RollAction::AddDie, KeyCode::NumpadAdd)
        .insert(RollAction::RemoveDie, KeyCode::Minus)
        .insert(RollAction::RemoveDie, KeyCode::NumpadSubtract)
        .insert(RollAction::SelectPrev, KeyCode::ArrowLeft)
        .insert(RollAction::SelectNext, KeyCode::ArrowRight)
        .insert(RollAction::FaceUp, KeyCode::ArrowUp)
        .insert(RollAction::FaceDown, KeyCode::ArrowDown);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<RollAction>::default());
    app.init_resource::<SelectedSlot>();

    app.add_systems(Update, handle_actions.run_if(has_roll));
}

fn handle_actions(
    actions: Res<ActionState<RollAction>>,
    mut roll: NonSendMut<Roll>,
    mut selected: ResMut<SelectedSlot>,
) {
    let slot = selected.0;
    let current = roll.roster().get(slot).map_or(1, |face| face.value());

    let result = if actions.just_pressed(&RollAction::Roll) {
        roll.start()
    } else if actions.just_pressed(&RollAction::Reset) {
        roll.reset();
        Ok(())
    } else if actions.just_pressed(&RollAction::Retry) {
        roll.retry_presolve()
    } else if actions.just_pressed(&RollAction::AddDie) {
        roll.add_slot().map(|_| selected.0 = roll.die_count() - 1)
    } else if actions.just_pressed(&RollAction::RemoveDie) {
        roll.remove_slot(slot)
    } else if actions.just_pressed(&RollAction::FaceUp) {
        roll.set_value(slot, current % 6 + 1)
    } else if actions.just_pressed(&RollAction::FaceDown) {
        roll.set_value(slot, (current + 4) % 6 + 1)
    } else if actions.just_pressed(&RollAction::SelectPrev) {
        selected.0 = slot.saturating_sub(1);
        Ok(())
    } else if actions.just_pressed(&RollAction::SelectNext) {
        selected.0 = slot + 1;
        Ok(())
    } else {
        return;
    };

    if let Err(err) = result {
        debug!("input ignored: {err}");
    }
    selected.0 = selected.0.min(roll.die_count().saturating_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_cycling_wraps() {
        let up = |v: u8| v % 6 + 1;
        let down = |v: u8| (v + 4) % 6 + 1;
        assert_eq!((1..=6).map(up).collect::<Vec<_>>(), vec![2, 3, 4, 5, 6, 1]);
        assert_eq!((1..=6).map(down).collect::<Vec<_>>(), vec![6, 1, 2, 3, 4, 5]);
    }
}
