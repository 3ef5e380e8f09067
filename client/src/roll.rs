//! Owns the engine session and drives it at the physics rate.

use std::sync::{Arc, Mutex};

use bevy::{
    prelude::*,
    window::{PrimaryWindow, WindowResized},
};
use engine::{FIXED_DT, RollSession, SessionOptions, SessionSnapshot};
use log::{error, info, warn};

/// The roll session. It holds the pre-solve receiver, which is `Send` but not `Sync`,
/// so it lives in the world as a non-send resource.
#[derive(Deref, DerefMut)]
pub struct Roll(pub RollSession);

/// Latest snapshot published by the session's listener.
#[derive(Resource, Default, Clone)]
pub struct LatestSnapshot(Arc<Mutex<Option<SessionSnapshot>>>);

impl LatestSnapshot {
    pub fn get(&self) -> Option<SessionSnapshot> {
        self.0.lock().ok().and_then(|guard| guard.clone())
    }

    fn store(&self, snapshot: SessionSnapshot) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = Some(snapshot);
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Time::<Fixed>::from_seconds(FIXED_DT as f64));
    app.init_resource::<LatestSnapshot>();

    // Before `Startup` so every other plugin can read the session while spawning.
    app.add_systems(PreStartup, start_session);
    app.add_systems(FixedUpdate, tick.run_if(has_roll));
    app.add_systems(Update, sync_sizes.run_if(has_roll));
}

/// Run condition: the session came up.
pub fn has_roll(roll: Option<NonSend<Roll>>) -> bool {
    roll.is_some()
}

fn start_session(world: &mut World) {
    let size = world
        .query_filtered::<&Window, With<PrimaryWindow>>()
        .single(world)
        .map(|window| (window.width(), window.height()));
    let Ok((width, height)) = size else {
        error!("no primary window, the dice tray stays empty");
        return;
    };

    let mut session = match RollSession::new(SessionOptions::default(), width, height) {
        Ok(session) => session,
        Err(err) => {
            error!("could not start the roll session: {err}");
            return;
        }
    };

    let latest = world.resource::<LatestSnapshot>().clone();
    latest.store(session.snapshot());
    session.set_listener(move |snapshot| {
        if snapshot.roll_unavailable {
            warn!("roll unavailable, press T to retry or R to reset");
        }
        latest.store(snapshot.clone());
    });

    info!("dice tray ready at {width}x{height}");
    world.insert_non_send_resource(Roll(session));
}

fn tick(mut roll: NonSendMut<Roll>) {
    roll.tick();
}

fn sync_sizes(
    mut roll: NonSendMut<Roll>,
    mut resized: MessageReader<WindowResized>,
    primary: Single<Entity, With<PrimaryWindow>>,
) {
    for message in resized.read() {
        if message.window != *primary {
            continue;
        }
        if let Err(err) = roll.sync_sizes(message.width, message.height) {
            warn!("ignoring resize: {err}");
        }
    }
}
