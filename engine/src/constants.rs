use std::f32::consts::PI;

/// Edge length of a die (meters).
pub const DIE_SIZE: f32 = 0.7;

/// Horizontal distance between two neighbouring die slots in the staging row.
pub const DIE_SPACING: f32 = DIE_SIZE * 2.0;

/// Height at which dice are staged and thrown from.
pub const DIE_STAGING_Y: f32 = DIE_SIZE * 4.0;

/// Mass of a single die (kg).
pub const DIE_MASS: f32 = 1.0;

pub const DIE_LINEAR_DAMPING: f32 = 0.01;
pub const DIE_ANGULAR_DAMPING: f32 = 0.1;

/// Contact friction shared by dice and tray.
pub const CONTACT_FRICTION: f32 = 0.3;

/// Contact restitution shared by dice and tray.
pub const CONTACT_RESTITUTION: f32 = 0.3;

/// Fixed physics timestep in seconds. Both the visible loop and the pre-solver use it,
/// which keeps the two simulations step-for-step identical.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Gravity along Y while a throw is in flight (m/s^2).
pub const FALLING_GRAVITY_Y: f32 = -9.82;

/// Smallest and largest number of dice in a roster.
pub const MIN_DICE: usize = 1;
pub const MAX_DICE: usize = 6;

/// Canonical orientation dice rest in while the roster is being configured.
///
/// Stored as `[x, y, z, w]`. Shows three faces to the default camera.
pub const STAGING_ROTATION_XYZW: [f32; 4] = [
    0.353_553_4,
    0.353_553_4,
    0.146_446_6,
    0.853_553_4,
];

/// Max translation per frame while dice glide to their staging slot (meters).
pub const STAGING_MOVE_STEP: f32 = 0.05;

/// Distance under which a gliding die snaps onto its slot (meters).
pub const STAGING_MOVE_SNAP: f32 = 0.01;

/// Max rotation per frame while dice turn to their staging orientation (radians).
pub const STAGING_TURN_STEP: f32 = 0.08;

/// Angle under which a turning die snaps onto its staging orientation (radians).
pub const STAGING_TURN_SNAP: f32 = 0.001;

/// Max rotation per frame while the alignment delta eases in under the spin (radians).
pub const ALIGNMENT_TURN_STEP: f32 = 0.08;

/// Angle under which the eased alignment snaps onto its target (radians).
pub const ALIGNMENT_TURN_SNAP: f32 = 0.001;

/// Spin applied to every die per frame during the disguise phase (radians).
pub const LOADING_SPIN_STEP: f32 = PI / 20.0;

/// Angular distance from identity under which the disguise spin counts as a full turn.
///
/// Must stay below `LOADING_SPIN_STEP` so the frame right before a full turn (one step
/// short of identity) is never mistaken for the turn itself.
pub const LOADING_TURN_EPS: f32 = LOADING_SPIN_STEP * 0.5;

/// Mean per-die speed (linear + angular) under which a frame counts toward rest.
pub const REST_SPEED_EPS: f32 = 0.01;

/// Consecutive qualifying frames needed before rest is declared.
pub const REST_CONFIRMATIONS: u32 = 50;

/// Simulated steps after which every frame qualifies toward rest, settled or not.
pub const REST_STEP_CAP: u32 = 500;

/// Render surfaces are never sized wider than this (pixels).
pub const MAX_DISPLAY_WIDTH: f32 = 2048.0;

/// FOV change per frame while framing narrows or relaxes (degrees).
pub const FOV_STEP_DEG: f32 = 0.025;

/// How much of the way the camera look target moves toward the dice per frame.
pub const LOOK_TARGET_SMOOTHING: f32 = 0.1;

/// Outer dimensions of the tray (meters).
pub const TRAY_SIZE: [f32; 3] = [DIE_SIZE * 22.0, DIE_SIZE * 4.5, DIE_SIZE * 12.0];

/// Thickness of the tray floor and walls (meters).
pub const TRAY_WALL: f32 = DIE_SIZE * 0.5;

/// Width of the 45 degree corner pieces (meters).
pub const TRAY_CHAMFER: f32 = DIE_SIZE * 2.0;
