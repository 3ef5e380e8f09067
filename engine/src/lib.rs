pub mod constants;
pub mod error;
pub mod face;
pub mod framing;
pub mod motion;
pub mod presolve;
pub mod rapier;
pub mod rapier_world;
pub mod rest;
pub mod roster;
pub mod session;
pub mod spin;
pub mod throw_plan;
pub mod tray;
pub mod types;

pub use constants::{DIE_SIZE, FIXED_DT, MAX_DICE, MIN_DICE};
pub use error::{PresolveError, RollError};
pub use face::{FACES, Face, alignment_delta, top_face};
pub use framing::{CAMERA_POSITION, Framing, Viewport, fov_range};
pub use motion::{Stepped, step_orientation_toward, step_position_toward};
pub use presolve::{
    Executor, FaceResult, InlineExecutor, PresolveStatus, Presolver, ThreadExecutor, simulate,
};
pub use rapier::{BodyDef, BodyShapeDef, Material, collider_from_def};
pub use rapier_world::{BodyVelocity, DiceWorld};
pub use rest::RestDetector;
pub use roster::TargetRoster;
pub use session::{Phase, RollSession, SessionOptions, SessionSnapshot, staging_rotation};
pub use spin::LoadingSpin;
pub use throw_plan::{ThrowPlan, slot_position};
pub use tray::{Tray, TrayPiece, tray_pieces};
pub use types::{Pose, Quat, Vec3};
