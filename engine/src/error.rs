use thiserror::Error;

use crate::{
    constants::{MAX_DICE, MIN_DICE},
    session::Phase,
};

/// Errors surfaced synchronously to the caller of a [`RollSession`](crate::RollSession)
/// operation. Every rejected call leaves the session untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RollError {
    #[error("face value {0} is outside 1..=6")]
    InvalidFace(u8),

    #[error("a roster holds {MIN_DICE}..={MAX_DICE} dice, {0} requested")]
    RosterSize(usize),

    #[error("slot {index} does not exist in a roster of {len}")]
    NoSuchSlot { index: usize, len: usize },

    #[error("the roster can only be edited while configuring")]
    Locked,

    #[error("a roll can only start while configuring, not during {0:?}")]
    NotConfiguring(Phase),

    #[error("render surface {width}x{height} cannot be used")]
    Surface { width: f32, height: f32 },

    #[error("roll unavailable: {0}")]
    Unavailable(#[from] PresolveError),
}

/// Why a background pre-solve produced no result.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PresolveError {
    #[error("the pre-solve task could not be started")]
    Spawn,

    #[error("the pre-solve task ended without a result")]
    Terminated,
}
