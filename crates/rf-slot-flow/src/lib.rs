//! # rf-slot-flow — Game lifecycle and win presentation
//!
//! Two cooperating state machines sit on top of `rf-slot-core`:
//!
//! - [`GameMachine`] owns balance, bet and the spin lifecycle
//!   (`idle → spinning → evaluating → celebrating → idle`).
//! - [`PaylineAnimator`] sequences the reveal of one or many wins and can be
//!   skipped from another task.
//!
//! [`SlotSession`] wires both to a symbol generator and a win evaluator and
//! emits [`SlotStage`] events to an injected [`StageSink`].
//!
//! ## Round flow
//!
//! ```text
//! SPIN ──► generate grid ──► evaluate ──► SPIN_COMPLETE
//!                                              │
//!                      ┌───── no wins ─────────┤
//!                      v                       v
//!                    idle ◄── WIN_CELEBRATION_COMPLETE ◄── animate wins
//! ```
//!
//! Everything here is cooperative: waits are `tokio` timers that resolve
//! early on skip, and no lock is held across an `.await`.

pub mod animation;
pub mod delay;
pub mod game;
pub mod session;
pub mod stage;

pub use animation::*;
pub use delay::*;
pub use game::*;
pub use session::*;
pub use stage::*;

use rf_slot_core::SlotError;
use thiserror::Error;

/// Errors raised while setting up the flow layer
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Slot configuration error: {0}")]
    Slot(#[from] SlotError),

    #[error("Invalid animation speed: {0} (must be finite and > 0)")]
    InvalidSpeed(f64),
}

pub type FlowResult<T> = Result<T, FlowError>;
