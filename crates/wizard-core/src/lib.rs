//! Core state machine and engine for the swap wizard.
//!
//! The machine itself is a pure function over events ([`machine::apply`]);
//! the [`engine::WizardEngine`] wraps it with the single-writer event
//! loop, randomized timers, snapshot persistence and the notification
//! bus.

pub mod engine;
pub mod machine;
pub mod quotes;
pub mod timing;

pub use engine::WizardEngine;
pub use machine::{apply, Transition, TransitionError};
pub use timing::SETTLEMENT_SUCCESS_RATE;
