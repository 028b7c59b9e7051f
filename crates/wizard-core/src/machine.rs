//! The wizard state machine.
//!
//! [`apply`] is a pure function `(state, event) -> Transition`: it never
//! touches clocks, RNGs or storage. Delays and drawn outcomes arrive as
//! events; anything the runtime must do next (schedule a timer, discard
//! the snapshot) comes back as an [`Effect`].
//!
//! Timer events are generation-guarded: a reset bumps the state's
//! generation, and any timer scheduled under an older generation resolves
//! to a no-op instead of corrupting the new run. Settlement resolutions
//! additionally match on the call id they were scheduled for.

use crate::quotes;
use thiserror::Error;
use uuid::Uuid;
use wizard_config::SimulationProfile;
use wizard_types::{
	Achievement, CompletedSwap, Effect, IntentField, SettlementStatus, SimulatedCall, WizardEvent,
	WizardNotification, WizardState, WizardStep, HISTORY_CAP,
};

/// Rejected user actions. Timer events never produce these; when stale or
/// misdirected they resolve to an unchanged state instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
	#[error("{field} can only be edited in the Set Goal step")]
	EditLocked { field: IntentField },

	#[error("'{value}' is not a valid choice for {field}")]
	UnknownOption { field: IntentField, value: String },

	#[error("{field} cannot equal '{value}'")]
	ExcludedOption { field: IntentField, value: String },

	#[error("signature already in progress")]
	AlreadySigning,

	#[error("intent already signed")]
	AlreadySigned,

	#[error("cannot {action} in step {step}")]
	InvalidAction {
		action: &'static str,
		step: WizardStep,
	},
}

/// Result of applying one event: the replacement state plus the effects
/// and notifications it produced.
#[derive(Debug)]
pub struct Transition {
	pub state: WizardState,
	pub effects: Vec<Effect>,
	pub notifications: Vec<WizardNotification>,
}

impl Transition {
	fn unchanged(state: &WizardState) -> Self {
		Self {
			state: state.clone(),
			effects: Vec::new(),
			notifications: Vec::new(),
		}
	}
}

/// Applies one event to the wizard state.
pub fn apply(
	state: &WizardState,
	event: WizardEvent,
	profile: &SimulationProfile,
) -> Result<Transition, TransitionError> {
	match event {
		WizardEvent::SetField { field, value } => set_field(state, profile, field, value),
		WizardEvent::Continue => advance(state),
		WizardEvent::Sign => sign(state),
		WizardEvent::SignCompleted { generation } => sign_completed(state, generation),
		WizardEvent::AuctionCompleted { generation } => auction_completed(state, generation),
		WizardEvent::ResolveSettlement {
			generation,
			call_id,
			outcome,
			completed_at,
		} => resolve_settlement(state, generation, call_id, outcome.into(), completed_at),
		WizardEvent::Reset => reset(state),
		WizardEvent::ResetAll => reset_all(state, profile),
	}
}

fn option_set<'a>(profile: &'a SimulationProfile, field: IntentField) -> Option<&'a [String]> {
	match field {
		IntentField::TokenIn | IntentField::TokenOut => Some(&profile.tokens),
		IntentField::ChainIn | IntentField::ChainOut => Some(&profile.chains),
		_ => None,
	}
}

/// The field whose current value is excluded from `field`'s choices.
fn counterpart(field: IntentField) -> Option<IntentField> {
	match field {
		IntentField::TokenIn => Some(IntentField::TokenOut),
		IntentField::TokenOut => Some(IntentField::TokenIn),
		IntentField::ChainIn => Some(IntentField::ChainOut),
		IntentField::ChainOut => Some(IntentField::ChainIn),
		_ => None,
	}
}

fn set_field(
	state: &WizardState,
	profile: &SimulationProfile,
	field: IntentField,
	value: String,
) -> Result<Transition, TransitionError> {
	if state.step != WizardStep::SetGoal {
		return Err(TransitionError::EditLocked { field });
	}

	if let Some(options) = option_set(profile, field) {
		if !options.iter().any(|o| o == &value) {
			return Err(TransitionError::UnknownOption { field, value });
		}
	}

	if field == IntentField::Expiry && profile.tier(&value).is_none() {
		return Err(TransitionError::UnknownOption { field, value });
	}

	if let Some(other) = counterpart(field) {
		if state.draft.get(other) == value {
			return Err(TransitionError::ExcludedOption { field, value });
		}
	}

	let mut next = state.clone();
	next.draft.set(field, value.clone());

	Ok(Transition {
		state: next,
		effects: Vec::new(),
		notifications: vec![WizardNotification::DraftUpdated { field, value }],
	})
}

fn advance(state: &WizardState) -> Result<Transition, TransitionError> {
	match state.step {
		WizardStep::SetGoal => {
			let mut next = state.clone();
			next.step = WizardStep::SignIntent;
			Ok(Transition {
				state: next,
				effects: Vec::new(),
				notifications: vec![WizardNotification::StepEntered {
					step: WizardStep::SignIntent,
				}],
			})
		}
		WizardStep::SignIntent if state.signing => Err(TransitionError::InvalidAction {
			action: "continue while signing",
			step: state.step,
		}),
		WizardStep::SignIntent if !state.signed => Err(TransitionError::InvalidAction {
			action: "continue before signing",
			step: state.step,
		}),
		WizardStep::SignIntent => {
			// Entering the auction generates the book synchronously; the
			// tier-scaled delay only gates the move to settlement.
			let (book, best) = quotes::run_auction();

			let mut next = state.clone();
			next.step = WizardStep::SolversCompete;
			next.solvers = book;
			next.best_solver = Some(best.clone());

			Ok(Transition {
				effects: vec![Effect::ScheduleAuctionDelay {
					generation: next.generation,
				}],
				notifications: vec![
					WizardNotification::StepEntered {
						step: WizardStep::SolversCompete,
					},
					WizardNotification::QuotesReceived {
						count: next.solvers.len(),
						best,
					},
				],
				state: next,
			})
		}
		step => Err(TransitionError::InvalidAction {
			action: "continue",
			step,
		}),
	}
}

fn sign(state: &WizardState) -> Result<Transition, TransitionError> {
	if state.step != WizardStep::SignIntent {
		return Err(TransitionError::InvalidAction {
			action: "sign",
			step: state.step,
		});
	}
	if state.signing {
		return Err(TransitionError::AlreadySigning);
	}
	if state.signed {
		return Err(TransitionError::AlreadySigned);
	}

	let mut next = state.clone();
	next.signing = true;

	Ok(Transition {
		effects: vec![Effect::ScheduleSignDelay {
			generation: next.generation,
		}],
		notifications: vec![WizardNotification::SigningStarted],
		state: next,
	})
}

fn sign_completed(state: &WizardState, generation: u64) -> Result<Transition, TransitionError> {
	let stale =
		generation != state.generation || state.step != WizardStep::SignIntent || !state.signing;
	if stale {
		return Ok(Transition::unchanged(state));
	}

	let mut next = state.clone();
	next.signing = false;
	next.signed = true;

	Ok(Transition {
		state: next,
		effects: Vec::new(),
		notifications: vec![WizardNotification::IntentSigned],
	})
}

fn auction_completed(state: &WizardState, generation: u64) -> Result<Transition, TransitionError> {
	let stale = generation != state.generation || state.step != WizardStep::SolversCompete;
	if stale {
		return Ok(Transition::unchanged(state));
	}

	let Some(best) = state.best_solver.clone() else {
		return Ok(Transition::unchanged(state));
	};

	let call = SimulatedCall {
		id: Uuid::new_v4(),
		from: state.draft.from_leg(),
		to: state.draft.to_leg(),
		solver: best.name,
		status: SettlementStatus::Pending,
	};
	let call_id = call.id;

	let mut next = state.clone();
	next.step = WizardStep::Settlement;
	next.settlement_status = SettlementStatus::Pending;
	next.calls.push(call);

	Ok(Transition {
		effects: vec![Effect::ScheduleSettlementDelay {
			generation: next.generation,
			call_id,
		}],
		notifications: vec![
			WizardNotification::StepEntered {
				step: WizardStep::Settlement,
			},
			WizardNotification::SettlementStarted { call_id },
		],
		state: next,
	})
}

fn resolve_settlement(
	state: &WizardState,
	generation: u64,
	call_id: Uuid,
	status: SettlementStatus,
	completed_at: chrono::DateTime<chrono::Utc>,
) -> Result<Transition, TransitionError> {
	let stale = generation != state.generation || state.step != WizardStep::Settlement;
	if stale {
		return Ok(Transition::unchanged(state));
	}

	let mut next = state.clone();
	let Some(call) = next
		.calls
		.iter_mut()
		.find(|c| c.id == call_id && c.status == SettlementStatus::Pending)
	else {
		return Ok(Transition::unchanged(state));
	};

	call.status = status;
	next.settlement_status = status;

	let mut notifications = Vec::new();

	if status == SettlementStatus::Success {
		let swap = CompletedSwap {
			id: Uuid::new_v4(),
			intent: next.draft.clone(),
			completed_at,
		};
		next.history.insert(0, swap.clone());
		next.history.truncate(HISTORY_CAP);
		notifications.push(WizardNotification::SwapCompleted { swap });

		notifications.extend(unlock_achievements(&mut next));
	} else {
		notifications.push(WizardNotification::SettlementTimedOut);
	}

	Ok(Transition {
		state: next,
		effects: Vec::new(),
		notifications,
	})
}

/// Evaluates unlock conditions in catalog order. Only called on a
/// successful settlement; each badge latches independently.
fn unlock_achievements(state: &mut WizardState) -> Vec<WizardNotification> {
	let cross_chain = state.draft.is_cross_chain();
	let swaps = state.history.len();

	let mut unlocked = Vec::new();
	let mut unlock = |state: &mut WizardState, index: usize, condition: bool| {
		if condition && !state.achievements[index].unlocked {
			state.achievements[index].unlocked = true;
			unlocked.push(WizardNotification::AchievementUnlocked {
				achievement: state.achievements[index].clone(),
			});
		}
	};

	unlock(state, Achievement::FIRST_SWAP, true);
	unlock(state, Achievement::CROSS_CHAIN, cross_chain);
	unlock(state, Achievement::MEV_PROTECTOR, swaps >= 5);

	unlocked
}

fn reset(state: &WizardState) -> Result<Transition, TransitionError> {
	let mut next = state.clone();
	next.step = WizardStep::SetGoal;
	next.signing = false;
	next.signed = false;
	next.solvers.clear();
	next.best_solver = None;
	next.settlement_status = SettlementStatus::Pending;
	next.calls.clear();
	next.generation += 1;

	Ok(Transition {
		state: next,
		effects: Vec::new(),
		notifications: vec![
			WizardNotification::WizardReset { full: false },
			WizardNotification::StepEntered {
				step: WizardStep::SetGoal,
			},
		],
	})
}

fn reset_all(
	state: &WizardState,
	profile: &SimulationProfile,
) -> Result<Transition, TransitionError> {
	let mut next = WizardState::with_draft(profile.default_draft());
	// The generation still advances so in-flight timers from the old
	// session can never land in the fresh one.
	next.generation = state.generation + 1;

	Ok(Transition {
		state: next,
		effects: vec![Effect::ClearSnapshot],
		notifications: vec![
			WizardNotification::WizardReset { full: true },
			WizardNotification::StepEntered {
				step: WizardStep::SetGoal,
			},
		],
	})
}
