//! Events, effects and notifications.
//!
//! `WizardEvent` is the input alphabet of the state machine: user actions
//! plus the timer completions the engine schedules. `Effect` is what a
//! transition asks the runtime to do next. `WizardNotification` is the
//! outbound broadcast stream observers (the CLI, tests) subscribe to.

use crate::{Achievement, CompletedSwap, IntentField, SettlementStatus, SolverQuote, WizardStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Outcome drawn for a settlement resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
	Success,
	Timeout,
}

impl From<SettlementOutcome> for SettlementStatus {
	fn from(outcome: SettlementOutcome) -> Self {
		match outcome {
			SettlementOutcome::Success => SettlementStatus::Success,
			SettlementOutcome::Timeout => SettlementStatus::Timeout,
		}
	}
}

/// Input events to the wizard state machine.
///
/// Timer variants carry the generation they were scheduled under; the
/// transition function ignores them when the generation no longer matches
/// (a reset happened in between).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardEvent {
	/// Edit one field of the intent draft (SetGoal only).
	SetField { field: IntentField, value: String },
	/// Advance: SetGoal -> SignIntent, or signed SignIntent -> auction.
	Continue,
	/// Start the simulated signature.
	Sign,
	/// Signature delay elapsed.
	SignCompleted { generation: u64 },
	/// Auction delay elapsed; move on to settlement.
	AuctionCompleted { generation: u64 },
	/// Settlement delay elapsed with a drawn outcome.
	ResolveSettlement {
		generation: u64,
		call_id: Uuid,
		outcome: SettlementOutcome,
		completed_at: DateTime<Utc>,
	},
	/// Back to SetGoal, keeping history and achievements.
	Reset,
	/// Back to factory defaults, discarding the persisted snapshot.
	ResetAll,
}

/// Side effects requested by a transition.
///
/// Transitions stay pure; the engine owns randomness, clocks and storage
/// and turns these into scheduled timer events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
	ScheduleSignDelay { generation: u64 },
	ScheduleAuctionDelay { generation: u64 },
	ScheduleSettlementDelay { generation: u64, call_id: Uuid },
	/// Discard the persisted snapshot (full reset).
	ClearSnapshot,
}

/// Broadcast notifications for observers.
#[derive(Debug, Clone)]
pub enum WizardNotification {
	StepEntered { step: WizardStep },
	DraftUpdated { field: IntentField, value: String },
	SigningStarted,
	IntentSigned,
	QuotesReceived { count: usize, best: SolverQuote },
	SettlementStarted { call_id: Uuid },
	SwapCompleted { swap: CompletedSwap },
	SettlementTimedOut,
	AchievementUnlocked { achievement: Achievement },
	WizardReset { full: bool },
}

/// Broadcast bus carrying [`WizardNotification`]s to any number of
/// subscribers. Cloning creates another handle onto the same channel.
pub struct EventBus {
	sender: broadcast::Sender<WizardNotification>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` notifications per
	/// subscriber before old ones are dropped.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<WizardNotification> {
		self.sender.subscribe()
	}

	/// Publishes to all current subscribers. A send error only means
	/// nobody is listening, which is not a failure for the wizard.
	pub fn publish(
		&self,
		notification: WizardNotification,
	) -> Result<(), broadcast::error::SendError<WizardNotification>> {
		self.sender.send(notification)?;
		Ok(())
	}
}

impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}
