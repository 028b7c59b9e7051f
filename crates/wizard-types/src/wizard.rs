//! Wizard state types.
//!
//! The whole wizard is one process-wide [`WizardState`] value. Transitions
//! replace it atomically; the engine mirrors every replacement into the
//! snapshot store. Nothing here performs I/O.

use crate::{IntentDraft, SolverQuote};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum number of completed swaps retained in the history.
pub const HISTORY_CAP: usize = 10;

/// The four wizard stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardStep {
	SetGoal,
	SignIntent,
	SolversCompete,
	Settlement,
}

impl WizardStep {
	/// One-based step number as shown in the flow sidebar.
	pub fn number(&self) -> u8 {
		match self {
			WizardStep::SetGoal => 1,
			WizardStep::SignIntent => 2,
			WizardStep::SolversCompete => 3,
			WizardStep::Settlement => 4,
		}
	}

	/// The next stage in the forward-only sequence.
	pub fn next(&self) -> Option<WizardStep> {
		match self {
			WizardStep::SetGoal => Some(WizardStep::SignIntent),
			WizardStep::SignIntent => Some(WizardStep::SolversCompete),
			WizardStep::SolversCompete => Some(WizardStep::Settlement),
			WizardStep::Settlement => None,
		}
	}

	/// Display title, matching the flow sidebar labels.
	pub fn title(&self) -> &'static str {
		match self {
			WizardStep::SetGoal => "Set Goal",
			WizardStep::SignIntent => "Sign Intent",
			WizardStep::SolversCompete => "Solvers Compete",
			WizardStep::Settlement => "On-chain Settlement",
		}
	}
}

impl fmt::Display for WizardStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}. {}", self.number(), self.title())
	}
}

/// Status of the settlement stage and of individual simulated calls.
///
/// `Success` and `Timeout` are absorbing until a reset; `Timeout` is a
/// modeled business outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementStatus {
	Pending,
	Success,
	Timeout,
}

impl fmt::Display for SettlementStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			SettlementStatus::Pending => "pending",
			SettlementStatus::Success => "success",
			SettlementStatus::Timeout => "timeout",
		};
		write!(f, "{}", s)
	}
}

/// A simulated settlement call record.
///
/// Append-only within a run. The id is matched against the resolution
/// event so a call scheduled before a reset can never resolve a later run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedCall {
	pub id: Uuid,
	/// Input leg, e.g. `100 USDC on Ethereum`.
	pub from: String,
	/// Output leg, e.g. `0.05 ETH on Arbitrum`.
	pub to: String,
	/// Name of the solver executing the call.
	pub solver: String,
	pub status: SettlementStatus,
}

/// A completed swap retained in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSwap {
	pub id: Uuid,
	pub intent: IntentDraft,
	pub completed_at: DateTime<Utc>,
}

/// An unlockable badge. Flags only ever go `false -> true` within a
/// session; a full reset restores the locked catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
	pub id: u8,
	pub name: String,
	pub description: String,
	pub unlocked: bool,
}

impl Achievement {
	/// Catalog index of the first-successful-settlement badge.
	pub const FIRST_SWAP: usize = 0;
	/// Catalog index of the cross-chain badge.
	pub const CROSS_CHAIN: usize = 1;
	/// Catalog index of the five-swaps badge.
	pub const MEV_PROTECTOR: usize = 2;

	/// The fixed locked catalog, in unlock-evaluation order.
	pub fn catalog() -> Vec<Achievement> {
		vec![
			Achievement {
				id: 1,
				name: "First Swap".to_string(),
				description: "Complete your first token swap".to_string(),
				unlocked: false,
			},
			Achievement {
				id: 2,
				name: "Cross-chain Explorer".to_string(),
				description: "Swap between different chains".to_string(),
				unlocked: false,
			},
			Achievement {
				id: 3,
				name: "MEV Protector".to_string(),
				description: "Complete 5 gasless swaps".to_string(),
				unlocked: false,
			},
		]
	}
}

/// The entire wizard state. Single instance, single writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
	pub step: WizardStep,
	pub draft: IntentDraft,
	/// True only while the simulated signature delay is running.
	pub signing: bool,
	/// Latched true once the signature delay completes.
	pub signed: bool,
	/// Quote book, sorted descending by numeric price once populated.
	pub solvers: Vec<SolverQuote>,
	/// Head of `solvers` when the book is populated.
	pub best_solver: Option<SolverQuote>,
	pub settlement_status: SettlementStatus,
	/// Simulated call records, append-only within a run.
	pub calls: Vec<SimulatedCall>,
	/// Completed swaps, newest first, capped at [`HISTORY_CAP`].
	pub history: Vec<CompletedSwap>,
	pub achievements: Vec<Achievement>,
	/// Bumped on every reset. Timer events scheduled under an older
	/// generation are ignored.
	pub generation: u64,
}

impl WizardState {
	/// Fresh state around the given draft, with locked achievements and
	/// empty history.
	pub fn with_draft(draft: IntentDraft) -> Self {
		Self {
			step: WizardStep::SetGoal,
			draft,
			signing: false,
			signed: false,
			solvers: Vec::new(),
			best_solver: None,
			settlement_status: SettlementStatus::Pending,
			calls: Vec::new(),
			history: Vec::new(),
			achievements: Achievement::catalog(),
			generation: 0,
		}
	}

	/// The in-flight settlement call, if any.
	pub fn pending_call(&self) -> Option<&SimulatedCall> {
		self.calls
			.iter()
			.rev()
			.find(|c| c.status == SettlementStatus::Pending)
	}

	/// Number of unlocked achievements.
	pub fn unlocked_count(&self) -> usize {
		self.achievements.iter().filter(|a| a.unlocked).count()
	}
}
