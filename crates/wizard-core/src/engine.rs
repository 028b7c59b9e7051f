//! The wizard engine.
//!
//! Owns the single [`WizardState`] instance and applies events strictly
//! one at a time, so every mutation is an atomic replacement. Timer
//! effects become spawned one-shot tasks that sleep and feed a timer
//! event back through the engine's queue; they carry the generation (and
//! call id) they were scheduled under, and the machine drops them when a
//! reset happened in between.
//!
//! Every accepted mutation is mirrored into the snapshot store,
//! best-effort: a failed write is logged and the run continues.

use crate::{machine, timing, TransitionError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tracing::{debug, info, warn};
use wizard_config::WizardConfig;
use wizard_storage::SnapshotStore;
use wizard_types::{
	Effect, EventBus, SettlementStatus, WizardEvent, WizardNotification, WizardState, WizardStep,
};

/// Storage namespace for the wizard snapshot.
const SNAPSHOT_NAMESPACE: &str = "wizard";
/// Fixed id of the single snapshot blob.
const SNAPSHOT_ID: &str = "snapshot";

/// Event-loop driver around the pure state machine.
pub struct WizardEngine {
	config: WizardConfig,
	store: Arc<SnapshotStore>,
	bus: EventBus,
	event_tx: mpsc::UnboundedSender<WizardEvent>,
	event_rx: Mutex<mpsc::UnboundedReceiver<WizardEvent>>,
	state: RwLock<WizardState>,
	shutdown_tx: broadcast::Sender<()>,
}

impl WizardEngine {
	/// Creates an engine, restoring the persisted snapshot when one is
	/// present and readable, otherwise starting from the profile's
	/// default draft.
	pub async fn new(config: WizardConfig, store: Arc<SnapshotStore>) -> Self {
		let state = match store.load::<WizardState>(SNAPSHOT_NAMESPACE, SNAPSHOT_ID).await {
			Some(state) => {
				info!(
					step = %state.step,
					swaps = state.history.len(),
					"Restored wizard state from snapshot"
				);
				state
			}
			None => WizardState::with_draft(config.simulation.default_draft()),
		};

		let (event_tx, event_rx) = mpsc::unbounded_channel();
		let (shutdown_tx, _) = broadcast::channel(4);

		Self {
			config,
			store,
			bus: EventBus::new(64),
			event_tx,
			event_rx: Mutex::new(event_rx),
			state: RwLock::new(state),
			shutdown_tx,
		}
	}

	/// A clone of the current state, for rendering.
	pub async fn state(&self) -> WizardState {
		self.state.read().await.clone()
	}

	/// The active simulation profile.
	pub fn profile(&self) -> &wizard_config::SimulationProfile {
		&self.config.simulation
	}

	/// Subscribes to the notification bus.
	pub fn subscribe(&self) -> broadcast::Receiver<WizardNotification> {
		self.bus.subscribe()
	}

	/// Sender half of the timer/event queue.
	pub fn sender(&self) -> mpsc::UnboundedSender<WizardEvent> {
		self.event_tx.clone()
	}

	/// Signals the run loop to stop.
	pub fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());
	}

	/// Applies one event and executes its effects.
	///
	/// Serialized on the state lock: there is exactly one writer at a
	/// time, and each transition replaces the state atomically.
	pub async fn dispatch(&self, event: WizardEvent) -> Result<(), TransitionError> {
		let mut state = self.state.write().await;
		let transition = machine::apply(&state, event, &self.config.simulation)?;

		let clears_snapshot = transition
			.effects
			.iter()
			.any(|e| matches!(e, Effect::ClearSnapshot));

		*state = transition.state;

		if clears_snapshot {
			if let Err(e) = self.store.clear(SNAPSHOT_NAMESPACE, SNAPSHOT_ID).await {
				warn!("Failed to discard snapshot: {}", e);
			}
		} else if let Err(e) = self
			.store
			.save(SNAPSHOT_NAMESPACE, SNAPSHOT_ID, &*state)
			.await
		{
			warn!("Failed to persist snapshot: {}", e);
		}

		for notification in transition.notifications {
			self.bus.publish(notification).ok();
		}

		for effect in transition.effects {
			self.execute(&state, effect);
		}

		Ok(())
	}

	/// Turns a scheduling effect into a spawned one-shot timer task.
	fn execute(&self, state: &WizardState, effect: Effect) {
		let profile = &self.config.simulation;
		let mut rng = rand::thread_rng();
		let tx = self.event_tx.clone();

		match effect {
			Effect::ScheduleSignDelay { generation } => {
				let delay = timing::draw_sign(profile, &mut rng);
				debug!(?delay, "Scheduling signature delay");
				tokio::spawn(async move {
					tokio::time::sleep(delay).await;
					tx.send(WizardEvent::SignCompleted { generation }).ok();
				});
			}
			Effect::ScheduleAuctionDelay { generation } => {
				let delay = timing::draw_auction(profile, &state.draft.expiry, &mut rng);
				debug!(?delay, expiry = %state.draft.expiry, "Scheduling auction delay");
				tokio::spawn(async move {
					tokio::time::sleep(delay).await;
					tx.send(WizardEvent::AuctionCompleted { generation }).ok();
				});
			}
			Effect::ScheduleSettlementDelay {
				generation,
				call_id,
			} => {
				let delay = timing::draw_settlement(profile, &state.draft.expiry, &mut rng);
				let outcome = timing::draw_outcome(&mut rng);
				debug!(?delay, ?outcome, %call_id, "Scheduling settlement delay");
				tokio::spawn(async move {
					tokio::time::sleep(delay).await;
					tx.send(WizardEvent::ResolveSettlement {
						generation,
						call_id,
						outcome,
						completed_at: Utc::now(),
					})
					.ok();
				});
			}
			// Handled inline by dispatch.
			Effect::ClearSnapshot => {}
		}
	}

	/// Re-arms the delay a restored snapshot was waiting on, so a run
	/// interrupted mid-flight picks up where it left off.
	async fn resume(&self) {
		let state = self.state.read().await;
		let generation = state.generation;

		if state.signing && !state.signed {
			info!("Resuming in-flight signature delay");
			self.execute(&state, Effect::ScheduleSignDelay { generation });
		} else if state.step == WizardStep::SolversCompete {
			info!("Resuming in-flight auction delay");
			self.execute(&state, Effect::ScheduleAuctionDelay { generation });
		} else if state.step == WizardStep::Settlement
			&& state.settlement_status == SettlementStatus::Pending
		{
			if let Some(call) = state.pending_call() {
				info!(call_id = %call.id, "Resuming in-flight settlement delay");
				self.execute(
					&state,
					Effect::ScheduleSettlementDelay {
						generation,
						call_id: call.id,
					},
				);
			}
		}
	}

	/// Runs the event loop until shutdown. Timer events flow through
	/// here; user actions may also be injected via [`Self::sender`].
	pub async fn run(&self) {
		self.resume().await;

		let mut event_rx = self.event_rx.lock().await;
		let mut shutdown_rx = self.shutdown_tx.subscribe();

		loop {
			tokio::select! {
				Some(event) = event_rx.recv() => {
					if let Err(e) = self.dispatch(event).await {
						// Timer events never fail; only injected user
						// actions can end up here.
						debug!("Rejected event: {}", e);
					}
				}
				_ = shutdown_rx.recv() => {
					info!("Wizard engine received shutdown signal");
					break;
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use tokio::time::timeout;
	use uuid::Uuid;
	use wizard_config::DelayRange;
	use wizard_storage::MemoryStore;
	use wizard_types::{IntentField, SettlementOutcome};

	fn fast_config() -> WizardConfig {
		let mut config = WizardConfig::default();
		let quick = DelayRange::new(1, 5);
		config.simulation.sign = quick;
		for tier in &mut config.simulation.tiers {
			tier.auction = quick;
			tier.settlement = quick;
		}
		config
	}

	fn memory_store() -> Arc<SnapshotStore> {
		Arc::new(SnapshotStore::new(Box::new(MemoryStore::new())))
	}

	#[tokio::test]
	async fn dispatch_persists_every_mutation() {
		let store = memory_store();
		let engine = WizardEngine::new(fast_config(), store.clone()).await;

		engine.dispatch(WizardEvent::Continue).await.unwrap();

		let saved: WizardState = store.load("wizard", "snapshot").await.unwrap();
		assert_eq!(saved.step, WizardStep::SignIntent);
	}

	#[tokio::test]
	async fn snapshot_survives_engine_restart() {
		let store = memory_store();
		{
			let engine = WizardEngine::new(fast_config(), store.clone()).await;
			engine
				.dispatch(WizardEvent::SetField {
					field: IntentField::AmountIn,
					value: "42".to_string(),
				})
				.await
				.unwrap();
			engine.dispatch(WizardEvent::Continue).await.unwrap();
		}

		let engine = WizardEngine::new(fast_config(), store).await;
		let state = engine.state().await;
		assert_eq!(state.step, WizardStep::SignIntent);
		assert_eq!(state.draft.amount_in, "42");
	}

	#[tokio::test]
	async fn reset_all_discards_the_snapshot() {
		let store = memory_store();
		let engine = WizardEngine::new(fast_config(), store.clone()).await;

		engine.dispatch(WizardEvent::Continue).await.unwrap();
		assert!(store.contains("wizard", "snapshot").await.unwrap());

		engine.dispatch(WizardEvent::ResetAll).await.unwrap();
		assert!(!store.contains("wizard", "snapshot").await.unwrap());
		assert_eq!(engine.state().await.step, WizardStep::SetGoal);
	}

	#[tokio::test]
	async fn stale_sign_timer_cannot_touch_the_new_run() {
		let engine = WizardEngine::new(fast_config(), memory_store()).await;

		engine.dispatch(WizardEvent::Continue).await.unwrap();
		engine.dispatch(WizardEvent::Sign).await.unwrap();
		let old_generation = engine.state().await.generation;

		engine.dispatch(WizardEvent::Reset).await.unwrap();
		engine
			.dispatch(WizardEvent::SignCompleted {
				generation: old_generation,
			})
			.await
			.unwrap();

		let state = engine.state().await;
		assert_eq!(state.step, WizardStep::SetGoal);
		assert!(!state.signed);
		assert!(!state.signing);
	}

	#[tokio::test]
	async fn forced_resolution_requires_matching_call_id() {
		let engine = WizardEngine::new(fast_config(), memory_store()).await;

		engine.dispatch(WizardEvent::Continue).await.unwrap();
		engine.dispatch(WizardEvent::Sign).await.unwrap();
		let generation = engine.state().await.generation;
		engine
			.dispatch(WizardEvent::SignCompleted { generation })
			.await
			.unwrap();
		engine.dispatch(WizardEvent::Continue).await.unwrap();
		engine
			.dispatch(WizardEvent::AuctionCompleted { generation })
			.await
			.unwrap();

		engine
			.dispatch(WizardEvent::ResolveSettlement {
				generation,
				call_id: Uuid::new_v4(),
				outcome: SettlementOutcome::Success,
				completed_at: Utc::now(),
			})
			.await
			.unwrap();
		assert!(engine.state().await.history.is_empty());

		let call_id = engine.state().await.pending_call().unwrap().id;
		engine
			.dispatch(WizardEvent::ResolveSettlement {
				generation,
				call_id,
				outcome: SettlementOutcome::Success,
				completed_at: Utc::now(),
			})
			.await
			.unwrap();
		assert_eq!(engine.state().await.history.len(), 1);
	}

	#[tokio::test]
	async fn full_run_drives_itself_through_the_timers() {
		let engine = Arc::new(WizardEngine::new(fast_config(), memory_store()).await);
		let mut notifications = engine.subscribe();

		let runner = engine.clone();
		let handle = tokio::spawn(async move { runner.run().await });

		engine.dispatch(WizardEvent::Continue).await.unwrap();
		engine.dispatch(WizardEvent::Sign).await.unwrap();

		// The sign, auction and settlement delays now run on their own;
		// wait for the terminal notification.
		let mut signed = false;
		let terminal = loop {
			let notification = timeout(Duration::from_secs(5), notifications.recv())
				.await
				.expect("wizard should settle within the test window")
				.expect("bus stays open");

			match notification {
				WizardNotification::IntentSigned => {
					signed = true;
					engine.dispatch(WizardEvent::Continue).await.unwrap();
				}
				WizardNotification::SwapCompleted { .. } => break SettlementStatus::Success,
				WizardNotification::SettlementTimedOut => break SettlementStatus::Timeout,
				_ => {}
			}
		};

		assert!(signed);
		let state = engine.state().await;
		assert_eq!(state.step, WizardStep::Settlement);
		assert_eq!(state.settlement_status, terminal);
		match terminal {
			SettlementStatus::Success => assert_eq!(state.history.len(), 1),
			_ => assert!(state.history.is_empty()),
		}

		engine.shutdown();
		handle.await.unwrap();
	}
}
