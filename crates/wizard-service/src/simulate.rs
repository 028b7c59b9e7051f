//! Automated simulation mode.
//!
//! Drives the wizard through full swap runs without user input, letting
//! the engine's own timers and the 90/10 settlement draw decide each
//! outcome, then reports the tally.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;
use wizard_core::WizardEngine;
use wizard_types::{WizardEvent, WizardNotification};

/// Upper bound for one swap run; generous next to the largest delay tier.
const SWAP_DEADLINE: Duration = Duration::from_secs(30);

/// Runs `swaps` consecutive swap attempts and returns a report.
pub async fn run(engine: Arc<WizardEngine>, swaps: usize) -> Result<String> {
	let mut notifications = engine.subscribe();
	let mut successes = 0usize;
	let mut timeouts = 0usize;

	for attempt in 1..=swaps {
		engine.dispatch(WizardEvent::Continue).await?;
		engine.dispatch(WizardEvent::Sign).await?;

		loop {
			let notification = timeout(SWAP_DEADLINE, notifications.recv())
				.await
				.with_context(|| format!("swap {} did not settle in time", attempt))?
				.context("notification bus closed")?;

			match notification {
				WizardNotification::IntentSigned => {
					engine.dispatch(WizardEvent::Continue).await?;
				}
				WizardNotification::SwapCompleted { .. } => {
					info!("Swap {} settled successfully", attempt);
					successes += 1;
					break;
				}
				WizardNotification::SettlementTimedOut => {
					info!("Swap {} expired without a fill", attempt);
					timeouts += 1;
					break;
				}
				_ => {}
			}
		}

		engine.dispatch(WizardEvent::Reset).await?;
	}

	let state = engine.state().await;
	let mut report = format!(
		"{} attempts: {} settled, {} expired\nhistory: {} swaps retained\n",
		swaps,
		successes,
		timeouts,
		state.history.len()
	);
	for achievement in &state.achievements {
		let mark = if achievement.unlocked { "x" } else { " " };
		report.push_str(&format!("[{}] {}\n", mark, achievement.name));
	}

	Ok(report.trim_end().to_string())
}
