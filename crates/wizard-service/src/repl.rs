//! Interactive command loop for the wizard.
//!
//! Reads line commands from stdin and dispatches the matching events to
//! the engine. Timer-driven progress (signature, auction, settlement)
//! arrives asynchronously and is echoed by the notification printer.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use wizard_core::WizardEngine;
use wizard_types::{
	IntentField, IntentRequest, SettlementStatus, WizardEvent, WizardNotification, WizardState,
	WizardStep,
};

/// Parsed REPL command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
	Show,
	Set { field: IntentField, value: String },
	Options,
	Next,
	Sign,
	Request,
	History,
	Achievements,
	Reset,
	ResetAll,
	Help,
	Quit,
	Unknown(String),
}

/// Parses one input line. Values may contain spaces ("BNB Chain").
pub fn parse_command(line: &str) -> Option<Command> {
	let mut parts = line.split_whitespace();
	let head = parts.next()?;

	let command = match head {
		"show" | "s" => Command::Show,
		"set" => {
			let field = match parts.next().and_then(|f| f.parse::<IntentField>().ok()) {
				Some(field) => field,
				None => return Some(Command::Unknown(line.to_string())),
			};
			let value = parts.collect::<Vec<_>>().join(" ");
			if value.is_empty() {
				return Some(Command::Unknown(line.to_string()));
			}
			Command::Set { field, value }
		}
		"options" | "o" => Command::Options,
		"next" | "n" | "continue" => Command::Next,
		"sign" => Command::Sign,
		"request" | "r" => Command::Request,
		"history" | "h" => Command::History,
		"achievements" | "a" => Command::Achievements,
		"reset" => Command::Reset,
		"reset-all" => Command::ResetAll,
		"help" | "?" => Command::Help,
		"quit" | "exit" | "q" => Command::Quit,
		other => Command::Unknown(other.to_string()),
	};

	Some(command)
}

const HELP: &str = "\
commands:
  show             current wizard state
  set <field> <v>  edit the draft (token_in, token_out, chain_in,
                   chain_out, amount_in, min_amount_out, expiry)
  options          selectable values for the current draft
  next             advance to the next step
  sign             sign the intent
  request          show the intent request a client would submit
  history          recent swaps
  achievements     badge progress
  reset            start over, keeping history and badges
  reset-all        discard everything, including the saved snapshot
  quit             leave";

/// Runs the loop until EOF or `quit`.
pub async fn run(engine: Arc<WizardEngine>) -> Result<()> {
	println!("swap-wizard — simulated token swap via intents");
	println!("type 'help' for commands\n");
	print_state(&engine.state().await);

	// Echo asynchronous progress while the user is at the prompt.
	let mut notifications = engine.subscribe();
	tokio::spawn(async move {
		while let Ok(notification) = notifications.recv().await {
			if let Some(line) = describe(&notification) {
				println!("{}", line);
			}
		}
	});

	let mut lines = BufReader::new(tokio::io::stdin()).lines();

	while let Some(line) = lines.next_line().await? {
		let Some(command) = parse_command(&line) else {
			continue;
		};

		match command {
			Command::Show => print_state(&engine.state().await),
			Command::Set { field, value } => {
				if let Err(e) = engine.dispatch(WizardEvent::SetField { field, value }).await {
					println!("rejected: {}", e);
				}
			}
			Command::Options => print_options(&engine).await,
			Command::Next => {
				if let Err(e) = engine.dispatch(WizardEvent::Continue).await {
					println!("rejected: {}", e);
				}
			}
			Command::Sign => {
				if let Err(e) = engine.dispatch(WizardEvent::Sign).await {
					println!("rejected: {}", e);
				}
			}
			Command::Request => {
				let state = engine.state().await;
				println!("{}", IntentRequest::from(&state.draft).render());
			}
			Command::History => print_history(&engine.state().await),
			Command::Achievements => print_achievements(&engine.state().await),
			Command::Reset => {
				engine.dispatch(WizardEvent::Reset).await.ok();
			}
			Command::ResetAll => {
				engine.dispatch(WizardEvent::ResetAll).await.ok();
			}
			Command::Help => println!("{}", HELP),
			Command::Quit => break,
			Command::Unknown(input) => {
				println!("unknown command: {} (try 'help')", input);
			}
		}
	}

	Ok(())
}

fn describe(notification: &WizardNotification) -> Option<String> {
	let line = match notification {
		WizardNotification::StepEntered { step } => format!("-> {}", step),
		WizardNotification::SigningStarted => "signing intent...".to_string(),
		WizardNotification::IntentSigned => {
			"intent signed — type 'next' to start the auction".to_string()
		}
		WizardNotification::QuotesReceived { count, best } => format!(
			"{} solvers competing; best so far: {} at {}",
			count, best.name, best.price
		),
		WizardNotification::SettlementStarted { .. } => "settling swap on-chain...".to_string(),
		WizardNotification::SwapCompleted { swap } => format!(
			"swap completed: {} -> {}",
			swap.intent.from_leg(),
			swap.intent.to_leg()
		),
		WizardNotification::SettlementTimedOut => {
			"intent expired — no solver filled it in time (type 'reset' to retry)".to_string()
		}
		WizardNotification::AchievementUnlocked { achievement } => {
			format!("achievement unlocked: {}", achievement.name)
		}
		// Draft edits and resets are echoed by the command itself.
		WizardNotification::DraftUpdated { .. } | WizardNotification::WizardReset { .. } => {
			return None
		}
	};
	Some(line)
}

fn print_state(state: &WizardState) {
	println!("step {} of 4: {}", state.step.number(), state.step.title());
	println!(
		"  {} -> {}  (expiry {})",
		state.draft.from_leg(),
		state.draft.to_leg(),
		state.draft.expiry
	);

	match state.step {
		WizardStep::SetGoal => println!("  edit with 'set', advance with 'next'"),
		WizardStep::SignIntent => {
			if state.signing {
				println!("  signing in progress...");
			} else if state.signed {
				println!("  signed — 'next' starts the auction");
			} else {
				println!("  'sign' to create the intent");
			}
		}
		WizardStep::SolversCompete => print_solvers(state),
		WizardStep::Settlement => {
			print_solvers(state);
			println!("  settlement: {}", state.settlement_status);
			for call in &state.calls {
				println!(
					"    call {} via {}: {}",
					call.id, call.solver, call.status
				);
			}
			if state.settlement_status != SettlementStatus::Pending {
				println!("  'reset' to start a new swap");
			}
		}
	}
}

fn print_solvers(state: &WizardState) {
	for quote in &state.solvers {
		let marker = match &state.best_solver {
			Some(best) if best.id == quote.id => " BEST",
			_ => "",
		};
		println!(
			"    {:<14} {:>12}  fulfilled in {:>5}  {}/5{}",
			quote.name, quote.price, quote.time, quote.rating, marker
		);
	}
}

fn print_history(state: &WizardState) {
	if state.history.is_empty() {
		println!("no completed swaps yet");
		return;
	}
	for swap in &state.history {
		println!(
			"  {}  {} -> {}",
			swap.completed_at.format("%Y-%m-%d %H:%M:%S"),
			swap.intent.from_leg(),
			swap.intent.to_leg()
		);
	}
}

fn print_achievements(state: &WizardState) {
	println!(
		"{}/{} unlocked",
		state.unlocked_count(),
		state.achievements.len()
	);
	for achievement in &state.achievements {
		let mark = if achievement.unlocked { "x" } else { " " };
		println!(
			"  [{}] {} — {}",
			mark, achievement.name, achievement.description
		);
	}
}

async fn print_options(engine: &Arc<WizardEngine>) {
	let state = engine.state().await;
	let profile = engine.profile();

	let filter = |options: &[String], exclude: &str| {
		options
			.iter()
			.filter(|o| o.as_str() != exclude)
			.cloned()
			.collect::<Vec<_>>()
			.join(", ")
	};

	println!(
		"  token_in:  {}",
		filter(&profile.tokens, &state.draft.token_out)
	);
	println!(
		"  token_out: {}",
		filter(&profile.tokens, &state.draft.token_in)
	);
	println!(
		"  chain_in:  {}",
		filter(&profile.chains, &state.draft.chain_out)
	);
	println!(
		"  chain_out: {}",
		filter(&profile.chains, &state.draft.chain_in)
	);
	println!(
		"  expiry:    {}",
		profile.expiry_options().join(", ")
	);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_set_with_spaced_value() {
		assert_eq!(
			parse_command("set chain_out BNB Chain"),
			Some(Command::Set {
				field: IntentField::ChainOut,
				value: "BNB Chain".to_string(),
			})
		);
	}

	#[test]
	fn set_requires_field_and_value() {
		assert!(matches!(
			parse_command("set chain_out"),
			Some(Command::Unknown(_))
		));
		assert!(matches!(
			parse_command("set bogus x"),
			Some(Command::Unknown(_))
		));
	}

	#[test]
	fn aliases_resolve() {
		assert_eq!(parse_command("n"), Some(Command::Next));
		assert_eq!(parse_command("continue"), Some(Command::Next));
		assert_eq!(parse_command("q"), Some(Command::Quit));
		assert_eq!(parse_command("reset-all"), Some(Command::ResetAll));
	}

	#[test]
	fn blank_lines_are_skipped() {
		assert_eq!(parse_command("   "), None);
	}
}
