use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizard_config::{ConfigLoader, StorageBackend, WizardConfig};
use wizard_core::WizardEngine;
use wizard_storage::{FileStore, MemoryStore, SnapshotStore};

mod repl;
mod simulate;

#[derive(Parser)]
#[command(name = "swap-wizard")]
#[command(about = "Simulated token swap via intents", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Optional configuration file; built-in defaults are used otherwise.
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Built-in simulation profile override ("classic" or "rapid").
	#[arg(long)]
	profile: Option<String>,

	#[arg(long, env = "WIZARD_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Run the interactive wizard
	Run,
	/// Auto-drive the wizard through a number of swaps
	Simulate {
		/// How many swap runs to attempt
		#[arg(long, default_value_t = 5)]
		swaps: usize,
	},
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Run) | None => run_wizard(cli).await,
		Some(Commands::Simulate { swaps }) => simulate_wizard(cli, swaps).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn load_config(cli: &Cli) -> Result<WizardConfig> {
	let mut loader = ConfigLoader::new();
	if let Some(path) = &cli.config {
		loader = loader.with_file(path);
	}
	if let Some(profile) = &cli.profile {
		loader = loader.with_profile(profile);
	}
	loader.load().await.context("Failed to load configuration")
}

fn build_store(config: &WizardConfig) -> Arc<SnapshotStore> {
	let backend: Box<dyn wizard_storage::KeyValueStore> = match config.storage.backend {
		StorageBackend::File => Box::new(FileStore::new(config.storage.path.clone())),
		StorageBackend::Memory => Box::new(MemoryStore::new()),
	};
	Arc::new(SnapshotStore::new(backend))
}

async fn run_wizard(cli: Cli) -> Result<()> {
	let config = load_config(&cli).await?;
	info!("Starting {} (interactive)", config.wizard.name);

	let store = build_store(&config);
	let engine = Arc::new(WizardEngine::new(config, store).await);

	// Timer events drain through the engine loop; the REPL dispatches
	// user actions directly.
	let runner = engine.clone();
	let engine_handle = tokio::spawn(async move { runner.run().await });

	tokio::select! {
		result = repl::run(engine.clone()) => result?,
		_ = signal::ctrl_c() => {
			info!("Interrupted");
		}
	}

	engine.shutdown();
	engine_handle.await.ok();

	info!("Wizard stopped");
	Ok(())
}

async fn simulate_wizard(cli: Cli, swaps: usize) -> Result<()> {
	let config = load_config(&cli).await?;
	info!("Starting {} (simulation, {} swaps)", config.wizard.name, swaps);

	let store = build_store(&config);
	let engine = Arc::new(WizardEngine::new(config, store).await);

	let runner = engine.clone();
	let engine_handle = tokio::spawn(async move { runner.run().await });

	let report = simulate::run(engine.clone(), swaps).await?;
	println!("{}", report);

	engine.shutdown();
	engine_handle.await.ok();
	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	let config = load_config(&cli).await?;

	info!("Configuration is valid");
	info!("Wizard name: {}", config.wizard.name);
	info!(
		"Storage: {:?} at {}",
		config.storage.backend,
		config.storage.path.display()
	);
	info!(
		"Tokens: {} | Chains: {}",
		config.simulation.tokens.join(", "),
		config.simulation.chains.join(", ")
	);
	for tier in &config.simulation.tiers {
		info!(
			"Expiry '{}': auction {}-{} ms, settlement {}-{} ms",
			tier.expiry,
			tier.auction.min_ms,
			tier.auction.max_ms,
			tier.settlement.min_ms,
			tier.settlement.max_ms
		);
	}

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}
