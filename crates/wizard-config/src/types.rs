//! Configuration types for the swap wizard.
//!
//! The original demo shipped several divergent versions of the same
//! machine, differing only in expiry option sets and delay constants.
//! Those differences are configuration here: a [`SimulationProfile`]
//! carries the option sets, the default draft and the delay tiers, and
//! the two shipped variants are available as the named `classic` and
//! `rapid` profiles.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wizard_types::IntentDraft;

/// Complete wizard configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WizardConfig {
	/// Identity and logging.
	#[serde(default)]
	pub wizard: WizardSettings,
	/// Snapshot storage settings.
	#[serde(default)]
	pub storage: StorageConfig,
	/// Simulation option sets and timing.
	#[serde(default = "SimulationProfile::rapid")]
	pub simulation: SimulationProfile,
}

impl Default for WizardConfig {
	fn default() -> Self {
		Self {
			wizard: WizardSettings::default(),
			storage: StorageConfig::default(),
			simulation: SimulationProfile::rapid(),
		}
	}
}

/// Identity and logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WizardSettings {
	/// Instance name for logging.
	#[serde(default = "default_name")]
	pub name: String,
	/// Default log level when RUST_LOG is not set.
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

fn default_name() -> String {
	"swap-wizard".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

impl Default for WizardSettings {
	fn default() -> Self {
		Self {
			name: default_name(),
			log_level: default_log_level(),
		}
	}
}

/// Snapshot storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	File,
	Memory,
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	#[serde(default = "default_backend")]
	pub backend: StorageBackend,
	/// Base directory for the file backend.
	#[serde(default = "default_storage_path")]
	pub path: PathBuf,
}

fn default_backend() -> StorageBackend {
	StorageBackend::File
}

fn default_storage_path() -> PathBuf {
	PathBuf::from("./data/wizard")
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: default_backend(),
			path: default_storage_path(),
		}
	}
}

/// Inclusive millisecond range a delay is drawn from uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DelayRange {
	pub min_ms: u64,
	pub max_ms: u64,
}

impl DelayRange {
	pub const fn new(min_ms: u64, max_ms: u64) -> Self {
		Self { min_ms, max_ms }
	}

	/// Whether `ms` lies within the range.
	pub fn contains(&self, ms: u64) -> bool {
		ms >= self.min_ms && ms <= self.max_ms
	}
}

/// Delay ranges tied to one expiry option.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DelayTier {
	/// The expiry option string as shown to the user, e.g. `"30 seconds"`.
	pub expiry: String,
	/// Range for the solver-competition delay.
	pub auction: DelayRange,
	/// Range for the settlement delay.
	pub settlement: DelayRange,
}

/// Default draft field values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DraftDefaults {
	pub token_in: String,
	pub token_out: String,
	pub chain_in: String,
	pub chain_out: String,
	pub amount_in: String,
	pub min_amount_out: String,
	pub expiry: String,
}

/// Option sets and timing for one simulation variant.
///
/// Tiers are listed shortest expiry first; validation enforces that delay
/// ranges never shrink as expiry grows.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationProfile {
	/// Selectable token symbols.
	pub tokens: Vec<String>,
	/// Selectable chain names.
	pub chains: Vec<String>,
	/// Initial draft values.
	pub defaults: DraftDefaults,
	/// Range for the simulated signature delay.
	pub sign: DelayRange,
	/// Expiry options with their delay ranges, shortest first.
	pub tiers: Vec<DelayTier>,
}

const TOKENS: [&str; 5] = ["USDC", "USDT", "DAI", "WETH", "WBTC"];
const CHAINS: [&str; 6] = [
	"Ethereum",
	"Polygon",
	"BNB Chain",
	"Arbitrum",
	"Optimism",
	"Base",
];

fn base_defaults(expiry: &str) -> DraftDefaults {
	// The original demo defaults token_out to ETH even though ETH is not
	// in the selectable token list. Reproduced as-is.
	DraftDefaults {
		token_in: "USDC".to_string(),
		token_out: "ETH".to_string(),
		chain_in: "Ethereum".to_string(),
		chain_out: "Arbitrum".to_string(),
		amount_in: "100".to_string(),
		min_amount_out: "0.05".to_string(),
		expiry: expiry.to_string(),
	}
}

impl SimulationProfile {
	/// The earliest shipped variant: long expiry options, one fixed
	/// 1500-3000 ms delay range across all tiers.
	pub fn classic() -> Self {
		let fixed = DelayRange::new(1500, 3000);
		let tiers = ["5 min", "10 min", "15 min", "30 min", "1 hour"]
			.into_iter()
			.map(|expiry| DelayTier {
				expiry: expiry.to_string(),
				auction: fixed,
				settlement: fixed,
			})
			.collect();

		Self {
			tokens: TOKENS.iter().map(|t| t.to_string()).collect(),
			chains: CHAINS.iter().map(|c| c.to_string()).collect(),
			defaults: base_defaults("15 min"),
			sign: DelayRange::new(1500, 2000),
			tiers,
		}
	}

	/// The later variant: short expiry options with delay ranges that
	/// grow with the chosen expiry.
	pub fn rapid() -> Self {
		let tiers = vec![
			DelayTier {
				expiry: "30 seconds".to_string(),
				auction: DelayRange::new(1000, 2000),
				settlement: DelayRange::new(1500, 3000),
			},
			DelayTier {
				expiry: "1 min".to_string(),
				auction: DelayRange::new(2000, 3500),
				settlement: DelayRange::new(2500, 4500),
			},
			DelayTier {
				expiry: "5 min".to_string(),
				auction: DelayRange::new(3500, 6000),
				settlement: DelayRange::new(4500, 8000),
			},
		];

		Self {
			tokens: TOKENS.iter().map(|t| t.to_string()).collect(),
			chains: CHAINS.iter().map(|c| c.to_string()).collect(),
			defaults: base_defaults("30 seconds"),
			sign: DelayRange::new(1500, 2000),
			tiers,
		}
	}

	/// Resolves a named built-in profile.
	pub fn named(name: &str) -> Option<Self> {
		match name {
			"classic" => Some(Self::classic()),
			"rapid" => Some(Self::rapid()),
			_ => None,
		}
	}

	/// The expiry option strings, shortest first.
	pub fn expiry_options(&self) -> Vec<&str> {
		self.tiers.iter().map(|t| t.expiry.as_str()).collect()
	}

	/// The delay tier for an expiry option, if it exists.
	pub fn tier(&self, expiry: &str) -> Option<&DelayTier> {
		self.tiers.iter().find(|t| t.expiry == expiry)
	}

	/// Builds the initial draft from the configured defaults.
	pub fn default_draft(&self) -> IntentDraft {
		IntentDraft {
			token_in: self.defaults.token_in.clone(),
			token_out: self.defaults.token_out.clone(),
			chain_in: self.defaults.chain_in.clone(),
			chain_out: self.defaults.chain_out.clone(),
			amount_in: self.defaults.amount_in.clone(),
			min_amount_out: self.defaults.min_amount_out.clone(),
			expiry: self.defaults.expiry.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn named_profiles_resolve() {
		assert!(SimulationProfile::named("classic").is_some());
		assert!(SimulationProfile::named("rapid").is_some());
		assert!(SimulationProfile::named("warp").is_none());
	}

	#[test]
	fn rapid_tiers_grow_with_expiry() {
		let profile = SimulationProfile::rapid();
		for pair in profile.tiers.windows(2) {
			assert!(pair[1].auction.min_ms >= pair[0].auction.min_ms);
			assert!(pair[1].auction.max_ms >= pair[0].auction.max_ms);
			assert!(pair[1].settlement.min_ms >= pair[0].settlement.min_ms);
			assert!(pair[1].settlement.max_ms >= pair[0].settlement.max_ms);
		}
	}

	#[test]
	fn default_draft_matches_original_demo() {
		let draft = SimulationProfile::rapid().default_draft();
		assert_eq!(draft.token_in, "USDC");
		assert_eq!(draft.token_out, "ETH");
		assert_eq!(draft.chain_in, "Ethereum");
		assert_eq!(draft.chain_out, "Arbitrum");
		assert_eq!(draft.amount_in, "100");
		assert_eq!(draft.min_amount_out, "0.05");
		assert_eq!(draft.expiry, "30 seconds");
	}

	#[test]
	fn classic_profile_keeps_fixed_ranges() {
		let profile = SimulationProfile::classic();
		assert_eq!(
			profile.expiry_options(),
			vec!["5 min", "10 min", "15 min", "30 min", "1 hour"]
		);
		assert!(profile
			.tiers
			.iter()
			.all(|t| t.auction == DelayRange::new(1500, 3000)));
	}
}
