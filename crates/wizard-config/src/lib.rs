//! Configuration loading for the swap wizard.
//!
//! TOML files with `${VAR}` environment substitution, environment
//! overrides for common settings, and validation of the simulation
//! profile invariants (option-set sanity, exclusion rule on the default
//! draft, monotonic delay tiers).

use std::env;
use std::path::Path;
use thiserror::Error;

pub mod types;

pub use types::{
	DelayRange, DelayTier, DraftDefaults, SimulationProfile, StorageBackend, StorageConfig,
	WizardConfig, WizardSettings,
};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	profile: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			profile: None,
			env_prefix: "WIZARD_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	/// Overrides the simulation section with a named built-in profile.
	pub fn with_profile(mut self, name: impl Into<String>) -> Self {
		self.profile = Some(name.into());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads, overrides and validates the configuration.
	///
	/// Without a file path the built-in defaults are used, so the wizard
	/// runs out of the box.
	pub async fn load(&self) -> Result<WizardConfig, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			WizardConfig::default()
		};

		if let Some(name) = &self.profile {
			config.simulation = SimulationProfile::named(name).ok_or_else(|| {
				ConfigError::ValidationError(format!("Unknown simulation profile: {}", name))
			})?;
		}

		self.apply_env_overrides(&mut config);
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<WizardConfig, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				ConfigError::FileNotFound(file_path.to_string())
			} else {
				ConfigError::IoError(e)
			}
		})?;

		let substituted = self.substitute_env_vars(&content)?;

		let config: WizardConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut WizardConfig) {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			config.wizard.log_level = log_level;
		}

		if let Ok(path) = env::var(format!("{}STORAGE_PATH", self.env_prefix)) {
			config.storage.path = path.into();
		}
	}
}

fn validate_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
	if range.min_ms > range.max_ms {
		return Err(ConfigError::ValidationError(format!(
			"{}: min_ms {} exceeds max_ms {}",
			name, range.min_ms, range.max_ms
		)));
	}
	Ok(())
}

/// Validates a full configuration.
pub fn validate_config(config: &WizardConfig) -> Result<(), ConfigError> {
	let sim = &config.simulation;

	// The exclusion rule needs an alternative to switch to.
	if sim.tokens.len() < 2 {
		return Err(ConfigError::ValidationError(
			"At least two token options are required".to_string(),
		));
	}
	if sim.chains.len() < 2 {
		return Err(ConfigError::ValidationError(
			"At least two chain options are required".to_string(),
		));
	}
	if sim.tiers.is_empty() {
		return Err(ConfigError::ValidationError(
			"At least one delay tier is required".to_string(),
		));
	}

	validate_range("sign", &sim.sign)?;
	for tier in &sim.tiers {
		validate_range(&format!("tier '{}' auction", tier.expiry), &tier.auction)?;
		validate_range(
			&format!("tier '{}' settlement", tier.expiry),
			&tier.settlement,
		)?;
	}

	// Longer expiry must never produce a shorter delay range.
	for pair in sim.tiers.windows(2) {
		let (a, b) = (&pair[0], &pair[1]);
		let monotonic = b.auction.min_ms >= a.auction.min_ms
			&& b.auction.max_ms >= a.auction.max_ms
			&& b.settlement.min_ms >= a.settlement.min_ms
			&& b.settlement.max_ms >= a.settlement.max_ms;
		if !monotonic {
			return Err(ConfigError::ValidationError(format!(
				"Delay tiers must be monotonic: '{}' shrinks below '{}'",
				b.expiry, a.expiry
			)));
		}
	}

	let defaults = &sim.defaults;
	if defaults.token_in == defaults.token_out {
		return Err(ConfigError::ValidationError(
			"Default token_out must differ from token_in".to_string(),
		));
	}
	if defaults.chain_in == defaults.chain_out {
		return Err(ConfigError::ValidationError(
			"Default chain_out must differ from chain_in".to_string(),
		));
	}
	if sim.tier(&defaults.expiry).is_none() {
		return Err(ConfigError::ValidationError(format!(
			"Default expiry '{}' is not one of the configured tiers",
			defaults.expiry
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[tokio::test]
	async fn defaults_load_without_a_file() {
		let config = ConfigLoader::new().load().await.unwrap();
		assert_eq!(config.wizard.name, "swap-wizard");
		assert_eq!(config.simulation.expiry_options()[0], "30 seconds");
	}

	#[tokio::test]
	async fn profile_override_selects_classic() {
		let config = ConfigLoader::new()
			.with_profile("classic")
			.load()
			.await
			.unwrap();
		assert_eq!(config.simulation.defaults.expiry, "15 min");
	}

	#[tokio::test]
	async fn unknown_profile_is_rejected() {
		let err = ConfigLoader::new()
			.with_profile("warp")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	async fn file_values_override_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[wizard]\nname = \"demo\"\n\n[storage]\nbackend = \"memory\"\npath = \"./tmp\"\n"
		)
		.unwrap();

		let config = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap();
		assert_eq!(config.wizard.name, "demo");
		assert_eq!(config.storage.backend, StorageBackend::Memory);
	}

	#[tokio::test]
	async fn env_vars_are_substituted_into_the_file() {
		std::env::set_var("WIZARD_TEST_NAME", "from-env");

		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[wizard]\nname = \"${{WIZARD_TEST_NAME}}\"\n").unwrap();

		let config = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap();
		assert_eq!(config.wizard.name, "from-env");
	}

	#[tokio::test]
	async fn missing_env_var_is_an_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[wizard]\nname = \"${{WIZARD_TEST_UNSET_VAR}}\"\n").unwrap();

		let err = ConfigLoader::new()
			.with_file(file.path())
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(_)));
	}

	#[tokio::test]
	async fn missing_file_is_reported() {
		let err = ConfigLoader::new()
			.with_file("/nonexistent/wizard.toml")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}

	#[test]
	fn non_monotonic_tiers_fail_validation() {
		let mut config = WizardConfig::default();
		config.simulation.tiers[1].auction = DelayRange::new(10, 20);
		let err = validate_config(&config).unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[test]
	fn default_draft_must_respect_exclusion() {
		let mut config = WizardConfig::default();
		config.simulation.defaults.chain_out = config.simulation.defaults.chain_in.clone();
		assert!(validate_config(&config).is_err());
	}

	#[test]
	fn inverted_range_fails_validation() {
		let mut config = WizardConfig::default();
		config.simulation.sign = DelayRange::new(3000, 1000);
		assert!(validate_config(&config).is_err());
	}
}
