//! Configuration loading for the intent client.
//!
//! Files may be TOML, JSON or YAML, chosen by extension. `${VAR}` references
//! are substituted from the environment before parsing and a small set of
//! prefixed environment variables override individual settings. A reference
//! whose variable is unset only fails the load if no override replaced it.
//! The result is validated before anything is built from it.

use intent_types::Environment;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub mod registry;
pub mod types;

pub use registry::{normalize_chain_name, Chain, ChainRegistry, RegistryError, Token};
pub use types::*;

pub const DEFAULT_ENV_PREFIX: &str = "INTENT_";

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
	Toml,
	Json,
	Yaml,
}

impl Format {
	fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some("toml") => Ok(Self::Toml),
			Some("json") => Ok(Self::Json),
			Some("yaml") | Some("yml") => Ok(Self::Yaml),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {}",
				path.display()
			))),
		}
	}
}

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: DEFAULT_ENV_PREFIX.to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<Config, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;
		if !file_path.exists() {
			return Err(ConfigError::FileNotFound(file_path.display().to_string()));
		}

		let content = tokio::fs::read_to_string(file_path).await?;
		let mut config = self.parse(&content, Format::from_path(file_path)?)?;

		self.apply_env_overrides(&mut config)?;
		ensure_resolved(&config)?;
		validate_config(&config)?;

		debug!(path = %file_path.display(), "Configuration loaded");
		Ok(config)
	}

	fn parse(&self, content: &str, format: Format) -> Result<Config, ConfigError> {
		let (substituted, unresolved) = substitute_available_env_vars(content)?;
		let parsed = match format {
			Format::Toml => {
				toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))
			}
			Format::Json => serde_json::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string())),
			Format::Yaml => serde_yaml::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(e.to_string())),
		};
		// An unquoted placeholder breaks the syntax; report the variable instead.
		parsed.map_err(|e| match unresolved.into_iter().next() {
			Some(name) => ConfigError::EnvVarNotFound(name),
			None => e,
		})
	}

	fn env_var(&self, name: &str) -> Option<String> {
		env::var(format!("{}{}", self.env_prefix, name)).ok()
	}

	fn apply_env_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
		if let Some(log_level) = self.env_var("LOG_LEVEL") {
			debug!("Overriding log level from environment");
			config.client.log_level = log_level;
		}

		if let Some(api_key) = self.env_var("API_KEY") {
			debug!("Overriding orchestrator API key from environment");
			set_key(&mut config.orchestrator.config, "api_key", api_key)?;
		}

		if let Some(environment) = self.env_var("ENVIRONMENT") {
			debug!(environment = %environment, "Overriding orchestrator environment");
			set_key(&mut config.orchestrator.config, "environment", environment)?;
		}

		if let Some(private_key) = self.env_var("PRIVATE_KEY") {
			debug!("Overriding account private key from environment");
			set_key(&mut config.account.config, "private_key", private_key)?;
		}

		Ok(())
	}
}

fn set_key(table: &mut toml::Value, key: &str, value: String) -> Result<(), ConfigError> {
	let table = table.as_table_mut().ok_or_else(|| {
		ConfigError::ValidationError(format!("cannot set {}: config is not a table", key))
	})?;
	table.insert(key.to_string(), toml::Value::String(value));
	Ok(())
}

fn placeholder_pattern() -> Result<regex::Regex, ConfigError> {
	regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Replaces every `${VAR}` with the value of the environment variable `VAR`.
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = placeholder_pattern()?;

	let mut result = content.to_string();
	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Like [`substitute_env_vars`], but leaves references to unset variables in
/// place and returns their names.
fn substitute_available_env_vars(content: &str) -> Result<(String, Vec<String>), ConfigError> {
	let re = placeholder_pattern()?;

	let mut unresolved = Vec::new();
	let result = re.replace_all(content, |cap: &regex::Captures| match env::var(&cap[1]) {
		Ok(value) => value,
		Err(_) => {
			unresolved.push(cap[1].to_string());
			cap[0].to_string()
		}
	});

	Ok((result.into_owned(), unresolved))
}

/// Fails on the first `${VAR}` reference that survived substitution and
/// overrides.
fn ensure_resolved(config: &Config) -> Result<(), ConfigError> {
	let re = placeholder_pattern()?;
	let value =
		serde_json::to_value(config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

	match first_placeholder(&re, &value) {
		Some(name) => Err(ConfigError::EnvVarNotFound(name)),
		None => Ok(()),
	}
}

fn first_placeholder(re: &regex::Regex, value: &serde_json::Value) -> Option<String> {
	match value {
		serde_json::Value::String(s) => re.captures(s).map(|cap| cap[1].to_string()),
		serde_json::Value::Array(items) => items.iter().find_map(|v| first_placeholder(re, v)),
		serde_json::Value::Object(map) => map.values().find_map(|v| first_placeholder(re, v)),
		_ => None,
	}
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
	let invalid = |message: String| Err(ConfigError::ValidationError(message));

	if config.orchestrator.implementation.trim().is_empty() {
		return invalid("orchestrator.implementation must be set".to_string());
	}
	if config.account.implementation.trim().is_empty() {
		return invalid("account.implementation must be set".to_string());
	}
	for (section, table) in [
		("orchestrator", &config.orchestrator.config),
		("account", &config.account.config),
	] {
		if !table.is_table() {
			return invalid(format!("{}.config must be a table", section));
		}
	}

	let orchestrator = &config.orchestrator.config;
	if orchestrator.get("url").is_none() {
		if let Some(environment) = orchestrator.get("environment") {
			let name = environment.as_str().unwrap_or_default();
			if let Err(e) = name.parse::<Environment>() {
				return invalid(format!("orchestrator.config.environment: {}", e));
			}
		}
	}

	let tracking = &config.tracking;
	if tracking.poll_interval_ms == 0 {
		return invalid("tracking.poll_interval_ms must be greater than zero".to_string());
	}
	if tracking.poll_interval_ms > tracking.max_wait_ms {
		return invalid(format!(
			"tracking.poll_interval_ms ({}) exceeds tracking.max_wait_ms ({})",
			tracking.poll_interval_ms, tracking.max_wait_ms
		));
	}

	ChainRegistry::from_config(&config.chains)
		.map_err(|e| ConfigError::ValidationError(e.to_string()))?;

	Ok(())
}
