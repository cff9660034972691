//! Configuration types for the intent client.

use alloy::primitives::Address;
use intent_compact::IntentSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_MAX_WAIT_MS: u64 = 90_000;

/// Complete client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	#[serde(default)]
	pub client: ClientConfig,
	/// Orchestrator implementation and its `config` table.
	pub orchestrator: ImplementationConfig,
	/// Owner key implementation and its `config` table.
	pub account: ImplementationConfig,
	#[serde(default)]
	pub signing: SigningConfig,
	#[serde(default)]
	pub tracking: TrackingConfig,
	#[serde(default)]
	pub batch: BatchConfig,
	/// Chains and tokens intent requests may name.
	#[serde(default)]
	pub chains: Vec<ChainConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			log_level: default_log_level(),
		}
	}
}

/// A pluggable section: which implementation to build and the table handed to its factory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImplementationConfig {
	pub implementation: String,
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SigningConfig {
	/// Struct hashing layout; `target` unless set.
	#[serde(default)]
	pub schema: IntentSchema,
	/// Validator module prefixed to every signature.
	pub validator: Option<Address>,
	/// Prefix the emissary config id after the validator address.
	#[serde(default)]
	pub use_emissary: bool,
	pub config_id: Option<u8>,
	/// Verifying contract of the signing domain.
	pub compact_address: Option<Address>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	#[serde(default = "default_max_wait_ms")]
	pub max_wait_ms: u64,
}

impl Default for TrackingConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
			max_wait_ms: DEFAULT_MAX_WAIT_MS,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
	/// Each intent is tracked to the end before the next one starts.
	#[default]
	Sequential,
	/// Every intent is started without waiting for the previous one.
	Concurrent,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchConfig {
	#[serde(default)]
	pub mode: BatchMode,
	/// Pause after each intent is started.
	#[serde(default)]
	pub delay_between_ms: u64,
	/// Call the simulate endpoint instead of submitting.
	#[serde(default)]
	pub simulate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	pub name: String,
	pub chain_id: u64,
	#[serde(default)]
	pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	pub symbol: String,
	pub address: Address,
	pub decimals: u8,
	/// The chain's gas token, sent as call value rather than through `transfer`.
	#[serde(default)]
	pub native: bool,
}

fn default_log_level() -> String {
	DEFAULT_LOG_LEVEL.to_string()
}

fn default_poll_interval_ms() -> u64 {
	DEFAULT_POLL_INTERVAL_MS
}

fn default_max_wait_ms() -> u64 {
	DEFAULT_MAX_WAIT_MS
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::map::Map::new())
}
