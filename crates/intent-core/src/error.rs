use alloy::primitives::U256;
use intent_account::AccountError;
use intent_compact::CompactError;
use intent_config::{ConfigError, RegistryError};
use intent_orchestrator::OrchestratorError;
use intent_settlement::SettlementError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error("Config error: {0}")]
	Config(#[from] ConfigError),

	#[error("Registry error: {0}")]
	Registry(#[from] RegistryError),

	#[error("Hashing error: {0}")]
	Compact(#[from] CompactError),

	#[error("Account error: {0}")]
	Account(#[from] AccountError),

	#[error("Orchestrator error: {0}")]
	Orchestrator(#[from] OrchestratorError),

	#[error("Settlement error: {0}")]
	Settlement(#[from] SettlementError),

	#[error("Intent expired at {expires} (now {now})")]
	Expired { expires: U256, now: u64 },

	#[error("Invalid intent file {path}: {message}")]
	IntentFile { path: String, message: String },
}
