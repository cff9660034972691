//! Engine assembly.
//!
//! [`EngineBuilder`] turns a loaded [`Config`] into an [`IntentEngine`]. The
//! account and orchestrator implementations are chosen by name through
//! registered factories; each factory validates its own `config` table. The
//! struct hasher is created here too, so a schema that fails its self-check
//! stops the process before anything is signed.

use crate::CoreError;
use alloy::primitives::Address;
use intent_account::signature::{DEFAULT_CONFIG_ID, DEFAULT_VALIDATOR};
use intent_account::{AccountError, AccountInterface, AccountService};
use intent_compact::{create_hasher_with_contract, StructHasher, COMPACT_ADDRESS};
use intent_config::{BatchMode, ChainRegistry, Config};
use intent_orchestrator::{OrchestratorError, OrchestratorInterface, OrchestratorService};
use intent_settlement::{BundleTracker, TrackerConfig};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

type AccountFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send>;
type OrchestratorFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn OrchestratorInterface>, OrchestratorError> + Send>;

/// How the owner signature is wrapped for the account's validator module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureSettings {
	pub validator: Address,
	/// Prefixed to intent signatures when the emissary is in use.
	pub config_id: Option<u8>,
	/// Id an emissary registration is made under.
	pub emissary_config_id: u8,
}

/// Batch defaults taken from `[batch]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
	pub mode: BatchMode,
	pub delay_between: Duration,
	pub simulate: bool,
}

pub struct IntentEngine {
	pub(crate) account: AccountService,
	pub(crate) orchestrator: OrchestratorService,
	pub(crate) hasher: Box<dyn StructHasher>,
	pub(crate) registry: ChainRegistry,
	pub(crate) tracker: BundleTracker,
	pub(crate) signature: SignatureSettings,
	pub(crate) batch: BatchSettings,
}

impl IntentEngine {
	pub fn account(&self) -> &AccountService {
		&self.account
	}

	pub fn orchestrator(&self) -> &OrchestratorService {
		&self.orchestrator
	}

	pub fn hasher(&self) -> &dyn StructHasher {
		self.hasher.as_ref()
	}

	pub fn registry(&self) -> &ChainRegistry {
		&self.registry
	}

	pub fn tracker(&self) -> &BundleTracker {
		&self.tracker
	}

	pub fn signature_settings(&self) -> SignatureSettings {
		self.signature
	}

	pub fn batch_settings(&self) -> BatchSettings {
		self.batch
	}
}

pub struct EngineBuilder {
	config: Config,
	account_factories: HashMap<String, AccountFactory>,
	orchestrator_factories: HashMap<String, OrchestratorFactory>,
}

impl EngineBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			account_factories: HashMap::new(),
			orchestrator_factories: HashMap::new(),
		}
	}

	pub fn with_account_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send + 'static,
	{
		self.account_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn with_orchestrator_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn OrchestratorInterface>, OrchestratorError>
			+ Send
			+ 'static,
	{
		self.orchestrator_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn build(self) -> Result<IntentEngine, CoreError> {
		let config = self.config;

		let account_factory = self
			.account_factories
			.get(&config.account.implementation)
			.ok_or_else(|| {
				CoreError::Configuration(format!(
					"Unknown account implementation '{}'",
					config.account.implementation
				))
			})?;
		let account_provider = account_factory(&config.account.config)?;
		account_provider
			.config_schema()
			.validate(&config.account.config)
			.map_err(|e| CoreError::Configuration(format!("account.config: {}", e)))?;

		let orchestrator_factory = self
			.orchestrator_factories
			.get(&config.orchestrator.implementation)
			.ok_or_else(|| {
				CoreError::Configuration(format!(
					"Unknown orchestrator implementation '{}'",
					config.orchestrator.implementation
				))
			})?;
		let orchestrator_provider = orchestrator_factory(&config.orchestrator.config)?;
		orchestrator_provider
			.config_schema()
			.validate(&config.orchestrator.config)
			.map_err(|e| CoreError::Configuration(format!("orchestrator.config: {}", e)))?;

		let signing = &config.signing;
		let hasher = create_hasher_with_contract(
			signing.schema,
			signing.compact_address.unwrap_or(COMPACT_ADDRESS),
		)?;

		let registry = ChainRegistry::from_config(&config.chains)?;
		let tracker = BundleTracker::new(TrackerConfig::from_millis(
			config.tracking.poll_interval_ms,
			config.tracking.max_wait_ms,
		)?);

		let emissary_config_id = signing.config_id.unwrap_or(DEFAULT_CONFIG_ID);
		let signature = SignatureSettings {
			validator: signing.validator.unwrap_or(DEFAULT_VALIDATOR),
			config_id: signing.use_emissary.then_some(emissary_config_id),
			emissary_config_id,
		};

		info!(
			schema = %hasher.schema(),
			account = %config.account.implementation,
			orchestrator = %config.orchestrator.implementation,
			chains = registry.chains().len(),
			"Intent engine ready"
		);

		Ok(IntentEngine {
			account: AccountService::new(account_provider),
			orchestrator: OrchestratorService::new(orchestrator_provider),
			hasher,
			registry,
			tracker,
			signature,
			batch: BatchSettings {
				mode: config.batch.mode,
				delay_between: Duration::from_millis(config.batch.delay_between_ms),
				simulate: config.batch.simulate,
			},
		})
	}
}
