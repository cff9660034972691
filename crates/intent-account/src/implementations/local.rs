//! Local private-key owner.
//!
//! The key is held in memory by Alloy's [`PrivateKeySigner`]. The smart
//! account it owns is either configured directly, derived from CREATE2
//! parameters, or, when neither is given, the owner address itself.

use crate::create2::{derive_address, safe_proxy_salt};
use crate::{AccountError, AccountInterface, SmartAccount};
use alloy::primitives::{Address, Bytes, Signature, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use intent_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};
use std::str::FromStr;

/// Account type reported to the orchestrator when none is configured.
pub const DEFAULT_ACCOUNT_TYPE: &str = "ERC7579";

/// Owner key held in memory, together with the account it controls.
///
/// Suitable for development and scripted replays where the key can live in
/// the environment or the config file.
pub struct LocalWallet {
	/// Alloy signer holding the owner key.
	signer: PrivateKeySigner,
	/// Smart account intents are routed and sponsored for.
	account: SmartAccount,
}

impl LocalWallet {
	/// Creates a wallet whose smart account is the owner address itself.
	///
	/// The key is hex, with or without the `0x` prefix.
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;
		let account = SmartAccount {
			address: signer.address(),
			account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
		};

		Ok(Self { signer, account })
	}

	/// Replaces the controlled account.
	pub fn with_account(mut self, account: SmartAccount) -> Self {
		self.account = account;
		self
	}
}

/// Configuration schema for [`LocalWallet`].
pub struct LocalWalletSchema;

impl LocalWalletSchema {
	fn counterfactual_schema() -> Schema {
		Schema::new(
			// Required fields
			vec![
				// CREATE2 deployer of the account.
				Field::new("factory", FieldType::Address),
				// keccak256 of the deployment init code.
				Field::new("init_code_hash", FieldType::Hex { bytes: Some(32) }),
			],
			// Optional fields
			vec![
				// Raw CREATE2 salt.
				Field::new("salt", FieldType::Hex { bytes: Some(32) }),
				// Safe setup calldata; the salt is derived from it and `salt_nonce`.
				Field::new("initializer", FieldType::Hex { bytes: None }),
				Field::new(
					"salt_nonce",
					FieldType::Integer {
						min: Some(0),
						max: None,
					},
				),
			],
		)
	}

	fn schema() -> Schema {
		Schema::new(
			// Required fields
			vec![
				// 32-byte owner key.
				Field::new("private_key", FieldType::Hex { bytes: Some(32) }),
			],
			// Optional fields
			vec![
				// Smart account address, when it is known up front.
				Field::new("address", FieldType::Address),
				// Account flavour passed to the orchestrator, e.g. `ERC7579` or `Safe`.
				Field::new("account_type", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(kind) if !kind.trim().is_empty() => Ok(()),
						_ => Err("account_type must not be empty".to_string()),
					}
				}),
				// CREATE2 parameters the address is derived from instead.
				Field::new(
					"counterfactual",
					FieldType::Table(Self::counterfactual_schema()),
				),
			],
		)
	}
}

impl ConfigSchema for LocalWalletSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Self::schema().validate(config)?;
		if config.get("address").is_some() && config.get("counterfactual").is_some() {
			return Err(ValidationError::InvalidValue {
				field: "address".to_string(),
				message: "Set either address or counterfactual, not both".to_string(),
			});
		}
		if let Some(counterfactual) = config.get("counterfactual") {
			let salt = counterfactual.get("salt").is_some();
			let initializer = counterfactual.get("initializer").is_some();
			if salt == initializer {
				return Err(ValidationError::InvalidValue {
					field: "counterfactual".to_string(),
					message: "Set exactly one of salt or initializer".to_string(),
				});
			}
		}
		Ok(())
	}
}

#[async_trait]
impl AccountInterface for LocalWallet {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalWalletSchema)
	}

	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	async fn smart_account(&self) -> Result<SmartAccount, AccountError> {
		Ok(self.account.clone())
	}

	async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError> {
		self.signer
			.sign_message(message)
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign message: {}", e)))
	}
}

fn str_field<'a>(config: &'a toml::Value, key: &str) -> Result<&'a str, AccountError> {
	config
		.get(key)
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::InvalidConfig(format!("{} is required", key)))
}

fn parse_field<T: FromStr>(config: &toml::Value, key: &str) -> Result<T, AccountError>
where
	T::Err: std::fmt::Display,
{
	str_field(config, key)?
		.parse()
		.map_err(|e| AccountError::InvalidConfig(format!("{}: {}", key, e)))
}

/// The configured salt, or the one a Safe proxy factory derives from
/// `initializer` and `salt_nonce`.
fn counterfactual_salt(counterfactual: &toml::Value) -> Result<B256, AccountError> {
	if counterfactual.get("salt").is_some() {
		return parse_field::<B256>(counterfactual, "salt");
	}
	let initializer = parse_field::<Bytes>(counterfactual, "initializer")?;
	let salt_nonce = counterfactual
		.get("salt_nonce")
		.and_then(|v| v.as_integer())
		.unwrap_or(0);
	let salt_nonce = u64::try_from(salt_nonce)
		.map_err(|_| AccountError::InvalidConfig("salt_nonce must not be negative".to_string()))?;
	Ok(safe_proxy_salt(&initializer, U256::from(salt_nonce)))
}

/// Builds a local wallet from the `[account.config]` table.
///
/// The smart account is taken from `address`, derived from
/// `[counterfactual]`, or falls back to the owner address.
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalWalletSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidConfig(e.to_string()))?;

	let wallet = LocalWallet::new(str_field(config, "private_key")?)?;
	let account_type = config
		.get("account_type")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_ACCOUNT_TYPE)
		.to_string();

	let address = if let Some(counterfactual) = config.get("counterfactual") {
		derive_address(
			parse_field::<Address>(counterfactual, "factory")?,
			counterfactual_salt(counterfactual)?,
			parse_field::<B256>(counterfactual, "init_code_hash")?,
		)
	} else if config.get("address").is_some() {
		parse_field::<Address>(config, "address")?
	} else {
		wallet.signer.address()
	};

	Ok(Box::new(wallet.with_account(SmartAccount {
		address,
		account_type,
	})))
}
