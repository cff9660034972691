//! Account management for the intent client.
//!
//! An intent is sponsored by a smart account and signed by its owner key.
//! [`AccountInterface`] is the seam for where that key lives; the
//! [`signature`] module packs owner signatures into what the account's
//! validator module expects, and [`create2`] derives counterfactual account
//! addresses.

use alloy::primitives::{Address, Bytes, Signature, B256};
use async_trait::async_trait;
use intent_types::ConfigSchema;
use thiserror::Error;

pub mod create2;
pub mod signature;

pub mod implementations {
	pub mod local;
}

pub use signature::{PackedSignature, SignatureLayout};

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	#[error("Invalid signature encoding: {0}")]
	InvalidSignature(String),
}

/// The smart account an intent is routed and sponsored for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartAccount {
	pub address: Address,
	pub account_type: String,
}

#[async_trait]
pub trait AccountInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Address of the owner key.
	async fn address(&self) -> Result<Address, AccountError>;

	/// The account the owner key controls.
	async fn smart_account(&self) -> Result<SmartAccount, AccountError>;

	/// EIP-191 personal signature over `message`.
	async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError>;
}

pub struct AccountService {
	provider: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(provider: Box<dyn AccountInterface>) -> Self {
		Self { provider }
	}

	pub async fn owner(&self) -> Result<Address, AccountError> {
		self.provider.address().await
	}

	pub async fn smart_account(&self) -> Result<SmartAccount, AccountError> {
		self.provider.smart_account().await
	}

	/// Signs the raw 32 digest bytes as a personal message.
	pub async fn sign_digest(&self, digest: B256) -> Result<Signature, AccountError> {
		self.provider.sign_message(digest.as_slice()).await
	}

	/// Ownable-validator signature: the single owner's `r ‖ s ‖ v`.
	pub async fn owner_signature(&self, digest: B256) -> Result<Bytes, AccountError> {
		let signature = self.sign_digest(digest).await?;
		Ok(signature::ownable_signature(&[signature]))
	}
}
