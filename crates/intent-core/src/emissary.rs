//! Emissary registration.
//!
//! Enabling the emissary for a lock tag is authorised once for a list of
//! chains. The registration names the smart account as sponsor and installs
//! the ownable validator with the owner key as its single signer, so the
//! digest can be built from configuration alone.

use crate::engine::IntentEngine;
use crate::utils::truncate_hash;
use crate::CoreError;
use alloy::primitives::{Bytes, B256, U256};
use intent_account::signature::ownable_validator_init_data;
use intent_account::PackedSignature;
use intent_compact::{EmissaryConfig, LockTag};
use tracing::debug;

/// Nonce of a first registration.
pub const DEFAULT_EMISSARY_NONCE: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissaryRequest {
	/// Registry names of the chains the registration covers, in signed order.
	pub chains: Vec<String>,
	pub lock_tag: LockTag,
	pub expires: U256,
	pub nonce: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEmissaryConfig {
	pub config: EmissaryConfig,
	pub digest: B256,
	/// Owner signature packed for the validator under the config id.
	pub signature: Bytes,
}

impl IntentEngine {
	/// Builds the registration for the configured account.
	pub async fn emissary_config(
		&self,
		request: &EmissaryRequest,
	) -> Result<EmissaryConfig, CoreError> {
		let chain_ids = request
			.chains
			.iter()
			.map(|name| {
				self.registry
					.chain(name)
					.map(|chain| U256::from(chain.chain_id))
			})
			.collect::<Result<Vec<_>, _>>()?;

		let owner = self.account.owner().await?;
		let account = self.account.smart_account().await?;

		Ok(EmissaryConfig {
			sponsor: account.address,
			validator: self.signature.validator,
			config_id: self.signature.emissary_config_id,
			lock_tag: request.lock_tag,
			expires: request.expires,
			validator_config: ownable_validator_init_data(1, &[owner]),
			nonce: request.nonce,
			chain_ids,
		})
	}

	/// Hashes `config` under the emissary domain and signs it with the owner key.
	pub async fn sign_emissary_config(
		&self,
		config: EmissaryConfig,
	) -> Result<SignedEmissaryConfig, CoreError> {
		let digest = config.default_digest();
		let owner_signature = self.account.owner_signature(digest).await?;
		let signature =
			PackedSignature::new(config.validator, Some(config.config_id), owner_signature).encode();

		debug!(
			digest = %truncate_hash(&digest.to_string()),
			config_id = config.config_id,
			chains = config.chain_ids.len(),
			"Signed emissary config"
		);

		Ok(SignedEmissaryConfig {
			config,
			digest,
			signature,
		})
	}
}
