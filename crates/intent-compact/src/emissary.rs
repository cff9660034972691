//! Emissary configuration digest.
//!
//! Registering a validator as the sponsor's emissary is signed once and
//! replayed on every chain, so the digest uses the sans-chain-id domain and
//! lists the chain ids in the body.

use crate::domain::{signing_digest, DomainSeparator, EMISSARY_ADDRESS};
use crate::encode::Words;
use crate::lock_tag::LockTag;
use alloy::primitives::{b256, keccak256, Address, Bytes, B256, U256};

pub const EMISSARY_CONFIG_TYPEHASH: B256 =
	b256!("f93d92d294dff1a0619308be9b3d40a5994c777b227e07b87f07d77637f4c6c8");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissaryConfig {
	pub sponsor: Address,
	pub validator: Address,
	pub config_id: u8,
	pub lock_tag: LockTag,
	pub expires: U256,
	pub validator_config: Bytes,
	pub nonce: U256,
	pub chain_ids: Vec<U256>,
}

impl EmissaryConfig {
	pub fn struct_hash(&self) -> B256 {
		let chain_ids = self
			.chain_ids
			.iter()
			.fold(Vec::with_capacity(self.chain_ids.len() * 32), |mut buf, id| {
				buf.extend_from_slice(&id.to_be_bytes::<32>());
				buf
			});

		Words::with_typehash(EMISSARY_CONFIG_TYPEHASH)
			.address(self.sponsor)
			.address(self.validator)
			.uint(U256::from(self.config_id))
			.fixed(self.lock_tag.as_bytes())
			.uint(self.expires)
			.word(keccak256(&self.validator_config))
			.uint(self.nonce)
			.word(keccak256(chain_ids))
			.hash()
	}

	pub fn signing_digest(&self, emissary: Address) -> B256 {
		signing_digest(&DomainSeparator::emissary(emissary), self.struct_hash())
	}

	pub fn default_digest(&self) -> B256 {
		self.signing_digest(EMISSARY_ADDRESS)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lock_tag::{ResetPeriod, Scope, DEFAULT_ALLOCATOR};
	use alloy::primitives::address;

	fn example() -> EmissaryConfig {
		let mut validator_config = vec![0u8; 64];
		validator_config[31] = 1;
		validator_config[63] = 6;
		EmissaryConfig {
			sponsor: address!("0000000000000000000000000000000000000006"),
			validator: address!("0000000000E9E6E96Bcaa3c113187CdB7E38AED9"),
			config_id: 42,
			lock_tag: LockTag::encode(
				DEFAULT_ALLOCATOR,
				ResetPeriod::SevenDaysAndOneHour,
				Scope::Multichain,
			),
			expires: U256::from(2000u64),
			validator_config: validator_config.into(),
			nonce: U256::from(1u64),
			chain_ids: vec![U256::from(1u64), U256::from(8453u64)],
		}
	}

	#[test]
	fn test_golden_digest() {
		let config = example();
		assert_eq!(
			config.struct_hash(),
			b256!("feb3b7f20164c5d77d4cb08ed07d780915242212d6a622fc5951d2885549b79e")
		);
		assert_eq!(
			config.default_digest(),
			b256!("136cb3e57662ffd8e6e8dc67cfc270cb78a779cbecaaa36471f08757dee24183")
		);
	}

	#[test]
	fn test_chain_order_is_signed() {
		let config = example();
		let mut reversed = config.clone();
		reversed.chain_ids.reverse();
		assert_ne!(config.struct_hash(), reversed.struct_hash());
	}
}
