//! EIP-712 domain separators.
//!
//! Name and version travel pre-hashed. A domain without a chain id is used by
//! contracts deployed at the same address on every chain that embed the chain
//! ids in the signed body instead.

use crate::encode::Words;
use alloy::primitives::{address, b256, keccak256, Address, B256, U256};

/// `keccak256("EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)")`
pub const DOMAIN_TYPEHASH: B256 =
	b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f");
/// `keccak256("EIP712Domain(string name,string version,address verifyingContract)")`
pub const DOMAIN_TYPEHASH_SANS_CHAIN_ID: B256 =
	b256!("91ab3d17e3a50a9d89e63fd30b92be7f5336b03b287bb946787a83a9d62a2766");

pub const COMPACT_NAME_HASH: B256 =
	b256!("5e6f7b4e1ac3d625bac418bc955510b3e054cb6cc23cc27885107f080180b292");
pub const COMPACT_VERSION_HASH: B256 =
	b256!("c89efdaa54c0f20c7adf612882df0950f5a951637e0307cdcb4c672f298b8bc6");
pub const EMISSARY_NAME_HASH: B256 =
	b256!("6ea0b95941b5d4a9566ad4be4b65d7961249427fc89dd79e0934e32eea81a8aa");
pub const EMISSARY_VERSION_HASH: B256 =
	b256!("ae209a0b48f21c054280f2455d32cf309387644879d9acbd8ffc199163811885");

/// The Compact, same address on every supported chain.
pub const COMPACT_ADDRESS: Address = address!("Abd3388A633758D0Bae01Efb885EF1e87BD519a6");
pub const EMISSARY_ADDRESS: Address = address!("dd0647716e3c3d709D833717aC5786Ed4f36D20e");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainSeparator {
	pub name_hash: B256,
	pub version_hash: B256,
	pub verifying_contract: Address,
	/// `None` selects the sans-chain-id typehash.
	pub chain_id: Option<U256>,
}

impl DomainSeparator {
	pub fn compact(verifying_contract: Address, chain_id: U256) -> Self {
		Self {
			name_hash: COMPACT_NAME_HASH,
			version_hash: COMPACT_VERSION_HASH,
			verifying_contract,
			chain_id: Some(chain_id),
		}
	}

	pub fn emissary(verifying_contract: Address) -> Self {
		Self {
			name_hash: EMISSARY_NAME_HASH,
			version_hash: EMISSARY_VERSION_HASH,
			verifying_contract,
			chain_id: None,
		}
	}

	/// Drops the chain id, keeping name, version and contract.
	pub fn sans_chain_id(self) -> Self {
		Self {
			chain_id: None,
			..self
		}
	}

	pub fn separator(&self) -> B256 {
		match self.chain_id {
			Some(chain_id) => Words::with_typehash(DOMAIN_TYPEHASH)
				.word(self.name_hash)
				.word(self.version_hash)
				.uint(chain_id)
				.address(self.verifying_contract)
				.hash(),
			None => Words::with_typehash(DOMAIN_TYPEHASH_SANS_CHAIN_ID)
				.word(self.name_hash)
				.word(self.version_hash)
				.address(self.verifying_contract)
				.hash(),
		}
	}
}

/// `keccak256(0x1901 ‖ domainSeparator ‖ structHash)`.
pub fn signing_digest(domain: &DomainSeparator, struct_hash: B256) -> B256 {
	let mut buf = [0u8; 66];
	buf[0] = 0x19;
	buf[1] = 0x01;
	buf[2..34].copy_from_slice(domain.separator().as_slice());
	buf[34..].copy_from_slice(struct_hash.as_slice());
	keccak256(buf)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pinned_hashes_match_their_preimages() {
		assert_eq!(
			keccak256(
				"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)"
			),
			DOMAIN_TYPEHASH
		);
		assert_eq!(
			keccak256("EIP712Domain(string name,string version,address verifyingContract)"),
			DOMAIN_TYPEHASH_SANS_CHAIN_ID
		);
		assert_eq!(keccak256("The Compact"), COMPACT_NAME_HASH);
		assert_eq!(keccak256("1"), COMPACT_VERSION_HASH);
		assert_eq!(keccak256("Emissary"), EMISSARY_NAME_HASH);
		assert_eq!(keccak256("0.0.1"), EMISSARY_VERSION_HASH);
	}

	#[test]
	fn test_with_and_without_chain_id() {
		let with_chain = DomainSeparator::compact(COMPACT_ADDRESS, U256::from(1u64));

		assert_eq!(
			with_chain.separator(),
			b256!("b83744a71d4ea6f7942cc1e9c6f6d4a609f01e3baf8da5369a7ab479f2d4cef4")
		);
		assert_eq!(
			with_chain.sans_chain_id().separator(),
			b256!("4eb40c2158dca3c5db1da5352564dad6227c96008508f054ee9f4101170dafc3")
		);
		assert_eq!(
			DomainSeparator::emissary(EMISSARY_ADDRESS).separator(),
			b256!("95f3e067988615ce1e2598ccdfff92071b9c756e096444a457ac14e6946d4081")
		);
	}

	#[test]
	fn test_separator_depends_on_chain() {
		let mainnet = DomainSeparator::compact(COMPACT_ADDRESS, U256::from(1u64));
		let base = DomainSeparator::compact(COMPACT_ADDRESS, U256::from(8453u64));
		assert_ne!(mainnet.separator(), base.separator());
	}
}
