//! ERC-6909 resource lock ids.
//!
//! A lock id packs a 12-byte [`LockTag`] into the high 96 bits and the token
//! address into the low 160 bits of a `uint256`.

use crate::lock_tag::LockTag;
use alloy::primitives::{Address, FixedBytes, U256};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedTokenId(U256);

impl PackedTokenId {
	pub fn new(lock_tag: LockTag, token: Address) -> Self {
		let mut word = [0u8; 32];
		word[..12].copy_from_slice(lock_tag.as_bytes().as_slice());
		word[12..].copy_from_slice(token.as_slice());
		Self(U256::from_be_bytes(word))
	}

	pub fn from_u256(id: U256) -> Self {
		Self(id)
	}

	pub fn as_u256(&self) -> U256 {
		self.0
	}

	/// The high 12 bytes of the fixed-width word.
	pub fn lock_tag(&self) -> LockTag {
		let word = self.0.to_be_bytes::<32>();
		LockTag::from_bytes(FixedBytes::<12>::from_slice(&word[..12]))
	}

	/// The low 20 bytes of the fixed-width word.
	pub fn token(&self) -> Address {
		let word = self.0.to_be_bytes::<32>();
		Address::from_slice(&word[12..])
	}
}

impl From<U256> for PackedTokenId {
	fn from(id: U256) -> Self {
		Self(id)
	}
}

impl fmt::Display for PackedTokenId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
