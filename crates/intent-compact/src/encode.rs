//! ABI word encoding for static struct members.
//!
//! Every struct hashed by the settlement contract is a flat sequence of
//! 32-byte words (dynamic members are pre-hashed), so `abi.encode` reduces to
//! left-padding each value to a word.

use alloy::primitives::{keccak256, Address, FixedBytes, B256, U256};

/// Accumulates 32-byte words and hashes them.
#[derive(Debug, Default, Clone)]
pub struct Words {
	buf: Vec<u8>,
}

impl Words {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_typehash(typehash: B256) -> Self {
		let mut words = Self {
			buf: Vec::with_capacity(32 * 8),
		};
		words.buf.extend_from_slice(typehash.as_slice());
		words
	}

	pub fn word(mut self, word: B256) -> Self {
		self.buf.extend_from_slice(word.as_slice());
		self
	}

	pub fn address(mut self, address: Address) -> Self {
		self.buf.extend_from_slice(&[0u8; 12]);
		self.buf.extend_from_slice(address.as_slice());
		self
	}

	pub fn uint(mut self, value: U256) -> Self {
		self.buf.extend_from_slice(&value.to_be_bytes::<32>());
		self
	}

	/// `bytesN` values are right-padded.
	pub fn fixed<const N: usize>(mut self, value: FixedBytes<N>) -> Self {
		self.buf.extend_from_slice(value.as_slice());
		self.buf.extend(std::iter::repeat(0u8).take(32 - N));
		self
	}

	pub fn len(&self) -> usize {
		self.buf.len() / 32
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	pub fn hash(&self) -> B256 {
		keccak256(&self.buf)
	}
}

/// `keccak256(abi.encodePacked(bytes32[]))`.
pub fn hash_concat(hashes: &[B256]) -> B256 {
	let mut buf = Vec::with_capacity(hashes.len() * 32);
	for hash in hashes {
		buf.extend_from_slice(hash.as_slice());
	}
	keccak256(buf)
}

/// `keccak256(abi.encode(bytes32[]))`: head offset, length, then the elements.
pub fn hash_abi_array(hashes: &[B256]) -> B256 {
	let words = hashes.iter().fold(
		Words::new()
			.uint(U256::from(32u64))
			.uint(U256::from(hashes.len())),
		|words, hash| words.word(*hash),
	);
	words.hash()
}
