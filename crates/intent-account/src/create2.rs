//! Counterfactual address derivation.

use alloy::primitives::{keccak256, Address, B256, U256};

/// `last20(keccak256(0xff ‖ factory ‖ salt ‖ init_code_hash))`.
pub fn derive_address(factory: Address, salt: B256, init_code_hash: B256) -> Address {
	factory.create2(salt.0, init_code_hash.0)
}

pub fn derive_address_from_code(factory: Address, salt: B256, init_code: &[u8]) -> Address {
	derive_address(factory, salt, keccak256(init_code))
}

/// Salt a Safe proxy factory derives from the setup calldata and nonce.
pub fn safe_proxy_salt(initializer: &[u8], salt_nonce: U256) -> B256 {
	let mut buf = [0u8; 64];
	buf[..32].copy_from_slice(keccak256(initializer).as_slice());
	buf[32..].copy_from_slice(&salt_nonce.to_be_bytes::<32>());
	keccak256(buf)
}
