//! Packed validator signatures.
//!
//! A smart account routes a signature to the validator module named in its
//! first 20 bytes. Emissary-enabled validators also take a one-byte config id
//! after the address. Whether that byte is present depends on the installed
//! module, so decoding needs the layout from the caller.

use crate::AccountError;
use alloy::primitives::{address, Address, Bytes, Signature, U256};
use alloy::sol_types::SolValue;

/// Ownable validator module.
pub const DEFAULT_VALIDATOR: Address = address!("0000000000E9E6E96Bcaa3c113187CdB7E38AED9");
pub const DEFAULT_CONFIG_ID: u8 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureLayout {
	Plain,
	WithConfigId,
}

impl SignatureLayout {
	pub fn header_len(self) -> usize {
		match self {
			Self::Plain => 20,
			Self::WithConfigId => 21,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSignature {
	pub validator: Address,
	pub config_id: Option<u8>,
	pub signature: Bytes,
}

impl PackedSignature {
	pub fn new(validator: Address, config_id: Option<u8>, signature: Bytes) -> Self {
		Self {
			validator,
			config_id,
			signature,
		}
	}

	pub fn layout(&self) -> SignatureLayout {
		if self.config_id.is_some() {
			SignatureLayout::WithConfigId
		} else {
			SignatureLayout::Plain
		}
	}

	/// `validator ‖ [config id] ‖ signature`.
	pub fn encode(&self) -> Bytes {
		let mut out = Vec::with_capacity(self.layout().header_len() + self.signature.len());
		out.extend_from_slice(self.validator.as_slice());
		if let Some(config_id) = self.config_id {
			out.push(config_id);
		}
		out.extend_from_slice(&self.signature);
		out.into()
	}

	pub fn decode(bytes: &[u8], layout: SignatureLayout) -> Result<Self, AccountError> {
		let header = layout.header_len();
		if bytes.len() < header {
			return Err(AccountError::InvalidSignature(format!(
				"expected at least {} bytes, got {}",
				header,
				bytes.len()
			)));
		}
		let config_id = match layout {
			SignatureLayout::Plain => None,
			SignatureLayout::WithConfigId => Some(bytes[20]),
		};
		Ok(Self {
			validator: Address::from_slice(&bytes[..20]),
			config_id,
			signature: Bytes::copy_from_slice(&bytes[header..]),
		})
	}
}

/// Concatenated 65-byte `r ‖ s ‖ v` owner signatures.
pub fn ownable_signature(signatures: &[Signature]) -> Bytes {
	signatures
		.iter()
		.flat_map(|signature| signature.as_bytes())
		.collect::<Vec<u8>>()
		.into()
}

/// Install data of the ownable validator: `abi.encode(threshold, owners)`
/// with the owners in ascending order.
pub fn ownable_validator_init_data(threshold: u64, owners: &[Address]) -> Bytes {
	let mut owners = owners.to_vec();
	owners.sort();
	(U256::from(threshold), owners).abi_encode_params().into()
}
