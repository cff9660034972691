//! Execution-list shape.
//!
//! Op lists are hashed as `abi.encode(bytes32[])`, token outputs carry their
//! own typehash and the claim proofer slot is always the zero address.

use crate::encode::hash_abi_array;
use crate::hasher::{Layout, StructHasher};
use crate::model::{Intent, SettlementLayer};
use crate::schema::{IntentSchema, EXECS_TYPEHASHES, NO_OP_HASH};
use alloy::primitives::{Address, B256};

/// Hash of an empty execution list. Equal to `keccak256("")`.
pub const NO_EXEC_HASH: B256 = NO_OP_HASH;

fn abi_op_list(hashes: &[B256]) -> B256 {
	if hashes.is_empty() {
		return NO_EXEC_HASH;
	}
	hash_abi_array(hashes)
}

fn no_claim_proofer(_: SettlementLayer) -> Address {
	Address::ZERO
}

static LAYOUT: Layout = Layout {
	typehashes: &EXECS_TYPEHASHES,
	op_list: abi_op_list,
	claim_proofer: no_claim_proofer,
};

pub struct ExecsHasher {
	verifying_contract: Address,
}

impl ExecsHasher {
	pub fn new(verifying_contract: Address) -> Self {
		Self { verifying_contract }
	}
}

impl StructHasher for ExecsHasher {
	fn schema(&self) -> IntentSchema {
		IntentSchema::Execs
	}

	fn verifying_contract(&self) -> Address {
		self.verifying_contract
	}

	fn hash_intent(&self, intent: &Intent) -> B256 {
		LAYOUT.hash_intent(intent)
	}
}
