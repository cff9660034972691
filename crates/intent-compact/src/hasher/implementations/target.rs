//! Current EIP-712 shape with a `Target` struct.

use crate::encode::hash_concat;
use crate::hasher::{Layout, StructHasher};
use crate::model::{Intent, SettlementLayer};
use crate::schema::{IntentSchema, NO_OP_HASH, TARGET_TYPEHASHES};
use alloy::primitives::{Address, B256};

/// An empty op list hashes to the pinned constant, never to a computed value.
pub(crate) fn concat_op_list(hashes: &[B256]) -> B256 {
	if hashes.is_empty() {
		return NO_OP_HASH;
	}
	hash_concat(hashes)
}

static LAYOUT: Layout = Layout {
	typehashes: &TARGET_TYPEHASHES,
	op_list: concat_op_list,
	claim_proofer: SettlementLayer::claim_proofer,
};

pub struct TargetHasher {
	verifying_contract: Address,
}

impl TargetHasher {
	pub fn new(verifying_contract: Address) -> Self {
		Self { verifying_contract }
	}
}

impl StructHasher for TargetHasher {
	fn schema(&self) -> IntentSchema {
		IntentSchema::Target
	}

	fn verifying_contract(&self) -> Address {
		self.verifying_contract
	}

	fn hash_intent(&self, intent: &Intent) -> B256 {
		LAYOUT.hash_intent(intent)
	}
}
