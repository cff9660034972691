//! Witness shape: the mandate is appended to the Compact's own type string.

use super::target::concat_op_list;
use crate::hasher::{Layout, StructHasher};
use crate::model::{Intent, SettlementLayer};
use crate::schema::{IntentSchema, WITNESS_TYPEHASHES};
use alloy::primitives::{Address, B256};

static LAYOUT: Layout = Layout {
	typehashes: &WITNESS_TYPEHASHES,
	op_list: concat_op_list,
	claim_proofer: SettlementLayer::claim_proofer,
};

pub struct WitnessHasher {
	verifying_contract: Address,
}

impl WitnessHasher {
	pub fn new(verifying_contract: Address) -> Self {
		Self { verifying_contract }
	}
}

impl StructHasher for WitnessHasher {
	fn schema(&self) -> IntentSchema {
		IntentSchema::Witness
	}

	fn verifying_contract(&self) -> Address {
		self.verifying_contract
	}

	fn hash_intent(&self, intent: &Intent) -> B256 {
		LAYOUT.hash_intent(intent)
	}
}
