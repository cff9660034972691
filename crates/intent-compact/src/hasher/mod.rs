//! Struct hashers, one per [`IntentSchema`].
//!
//! All three schemas encode the same tree of structs with the same word
//! encoder. They differ only in the typehashes, in how an `Op[]` is folded
//! into one word, and in whether the claim proofer is signed. Each
//! implementation pins those three choices in a [`Layout`].

use crate::domain::{signing_digest, DomainSeparator, COMPACT_ADDRESS};
use crate::encode::{hash_concat, Words};
use crate::model::{Commitment, Element, Intent, Op, SettlementLayer};
use crate::schema::{IntentSchema, Typehashes};
use crate::CompactError;
use alloy::primitives::{keccak256, Address, B256};

pub mod implementations {
	pub mod execs;
	pub mod target;
	pub mod witness;
}

use implementations::{execs::ExecsHasher, target::TargetHasher, witness::WitnessHasher};

pub trait StructHasher: Send + Sync {
	fn schema(&self) -> IntentSchema;

	/// The settlement contract the digest is bound to.
	fn verifying_contract(&self) -> Address;

	fn hash_intent(&self, intent: &Intent) -> B256;

	/// The compact domain on the notarized element's chain.
	fn domain(&self, intent: &Intent) -> DomainSeparator {
		DomainSeparator::compact(self.verifying_contract(), intent.notarized_chain_id())
	}

	fn signing_digest(&self, intent: &Intent) -> B256 {
		signing_digest(&self.domain(intent), self.hash_intent(intent))
	}
}

/// The per-schema choices of the shared encoder.
pub(crate) struct Layout {
	pub typehashes: &'static Typehashes,
	pub op_list: fn(&[B256]) -> B256,
	pub claim_proofer: fn(SettlementLayer) -> Address,
}

pub(crate) fn hash_lock(typehash: B256, commitment: &Commitment) -> B256 {
	Words::with_typehash(typehash)
		.fixed(commitment.id.lock_tag().as_bytes())
		.address(commitment.id.token())
		.uint(commitment.amount)
		.hash()
}

pub(crate) fn hash_token(typehash: B256, commitment: &Commitment) -> B256 {
	Words::with_typehash(typehash)
		.address(commitment.id.token())
		.uint(commitment.amount)
		.hash()
}

pub(crate) fn hash_op(typehash: B256, op: &Op) -> B256 {
	Words::with_typehash(typehash)
		.address(op.to)
		.uint(op.value)
		.word(keccak256(&op.data))
		.hash()
}

impl Layout {
	fn ops(&self, ops: &[Op]) -> B256 {
		let hashes: Vec<B256> = ops
			.iter()
			.map(|op| hash_op(self.typehashes.op, op))
			.collect();
		(self.op_list)(&hashes)
	}

	fn element(&self, element: &Element, claim_proofer: Address) -> B256 {
		let hashes = self.typehashes;
		let mandate = &element.mandate;
		let target = &mandate.target;

		let tokens: Vec<B256> = target
			.token_out
			.iter()
			.map(|token| hash_token(hashes.token, token))
			.collect();
		let target_hash = Words::with_typehash(hashes.target)
			.address(target.recipient)
			.word(hash_concat(&tokens))
			.uint(target.target_chain)
			.uint(target.fill_expiry)
			.address(claim_proofer)
			.hash();

		let mandate_hash = Words::with_typehash(hashes.mandate)
			.word(target_hash)
			.word(self.ops(&mandate.origin_ops))
			.word(self.ops(&mandate.dest_ops))
			.word(keccak256(&mandate.qualifier))
			.hash();

		let locks: Vec<B256> = element
			.commitments
			.iter()
			.map(|commitment| hash_lock(hashes.lock, commitment))
			.collect();

		Words::with_typehash(hashes.element)
			.address(element.arbiter)
			.uint(element.chain_id)
			.word(hash_concat(&locks))
			.word(mandate_hash)
			.hash()
	}

	pub(crate) fn hash_intent(&self, intent: &Intent) -> B256 {
		let claim_proofer = (self.claim_proofer)(intent.settlement_layer);
		let elements: Vec<B256> = intent
			.elements()
			.iter()
			.map(|element| self.element(element, claim_proofer))
			.collect();

		Words::with_typehash(self.typehashes.compact)
			.address(intent.sponsor)
			.uint(intent.nonce)
			.uint(intent.expires)
			.word(hash_concat(&elements))
			.hash()
	}
}

/// Builds the hasher for `schema` bound to the canonical Compact deployment.
pub fn create_hasher(schema: IntentSchema) -> Result<Box<dyn StructHasher>, CompactError> {
	create_hasher_with_contract(schema, COMPACT_ADDRESS)
}

/// Runs the schema self-check, then builds its hasher.
pub fn create_hasher_with_contract(
	schema: IntentSchema,
	verifying_contract: Address,
) -> Result<Box<dyn StructHasher>, CompactError> {
	schema.verify()?;
	Ok(match schema {
		IntentSchema::Witness => Box::new(WitnessHasher::new(verifying_contract)),
		IntentSchema::Execs => Box::new(ExecsHasher::new(verifying_contract)),
		IntentSchema::Target => Box::new(TargetHasher::new(verifying_contract)),
	})
}

#[cfg(test)]
pub(crate) mod fixtures {
	use crate::lock_tag::LockTag;
	use crate::model::{Commitment, Element, Intent, Mandate, Op, SettlementLayer, Target};
	use crate::packed::PackedTokenId;
	use alloy::primitives::{address, fixed_bytes, Address, Bytes, U256};

	fn addr(last: u8) -> Address {
		let mut bytes = [0u8; 20];
		bytes[19] = last;
		Address::from(bytes)
	}

	fn op(to: u8) -> Op {
		Op {
			to: addr(to),
			value: U256::ZERO,
			data: Bytes::new(),
		}
	}

	/// The single-element intent used for every pinned vector.
	pub fn example_intent(settlement_layer: SettlementLayer, qualifier: Bytes) -> Intent {
		let lock = Commitment {
			id: PackedTokenId::new(
				LockTag::from_bytes(fixed_bytes!("100000000000000000000000")),
				address!("0000000000000000000000000000000000000005"),
			),
			amount: U256::from(50u64),
		};
		let token_out = Commitment {
			id: PackedTokenId::from_u256(U256::from(3u64)),
			amount: U256::from(100u64),
		};
		let element = Element {
			arbiter: addr(4),
			chain_id: U256::from(1u64),
			commitments: vec![lock],
			mandate: Mandate {
				target: Target {
					recipient: addr(1),
					token_out: vec![token_out],
					target_chain: U256::from(1u64),
					fill_expiry: U256::from(1000u64),
				},
				origin_ops: vec![op(1)],
				dest_ops: vec![op(2)],
				qualifier,
			},
		};

		Intent::new(
			addr(6),
			U256::from(1u64),
			U256::from(2000u64),
			settlement_layer,
			vec![element],
		)
		.unwrap()
	}

	pub fn same_chain_example() -> Intent {
		example_intent(SettlementLayer::SameChain, Bytes::new())
	}
}
