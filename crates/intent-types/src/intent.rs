//! Intent operations as the orchestrator returns and accepts them.
//!
//! These are the loosely-specified JSON shapes. Fields the client does not
//! understand are kept in `extra` so a signed operation is sent back with
//! everything the route response contained.

use crate::DecimalU256;
use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fully routed intent, ready to be hashed and signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentOp {
	pub sponsor: Address,
	pub nonce: DecimalU256,
	pub expires: DecimalU256,
	pub elements: Vec<IntentElement>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl IntentOp {
	/// The first element; its chain supplies the signing domain.
	pub fn notarized_element(&self) -> Option<&IntentElement> {
		self.elements.first()
	}
}

/// One chain's part of an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentElement {
	pub arbiter: Address,
	pub chain_id: DecimalU256,
	/// `[packed token id, amount]` pairs.
	#[serde(default)]
	pub ids_and_amounts: Vec<[DecimalU256; 2]>,
	pub mandate: IntentMandate,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentMandate {
	pub recipient: Address,
	#[serde(default)]
	pub token_out: Vec<[DecimalU256; 2]>,
	pub destination_chain_id: DecimalU256,
	pub fill_deadline: DecimalU256,
	#[serde(default)]
	pub pre_claim_ops: Vec<WireOp>,
	#[serde(default)]
	pub destination_ops: Vec<WireOp>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub qualifier: Option<WireQualifier>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// A call executed on the origin chain before a claim or on the target chain at fill time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOp {
	pub to: Address,
	pub value: DecimalU256,
	#[serde(default)]
	pub data: Bytes,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQualifier {
	#[serde(alias = "settlementLayer")]
	pub settlement_system: String,
	#[serde(default)]
	pub encoded_val: Bytes,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// An intent operation with its origin and destination signatures attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIntentOp {
	#[serde(flatten)]
	pub intent_op: IntentOp,
	pub origin_signatures: Vec<Bytes>,
	pub destination_signature: Bytes,
}

impl SignedIntentOp {
	/// Broadcasts one packed signature to every element and to the destination.
	pub fn new(intent_op: IntentOp, packed_signature: Bytes) -> Self {
		let origin_signatures = vec![packed_signature.clone(); intent_op.elements.len()];
		Self {
			intent_op,
			origin_signatures,
			destination_signature: packed_signature,
		}
	}
}
