//! Closed intent model consumed by the hashers.
//!
//! The routed intent arrives as loosely typed JSON ([`IntentOp`]). Converting
//! it into an [`Intent`] is the point where unsupported input is rejected, so
//! hashing itself cannot fail.

use crate::packed::PackedTokenId;
use crate::CompactError;
use alloy::primitives::{address, Address, Bytes, U256};
use intent_types::{IntentElement, IntentOp, WireOp, WireQualifier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contract that proves a fill back to the origin chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementLayer {
	SameChain,
	Across,
	Eco,
}

impl SettlementLayer {
	pub fn claim_proofer(self) -> Address {
		match self {
			Self::SameChain => Address::ZERO,
			Self::Across => address!("1636b30481Db91Bbc5818e65d3962838BdCd5569"),
			Self::Eco => address!("0746dc2CdcbF6270c9C53D1C4923604448cf3e94"),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::SameChain => "SAME_CHAIN",
			Self::Across => "ACROSS",
			Self::Eco => "ECO",
		}
	}
}

impl FromStr for SettlementLayer {
	type Err = CompactError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"SAME_CHAIN" => Ok(Self::SameChain),
			"ACROSS" => Ok(Self::Across),
			"ECO" => Ok(Self::Eco),
			other => Err(CompactError::UnsupportedSettlementLayer(other.to_string())),
		}
	}
}

impl fmt::Display for SettlementLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A `(lock id, amount)` pair; input commitments and outputs share the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment {
	pub id: PackedTokenId,
	pub amount: U256,
}

impl From<&[intent_types::DecimalU256; 2]> for Commitment {
	fn from(pair: &[intent_types::DecimalU256; 2]) -> Self {
		Self {
			id: PackedTokenId::from_u256(pair[0].get()),
			amount: pair[1].get(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
	pub to: Address,
	pub value: U256,
	pub data: Bytes,
}

impl From<&WireOp> for Op {
	fn from(op: &WireOp) -> Self {
		Self {
			to: op.to,
			value: op.value.get(),
			data: op.data.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	pub recipient: Address,
	pub token_out: Vec<Commitment>,
	pub target_chain: U256,
	pub fill_expiry: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mandate {
	pub target: Target,
	pub origin_ops: Vec<Op>,
	pub dest_ops: Vec<Op>,
	/// Opaque; only its hash is signed.
	pub qualifier: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub arbiter: Address,
	pub chain_id: U256,
	pub commitments: Vec<Commitment>,
	pub mandate: Mandate,
}

/// A multichain compact. Always holds at least one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
	pub sponsor: Address,
	pub nonce: U256,
	pub expires: U256,
	pub settlement_layer: SettlementLayer,
	elements: Vec<Element>,
}

impl Intent {
	pub fn new(
		sponsor: Address,
		nonce: U256,
		expires: U256,
		settlement_layer: SettlementLayer,
		elements: Vec<Element>,
	) -> Result<Self, CompactError> {
		if elements.is_empty() {
			return Err(CompactError::EmptyIntent);
		}
		Ok(Self {
			sponsor,
			nonce,
			expires,
			settlement_layer,
			elements,
		})
	}

	pub fn elements(&self) -> &[Element] {
		&self.elements
	}

	pub fn elements_mut(&mut self) -> &mut [Element] {
		&mut self.elements
	}

	/// The element whose chain supplies the signing domain.
	pub fn notarized_element(&self) -> &Element {
		&self.elements[0]
	}

	pub fn notarized_chain_id(&self) -> U256 {
		self.notarized_element().chain_id
	}
}

fn qualifier_bytes(qualifier: Option<&WireQualifier>) -> Bytes {
	qualifier
		.map(|qualifier| qualifier.encoded_val.clone())
		.unwrap_or_default()
}

impl From<&IntentElement> for Element {
	fn from(element: &IntentElement) -> Self {
		let mandate = &element.mandate;
		Self {
			arbiter: element.arbiter,
			chain_id: element.chain_id.get(),
			commitments: element.ids_and_amounts.iter().map(Commitment::from).collect(),
			mandate: Mandate {
				target: Target {
					recipient: mandate.recipient,
					token_out: mandate.token_out.iter().map(Commitment::from).collect(),
					target_chain: mandate.destination_chain_id.get(),
					fill_expiry: mandate.fill_deadline.get(),
				},
				origin_ops: mandate.pre_claim_ops.iter().map(Op::from).collect(),
				dest_ops: mandate.destination_ops.iter().map(Op::from).collect(),
				qualifier: qualifier_bytes(mandate.qualifier.as_ref()),
			},
		}
	}
}

impl TryFrom<&IntentOp> for Intent {
	type Error = CompactError;

	fn try_from(op: &IntentOp) -> Result<Self, Self::Error> {
		let notarized = op.notarized_element().ok_or(CompactError::EmptyIntent)?;
		let settlement_layer = notarized
			.mandate
			.qualifier
			.as_ref()
			.ok_or(CompactError::MissingQualifier)?
			.settlement_system
			.parse::<SettlementLayer>()?;

		Intent::new(
			op.sponsor,
			op.nonce.get(),
			op.expires.get(),
			settlement_layer,
			op.elements.iter().map(Element::from).collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn route_output(settlement: &str) -> IntentOp {
		serde_json::from_value(json!({
			"sponsor": "0x0000000000000000000000000000000000000006",
			"nonce": "1",
			"expires": "2000",
			"elements": [
				{
					"arbiter": "0x0000000000000000000000000000000000000004",
					"chainId": "1",
					"idsAndAmounts": [["7237005577332262213973186563042994240829374041602535252466099000494570602501", "50"]],
					"mandate": {
						"recipient": "0x0000000000000000000000000000000000000001",
						"tokenOut": [["3", "100"]],
						"destinationChainId": "1",
						"fillDeadline": "1000",
						"preClaimOps": [],
						"destinationOps": [],
						"qualifier": { "settlementSystem": settlement, "encodedVal": "0xdeadbeef" }
					}
				},
				{
					"arbiter": "0x0000000000000000000000000000000000000004",
					"chainId": "10",
					"idsAndAmounts": [],
					"mandate": {
						"recipient": "0x0000000000000000000000000000000000000001",
						"tokenOut": [],
						"destinationChainId": "1",
						"fillDeadline": "1000"
					}
				}
			]
		}))
		.unwrap()
	}

	#[test]
	fn test_converts_route_output() {
		let intent = Intent::try_from(&route_output("ACROSS")).unwrap();

		assert_eq!(intent.settlement_layer, SettlementLayer::Across);
		assert_eq!(intent.elements().len(), 2);
		assert_eq!(intent.notarized_chain_id(), U256::from(1u64));

		let notarized = intent.notarized_element();
		let commitment = notarized.commitments[0];
		assert_eq!(
			commitment.id.token(),
			address!("0000000000000000000000000000000000000005")
		);
		assert_eq!(
			commitment.id.lock_tag().as_bytes().as_slice(),
			&[0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
		);
		assert_eq!(&notarized.mandate.qualifier[..], &[0xde, 0xad, 0xbe, 0xef]);
		// A non-notarized element without a qualifier hashes empty bytes.
		assert!(intent.elements()[1].mandate.qualifier.is_empty());
	}

	#[test]
	fn test_rejects_unsupported_settlement_layer() {
		let err = Intent::try_from(&route_output("RELAY")).unwrap_err();
		assert!(matches!(err, CompactError::UnsupportedSettlementLayer(layer) if layer == "RELAY"));
	}

	#[test]
	fn test_rejects_empty_and_unqualified_intents() {
		let mut op = route_output("SAME_CHAIN");
		op.elements[0].mandate.qualifier = None;
		assert!(matches!(
			Intent::try_from(&op),
			Err(CompactError::MissingQualifier)
		));

		op.elements.clear();
		assert!(matches!(Intent::try_from(&op), Err(CompactError::EmptyIntent)));
	}

	#[test]
	fn test_claim_proofers() {
		assert_eq!(SettlementLayer::SameChain.claim_proofer(), Address::ZERO);
		assert_eq!(
			"ECO".parse::<SettlementLayer>().unwrap().claim_proofer(),
			address!("0746dc2CdcbF6270c9C53D1C4923604448cf3e94")
		);
	}
}
