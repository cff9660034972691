//! Request and response bodies of the orchestrator endpoints.

use crate::{DecimalU256, IntentOp, SignedIntentOp, WireOp};
use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Body of `POST /intents/route`: what the caller wants, before routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
	pub account: AccountDescriptor,
	pub destination_chain_id: u64,
	pub token_requests: Vec<TokenRequest>,
	pub recipient: Address,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub account_access_list: Vec<AccessListEntry>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub destination_executions: Vec<WireOp>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub destination_gas_units: Option<DecimalU256>,
}

/// The smart account the intent is routed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDescriptor {
	pub address: Address,
	pub account_type: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub setup_ops: Vec<SetupOp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupOp {
	pub to: Address,
	pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
	pub token_address: Address,
	pub amount: DecimalU256,
}

/// A source chain/token pair the route may draw funds from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
	pub chain_id: u64,
	pub token_address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
	pub intent_op: IntentOp,
	/// Cost breakdown, passed through untouched.
	#[serde(default)]
	pub intent_cost: Value,
}

/// Body of `POST /intent-operations` and `POST /intent-operations/simulate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentOperationRequest<'a> {
	pub signed_intent_op: &'a SignedIntentOp,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitResponse {
	pub result: SubmitResult,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitResult {
	pub id: BundleId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationResponse {
	/// Simulation trace; its layout belongs to the service.
	#[serde(default)]
	pub result: Value,
}

/// Opaque identifier the service assigns to a submitted intent operation.
///
/// Sent as a string-encoded integer; a bare JSON number is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BundleId(pub String);

impl BundleId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for BundleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for BundleId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum RawId {
			Text(String),
			Number(u64),
		}

		Ok(match RawId::deserialize(deserializer)? {
			RawId::Text(text) => BundleId(text),
			RawId::Number(number) => BundleId(number.to_string()),
		})
	}
}
