//! Lifecycle status of a submitted intent operation.

use crate::DecimalU256;
use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by `GET /intent-operation/{id}/status`.
///
/// Any string the client does not know maps to [`BundleStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleStatus {
	Pending,
	PartiallyCompleted,
	Preconfirmed,
	Filled,
	Completed,
	Failed,
	Expired,
	Claimed,
	#[serde(other)]
	Unknown,
}

impl BundleStatus {
	/// Statuses the tracker keeps polling on.
	pub fn keeps_polling(self) -> bool {
		matches!(
			self,
			Self::Pending | Self::PartiallyCompleted | Self::Preconfirmed | Self::Filled
		)
	}

	/// The protocol's terminal outcomes.
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Completed | Self::Failed | Self::Expired)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "PENDING",
			Self::PartiallyCompleted => "PARTIALLY_COMPLETED",
			Self::Preconfirmed => "PRECONFIRMED",
			Self::Filled => "FILLED",
			Self::Completed => "COMPLETED",
			Self::Failed => "FAILED",
			Self::Expired => "EXPIRED",
			Self::Claimed => "CLAIMED",
			Self::Unknown => "UNKNOWN",
		}
	}
}

impl fmt::Display for BundleStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Snapshot of a bundle: one claim per source chain and the fill on the target chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResult {
	pub status: BundleStatus,
	#[serde(default)]
	pub claims: Vec<ClaimResult>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub destination_chain_id: Option<DecimalU256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fill_transaction_hash: Option<B256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fill_timestamp: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResult {
	pub chain_id: DecimalU256,
	pub status: BundleStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deposit_id: Option<DecimalU256>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub claim_timestamp: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub claim_transaction_hash: Option<B256>,
}
