//! Intent descriptions and their resolution into route requests.
//!
//! An [`IntentRequest`] names chains and tokens the way a person would
//! ("Base", "USDC", "1.5"). Resolution against the [`ChainRegistry`] turns it
//! into the orchestrator's [`RouteRequest`] before any network call is made,
//! so an unknown chain or token fails early.

use crate::CoreError;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use intent_account::SmartAccount;
use intent_config::{ChainRegistry, RegistryError, Token};
use intent_types::{
	AccessListEntry, AccountDescriptor, DecimalU256, RouteRequest, TokenRequest, WireOp,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

sol! {
	interface IERC20 {
		function transfer(address to, uint256 amount) external returns (bool);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
	pub target_chain: String,
	pub target_tokens: Vec<TargetToken>,
	#[serde(default)]
	pub source_chains: Vec<String>,
	#[serde(default)]
	pub source_tokens: Vec<String>,
	pub token_recipient: Address,
}

/// A token to deliver, with its amount in human units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetToken {
	pub symbol: String,
	pub amount: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntentFile {
	List {
		#[serde(rename = "intentList")]
		intent_list: Vec<IntentRequest>,
	},
	Single(IntentRequest),
}

/// Parses a replay file holding one request or `{ "intentList": [...] }`.
pub fn parse_intent_file(content: &str) -> Result<Vec<IntentRequest>, serde_json::Error> {
	Ok(match serde_json::from_str::<IntentFile>(content)? {
		IntentFile::List { intent_list } => intent_list,
		IntentFile::Single(request) => vec![request],
	})
}

/// Reads replay files in order and concatenates their requests.
pub async fn load_intent_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<IntentRequest>, CoreError> {
	let mut requests = Vec::new();
	for path in paths {
		let path = path.as_ref();
		let file_error = |message: String| CoreError::IntentFile {
			path: path.display().to_string(),
			message,
		};
		let content = tokio::fs::read_to_string(path)
			.await
			.map_err(|e| file_error(e.to_string()))?;
		requests.extend(parse_intent_file(&content).map_err(|e| file_error(e.to_string()))?);
	}
	Ok(requests)
}

/// The target-chain call that hands `amount` of `token` to `recipient`.
pub fn transfer_execution(token: &Token, recipient: Address, amount: U256) -> WireOp {
	if token.native {
		WireOp {
			to: recipient,
			value: amount.into(),
			data: Bytes::new(),
			extra: Default::default(),
		}
	} else {
		WireOp {
			to: token.address,
			value: DecimalU256::ZERO,
			data: IERC20::transferCall {
				to: recipient,
				amount,
			}
			.abi_encode()
			.into(),
			extra: Default::default(),
		}
	}
}

impl IntentRequest {
	/// Resolves names and amounts against `registry` for `account`.
	///
	/// The routed funds land in the account; the destination executions then
	/// forward each token to `token_recipient`. The access list is every
	/// source chain paired with every source token.
	pub fn to_route_request(
		&self,
		registry: &ChainRegistry,
		account: &SmartAccount,
	) -> Result<RouteRequest, RegistryError> {
		let target = registry.chain(&self.target_chain)?;

		let mut token_requests = Vec::with_capacity(self.target_tokens.len());
		let mut destination_executions = Vec::with_capacity(self.target_tokens.len());
		for requested in &self.target_tokens {
			let token = target.token(&requested.symbol)?;
			let amount = token.parse_amount(&requested.amount)?;
			token_requests.push(TokenRequest {
				token_address: token.address,
				amount: amount.into(),
			});
			destination_executions.push(transfer_execution(token, self.token_recipient, amount));
		}

		let mut account_access_list = Vec::new();
		for chain_name in &self.source_chains {
			let chain = registry.chain(chain_name)?;
			for symbol in &self.source_tokens {
				account_access_list.push(AccessListEntry {
					chain_id: chain.chain_id,
					token_address: chain.token(symbol)?.address,
				});
			}
		}

		Ok(RouteRequest {
			account: AccountDescriptor {
				address: account.address,
				account_type: account.account_type.clone(),
				setup_ops: vec![],
			},
			destination_chain_id: target.chain_id,
			token_requests,
			recipient: account.address,
			account_access_list,
			destination_executions,
			destination_gas_units: None,
		})
	}
}
