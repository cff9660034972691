//! Scripted orchestrator and fixtures shared by the engine tests.

use crate::engine::{EngineBuilder, IntentEngine};
use crate::utils::unix_now;
use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;
use intent_config::{ChainRegistry, Config};
use intent_orchestrator::{OrchestratorError, OrchestratorInterface};
use intent_types::{
	BundleId, BundleResult, BundleStatus, ConfigSchema, IntentOp, RouteRequest, RouteResponse,
	SignedIntentOp, SimulationResponse, ValidationError,
};
use serde_json::json;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Anvil's first development key and its address.
pub const OWNER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const SMART_ACCOUNT: Address = address!("00000000000000000000000000000000000c0ffe");

const CHAINS: &str = r#"
[[chains]]
name = "Base"
chain_id = 8453

[[chains.tokens]]
symbol = "USDC"
address = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
decimals = 6

[[chains.tokens]]
symbol = "ETH"
address = "0x0000000000000000000000000000000000000000"
decimals = 18
native = true

[[chains]]
name = "Optimism"
chain_id = 10

[[chains.tokens]]
symbol = "USDC"
address = "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"
decimals = 6

[[chains.tokens]]
symbol = "ETH"
address = "0x0000000000000000000000000000000000000000"
decimals = 18
native = true

[[chains]]
name = "Arbitrum One"
chain_id = 42161

[[chains.tokens]]
symbol = "USDC"
address = "0xaf88d065e77c8cC2239327C5EDb3A432268e5831"
decimals = 6

[[chains.tokens]]
symbol = "ETH"
address = "0x0000000000000000000000000000000000000000"
decimals = 18
native = true
"#;

/// Engine config with a mock orchestrator, the development key and fast polling.
pub fn test_config(extra: &str) -> Config {
	toml::from_str(&format!(
		r#"
[orchestrator]
implementation = "mock"

[account]
implementation = "local"

[account.config]
private_key = "{}"
address = "{}"

[tracking]
poll_interval_ms = 5
max_wait_ms = 2000
{}
{}"#,
		OWNER_KEY, SMART_ACCOUNT, extra, CHAINS
	))
	.unwrap()
}

pub fn registry() -> ChainRegistry {
	ChainRegistry::from_config(&test_config("").chains).unwrap()
}

pub fn engine_with(config: Config, state: Arc<MockState>) -> IntentEngine {
	EngineBuilder::new(config)
		.with_account_factory("local", intent_account::implementations::local::create_account)
		.with_orchestrator_factory("mock", move |_| {
			Ok(Box::new(MockOrchestrator {
				state: state.clone(),
			}) as Box<dyn OrchestratorInterface>)
		})
		.build()
		.unwrap()
}

/// What the mock orchestrator returns and what it has seen.
pub struct MockState {
	pub settlement: String,
	pub expires: AtomicU64,
	/// Route requests for this destination chain fail with HTTP 500.
	pub fail_destination: AtomicU64,
	pub routes: Mutex<Vec<RouteRequest>>,
	pub submitted: Mutex<Vec<SignedIntentOp>>,
	pub simulated: AtomicU32,
	/// Status polls per bundle id; odd polls report completion.
	pub status_polls: Mutex<HashMap<String, u32>>,
}

impl MockState {
	pub fn new(settlement: &str) -> Arc<Self> {
		Arc::new(Self {
			settlement: settlement.to_string(),
			expires: AtomicU64::new(unix_now() + 3_600),
			fail_destination: AtomicU64::new(0),
			routes: Mutex::new(Vec::new()),
			submitted: Mutex::new(Vec::new()),
			simulated: AtomicU32::new(0),
			status_polls: Mutex::new(HashMap::new()),
		})
	}

	pub fn route_count(&self) -> usize {
		self.routes.lock().unwrap().len()
	}

	pub fn submit_count(&self) -> usize {
		self.submitted.lock().unwrap().len()
	}
}

struct NoSchema;

impl ConfigSchema for NoSchema {
	fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
		Ok(())
	}
}

pub struct MockOrchestrator {
	state: Arc<MockState>,
}

impl MockOrchestrator {
	fn intent_op(&self, request: &RouteRequest) -> IntentOp {
		let expires = self.state.expires.load(Ordering::SeqCst).to_string();
		let origin_chain = request
			.account_access_list
			.first()
			.map(|entry| entry.chain_id)
			.unwrap_or(request.destination_chain_id);
		let token_out: Vec<[String; 2]> = request
			.token_requests
			.iter()
			.map(|token| {
				[
					U256::from_be_slice(token.token_address.as_slice()).to_string(),
					token.amount.to_string(),
				]
			})
			.collect();

		serde_json::from_value(json!({
			"sponsor": request.account.address,
			"nonce": "7",
			"expires": expires,
			"elements": [{
				"arbiter": "0x0000000000000000000000000000000000000004",
				"chainId": origin_chain.to_string(),
				"idsAndAmounts": [["7237005577332262213973186563042994240829374041602535252466099000494570602501", "50"]],
				"mandate": {
					"recipient": request.account.address,
					"tokenOut": token_out,
					"destinationChainId": request.destination_chain_id.to_string(),
					"fillDeadline": expires,
					"preClaimOps": [],
					"destinationOps": request.destination_executions,
					"qualifier": { "settlementSystem": self.state.settlement, "encodedVal": "0x" }
				}
			}],
			"serverNonce": "opaque"
		}))
		.unwrap()
	}
}

#[async_trait]
impl OrchestratorInterface for MockOrchestrator {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(NoSchema)
	}

	async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, OrchestratorError> {
		self.state.routes.lock().unwrap().push(request.clone());
		if request.destination_chain_id == self.state.fail_destination.load(Ordering::SeqCst) {
			return Err(OrchestratorError::Http {
				status: 500,
				body: "no route".to_string(),
			});
		}
		Ok(RouteResponse {
			intent_op: self.intent_op(request),
			intent_cost: json!({}),
		})
	}

	async fn submit(&self, signed: &SignedIntentOp) -> Result<BundleId, OrchestratorError> {
		let mut submitted = self.state.submitted.lock().unwrap();
		submitted.push(signed.clone());
		Ok(BundleId::new(submitted.len().to_string()))
	}

	async fn simulate(
		&self,
		_signed: &SignedIntentOp,
	) -> Result<SimulationResponse, OrchestratorError> {
		self.state.simulated.fetch_add(1, Ordering::SeqCst);
		Ok(SimulationResponse {
			result: json!({ "success": true }),
		})
	}

	async fn bundle_status(&self, id: &BundleId) -> Result<BundleResult, OrchestratorError> {
		let polls = {
			let mut status_polls = self.state.status_polls.lock().unwrap();
			let count = status_polls.entry(id.as_str().to_string()).or_insert(0);
			*count += 1;
			*count - 1
		};
		Ok(BundleResult {
			status: if polls % 2 == 0 {
				BundleStatus::Pending
			} else {
				BundleStatus::Completed
			},
			claims: vec![],
			destination_chain_id: None,
			fill_transaction_hash: None,
			fill_timestamp: None,
		})
	}
}
