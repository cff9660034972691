//! Client side of the orchestrator API.
//!
//! The orchestrator routes an intent description into a fully formed intent,
//! accepts the signed result and reports settlement progress. Everything the
//! client needs from it goes through [`OrchestratorInterface`].

use async_trait::async_trait;
use intent_types::{
	BundleId, BundleResult, ConfigSchema, RouteRequest, RouteResponse, SignedIntentOp,
	SimulationResponse,
};
use thiserror::Error;

pub mod implementations {
	pub mod http;
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
	#[error("Orchestrator returned HTTP {status}: {body}")]
	Http { status: u16, body: String },
	#[error("Network error: {0}")]
	Network(String),
	#[error("Failed to encode request: {0}")]
	Encode(String),
	#[error("Failed to decode response: {0}")]
	Decode(String),
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

#[async_trait]
pub trait OrchestratorInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// `POST /intents/route`
	async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, OrchestratorError>;

	/// `POST /intent-operations`
	async fn submit(&self, signed: &SignedIntentOp) -> Result<BundleId, OrchestratorError>;

	/// `POST /intent-operations/simulate`
	async fn simulate(
		&self,
		signed: &SignedIntentOp,
	) -> Result<SimulationResponse, OrchestratorError>;

	/// `GET /intent-operation/{id}/status`
	async fn bundle_status(&self, id: &BundleId) -> Result<BundleResult, OrchestratorError>;
}

pub struct OrchestratorService {
	provider: Box<dyn OrchestratorInterface>,
}

impl OrchestratorService {
	pub fn new(provider: Box<dyn OrchestratorInterface>) -> Self {
		Self { provider }
	}

	pub fn provider(&self) -> &dyn OrchestratorInterface {
		self.provider.as_ref()
	}

	pub async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, OrchestratorError> {
		self.provider.route(request).await
	}

	pub async fn submit(&self, signed: &SignedIntentOp) -> Result<BundleId, OrchestratorError> {
		self.provider.submit(signed).await
	}

	pub async fn simulate(
		&self,
		signed: &SignedIntentOp,
	) -> Result<SimulationResponse, OrchestratorError> {
		self.provider.simulate(signed).await
	}

	pub async fn bundle_status(&self, id: &BundleId) -> Result<BundleResult, OrchestratorError> {
		self.provider.bundle_status(id).await
	}
}
