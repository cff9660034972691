//! Orchestrator client over HTTPS.
//!
//! Every request carries the `x-api-key` header. Outbound bodies go through
//! [`stringify_big_integers`] so no integer above 2^53 reaches the service as
//! a JSON number. Non-2xx responses are returned as
//! [`OrchestratorError::Http`] with the response body attached and are never
//! retried here.

use crate::{OrchestratorError, OrchestratorInterface};
use async_trait::async_trait;
use intent_types::{
	stringify_big_integers, BundleId, BundleResult, ConfigSchema, Environment, Field, FieldType,
	IntentOperationRequest, RouteRequest, RouteResponse, Schema, SignedIntentOp,
	SimulationResponse, SubmitResponse, ValidationError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Header the API key travels in.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Per-request timeout when `timeout_secs` is not configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Orchestrator reached over its REST API.
pub struct HttpOrchestrator {
	/// Shared connection pool with the configured timeout.
	client: reqwest::Client,
	/// Service root without a trailing slash; paths are appended to it.
	base_url: String,
	/// Value of the `x-api-key` header.
	api_key: String,
}

impl HttpOrchestrator {
	/// Creates a client for `base_url`. The timeout covers a whole request,
	/// body included.
	pub fn new(
		base_url: impl Into<String>,
		api_key: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, OrchestratorError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| {
				OrchestratorError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
			})?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			api_key: api_key.into(),
		})
	}

	/// The service root requests go to.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, OrchestratorError>
	where
		B: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let body = serde_json::to_value(body)
			.map(stringify_big_integers)
			.map_err(|e| OrchestratorError::Encode(e.to_string()))?;

		debug!(path, "POST to orchestrator");
		let response = self
			.client
			.post(self.endpoint(path))
			.header(API_KEY_HEADER, &self.api_key)
			.json(&body)
			.send()
			.await
			.map_err(|e| OrchestratorError::Network(format!("POST {} failed: {}", path, e)))?;

		Self::read(response).await
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, OrchestratorError> {
		debug!(path, "GET from orchestrator");
		let response = self
			.client
			.get(self.endpoint(path))
			.header(API_KEY_HEADER, &self.api_key)
			.send()
			.await
			.map_err(|e| OrchestratorError::Network(format!("GET {} failed: {}", path, e)))?;

		Self::read(response).await
	}

	/// Decodes a 2xx body as `T`; any other status becomes
	/// [`OrchestratorError::Http`] carrying the body text.
	async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, OrchestratorError> {
		let status = response.status();
		if !status.is_success() {
			let body = response
				.text()
				.await
				.unwrap_or_else(|e| format!("<failed to read response body: {}>", e));
			return Err(OrchestratorError::Http {
				status: status.as_u16(),
				body,
			});
		}

		response
			.json()
			.await
			.map_err(|e| OrchestratorError::Decode(e.to_string()))
	}
}

/// Configuration schema for [`HttpOrchestrator`].
pub struct HttpOrchestratorSchema;

impl HttpOrchestratorSchema {
	fn schema() -> Schema {
		Schema::new(
			// Required fields
			vec![
				// Key issued for the orchestrator account.
				Field::new("api_key", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(key) if !key.trim().is_empty() => Ok(()),
						_ => Err("api_key must not be empty".to_string()),
					}
				}),
			],
			// Optional fields
			vec![
				// `prod`, `dev` or `local`; picks the base URL.
				Field::new("environment", FieldType::String).with_validator(|value| {
					value
						.as_str()
						.unwrap_or_default()
						.parse::<Environment>()
						.map(|_| ())
				}),
				// Explicit base URL, wins over `environment`.
				Field::new("url", FieldType::Url),
				// Per-request timeout in seconds.
				Field::new(
					"timeout_secs",
					FieldType::Integer {
						min: Some(1),
						max: Some(600),
					},
				),
			],
		)
	}
}

impl ConfigSchema for HttpOrchestratorSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Self::schema().validate(config)
	}
}

#[async_trait]
impl OrchestratorInterface for HttpOrchestrator {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpOrchestratorSchema)
	}

	async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, OrchestratorError> {
		self.post("/intents/route", request).await
	}

	async fn submit(&self, signed: &SignedIntentOp) -> Result<BundleId, OrchestratorError> {
		let response: SubmitResponse = self
			.post(
				"/intent-operations",
				&IntentOperationRequest {
					signed_intent_op: signed,
				},
			)
			.await?;
		Ok(response.result.id)
	}

	async fn simulate(
		&self,
		signed: &SignedIntentOp,
	) -> Result<SimulationResponse, OrchestratorError> {
		self.post(
			"/intent-operations/simulate",
			&IntentOperationRequest {
				signed_intent_op: signed,
			},
		)
		.await
	}

	async fn bundle_status(&self, id: &BundleId) -> Result<BundleResult, OrchestratorError> {
		self.get(&format!("/intent-operation/{}/status", id)).await
	}
}

/// Resolves the base URL: an explicit `url` wins over `environment`.
pub fn resolve_base_url(config: &toml::Value) -> Result<String, OrchestratorError> {
	if let Some(url) = config.get("url").and_then(|v| v.as_str()) {
		return Ok(url.to_string());
	}
	let environment = match config.get("environment").and_then(|v| v.as_str()) {
		Some(name) => name
			.parse::<Environment>()
			.map_err(OrchestratorError::InvalidConfig)?,
		None => Environment::default(),
	};
	Ok(environment.base_url().to_string())
}

/// Builds the HTTP client from the `[orchestrator.config]` table.
pub fn create_orchestrator(
	config: &toml::Value,
) -> Result<Box<dyn OrchestratorInterface>, OrchestratorError> {
	HttpOrchestratorSchema
		.validate(config)
		.map_err(|e| OrchestratorError::InvalidConfig(e.to_string()))?;

	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| OrchestratorError::InvalidConfig("api_key is required".to_string()))?;
	let timeout_secs = config
		.get("timeout_secs")
		.and_then(|v| v.as_integer())
		.map(|secs| secs as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECS);

	Ok(Box::new(HttpOrchestrator::new(
		resolve_base_url(config)?,
		api_key,
		Duration::from_secs(timeout_secs),
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use intent_types::{
		AccountDescriptor, BundleStatus, DecimalU256, IntentOp, TokenRequest,
	};
	use serde_json::{json, Value};
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const KEY: &str = "test-key";

	fn client(server: &MockServer) -> HttpOrchestrator {
		HttpOrchestrator::new(server.uri(), KEY, Duration::from_secs(5)).unwrap()
	}

	fn intent_op_json() -> Value {
		json!({
			"sponsor": "0x0000000000000000000000000000000000000006",
			"nonce": "115792089237316195423570985008687907853269984665640564039457584007913129639935",
			"expires": "2000",
			"elements": [{
				"arbiter": "0x0000000000000000000000000000000000000004",
				"chainId": "10",
				"idsAndAmounts": [],
				"mandate": {
					"recipient": "0x0000000000000000000000000000000000000001",
					"tokenOut": [],
					"destinationChainId": "8453",
					"fillDeadline": "1000",
					"qualifier": { "settlementSystem": "SAME_CHAIN", "encodedVal": "0x" }
				}
			}]
		})
	}

	fn route_request() -> RouteRequest {
		RouteRequest {
			account: AccountDescriptor {
				address: "0x1111111111111111111111111111111111111111".parse().unwrap(),
				account_type: "ERC7579".to_string(),
				setup_ops: vec![],
			},
			destination_chain_id: 8453,
			token_requests: vec![TokenRequest {
				token_address: "0x2222222222222222222222222222222222222222".parse().unwrap(),
				amount: DecimalU256::from(u64::MAX),
			}],
			recipient: "0x3333333333333333333333333333333333333333".parse().unwrap(),
			account_access_list: vec![],
			destination_executions: vec![],
			destination_gas_units: None,
		}
	}

	#[tokio::test]
	async fn test_route_sends_key_and_decimal_strings() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/intents/route"))
			.and(header(API_KEY_HEADER, KEY))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"intentOp": intent_op_json(),
				"intentCost": { "tokensSpent": {} }
			})))
			.expect(1)
			.mount(&server)
			.await;

		let response = client(&server).route(&route_request()).await.unwrap();
		assert_eq!(response.intent_op.elements.len(), 1);
		assert_eq!(response.intent_cost, json!({ "tokensSpent": {} }));

		let requests = server.received_requests().await.unwrap();
		let body: Value = requests[0].body_json().unwrap();
		assert_eq!(
			body["tokenRequests"][0]["amount"],
			json!("18446744073709551615")
		);
		assert_eq!(body["destinationChainId"], json!(8453));
	}

	#[tokio::test]
	async fn test_submit_wraps_signed_op_and_returns_id() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/intent-operations"))
			.and(header(API_KEY_HEADER, KEY))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_json(json!({ "result": { "id": "98765432109876543210" } })),
			)
			.expect(1)
			.mount(&server)
			.await;

		let op: IntentOp = serde_json::from_value(intent_op_json()).unwrap();
		let signed = SignedIntentOp::new(op, vec![0xab; 4].into());

		let id = client(&server).submit(&signed).await.unwrap();
		assert_eq!(id, BundleId::new("98765432109876543210"));

		let requests = server.received_requests().await.unwrap();
		let body: Value = requests[0].body_json().unwrap();
		let signed_body = &body["signedIntentOp"];
		assert_eq!(signed_body["originSignatures"], json!(["0xabababab"]));
		assert_eq!(signed_body["destinationSignature"], json!("0xabababab"));
		assert_eq!(
			signed_body["nonce"],
			json!("115792089237316195423570985008687907853269984665640564039457584007913129639935")
		);
	}

	#[tokio::test]
	async fn test_simulate_uses_simulate_endpoint() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/intent-operations/simulate"))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(json!({ "result": { "success": true } })),
			)
			.expect(1)
			.mount(&server)
			.await;

		let op: IntentOp = serde_json::from_value(intent_op_json()).unwrap();
		let simulation = client(&server)
			.simulate(&SignedIntentOp::new(op, vec![0x01].into()))
			.await
			.unwrap();
		assert_eq!(simulation.result, json!({ "success": true }));
	}

	#[tokio::test]
	async fn test_bundle_status_path() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/intent-operation/42/status"))
			.and(header(API_KEY_HEADER, KEY))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"status": "FILLED",
				"claims": [{ "chainId": "10", "status": "PENDING" }]
			})))
			.expect(1)
			.mount(&server)
			.await;

		let result = client(&server)
			.bundle_status(&BundleId::new("42"))
			.await
			.unwrap();
		assert_eq!(result.status, BundleStatus::Filled);
		assert_eq!(result.claims[0].chain_id, DecimalU256::from(10u64));
	}

	#[tokio::test]
	async fn test_error_status_carries_body() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/intents/route"))
			.respond_with(ResponseTemplate::new(400).set_body_string("insufficient balance"))
			.expect(1)
			.mount(&server)
			.await;

		let err = client(&server).route(&route_request()).await.unwrap_err();
		match err {
			OrchestratorError::Http { status, body } => {
				assert_eq!(status, 400);
				assert_eq!(body, "insufficient balance");
			}
			other => panic!("unexpected error: {}", other),
		}
	}

	#[tokio::test]
	async fn test_truncated_error_body_reports_read_failure() {
		use tokio::io::{AsyncReadExt, AsyncWriteExt};

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let server = tokio::spawn(async move {
			let (mut socket, _) = listener.accept().await.unwrap();
			let mut request = Vec::new();
			let mut buf = [0u8; 1024];
			while !request.windows(4).any(|w| w == b"\r\n\r\n") {
				let n = socket.read(&mut buf).await.unwrap();
				if n == 0 {
					break;
				}
				request.extend_from_slice(&buf[..n]);
			}
			// Promises 100 bytes, sends 5, then hangs up.
			socket
				.write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nshort")
				.await
				.unwrap();
			let _ = socket.shutdown().await;
		});

		let client =
			HttpOrchestrator::new(format!("http://{}", addr), KEY, Duration::from_secs(5)).unwrap();
		let err = client
			.bundle_status(&BundleId::new("1"))
			.await
			.unwrap_err();
		server.await.unwrap();

		match err {
			OrchestratorError::Http { status, body } => {
				assert_eq!(status, 500);
				assert!(body.contains("failed to read response body"), "body: {}", body);
			}
			other => panic!("unexpected error: {}", other),
		}
	}

	#[tokio::test]
	async fn test_malformed_body_is_decode_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/intent-operation/1/status"))
			.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
			.mount(&server)
			.await;

		let err = client(&server)
			.bundle_status(&BundleId::new("1"))
			.await
			.unwrap_err();
		assert!(matches!(err, OrchestratorError::Decode(_)));
	}

	#[test]
	fn test_base_url_resolution() {
		let dev: toml::Value = toml::from_str("api_key = \"k\"\nenvironment = \"dev\"").unwrap();
		assert_eq!(
			resolve_base_url(&dev).unwrap(),
			"https://dev.v1.orchestrator.rhinestone.dev"
		);

		let explicit: toml::Value = toml::from_str(
			"api_key = \"k\"\nenvironment = \"dev\"\nurl = \"http://127.0.0.1:9000\"",
		)
		.unwrap();
		assert_eq!(resolve_base_url(&explicit).unwrap(), "http://127.0.0.1:9000");

		let default: toml::Value = toml::from_str("api_key = \"k\"").unwrap();
		assert_eq!(
			resolve_base_url(&default).unwrap(),
			Environment::Prod.base_url()
		);
	}

	#[test]
	fn test_factory_validates_config() {
		let missing_key: toml::Value = toml::from_str("environment = \"prod\"").unwrap();
		assert!(create_orchestrator(&missing_key).is_err());

		let bad_env: toml::Value =
			toml::from_str("api_key = \"k\"\nenvironment = \"staging\"").unwrap();
		assert!(create_orchestrator(&bad_env).is_err());

		let zero_timeout: toml::Value =
			toml::from_str("api_key = \"k\"\ntimeout_secs = 0").unwrap();
		assert!(create_orchestrator(&zero_timeout).is_err());

		let ok: toml::Value = toml::from_str("api_key = \"k\"\nenvironment = \"local\"").unwrap();
		assert!(create_orchestrator(&ok).is_ok());
	}
}
