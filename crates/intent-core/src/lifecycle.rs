//! One intent, start to finish.
//!
//! The lifecycle is a straight line of awaits: resolve and route the request,
//! convert the routed operation into the closed model, hash it, sign the
//! digest with the owner key, then either submit and track the bundle or ask
//! the orchestrator to simulate it. Nothing is retried; the first error ends
//! the lifecycle.

use crate::engine::IntentEngine;
use crate::request::IntentRequest;
use crate::utils::{truncate_hash, unix_now};
use crate::CoreError;
use alloy::primitives::{B256, U256};
use intent_account::PackedSignature;
use intent_compact::Intent;
use intent_settlement::TrackedBundle;
use intent_types::{BundleId, IntentOp, SignedIntentOp, SimulationResponse};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// What happens to a signed intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
	#[default]
	Submit,
	Simulate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedIntent {
	pub digest: B256,
	pub signed: SignedIntentOp,
}

#[derive(Debug, Clone)]
pub enum IntentOutcome {
	Settled {
		bundle_id: BundleId,
		digest: B256,
		tracked: TrackedBundle,
	},
	Simulated {
		digest: B256,
		simulation: SimulationResponse,
	},
}

impl IntentOutcome {
	pub fn digest(&self) -> B256 {
		match self {
			Self::Settled { digest, .. } | Self::Simulated { digest, .. } => *digest,
		}
	}

	/// Simulations always count; a bundle only once it completed in time.
	pub fn is_success(&self) -> bool {
		match self {
			Self::Settled { tracked, .. } => tracked.is_completed(),
			Self::Simulated { .. } => true,
		}
	}
}

impl IntentEngine {
	/// Resolves `request` for the configured account and asks for a route.
	pub async fn route(&self, request: &IntentRequest) -> Result<IntentOp, CoreError> {
		let account = self.account.smart_account().await?;
		let route_request = request.to_route_request(&self.registry, &account)?;
		debug!(
			destination_chain = route_request.destination_chain_id,
			tokens = route_request.token_requests.len(),
			access_list = route_request.account_access_list.len(),
			"Requesting route"
		);
		Ok(self.orchestrator.route(&route_request).await?.intent_op)
	}

	/// The EIP-712 digest the settlement contract will check.
	pub fn digest(&self, intent_op: &IntentOp) -> Result<B256, CoreError> {
		let intent = Intent::try_from(intent_op)?;
		Ok(self.hasher.signing_digest(&intent))
	}

	/// Signs a routed operation with the owner key.
	///
	/// The same packed signature is used for every element and for the
	/// destination. An operation whose `expires` has passed is refused.
	pub async fn sign(&self, intent_op: IntentOp) -> Result<SignedIntent, CoreError> {
		let intent = Intent::try_from(&intent_op)?;

		let now = unix_now();
		if intent.expires <= U256::from(now) {
			return Err(CoreError::Expired {
				expires: intent.expires,
				now,
			});
		}

		let account = self.account.smart_account().await?;
		if intent.sponsor != account.address {
			warn!(
				sponsor = %intent.sponsor,
				account = %account.address,
				"Routed intent is sponsored by a different account"
			);
		}

		let digest = self.hasher.signing_digest(&intent);
		let owner_signature = self.account.owner_signature(digest).await?;
		let packed = PackedSignature::new(
			self.signature.validator,
			self.signature.config_id,
			owner_signature,
		)
		.encode();

		debug!(
			digest = %truncate_hash(&digest.to_string()),
			settlement = %intent.settlement_layer,
			elements = intent.elements().len(),
			"Signed intent"
		);

		Ok(SignedIntent {
			digest,
			signed: SignedIntentOp::new(intent_op, packed),
		})
	}

	pub async fn track(&self, bundle_id: &BundleId) -> Result<TrackedBundle, CoreError> {
		Ok(self
			.tracker
			.track(self.orchestrator.provider(), bundle_id)
			.await?)
	}

	pub async fn execute(
		&self,
		request: &IntentRequest,
		mode: SubmitMode,
	) -> Result<IntentOutcome, CoreError> {
		self.execute_with_id(Uuid::new_v4(), request, mode).await
	}

	/// Runs one lifecycle inside an `intent` span carrying `id`.
	pub async fn execute_with_id(
		&self,
		id: Uuid,
		request: &IntentRequest,
		mode: SubmitMode,
	) -> Result<IntentOutcome, CoreError> {
		self.run_lifecycle(request, mode)
			.instrument(info_span!("intent", id = %id))
			.await
	}

	async fn run_lifecycle(
		&self,
		request: &IntentRequest,
		mode: SubmitMode,
	) -> Result<IntentOutcome, CoreError> {
		info!(
			target_chain = %request.target_chain,
			tokens = request.target_tokens.len(),
			"Routing intent"
		);
		let intent_op = self.route(request).await?;
		let SignedIntent { digest, signed } = self.sign(intent_op).await?;

		match mode {
			SubmitMode::Simulate => {
				let simulation = self.orchestrator.simulate(&signed).await?;
				info!(digest = %truncate_hash(&digest.to_string()), "Simulated intent");
				Ok(IntentOutcome::Simulated { digest, simulation })
			}
			SubmitMode::Submit => {
				let bundle_id = self.orchestrator.submit(&signed).await?;
				info!(
					bundle_id = %bundle_id,
					digest = %truncate_hash(&digest.to_string()),
					"Submitted intent"
				);

				let tracked = self.track(&bundle_id).await?;
				if tracked.timed_out {
					warn!(bundle_id = %bundle_id, status = %tracked.status(), "Bundle did not settle in time");
				} else {
					info!(
						bundle_id = %bundle_id,
						status = %tracked.status(),
						polls = tracked.polls,
						"Bundle settled"
					);
				}

				Ok(IntentOutcome::Settled {
					bundle_id,
					digest,
					tracked,
				})
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::request::TargetToken;
	use crate::testing::{engine_with, test_config, MockState, OWNER};
	use alloy::primitives::{address, Signature};
	use intent_account::signature::{DEFAULT_CONFIG_ID, DEFAULT_VALIDATOR};
	use intent_compact::CompactError;
	use intent_config::RegistryError;
	use intent_types::BundleStatus;
	use std::sync::atomic::Ordering;

	fn request(target_chain: &str) -> IntentRequest {
		IntentRequest {
			target_chain: target_chain.to_string(),
			target_tokens: vec![TargetToken {
				symbol: "USDC".to_string(),
				amount: "10".to_string(),
			}],
			source_chains: vec!["Optimism".to_string()],
			source_tokens: vec!["USDC".to_string()],
			token_recipient: address!("00000000000000000000000000000000000000aa"),
		}
	}

	#[tokio::test]
	async fn test_submits_signed_intent_and_tracks_it() {
		let state = MockState::new("SAME_CHAIN");
		let engine = engine_with(test_config(""), state.clone());

		let outcome = engine
			.execute(&request("Base"), SubmitMode::Submit)
			.await
			.unwrap();
		assert!(outcome.is_success());

		let IntentOutcome::Settled {
			bundle_id,
			digest,
			tracked,
		} = outcome
		else {
			panic!("expected a settled outcome");
		};
		assert_eq!(bundle_id.as_str(), "1");
		assert_eq!(tracked.status(), BundleStatus::Completed);
		assert_eq!(tracked.polls, 2);

		let submitted = state.submitted.lock().unwrap()[0].clone();
		assert_eq!(engine.digest(&submitted.intent_op).unwrap(), digest);
		assert_eq!(submitted.origin_signatures.len(), 1);
		assert_eq!(submitted.destination_signature, submitted.origin_signatures[0]);

		let packed = &submitted.destination_signature;
		assert_eq!(packed.len(), 20 + 65);
		assert_eq!(&packed[..20], DEFAULT_VALIDATOR.as_slice());
		let signature = Signature::try_from(&packed[20..]).unwrap();
		assert_eq!(
			signature.recover_address_from_msg(digest.as_slice()).unwrap(),
			OWNER
		);
	}

	#[tokio::test]
	async fn test_emissary_signature_carries_config_id() {
		let state = MockState::new("ACROSS");
		let engine = engine_with(test_config("[signing]\nuse_emissary = true\n"), state.clone());

		engine
			.execute(&request("Base"), SubmitMode::Submit)
			.await
			.unwrap();

		let submitted = state.submitted.lock().unwrap()[0].clone();
		let packed = &submitted.destination_signature;
		assert_eq!(packed.len(), 20 + 1 + 65);
		assert_eq!(packed[20], DEFAULT_CONFIG_ID);
	}

	#[tokio::test]
	async fn test_simulate_does_not_submit() {
		let state = MockState::new("SAME_CHAIN");
		let engine = engine_with(test_config(""), state.clone());

		let outcome = engine
			.execute(&request("Base"), SubmitMode::Simulate)
			.await
			.unwrap();

		assert!(matches!(outcome, IntentOutcome::Simulated { .. }));
		assert_eq!(state.simulated.load(Ordering::SeqCst), 1);
		assert_eq!(state.submit_count(), 0);
	}

	#[tokio::test]
	async fn test_expired_intent_is_never_signed() {
		let state = MockState::new("SAME_CHAIN");
		state.expires.store(unix_now() - 10, Ordering::SeqCst);
		let engine = engine_with(test_config(""), state.clone());

		let result = engine.execute(&request("Base"), SubmitMode::Submit).await;

		assert!(matches!(result, Err(CoreError::Expired { .. })));
		assert_eq!(state.route_count(), 1);
		assert_eq!(state.submit_count(), 0);
	}

	#[tokio::test]
	async fn test_unknown_chain_fails_before_routing() {
		let state = MockState::new("SAME_CHAIN");
		let engine = engine_with(test_config(""), state.clone());

		let result = engine.execute(&request("Solana"), SubmitMode::Submit).await;

		assert!(matches!(
			result,
			Err(CoreError::Registry(RegistryError::UnknownChain(_)))
		));
		assert_eq!(state.route_count(), 0);
	}

	#[tokio::test]
	async fn test_unsupported_settlement_layer_is_rejected() {
		let state = MockState::new("RELAY");
		let engine = engine_with(test_config(""), state.clone());

		let result = engine.execute(&request("Base"), SubmitMode::Submit).await;

		assert!(matches!(
			result,
			Err(CoreError::Compact(CompactError::UnsupportedSettlementLayer(_)))
		));
		assert_eq!(state.submit_count(), 0);
	}

	#[tokio::test]
	async fn test_route_error_keeps_body() {
		let state = MockState::new("SAME_CHAIN");
		state.fail_destination.store(8453, Ordering::SeqCst);
		let engine = engine_with(test_config(""), state.clone());

		let error = engine
			.execute(&request("Base"), SubmitMode::Submit)
			.await
			.unwrap_err();

		assert!(error.to_string().contains("no route"));
	}
}
