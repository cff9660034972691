//! Subcommand handlers.

use crate::factories;
use alloy::primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use intent_compact::{
	create_hasher_with_contract, Intent, LockTag, ResetPeriod, Scope, COMPACT_ADDRESS,
};
use intent_config::{BatchMode, ChainRegistry, Config};
use intent_core::{
	load_intent_files, run_batch, utils::truncate_hash, BatchOptions, EmissaryRequest,
	IntentOutcome, SubmitMode,
};
use intent_settlement::{BundleTracker, TrackerConfig};
use intent_types::{BundleId, IntentOp};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Overrides for the `[batch]` section given on the command line.
#[derive(Debug, Default)]
pub struct BatchOverrides {
	pub concurrent: bool,
	pub delay_ms: Option<u64>,
}

pub async fn run(
	config: Config,
	files: &[PathBuf],
	submit_mode: SubmitMode,
	overrides: BatchOverrides,
) -> Result<()> {
	let requests = load_intent_files(files)
		.await
		.context("Failed to read intent files")?;
	if requests.is_empty() {
		bail!("No intents found in {:?}", files);
	}

	let engine = factories::engine_builder(config)
		.build()
		.context("Failed to build intent engine")?;

	let mut options = BatchOptions::from(engine.batch_settings());
	options.submit_mode = submit_mode;
	if overrides.concurrent {
		options.mode = BatchMode::Concurrent;
	}
	if let Some(delay_ms) = overrides.delay_ms {
		options.delay_between = Duration::from_millis(delay_ms);
	}

	let total = requests.len();
	let outcomes = run_batch(Arc::new(engine), requests, options).await;

	for outcome in &outcomes {
		match &outcome.result {
			Ok(IntentOutcome::Settled {
				bundle_id,
				digest,
				tracked,
			}) => info!(
				index = outcome.index,
				bundle_id = %bundle_id,
				digest = %truncate_hash(&digest.to_string()),
				status = %tracked.status(),
				timed_out = tracked.timed_out,
				elapsed_ms = tracked.elapsed.as_millis() as u64,
				"Intent result"
			),
			Ok(IntentOutcome::Simulated { digest, simulation }) => info!(
				index = outcome.index,
				digest = %truncate_hash(&digest.to_string()),
				simulation = %simulation.result,
				"Simulation result"
			),
			Err(message) => error!(
				index = outcome.index,
				id = %outcome.correlation_id,
				"Intent failed: {}",
				message
			),
		}
	}

	let failed = outcomes.iter().filter(|o| !o.is_success()).count();
	if failed > 0 {
		bail!("{} of {} intents did not complete", failed, total);
	}
	Ok(())
}

pub async fn status(config: Config, id: &str, wait: bool) -> Result<()> {
	let orchestrator = factories::orchestrator(&config)?;
	let registry =
		ChainRegistry::from_config(&config.chains).context("Invalid chain configuration")?;
	let bundle_id = BundleId::new(id);

	let result = if wait {
		let tracker = BundleTracker::new(TrackerConfig::from_millis(
			config.tracking.poll_interval_ms,
			config.tracking.max_wait_ms,
		)?);
		let tracked = tracker.track(orchestrator.provider(), &bundle_id).await?;
		if tracked.timed_out {
			warn!(bundle_id = %bundle_id, "Bundle still in flight after {:?}", tracked.elapsed);
		}
		tracked.result
	} else {
		orchestrator
			.bundle_status(&bundle_id)
			.await
			.context("Failed to fetch bundle status")?
	};

	info!(
		bundle_id = %bundle_id,
		status = %result.status,
		claims = result.claims.len(),
		"Bundle status"
	);
	for claim in &result.claims {
		info!(
			chain = %chain_label(&registry, claim.chain_id.get()),
			status = %claim.status,
			"Claim"
		);
	}
	if let Some(hash) = &result.fill_transaction_hash {
		info!(fill_transaction = %hash, "Filled");
	}
	Ok(())
}

/// Registry name of `chain_id`, or the id itself for an unconfigured chain.
fn chain_label(registry: &ChainRegistry, chain_id: U256) -> String {
	u64::try_from(chain_id)
		.ok()
		.and_then(|id| registry.chain_by_id(id).ok())
		.map(|chain| chain.name.clone())
		.unwrap_or_else(|| chain_id.to_string())
}

/// Reads an intent operation, bare or wrapped in a route response.
async fn read_intent_op(path: &Path) -> Result<IntentOp> {
	let content = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("Failed to read {}", path.display()))?;
	let mut value: serde_json::Value =
		serde_json::from_str(&content).context("Intent operation is not valid JSON")?;
	if let Some(intent_op) = value.get_mut("intentOp") {
		value = intent_op.take();
	}
	serde_json::from_value(value).context("Failed to parse intent operation")
}

pub async fn digest(config: Config, file: &Path) -> Result<()> {
	let intent_op = read_intent_op(file).await?;
	let hasher = create_hasher_with_contract(
		config.signing.schema,
		config.signing.compact_address.unwrap_or(COMPACT_ADDRESS),
	)?;
	let intent = Intent::try_from(&intent_op)?;

	println!("schema:       {}", hasher.schema());
	println!("chain id:     {}", intent.notarized_chain_id());
	println!("settlement:   {}", intent.settlement_layer);
	println!("struct hash:  {}", hasher.hash_intent(&intent));
	println!("domain:       {}", hasher.domain(&intent).separator());
	println!("digest:       {}", hasher.signing_digest(&intent));
	Ok(())
}

pub async fn emissary_digest(config: Config, request: &EmissaryRequest, sign: bool) -> Result<()> {
	let engine = factories::engine_builder(config)
		.build()
		.context("Failed to build intent engine")?;
	let emissary = engine
		.emissary_config(request)
		.await
		.context("Failed to build emissary config")?;

	let chain_ids = emissary
		.chain_ids
		.iter()
		.map(|id| id.to_string())
		.collect::<Vec<_>>()
		.join(", ");
	println!("sponsor:          {}", emissary.sponsor);
	println!("validator:        {}", emissary.validator);
	println!("config id:        {}", emissary.config_id);
	println!("lock tag:         {}", emissary.lock_tag);
	println!("expires:          {}", emissary.expires);
	println!("nonce:            {}", emissary.nonce);
	println!("chain ids:        {}", chain_ids);
	println!("validator config: {}", emissary.validator_config);
	println!("struct hash:      {}", emissary.struct_hash());

	if sign {
		let signed = engine
			.sign_emissary_config(emissary)
			.await
			.context("Failed to sign emissary config")?;
		println!("digest:           {}", signed.digest);
		println!("signature:        {}", signed.signature);
	} else {
		println!("digest:           {}", emissary.default_digest());
	}
	Ok(())
}

pub fn lock_tag(allocator: Address, reset_period: ResetPeriod, scope: Scope) -> Result<()> {
	let tag = LockTag::encode(allocator, reset_period, scope);
	let (_, _, allocator_id) = tag.decode();

	println!("lock tag:      {}", tag);
	println!("allocator id:  {:#x}", allocator_id.as_u128());
	println!("reset period:  {:?} ({}s)", reset_period, reset_period.seconds());
	println!("scope:         {:?}", scope);
	Ok(())
}

pub async fn address(config: Config) -> Result<()> {
	let account = factories::account(&config)?;
	let smart_account = account.smart_account().await?;

	println!("owner:         {}", account.owner().await?);
	println!("smart account: {}", smart_account.address);
	println!("account type:  {}", smart_account.account_type);
	Ok(())
}

pub async fn validate(config: Config) -> Result<()> {
	let engine = factories::engine_builder(config)
		.build()
		.context("Configuration is not usable")?;

	info!("Configuration is valid");
	info!(
		schema = %engine.hasher().schema(),
		verifying_contract = %engine.hasher().verifying_contract(),
		"Signing"
	);
	for chain in engine.registry().chains() {
		info!(
			chain = %chain.name,
			chain_id = chain.chain_id,
			tokens = chain.tokens.len(),
			"Chain"
		);
	}
	Ok(())
}
