//! Implementations the binary knows by name.
//!
//! `[account] implementation` and `[orchestrator] implementation` select one
//! of the factories registered here.

use anyhow::{bail, Context, Result};
use intent_account::{implementations::local, AccountService};
use intent_config::Config;
use intent_core::EngineBuilder;
use intent_orchestrator::{implementations::http, OrchestratorService};

pub fn engine_builder(config: Config) -> EngineBuilder {
	EngineBuilder::new(config)
		.with_account_factory("local", local::create_account)
		.with_orchestrator_factory("http", http::create_orchestrator)
}

/// The orchestrator alone, for commands that never sign.
pub fn orchestrator(config: &Config) -> Result<OrchestratorService> {
	let provider = match config.orchestrator.implementation.as_str() {
		"http" => http::create_orchestrator(&config.orchestrator.config)
			.context("Failed to create orchestrator")?,
		other => bail!("Unknown orchestrator implementation '{}'", other),
	};
	Ok(OrchestratorService::new(provider))
}

/// The account alone, for commands that never talk to the orchestrator.
pub fn account(config: &Config) -> Result<AccountService> {
	let provider = match config.account.implementation.as_str() {
		"local" => local::create_account(&config.account.config)
			.context("Failed to create account")?,
		other => bail!("Unknown account implementation '{}'", other),
	};
	Ok(AccountService::new(provider))
}
