//! Settlement tracking for submitted bundles.
//!
//! A bundle settles asynchronously: one claim per source chain and one fill
//! on the target chain. [`BundleTracker`] polls the orchestrator until the
//! reported status leaves the in-flight set or the wait budget runs out.

use intent_orchestrator::{OrchestratorError, OrchestratorInterface};
use intent_types::{BundleId, BundleResult, BundleStatus};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(90_000);

#[derive(Debug, Error)]
pub enum SettlementError {
	#[error("Status request failed: {0}")]
	Status(#[from] OrchestratorError),
	#[error("Invalid tracker configuration: {0}")]
	InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
	pub poll_interval: Duration,
	pub max_wait: Duration,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			poll_interval: DEFAULT_POLL_INTERVAL,
			max_wait: DEFAULT_MAX_WAIT,
		}
	}
}

impl TrackerConfig {
	pub fn new(poll_interval: Duration, max_wait: Duration) -> Result<Self, SettlementError> {
		if poll_interval.is_zero() {
			return Err(SettlementError::InvalidConfig(
				"poll interval must be greater than zero".to_string(),
			));
		}
		if poll_interval > max_wait {
			return Err(SettlementError::InvalidConfig(format!(
				"poll interval {:?} exceeds max wait {:?}",
				poll_interval, max_wait
			)));
		}
		Ok(Self {
			poll_interval,
			max_wait,
		})
	}

	pub fn from_millis(poll_interval_ms: u64, max_wait_ms: u64) -> Result<Self, SettlementError> {
		Self::new(
			Duration::from_millis(poll_interval_ms),
			Duration::from_millis(max_wait_ms),
		)
	}
}

/// Outcome of a tracking run.
///
/// A timeout is not an error: `result` is the last status observed and
/// `timed_out` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedBundle {
	pub result: BundleResult,
	pub polls: u32,
	pub elapsed: Duration,
	pub timed_out: bool,
}

impl TrackedBundle {
	pub fn status(&self) -> BundleStatus {
		self.result.status
	}

	pub fn is_completed(&self) -> bool {
		!self.timed_out && self.result.status == BundleStatus::Completed
	}
}

#[derive(Debug, Clone, Default)]
pub struct BundleTracker {
	config: TrackerConfig,
}

impl BundleTracker {
	pub fn new(config: TrackerConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &TrackerConfig {
		&self.config
	}

	/// Polls `bundle_id` until its status is no longer in flight.
	///
	/// A failing status request ends tracking with an error; it is not retried.
	pub async fn track(
		&self,
		orchestrator: &dyn OrchestratorInterface,
		bundle_id: &BundleId,
	) -> Result<TrackedBundle, SettlementError> {
		let start_time = Instant::now();
		let mut polls = 0u32;
		let mut last_status = None;

		loop {
			let result = orchestrator.bundle_status(bundle_id).await?;
			polls += 1;

			if last_status != Some(result.status) {
				info!(
					bundle_id = %bundle_id,
					status = %result.status,
					claims = result.claims.len(),
					"Bundle status changed"
				);
				last_status = Some(result.status);
			} else {
				debug!(bundle_id = %bundle_id, status = %result.status, polls, "Bundle still in flight");
			}

			if !result.status.keeps_polling() {
				return Ok(TrackedBundle {
					result,
					polls,
					elapsed: start_time.elapsed(),
					timed_out: false,
				});
			}

			if start_time.elapsed() + self.config.poll_interval > self.config.max_wait {
				warn!(
					bundle_id = %bundle_id,
					status = %result.status,
					"Gave up waiting for bundle after {:?}",
					self.config.max_wait
				);
				return Ok(TrackedBundle {
					result,
					polls,
					elapsed: start_time.elapsed(),
					timed_out: true,
				});
			}

			tokio::time::sleep(self.config.poll_interval).await;
		}
	}
}
