//! Replaying many intents.
//!
//! A batch runs every request through the lifecycle, one after the other or
//! as spawned tasks, and reports one [`BatchItemOutcome`] per request in input
//! order. A failing item never stops the rest; the caller decides what a
//! partially failed batch means.

use crate::engine::{BatchSettings, IntentEngine};
use crate::lifecycle::{IntentOutcome, SubmitMode};
use crate::request::IntentRequest;
use futures::future::join_all;
use intent_config::BatchMode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
	pub mode: BatchMode,
	/// Pause between two consecutive starts.
	pub delay_between: Duration,
	pub submit_mode: SubmitMode,
}

impl From<BatchSettings> for BatchOptions {
	fn from(settings: BatchSettings) -> Self {
		Self {
			mode: settings.mode,
			delay_between: settings.delay_between,
			submit_mode: if settings.simulate {
				SubmitMode::Simulate
			} else {
				SubmitMode::Submit
			},
		}
	}
}

#[derive(Debug)]
pub struct BatchItemOutcome {
	pub index: usize,
	pub correlation_id: Uuid,
	pub result: Result<IntentOutcome, String>,
}

impl BatchItemOutcome {
	pub fn is_success(&self) -> bool {
		matches!(&self.result, Ok(outcome) if outcome.is_success())
	}
}

pub async fn run_batch(
	engine: Arc<IntentEngine>,
	requests: Vec<IntentRequest>,
	options: BatchOptions,
) -> Vec<BatchItemOutcome> {
	let total = requests.len();
	info!(total, mode = ?options.mode, submit_mode = ?options.submit_mode, "Starting batch");

	let outcomes = match options.mode {
		BatchMode::Sequential => run_sequential(&engine, requests, options).await,
		BatchMode::Concurrent => run_concurrent(engine, requests, options).await,
	};

	let succeeded = outcomes.iter().filter(|outcome| outcome.is_success()).count();
	info!(total, succeeded, failed = total - succeeded, "Batch finished");
	outcomes
}

async fn run_sequential(
	engine: &IntentEngine,
	requests: Vec<IntentRequest>,
	options: BatchOptions,
) -> Vec<BatchItemOutcome> {
	let total = requests.len();
	let mut outcomes = Vec::with_capacity(total);

	for (index, request) in requests.into_iter().enumerate() {
		let correlation_id = Uuid::new_v4();
		let result = engine
			.execute_with_id(correlation_id, &request, options.submit_mode)
			.await
			.map_err(|e| e.to_string());
		if let Err(error) = &result {
			warn!(index, id = %correlation_id, "Intent failed: {}", error);
		}
		outcomes.push(BatchItemOutcome {
			index,
			correlation_id,
			result,
		});

		if index + 1 < total {
			tokio::time::sleep(options.delay_between).await;
		}
	}

	outcomes
}

async fn run_concurrent(
	engine: Arc<IntentEngine>,
	requests: Vec<IntentRequest>,
	options: BatchOptions,
) -> Vec<BatchItemOutcome> {
	let total = requests.len();
	let mut ids = Vec::with_capacity(total);
	let mut handles = Vec::with_capacity(total);

	for (index, request) in requests.into_iter().enumerate() {
		let correlation_id = Uuid::new_v4();
		let engine = Arc::clone(&engine);
		let submit_mode = options.submit_mode;

		handles.push(tokio::spawn(async move {
			engine
				.execute_with_id(correlation_id, &request, submit_mode)
				.await
				.map_err(|e| e.to_string())
		}));
		ids.push(correlation_id);

		if index + 1 < total {
			tokio::time::sleep(options.delay_between).await;
		}
	}

	join_all(handles)
		.await
		.into_iter()
		.zip(ids)
		.enumerate()
		.map(|(index, (joined, correlation_id))| {
			let result = joined.unwrap_or_else(|e| Err(format!("Intent task failed: {}", e)));
			if let Err(error) = &result {
				warn!(index, id = %correlation_id, "Intent failed: {}", error);
			}
			BatchItemOutcome {
				index,
				correlation_id,
				result,
			}
		})
		.collect()
}
