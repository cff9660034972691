//! Intent lifecycle engine.
//!
//! Ties the workspace together: an [`IntentEngine`] is assembled from config
//! by [`EngineBuilder`] and drives each [`IntentRequest`] through routing,
//! hashing, signing, submission and settlement tracking. [`batch`] replays
//! many requests sequentially or concurrently, and [`emissary`] builds the
//! one-off emissary registration for the same account.

pub mod batch;
pub mod emissary;
pub mod engine;
mod error;
pub mod lifecycle;
pub mod request;
pub mod utils;

#[cfg(test)]
mod testing;

pub use batch::{run_batch, BatchItemOutcome, BatchOptions};
pub use emissary::{EmissaryRequest, SignedEmissaryConfig, DEFAULT_EMISSARY_NONCE};
pub use engine::{BatchSettings, EngineBuilder, IntentEngine, SignatureSettings};
pub use error::CoreError;
pub use lifecycle::{IntentOutcome, SignedIntent, SubmitMode};
pub use request::{load_intent_files, parse_intent_file, IntentRequest, TargetToken};
