//! Hashing engine for multichain compacts.
//!
//! Reproduces the EIP-712 struct hash and signing digest the settlement
//! contract computes over a routed intent. The engine is built from small
//! pieces: a word encoder, the packed token id codec, the lock tag encoder and
//! the domain separator builder. One [`hasher::StructHasher`] exists per
//! [`IntentSchema`], chosen once at configuration time.

use thiserror::Error;

pub mod domain;
pub mod emissary;
pub mod encode;
pub mod hasher;
pub mod lock_tag;
pub mod model;
pub mod packed;
pub mod schema;

pub use domain::{signing_digest, DomainSeparator, COMPACT_ADDRESS, EMISSARY_ADDRESS};
pub use emissary::EmissaryConfig;
pub use hasher::{create_hasher, create_hasher_with_contract, StructHasher};
pub use lock_tag::{AllocatorId, LockTag, ResetPeriod, Scope};
pub use model::{Commitment, Element, Intent, Mandate, Op, SettlementLayer, Target};
pub use packed::PackedTokenId;
pub use schema::IntentSchema;

#[derive(Debug, Error)]
pub enum CompactError {
	#[error("Intent has no elements")]
	EmptyIntent,
	#[error("Notarized element has no settlement qualifier")]
	MissingQualifier,
	#[error("Unsupported settlement layer: {0}")]
	UnsupportedSettlementLayer(String),
	#[error("Unknown intent schema: {0}")]
	UnknownSchema(String),
	#[error("Schema self-check failed for {schema}: {message}")]
	Schema {
		schema: IntentSchema,
		message: String,
	},
}
