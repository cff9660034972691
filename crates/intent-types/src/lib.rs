//! Shared types for the intent client.
//!
//! This crate holds everything that crosses a crate boundary without carrying
//! behaviour of its own: the orchestrator wire format, the bundle status model,
//! decimal big-integer encoding and the TOML schema validation used by the
//! pluggable account and orchestrator implementations.

pub mod api;
pub mod decimal;
pub mod environment;
pub mod intent;
pub mod status;
pub mod validation;

pub use api::*;
pub use decimal::*;
pub use environment::Environment;
pub use intent::*;
pub use status::*;
pub use validation::*;
