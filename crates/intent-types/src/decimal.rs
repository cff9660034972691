//! Decimal-string encoding of 256-bit integers.
//!
//! The orchestrator is a JavaScript service, so any integer that may exceed
//! 2^53 - 1 travels as a decimal string. [`DecimalU256`] is the typed side of
//! that rule and [`stringify_big_integers`] is the pass applied to every
//! outbound JSON body.

use alloy::primitives::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Largest integer a JSON number carries without precision loss.
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// A `U256` that serializes as a decimal string.
///
/// Deserialization accepts a decimal string, a `0x`-prefixed hex string or a
/// non-negative JSON integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DecimalU256(pub U256);

impl DecimalU256 {
	pub const ZERO: Self = Self(U256::ZERO);

	pub fn get(self) -> U256 {
		self.0
	}
}

impl From<U256> for DecimalU256 {
	fn from(value: U256) -> Self {
		Self(value)
	}
}

impl From<u64> for DecimalU256 {
	fn from(value: u64) -> Self {
		Self(U256::from(value))
	}
}

impl From<DecimalU256> for U256 {
	fn from(value: DecimalU256) -> Self {
		value.0
	}
}

impl fmt::Display for DecimalU256 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for DecimalU256 {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		let parsed = match trimmed
			.strip_prefix("0x")
			.or_else(|| trimmed.strip_prefix("0X"))
		{
			Some(hex) => U256::from_str_radix(hex, 16),
			None => U256::from_str_radix(trimmed, 10),
		};
		parsed
			.map(Self)
			.map_err(|e| format!("invalid integer '{}': {}", s, e))
	}
}

impl Serialize for DecimalU256 {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0.to_string())
	}
}

impl<'de> Deserialize<'de> for DecimalU256 {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct DecimalVisitor;

		impl de::Visitor<'_> for DecimalVisitor {
			type Value = DecimalU256;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a decimal string, a 0x hex string or a non-negative integer")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				v.parse().map_err(E::custom)
			}

			fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
				Ok(DecimalU256::from(v))
			}

			fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
				u64::try_from(v)
					.map(DecimalU256::from)
					.map_err(|_| E::custom(format!("negative integer {}", v)))
			}
		}

		deserializer.deserialize_any(DecimalVisitor)
	}
}

/// Recursively replaces every JSON integer outside +/-(2^53 - 1) with its
/// decimal string. Floats, strings and small integers pass through untouched.
pub fn stringify_big_integers(value: Value) -> Value {
	match value {
		Value::Number(number) => {
			let unsafe_int = match (number.as_u64(), number.as_i64()) {
				(Some(u), _) => u > MAX_SAFE_INTEGER,
				(None, Some(i)) => i.unsigned_abs() > MAX_SAFE_INTEGER,
				_ => false,
			};
			if unsafe_int {
				Value::String(number.to_string())
			} else {
				Value::Number(number)
			}
		}
		Value::Array(items) => Value::Array(items.into_iter().map(stringify_big_integers).collect()),
		Value::Object(map) => Value::Object(
			map.into_iter()
				.map(|(key, value)| (key, stringify_big_integers(value)))
				.collect(),
		),
		other => other,
	}
}
