//! Lock tag encoding.
//!
//! A lock tag is 96 bits: `scope (1) | reset period (3) | allocator id (92)`.
//! The allocator id is a 4-bit compact flag followed by the low 88 bits of
//! the allocator address. The compact flag counts leading zero nibbles of the
//! address so that vanity allocators get a shorter registration.

use alloy::primitives::{address, Address, FixedBytes};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ALLOCATOR: Address = address!("eEef182c81EC267732D3efD0fdeF3b05dF2E05F7");

const LOW_88_MASK: u128 = (1u128 << 88) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
	#[default]
	Multichain = 0,
	ChainSpecific = 1,
}

impl Scope {
	fn from_bit(bit: u8) -> Self {
		if bit & 1 == 0 {
			Self::Multichain
		} else {
			Self::ChainSpecific
		}
	}
}

impl FromStr for Scope {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"multichain" | "0" => Ok(Self::Multichain),
			"chain-specific" | "chainspecific" | "1" => Ok(Self::ChainSpecific),
			other => Err(format!("unknown scope '{}'", other)),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPeriod {
	OneSecond = 0,
	FifteenSeconds = 1,
	OneMinute = 2,
	TenMinutes = 3,
	OneHourAndFiveMinutes = 4,
	OneDay = 5,
	#[default]
	SevenDaysAndOneHour = 6,
	ThirtyDays = 7,
}

impl ResetPeriod {
	pub const ALL: [ResetPeriod; 8] = [
		Self::OneSecond,
		Self::FifteenSeconds,
		Self::OneMinute,
		Self::TenMinutes,
		Self::OneHourAndFiveMinutes,
		Self::OneDay,
		Self::SevenDaysAndOneHour,
		Self::ThirtyDays,
	];

	/// Total over three bits.
	fn from_bits(bits: u8) -> Self {
		Self::ALL[(bits & 0b111) as usize]
	}

	pub fn seconds(self) -> u64 {
		match self {
			Self::OneSecond => 1,
			Self::FifteenSeconds => 15,
			Self::OneMinute => 60,
			Self::TenMinutes => 600,
			Self::OneHourAndFiveMinutes => 3_900,
			Self::OneDay => 86_400,
			Self::SevenDaysAndOneHour => 608_400,
			Self::ThirtyDays => 2_592_000,
		}
	}
}

impl FromStr for ResetPeriod {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if let Ok(index) = s.parse::<u8>() {
			return Self::ALL
				.get(index as usize)
				.copied()
				.ok_or_else(|| format!("reset period index {} out of range", index));
		}
		let normalized: String = s
			.chars()
			.filter(|c| c.is_ascii_alphanumeric())
			.collect::<String>()
			.to_ascii_lowercase();
		Self::ALL
			.iter()
			.copied()
			.find(|period| format!("{:?}", period).to_ascii_lowercase() == normalized)
			.ok_or_else(|| format!("unknown reset period '{}'", s))
	}
}

/// Leading-zero-nibble count of `address`, saturated into four bits.
pub fn compact_flag(address: Address) -> u8 {
	let mut zero_nibbles = 0u8;
	for byte in address.iter() {
		if *byte == 0 {
			zero_nibbles += 2;
			continue;
		}
		if *byte >> 4 == 0 {
			zero_nibbles += 1;
		}
		break;
	}
	match zero_nibbles {
		n if n >= 18 => 15,
		n if n >= 4 => n - 3,
		_ => 0,
	}
}

/// The 92-bit allocator id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocatorId(u128);

impl AllocatorId {
	pub fn from_address(allocator: Address) -> Self {
		let mut low = [0u8; 16];
		low[5..].copy_from_slice(&allocator.as_slice()[9..]);
		let low_bits = u128::from_be_bytes(low) & LOW_88_MASK;
		Self(((compact_flag(allocator) as u128) << 88) | low_bits)
	}

	pub fn compact_flag(&self) -> u8 {
		((self.0 >> 88) & 0xf) as u8
	}

	pub fn low_bits(&self) -> u128 {
		self.0 & LOW_88_MASK
	}

	pub fn as_u128(&self) -> u128 {
		self.0
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LockTag(FixedBytes<12>);

impl LockTag {
	pub fn encode(allocator: Address, reset_period: ResetPeriod, scope: Scope) -> Self {
		Self::compose(AllocatorId::from_address(allocator), reset_period, scope)
	}

	pub fn compose(allocator_id: AllocatorId, reset_period: ResetPeriod, scope: Scope) -> Self {
		let tag = ((scope as u128) << 95) | ((reset_period as u128) << 92) | allocator_id.0;
		Self(FixedBytes::from_slice(&tag.to_be_bytes()[4..]))
	}

	pub fn decode(&self) -> (Scope, ResetPeriod, AllocatorId) {
		let mut word = [0u8; 16];
		word[4..].copy_from_slice(self.0.as_slice());
		let tag = u128::from_be_bytes(word);
		let scope = Scope::from_bit((tag >> 95) as u8);
		let reset_period = ResetPeriod::from_bits((tag >> 92) as u8);
		let allocator_id = AllocatorId(tag & ((1u128 << 92) - 1));
		(scope, reset_period, allocator_id)
	}

	pub fn from_bytes(bytes: FixedBytes<12>) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> FixedBytes<12> {
		self.0
	}
}

impl fmt::Display for LockTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::fixed_bytes;

	#[test]
	fn test_compact_flag_saturation() {
		// 0 leading zero nibbles
		assert_eq!(compact_flag(DEFAULT_ALLOCATOR), 0);
		// 3
		assert_eq!(
			compact_flag(address!("0001000000000000000000000000000000000000")),
			0
		);
		// 4
		assert_eq!(
			compact_flag(address!("0000100000000000000000000000000000000000")),
			1
		);
		// 10
		assert_eq!(
			compact_flag(address!("0000000000E9E6E96Bcaa3c113187CdB7E38AED9")),
			7
		);
		// 17
		assert_eq!(
			compact_flag(address!("0000000000000000010000000000000000000000")),
			14
		);
		// 18 and beyond
		assert_eq!(
			compact_flag(address!("0000000000000000001000000000000000000000")),
			15
		);
		assert_eq!(compact_flag(Address::ZERO), 15);
	}

	#[test]
	fn test_default_allocator_tag() {
		let tag = LockTag::encode(
			DEFAULT_ALLOCATOR,
			ResetPeriod::default(),
			Scope::default(),
		);
		assert_eq!(tag.as_bytes(), fixed_bytes!("60d3efd0fdef3b05df2e05f7"));
	}

	#[test]
	fn test_pinned_tags() {
		let cases = [
			(
				DEFAULT_ALLOCATOR,
				ResetPeriod::OneSecond,
				Scope::Multichain,
				fixed_bytes!("00d3efd0fdef3b05df2e05f7"),
			),
			(
				DEFAULT_ALLOCATOR,
				ResetPeriod::ThirtyDays,
				Scope::ChainSpecific,
				fixed_bytes!("f0d3efd0fdef3b05df2e05f7"),
			),
			(
				address!("0000000000E9E6E96Bcaa3c113187CdB7E38AED9"),
				ResetPeriod::SevenDaysAndOneHour,
				Scope::Multichain,
				fixed_bytes!("67caa3c113187cdb7e38aed9"),
			),
			(
				address!("0000000000000000000000000000000000000001"),
				ResetPeriod::OneMinute,
				Scope::ChainSpecific,
				fixed_bytes!("af0000000000000000000001"),
			),
		];

		for (allocator, reset_period, scope, expected) in cases {
			assert_eq!(
				LockTag::encode(allocator, reset_period, scope).as_bytes(),
				expected,
				"allocator {}",
				allocator
			);
		}
	}

	#[test]
	fn test_round_trip() {
		let allocators = [
			DEFAULT_ALLOCATOR,
			address!("0001000000000000000000000000000000000abc"),
			address!("0000100000000000000000000000000000000abc"),
			address!("0000000000000000010000000000000000000001"),
			address!("0000000000000000000000000000000000000001"),
		];

		for allocator in allocators {
			for reset_period in ResetPeriod::ALL {
				for scope in [Scope::Multichain, Scope::ChainSpecific] {
					let tag = LockTag::encode(allocator, reset_period, scope);
					let (got_scope, got_period, allocator_id) = tag.decode();
					assert_eq!(got_scope, scope);
					assert_eq!(got_period, reset_period);
					assert_eq!(allocator_id, AllocatorId::from_address(allocator));
					assert_eq!(allocator_id.compact_flag(), compact_flag(allocator));
				}
			}
		}
	}

	#[test]
	fn test_parses_reset_period_names() {
		assert_eq!(
			"SevenDaysAndOneHour".parse::<ResetPeriod>().unwrap(),
			ResetPeriod::SevenDaysAndOneHour
		);
		assert_eq!(
			"one-hour-and-five-minutes".parse::<ResetPeriod>().unwrap(),
			ResetPeriod::OneHourAndFiveMinutes
		);
		assert_eq!("3".parse::<ResetPeriod>().unwrap(), ResetPeriod::TenMinutes);
		assert!("8".parse::<ResetPeriod>().is_err());
		assert_eq!("chain-specific".parse::<Scope>().unwrap(), Scope::ChainSpecific);
	}
}
