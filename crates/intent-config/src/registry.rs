//! Immutable chain and token registry.
//!
//! Built once from the `[[chains]]` section. Chain names match ignoring case
//! and whitespace, so `"Arbitrum One"`, `"arbitrumone"` and `"ARBITRUM ONE"`
//! name the same chain. Token symbols match ignoring case; a token may also be
//! named by its address.

use crate::types::ChainConfig;
use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("Unknown chain: {0}")]
	UnknownChain(String),
	#[error("Unknown chain id: {0}")]
	UnknownChainId(u64),
	#[error("Token {symbol} is not configured on {chain}")]
	UnknownToken { chain: String, symbol: String },
	#[error("Duplicate chain: {0}")]
	DuplicateChain(String),
	#[error("Duplicate token {symbol} on {chain}")]
	DuplicateToken { chain: String, symbol: String },
	#[error("Invalid amount '{amount}' for {symbol}: {message}")]
	InvalidAmount {
		symbol: String,
		amount: String,
		message: String,
	},
}

/// Lookup key for a chain name.
pub fn normalize_chain_name(name: &str) -> String {
	name.chars()
		.filter(|c| !c.is_whitespace())
		.collect::<String>()
		.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub symbol: String,
	pub address: Address,
	pub decimals: u8,
	pub native: bool,
}

impl Token {
	/// Converts a human-unit decimal string such as `"1.5"` into base units.
	pub fn parse_amount(&self, amount: &str) -> Result<U256, RegistryError> {
		let invalid = |message: String| RegistryError::InvalidAmount {
			symbol: self.symbol.clone(),
			amount: amount.to_string(),
			message,
		};

		let trimmed = amount.trim();
		if trimmed.starts_with('-') {
			return Err(invalid("amount must not be negative".to_string()));
		}
		parse_units(trimmed, self.decimals)
			.map(|units| units.get_absolute())
			.map_err(|e| invalid(e.to_string()))
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
	pub name: String,
	pub chain_id: u64,
	pub tokens: Vec<Token>,
}

impl Chain {
	pub fn token(&self, symbol: &str) -> Result<&Token, RegistryError> {
		let symbol = symbol.trim();
		let by_address = symbol.parse::<Address>().ok();
		self.tokens
			.iter()
			.find(|token| {
				token.symbol.eq_ignore_ascii_case(symbol) || Some(token.address) == by_address
			})
			.ok_or_else(|| RegistryError::UnknownToken {
				chain: self.name.clone(),
				symbol: symbol.to_string(),
			})
	}
}

#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
	chains: Vec<Chain>,
	by_name: HashMap<String, usize>,
	by_id: HashMap<u64, usize>,
}

impl ChainRegistry {
	pub fn from_config(chains: &[ChainConfig]) -> Result<Self, RegistryError> {
		let mut registry = Self::default();

		for chain in chains {
			let key = normalize_chain_name(&chain.name);
			if registry.by_name.contains_key(&key) {
				return Err(RegistryError::DuplicateChain(chain.name.clone()));
			}
			if registry.by_id.contains_key(&chain.chain_id) {
				return Err(RegistryError::DuplicateChain(format!(
					"{} (chain id {})",
					chain.name, chain.chain_id
				)));
			}

			let mut tokens: Vec<Token> = Vec::with_capacity(chain.tokens.len());
			for token in &chain.tokens {
				if tokens
					.iter()
					.any(|seen| seen.symbol.eq_ignore_ascii_case(&token.symbol))
				{
					return Err(RegistryError::DuplicateToken {
						chain: chain.name.clone(),
						symbol: token.symbol.clone(),
					});
				}
				tokens.push(Token {
					symbol: token.symbol.clone(),
					address: token.address,
					decimals: token.decimals,
					native: token.native,
				});
			}

			let index = registry.chains.len();
			registry.by_name.insert(key, index);
			registry.by_id.insert(chain.chain_id, index);
			registry.chains.push(Chain {
				name: chain.name.clone(),
				chain_id: chain.chain_id,
				tokens,
			});
		}

		Ok(registry)
	}

	pub fn chain(&self, name: &str) -> Result<&Chain, RegistryError> {
		self.by_name
			.get(&normalize_chain_name(name))
			.map(|&index| &self.chains[index])
			.ok_or_else(|| RegistryError::UnknownChain(name.to_string()))
	}

	pub fn chain_by_id(&self, chain_id: u64) -> Result<&Chain, RegistryError> {
		self.by_id
			.get(&chain_id)
			.map(|&index| &self.chains[index])
			.ok_or(RegistryError::UnknownChainId(chain_id))
	}

	pub fn token(&self, chain_name: &str, symbol: &str) -> Result<&Token, RegistryError> {
		self.chain(chain_name)?.token(symbol)
	}

	pub fn chains(&self) -> &[Chain] {
		&self.chains
	}

	pub fn is_empty(&self) -> bool {
		self.chains.is_empty()
	}
}
