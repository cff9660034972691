//! Named orchestrator deployments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	#[default]
	Prod,
	Dev,
	Local,
}

impl Environment {
	pub const ALL: [Environment; 3] = [Self::Prod, Self::Dev, Self::Local];

	pub fn base_url(self) -> &'static str {
		match self {
			Self::Prod => "https://v1.orchestrator.rhinestone.dev",
			Self::Dev => "https://dev.v1.orchestrator.rhinestone.dev",
			Self::Local => "http://localhost:3000",
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Prod => "prod",
			Self::Dev => "dev",
			Self::Local => "local",
		}
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Environment {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"prod" | "production" => Ok(Self::Prod),
			"dev" | "development" => Ok(Self::Dev),
			"local" => Ok(Self::Local),
			other => Err(format!(
				"unknown environment '{}', expected one of prod, dev, local",
				other
			)),
		}
	}
}
