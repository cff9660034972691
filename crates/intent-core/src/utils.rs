//! # Core Utilities
//!
//! Formatting helpers shared by the lifecycle and batch logs.

/// Shortens a hash or long identifier for display.
///
/// Keeps the first 6 and last 4 characters, so
/// `"0xa096c418fd1192ba7f5b506beea682a633f9ab82911fa3d7a249b8d80889a0b4"`
/// becomes `"0xa096...a0b4"`. Strings of 12 characters or fewer are returned
/// unchanged.
pub fn truncate_hash(hash: &str) -> String {
	if hash.len() <= 12 {
		hash.to_string()
	} else {
		format!("{}...{}", &hash[..6], &hash[hash.len() - 4..])
	}
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
	chrono::Utc::now().timestamp().max(0) as u64
}
