//! Utility functions

use rand::RngExt;
use sha2::{Digest, Sha256};

pub const API_TOKEN_PREFIX: &str = "xvc_";
pub const TOKEN_LENGTH: usize = 40;
/// Characters of the random part stored in clear for lookup
pub const TOKEN_LOOKUP_LENGTH: usize = 8;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

pub fn random_string(len: usize) -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(len);

	for _ in 0..len {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

/// Generates a new API token, returning `(plaintext, lookup_prefix)`
pub fn generate_api_token() -> (String, String) {
	let token = format!("{}{}", API_TOKEN_PREFIX, random_string(TOKEN_LENGTH));
	let prefix = token[..API_TOKEN_PREFIX.len() + TOKEN_LOOKUP_LENGTH].to_string();
	(token, prefix)
}

/// Lookup prefix of a presented token, `None` if it can't be one of ours
pub fn api_token_prefix(token: &str) -> Option<&str> {
	if !token.starts_with(API_TOKEN_PREFIX) {
		return None;
	}
	token.get(..API_TOKEN_PREFIX.len() + TOKEN_LOOKUP_LENGTH)
}

/// Hex encoded SHA-256 of a token
pub fn hash_api_token(token: &str) -> String {
	format!("{:x}", Sha256::digest(token.as_bytes()))
}


// vim: ts=4
