//! Process configuration, read from environment variables

use std::env;
use std::path::PathBuf;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
pub const DEFAULT_DB_DIR: &str = "./data";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@xiver.local";

#[derive(Debug, Clone)]
pub struct Config {
	/// Socket address of the HTTP listener
	pub listen: String,
	/// Directory holding `xiver.db`
	pub db_dir: PathBuf,
	pub allowed_origins: Vec<String>,
	/// Super admin created on first start
	pub admin_username: String,
	pub admin_email: String,
}

impl Config {
	pub fn from_env() -> Self {
		Self::from_lookup(|key| env::var(key).ok())
	}

	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let var = |key: &str, default: &str| {
			lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
		};

		Config {
			listen: var("LISTEN", DEFAULT_LISTEN),
			db_dir: PathBuf::from(var("DB_DIR", DEFAULT_DB_DIR)),
			allowed_origins: var("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)
				.split(',')
				.map(str::trim)
				.filter(|origin| !origin.is_empty())
				.map(String::from)
				.collect(),
			admin_username: var("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
			admin_email: var("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
		}
	}
}


// vim: ts=4
