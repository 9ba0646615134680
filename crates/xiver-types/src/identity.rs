//! Acting identities and the grants attached to them.

use serde::{Deserialize, Serialize};

/// Permission grant as seen by the access evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
	pub action: String,
	pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
	pub name: String,
	pub permissions: Vec<PermissionGrant>,
}

/// A resolved user together with all of its roles and their permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
	pub user_id: u64,
	pub username: String,
	pub is_super_admin: bool,
	pub roles: Vec<RoleGrant>,
}

impl Identity {
	pub fn has_role(&self, name: &str) -> bool {
		self.roles.iter().any(|r| r.name == name)
	}

	pub fn permissions(&self) -> impl Iterator<Item = &PermissionGrant> {
		self.roles.iter().flat_map(|r| r.permissions.iter())
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenType {
	#[default]
	ReadOnly,
	FullAccess,
}

impl TokenType {
	pub fn as_str(&self) -> &'static str {
		match self {
			TokenType::ReadOnly => "read-only",
			TokenType::FullAccess => "full-access",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"read-only" => Some(TokenType::ReadOnly),
			"full-access" => Some(TokenType::FullAccess),
			_ => None,
		}
	}
}

/// Authentication context attached to a request
#[derive(Debug, Clone)]
pub struct AuthCtx {
	pub identity: Identity,
	pub token_id: u64,
	pub token_type: TokenType,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_token_type_names() {
		assert_eq!(serde_json::to_string(&TokenType::FullAccess).unwrap(), "\"full-access\"");
		assert_eq!(TokenType::parse("read-only"), Some(TokenType::ReadOnly));
		assert_eq!(TokenType::parse("admin"), None);
	}
}

// vim: ts=4
