//! First-start seeding: built-in roles and the initial super admin

use crate::config::Config;
use crate::prelude::*;
use xiver_core::access::{ROLE_ADMIN, ROLE_MODERATOR, WILDCARD};
use xiver_types::identity::TokenType;
use xiver_types::meta_adapter::{CreateApiToken, CreatePermission, CreateRole, CreateUser, RoleType};

/// Roles every installation starts with
pub const SEED_ROLES: &[(&str, RoleType, &str)] = &[
	("Public", RoleType::Public, "Anonymous visitors"),
	("Authenticated", RoleType::Public, "Any signed-in user"),
	(ROLE_MODERATOR, RoleType::Custom, "Content moderators"),
	(ROLE_ADMIN, RoleType::Custom, "Full administrative access"),
];

async fn seed_roles(app: &App) -> XvResult<()> {
	let existing = app.meta_adapter.list_roles(None).await?;

	for (name, role_type, description) in SEED_ROLES {
		if existing.iter().any(|role| role.name == *name) {
			continue;
		}

		let mut permission_ids = Vec::new();
		if *name == ROLE_ADMIN {
			let perm = app
				.meta_adapter
				.create_permission(&CreatePermission {
					action: WILDCARD.into(),
					subject: WILDCARD.into(),
					properties: None,
					conditions: None,
				})
				.await?;
			permission_ids.push(perm.id);
		}

		app.meta_adapter
			.create_role(&CreateRole {
				name: (*name).to_string(),
				description: Some((*description).to_string()),
				role_type: *role_type,
				permission_ids,
			})
			.await?;
		info!(role = %name, "seeded role");
	}
	Ok(())
}

/// Creates the super admin and a full-access token when no user exists yet.
/// Returns the token plaintext, which is never retrievable again.
async fn seed_admin(app: &App, config: &Config) -> XvResult<Option<String>> {
	if app.meta_adapter.count_users().await? > 0 {
		debug!("users present, skipping admin bootstrap");
		return Ok(None);
	}

	let user = app
		.meta_adapter
		.create_user(&CreateUser {
			username: &config.admin_username,
			email: &config.admin_email,
			is_active: true,
			is_super_admin: true,
		})
		.await?;

	let roles = app.meta_adapter.list_roles(Some(RoleType::Custom)).await?;
	if let Some(admin_role) = roles.iter().find(|role| role.name == ROLE_ADMIN) {
		app.meta_adapter.set_user_roles(user.id, &[admin_role.id]).await?;
	}

	let token = app
		.meta_adapter
		.create_api_token(&CreateApiToken {
			name: "bootstrap",
			description: Some("Created on first start"),
			token_type: TokenType::FullAccess,
			expires_at: None,
			user_id: user.id,
		})
		.await?;

	warn!(
		username = %user.username,
		token = %token.plaintext,
		"created super admin; this API token is shown only once"
	);
	Ok(Some(token.plaintext))
}

pub async fn run(app: &App, config: &Config) -> XvResult<Option<String>> {
	seed_roles(app).await?;
	seed_admin(app, config).await
}

// vim: ts=4
