//! API token management
//!
//! A token is bound to the user who created it and acts with that user's
//! identity. The plaintext is returned once, by the create call.

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prelude::*;
use xiver_core::extract::Auth;
use xiver_types::identity::TokenType;
use xiver_types::meta_adapter::{ApiToken, CreateApiToken, CreatedApiToken};
use xiver_types::types::ApiResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
	pub name: String,
	pub description: Option<String>,
	#[serde(rename = "type", default)]
	pub token_type: TokenType,
	pub expires_at: Option<Timestamp>,
}

/// Freshly issued token, including its plaintext
#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
	pub id: u64,
	pub name: String,
	pub description: Option<String>,
	pub token_prefix: String,
	#[serde(rename = "type")]
	pub token_type: TokenType,
	pub expires_at: Option<Timestamp>,
	pub user_id: u64,
	pub created_at: Timestamp,
	pub access_key: String,
}

impl From<CreatedApiToken> for IssuedToken {
	fn from(created: CreatedApiToken) -> Self {
		let info = created.info;
		Self {
			id: info.id,
			name: info.name,
			description: info.description,
			token_prefix: info.token_prefix,
			token_type: info.token_type,
			expires_at: info.expires_at,
			user_id: info.user_id,
			created_at: info.created_at,
			access_key: created.plaintext,
		}
	}
}

fn check_request(req: &CreateTokenRequest, now: Timestamp) -> XvResult<()> {
	if req.name.trim().is_empty() {
		return Err(Error::ValidationError("token name is required".into()));
	}
	if req.expires_at.is_some_and(|exp| exp <= now) {
		return Err(Error::ValidationError("expiresAt must be in the future".into()));
	}
	Ok(())
}

pub async fn list_tokens(
	State(app): State<App>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<ApiToken>>>)> {
	let tokens = app.meta_adapter.list_api_tokens().await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(tokens))))
}

pub async fn get_token(
	State(app): State<App>,
	Path(token_id): Path<u64>,
) -> XvResult<(StatusCode, Json<ApiResponse<ApiToken>>)> {
	let token = app.meta_adapter.read_api_token(token_id).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(token))))
}

pub async fn post_token(
	State(app): State<App>,
	auth: Auth,
	Json(req): Json<CreateTokenRequest>,
) -> XvResult<(StatusCode, Json<ApiResponse<IssuedToken>>)> {
	check_request(&req, Timestamp::now())?;

	let created = app
		.meta_adapter
		.create_api_token(&CreateApiToken {
			name: &req.name,
			description: req.description.as_deref(),
			token_type: req.token_type,
			expires_at: req.expires_at,
			user_id: auth.user_id(),
		})
		.await?;

	tracing::info!(
		token_id = created.info.id,
		user_id = auth.user_id(),
		token_type = created.info.token_type.as_str(),
		"api token issued"
	);
	Ok((StatusCode::CREATED, Json(ApiResponse::new(created.into()))))
}

pub async fn delete_token(
	State(app): State<App>,
	Path(token_id): Path<u64>,
) -> XvResult<StatusCode> {
	app.meta_adapter.delete_api_token(token_id).await?;
	tracing::info!(token_id = token_id, "api token revoked");
	Ok(StatusCode::NO_CONTENT)
}


// vim: ts=4
