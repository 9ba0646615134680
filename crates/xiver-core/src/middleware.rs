//! Authentication middlewares
//!
//! Requests authenticate with `Authorization: Bearer xvc_...` API tokens.
//! The token resolves to its creator's identity, which is attached to the
//! request as an [`Auth`] extension.

use axum::{
	extract::{Request, State},
	http::{Method, header},
	middleware::Next,
	response::Response,
};
use std::{future::Future, pin::Pin};

use crate::extract::Auth;
use crate::prelude::*;
use xiver_types::identity::{AuthCtx, TokenType};

/// Output of a permission check middleware
pub type PermissionCheckOutput = Pin<Box<dyn Future<Output = Result<Response, Error>> + Send>>;

fn bearer_token(req: &Request) -> XvResult<Option<String>> {
	let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
		return Ok(None);
	};
	let auth_header = auth_header.to_str().map_err(|_| Error::Unauthorized)?;
	match auth_header.strip_prefix("Bearer ") {
		Some(token) => Ok(Some(token.trim().to_string())),
		None => Err(Error::Unauthorized),
	}
}

/// Resolves a token into an authentication context
pub async fn authenticate(app: &App, token: &str, method: &Method) -> XvResult<AuthCtx> {
	let validation = app.meta_adapter.validate_api_token(token).await?;

	if validation.token_type == TokenType::ReadOnly && !matches!(*method, Method::GET | Method::HEAD)
	{
		warn!(token_id = validation.token_id, method = %method, "read-only token used for a write");
		return Err(Error::PermissionDenied);
	}

	let user = match app.meta_adapter.read_user(validation.user_id).await {
		Ok(user) => user,
		Err(Error::NotFound) => return Err(Error::Unauthorized),
		Err(err) => return Err(err),
	};
	if !user.is_active {
		debug!(user_id = user.id, "token of inactive user rejected");
		return Err(Error::Unauthorized);
	}

	let identity = app.meta_adapter.read_identity(user.id).await?;
	Ok(AuthCtx { identity, token_id: validation.token_id, token_type: validation.token_type })
}

pub async fn require_auth(
	State(app): State<App>,
	mut req: Request,
	next: Next,
) -> XvResult<Response> {
	let token = bearer_token(&req)?.ok_or(Error::Unauthorized)?;
	let method = req.method().clone();
	let ctx = authenticate(&app, &token, &method).await?;

	req.extensions_mut().insert(Auth(ctx));
	Ok(next.run(req).await)
}

/// Attaches the identity when a token is presented. Invalid tokens are
/// rejected rather than silently downgraded to anonymous access.
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request,
	next: Next,
) -> XvResult<Response> {
	if let Some(token) = bearer_token(&req)? {
		let method = req.method().clone();
		let ctx = authenticate(&app, &token, &method).await?;
		req.extensions_mut().insert(Auth(ctx));
	}

	Ok(next.run(req).await)
}

// vim: ts=4
