//! RBAC middleware for management endpoints

use axum::{
	extract::{Request, State},
	middleware::Next,
	response::Response,
};

use crate::{access, extract::Auth, middleware::PermissionCheckOutput, prelude::*};

/// Middleware factory checking that the caller holds a permission matching
/// `(action, subject)`.
///
/// Must be layered inside [`crate::middleware::require_auth`].
pub fn require_permission(
	action: &'static str,
	subject: &'static str,
) -> impl Fn(State<App>, Auth, Request, Next) -> PermissionCheckOutput + Clone {
	move |state, auth, req, next| Box::pin(check_permission(state, auth, req, next, action, subject))
}

async fn check_permission(
	State(_app): State<App>,
	auth: Auth,
	req: Request,
	next: Next,
	action: &str,
	subject: &str,
) -> Result<Response, Error> {
	if !access::check_permission(auth.identity(), action, subject) {
		tracing::warn!(
			subject = %auth.identity().username,
			resource = subject,
			action = action,
			"permission denied"
		);
		return Err(Error::PermissionDenied);
	}

	Ok(next.run(req).await)
}

// vim: ts=4
