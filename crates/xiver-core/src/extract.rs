//! Custom extractors for Xiver-specific data

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::prelude::*;
use xiver_types::identity::{AuthCtx, Identity};

// Auth //
//******//
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl Auth {
	pub fn identity(&self) -> &Identity {
		&self.0.identity
	}

	pub fn user_id(&self) -> u64 {
		self.0.identity.user_id
	}
}

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::Unauthorized)
		}
	}
}

// OptionalAuth //
//***************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthCtx>);

impl OptionalAuth {
	pub fn identity(&self) -> Option<&Identity> {
		self.0.as_ref().map(|ctx| &ctx.identity)
	}
}

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// vim: ts=4
