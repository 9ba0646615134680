//! Error taxonomy shared by every Xiver crate.
//!
//! Expected outcomes (not found, conflicts, access denials, malformed input)
//! are returned to the caller as-is. Storage failures collapse into
//! `DbError` after being logged by the adapter, so driver details never leak
//! into HTTP responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

pub type XvResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Unknown content type, entry, role, user, ...
	NotFound,
	/// Duplicate UID or name, or a write that would break a uniqueness rule
	Conflict(String),
	/// Identity present but not allowed to perform the request
	PermissionDenied,
	/// Missing or invalid identity
	Unauthorized,
	/// Malformed request payload
	ValidationError(String),
	/// Unrecoverable storage error (already logged by the adapter)
	DbError,
	Parse,

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("JSON error: {}", err);
		Self::Parse
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::Conflict(msg) => write!(f, "conflict: {}", msg),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

#[derive(Serialize)]
struct ErrorBody {
	code: &'static str,
	message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
	error: ErrorBody,
}

impl Error {
	/// HTTP status and stable error code for this error
	pub fn status(&self) -> (StatusCode, &'static str) {
		match self {
			Error::NotFound => (StatusCode::NOT_FOUND, "E-CORE-NOTFOUND"),
			Error::Conflict(_) => (StatusCode::CONFLICT, "E-CORE-CONFLICT"),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "E-AUTH-NOPERM"),
			Error::Unauthorized => (StatusCode::UNAUTHORIZED, "E-AUTH-UNAUTH"),
			Error::ValidationError(_) | Error::Parse => (StatusCode::BAD_REQUEST, "E-VAL-INVALID"),
			Error::DbError | Error::Io(_) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "E-CORE-INTERNAL")
			}
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let (status, code) = self.status();
		let message = match self {
			Error::NotFound => "not found".to_string(),
			Error::Conflict(msg) | Error::ValidationError(msg) => msg,
			Error::PermissionDenied => "insufficient access".to_string(),
			Error::Unauthorized => "authentication required".to_string(),
			Error::Parse => "malformed request".to_string(),
			Error::DbError | Error::Io(_) => "internal server error".to_string(),
		};

		(status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(Error::NotFound.status().0, StatusCode::NOT_FOUND);
		assert_eq!(Error::Conflict("uid".into()).status().0, StatusCode::CONFLICT);
		assert_eq!(Error::PermissionDenied.status().0, StatusCode::FORBIDDEN);
		assert_eq!(Error::Unauthorized.status().0, StatusCode::UNAUTHORIZED);
		assert_eq!(Error::ValidationError("x".into()).status().0, StatusCode::BAD_REQUEST);
		assert_eq!(Error::DbError.status().0, StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn test_permission_denied_does_not_explain() {
		let res = Error::PermissionDenied.into_response();
		assert_eq!(res.status(), StatusCode::FORBIDDEN);
	}
}

// vim: ts=4
