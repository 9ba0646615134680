//! Access evaluation
//!
//! Two independent checks decide whether an identity may proceed:
//!
//! * the tiered check compares the identity against a content type's
//!   [`AccessType`] (public < authenticated < moderator < admin),
//! * the RBAC check matches `(action, subject)` against the permissions of
//!   every role the identity holds.
//!
//! Super admins pass both unconditionally. Permission `properties` and
//! `conditions` are stored but not evaluated here.

use crate::prelude::*;
use xiver_types::content::AccessType;
use xiver_types::identity::{Identity, PermissionGrant};

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_MODERATOR: &str = "Moderator";
pub const WILDCARD: &str = "all";

/// Tiered access check against a content type's access type
pub fn check_access(identity: Option<&Identity>, access_type: AccessType) -> bool {
	if access_type == AccessType::Public {
		return true;
	}
	let Some(identity) = identity else {
		return false;
	};
	if access_type == AccessType::Authenticated {
		return true;
	}
	if identity.is_super_admin {
		return true;
	}

	match access_type {
		AccessType::Moderator => identity.has_role(ROLE_MODERATOR) || identity.has_role(ROLE_ADMIN),
		AccessType::Admin => identity.has_role(ROLE_ADMIN),
		AccessType::Public | AccessType::Authenticated => false,
	}
}

/// Like [`check_access`], but reports the failure kind: `Unauthorized`
/// without an identity, `PermissionDenied` otherwise.
pub fn require_access(identity: Option<&Identity>, access_type: AccessType) -> XvResult<()> {
	if check_access(identity, access_type) {
		return Ok(());
	}
	match identity {
		None => Err(Error::Unauthorized),
		Some(identity) => {
			tracing::warn!(
				subject = %identity.username,
				access_type = access_type.as_str(),
				"content access denied"
			);
			Err(Error::PermissionDenied)
		}
	}
}

/// Super admin, or holder of the "Admin" role
pub fn is_admin(identity: Option<&Identity>) -> bool {
	identity.is_some_and(|id| id.is_super_admin || id.has_role(ROLE_ADMIN))
}

fn subject_matches(granted: &str, subject: &str) -> bool {
	if granted == WILDCARD || granted == subject {
		return true;
	}
	// "content-type" covers "content-type:articles", and a grant scoped to
	// "content-type:articles" admits checks made on plain "content-type"
	let scoped = |long: &str, short: &str| {
		long.strip_prefix(short).is_some_and(|rest| rest.starts_with(':'))
	};
	scoped(subject, granted) || scoped(granted, subject)
}

pub fn permission_matches(perm: &PermissionGrant, action: &str, subject: &str) -> bool {
	(perm.action == WILDCARD || perm.action == action) && subject_matches(&perm.subject, subject)
}

/// RBAC check over all roles of the identity
pub fn check_permission(identity: &Identity, action: &str, subject: &str) -> bool {
	identity.is_super_admin || identity.permissions().any(|p| permission_matches(p, action, subject))
}


// vim: ts=4
