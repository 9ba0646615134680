//! Public read API
//!
//! Anonymous callers and tokens alike see only visible content types whose
//! access tier they pass, and only published entries. Admins may list and
//! read hidden content type definitions.

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use crate::prelude::*;
use crate::relation::TargetScope;
use crate::schema;
use crate::service::{self, EntryFilter};
use xiver_core::access;
use xiver_core::extract::OptionalAuth;
use xiver_types::content::{ContentEntry, ContentType, EntryStatus, is_reserved_uid};
use xiver_types::identity::Identity;
use xiver_types::types::{ApiResponse, DEFAULT_PAGE_SIZE};

fn deny(identity: Option<&Identity>, ct: &ContentType) -> Error {
	tracing::warn!(
		subject = identity.map_or("anonymous", |id| id.username.as_str()),
		uid = %ct.uid,
		access_type = ct.access_type.as_str(),
		"public content access denied"
	);
	Error::PermissionDenied
}

/// Content types the caller may see, paged after filtering
pub async fn list_content_types(
	app: &App,
	identity: Option<&Identity>,
	page: Page,
) -> XvResult<(Vec<ContentType>, u64)> {
	if access::is_admin(identity) {
		return schema::list(app, None, Some(page)).await;
	}

	let (visible, _) = schema::list(app, Some(true), None).await?;
	let accessible: Vec<ContentType> = visible
		.into_iter()
		.filter(|ct| access::check_access(identity, ct.access_type))
		.collect();
	let total = accessible.len() as u64;
	let items = accessible
		.into_iter()
		.skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
		.take(page.limit() as usize)
		.collect();

	Ok((items, total))
}

pub async fn get_content_type(
	app: &App,
	identity: Option<&Identity>,
	uid: &str,
) -> XvResult<ContentType> {
	let ct = schema::get(app, uid).await?;
	if access::is_admin(identity) {
		return Ok(ct);
	}
	if !ct.is_visible {
		return Err(Error::NotFound);
	}
	if !access::check_access(identity, ct.access_type) {
		return Err(deny(identity, &ct));
	}
	Ok(ct)
}

/// Content type addressed by a public entry path
async fn entry_type(app: &App, identity: Option<&Identity>, uid: &str) -> XvResult<ContentType> {
	if is_reserved_uid(uid) {
		return Err(Error::NotFound);
	}
	let ct = schema::get(app, uid).await?;
	if !ct.is_visible {
		return Err(Error::NotFound);
	}
	if !access::check_access(identity, ct.access_type) {
		return Err(deny(identity, &ct));
	}
	Ok(ct)
}

pub async fn list_entries(
	app: &App,
	identity: Option<&Identity>,
	uid: &str,
	search: Option<&str>,
	page: Page,
) -> XvResult<(Vec<ContentEntry>, u64)> {
	let ct = entry_type(app, identity, uid).await?;
	let filter = EntryFilter { status: Some(EntryStatus::Published), search, page };
	service::list_entries(app, &ct, &filter).await
}

/// Published entry; drafts are reported as missing. Hydration only embeds
/// published targets of visible types the caller passes the tier check for.
pub async fn get_entry(
	app: &App,
	identity: Option<&Identity>,
	uid: &str,
	entry_id: u64,
	populate: bool,
) -> XvResult<ContentEntry> {
	let ct = entry_type(app, identity, uid).await?;
	let entry =
		service::get_entry(app, &ct, entry_id, populate, TargetScope::public(identity)).await?;
	if entry.status != EntryStatus::Published {
		return Err(Error::NotFound);
	}
	Ok(entry)
}

// Handlers //
//**********//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicListQuery {
	pub search: Option<String>,
	pub page: Option<u32>,
	pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PopulateQuery {
	#[serde(default)]
	pub populate: bool,
}

/// GET /api/content-types
pub async fn get_content_types(
	State(app): State<App>,
	auth: OptionalAuth,
	Query(q): Query<PublicListQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<ContentType>>>)> {
	let page = Page::new(q.page, q.page_size, DEFAULT_PAGE_SIZE);
	let (types, total) = list_content_types(&app, auth.identity(), page).await?;
	Ok((StatusCode::OK, Json(ApiResponse::with_pagination(types, page, total))))
}

/// GET /api/content-types/{uid}
pub async fn get_content_type_by_uid(
	State(app): State<App>,
	auth: OptionalAuth,
	Path(uid): Path<String>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentType>>)> {
	let ct = get_content_type(&app, auth.identity(), &uid).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(ct))))
}

/// GET /api/{uid}
pub async fn get_entries(
	State(app): State<App>,
	auth: OptionalAuth,
	Path(uid): Path<String>,
	Query(q): Query<PublicListQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<ContentEntry>>>)> {
	let page = Page::new(q.page, q.page_size, DEFAULT_PAGE_SIZE);
	let (entries, total) =
		list_entries(&app, auth.identity(), &uid, q.search.as_deref(), page).await?;
	Ok((StatusCode::OK, Json(ApiResponse::with_pagination(entries, page, total))))
}

/// GET /api/{uid}/{id}
pub async fn get_entry_by_id(
	State(app): State<App>,
	auth: OptionalAuth,
	Path((uid, entry_id)): Path<(String, u64)>,
	Query(q): Query<PopulateQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentEntry>>)> {
	let entry = get_entry(&app, auth.identity(), &uid, entry_id, q.populate).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(entry))))
}

// vim: ts=4
