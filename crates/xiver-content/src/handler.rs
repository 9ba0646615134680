//! Management API handlers for content types, entries and relations
//!
//! Content type routes are gated by RBAC layers in the router. Entry and
//! relation routes require an identity and the content type's access tier.

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::relation::{self, NewRelation, TargetScope};
use crate::schema::{self, ContentTypePatch, DefineContentType};
use crate::service::{self, EntryFilter, EntryInput};
use xiver_core::extract::Auth;
use xiver_types::content::{ContentEntry, ContentRelation, ContentType, EntryStatus};
use xiver_types::meta_adapter::ContentHistory;
use xiver_types::types::{ApiResponse, DEFAULT_PAGE_SIZE};

// Content types //
//***************//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContentTypesQuery {
	pub is_visible: Option<bool>,
	pub page: Option<u32>,
	pub page_size: Option<u32>,
}

/// GET /api/admin/content-types - every content type, hidden ones included
pub async fn list_content_types(
	State(app): State<App>,
	Query(q): Query<ListContentTypesQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<ContentType>>>)> {
	let page = Page::new(q.page, q.page_size, DEFAULT_PAGE_SIZE);
	let (types, total) = schema::list(&app, q.is_visible, Some(page)).await?;

	Ok((StatusCode::OK, Json(ApiResponse::with_pagination(types, page, total))))
}

pub async fn get_content_type(
	State(app): State<App>,
	Path(uid): Path<String>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentType>>)> {
	let ct = schema::get(&app, &uid).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(ct))))
}

pub async fn post_content_type(
	State(app): State<App>,
	Json(def): Json<DefineContentType>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentType>>)> {
	let ct = schema::define(&app, def).await?;
	Ok((StatusCode::CREATED, Json(ApiResponse::new(ct))))
}

pub async fn put_content_type(
	State(app): State<App>,
	Path(uid): Path<String>,
	Json(patch): Json<ContentTypePatch>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentType>>)> {
	let ct = schema::update(&app, &uid, patch).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(ct))))
}

pub async fn delete_content_type(
	State(app): State<App>,
	Path(uid): Path<String>,
) -> XvResult<StatusCode> {
	schema::delete(&app, &uid).await?;
	Ok(StatusCode::NO_CONTENT)
}

// Entries //
//*********//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesQuery {
	pub status: Option<EntryStatus>,
	pub search: Option<String>,
	pub page: Option<u32>,
	pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetEntryQuery {
	#[serde(default)]
	pub populate: bool,
}

/// GET /api/admin/content-types/{uid}/entries - entries of every status
pub async fn list_entries(
	State(app): State<App>,
	auth: Auth,
	Path(uid): Path<String>,
	Query(q): Query<ListEntriesQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<ContentEntry>>>)> {
	let ct = service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	let page = Page::new(q.page, q.page_size, DEFAULT_PAGE_SIZE);
	let filter = EntryFilter { status: q.status, search: q.search.as_deref(), page };
	let (entries, total) = service::list_entries(&app, &ct, &filter).await?;

	Ok((StatusCode::OK, Json(ApiResponse::with_pagination(entries, page, total))))
}

pub async fn post_entry(
	State(app): State<App>,
	auth: Auth,
	Path(uid): Path<String>,
	Json(input): Json<EntryInput>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentEntry>>)> {
	let ct = service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	let entry = service::create_entry(&app, &ct, input, Some(auth.user_id())).await?;
	Ok((StatusCode::CREATED, Json(ApiResponse::new(entry))))
}

pub async fn get_entry(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id)): Path<(String, u64)>,
	Query(q): Query<GetEntryQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentEntry>>)> {
	let ct = service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	let scope = TargetScope::management(auth.identity());
	let entry = service::get_entry(&app, &ct, entry_id, q.populate, scope).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(entry))))
}

pub async fn put_entry(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id)): Path<(String, u64)>,
	Json(input): Json<EntryInput>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentEntry>>)> {
	let ct = service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	let entry = service::update_entry(&app, &ct, entry_id, input, Some(auth.user_id())).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(entry))))
}

pub async fn delete_entry(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id)): Path<(String, u64)>,
) -> XvResult<StatusCode> {
	let ct = service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	service::delete_entry(&app, &ct, entry_id, Some(auth.user_id())).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/content-types/{uid}/entries/{id}/history - newest first
pub async fn get_entry_history(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id)): Path<(String, u64)>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<ContentHistory>>>)> {
	let ct = service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	app.meta_adapter.read_entry(ct.id, entry_id).await?;
	let history = app.meta_adapter.list_entry_history(entry_id).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(history))))
}

// Relations //
//***********//
#[derive(Debug, Default, Deserialize)]
pub struct ListRelationsQuery {
	pub field: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RelatedEntry {
	pub entry: ContentEntry,
	pub relation: ContentRelation,
}

pub async fn list_relations(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id)): Path<(String, u64)>,
	Query(q): Query<ListRelationsQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<ContentRelation>>>)> {
	service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	let rels =
		relation::list_by_source(app.meta_adapter.as_ref(), &uid, entry_id, q.field.as_deref())
			.await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(rels))))
}

pub async fn post_relation(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id)): Path<(String, u64)>,
	Json(rel): Json<NewRelation>,
) -> XvResult<(StatusCode, Json<ApiResponse<ContentRelation>>)> {
	service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	let created = relation::upsert(&app, &uid, entry_id, &rel).await?;
	Ok((StatusCode::CREATED, Json(ApiResponse::new(created))))
}

/// DELETE /api/admin/content-types/{uid}/entries/{id}/relations/{relation_id}
pub async fn delete_relation(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id, relation_id)): Path<(String, u64, u64)>,
) -> XvResult<StatusCode> {
	service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	relation::delete(&app, &uid, entry_id, relation_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/content-types/{uid}/entries/{id}/relations/{field}
pub async fn list_related_entries(
	State(app): State<App>,
	auth: Auth,
	Path((uid, entry_id, field)): Path<(String, u64, String)>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<RelatedEntry>>>)> {
	service::authorize_type(&app, &uid, Some(auth.identity())).await?;
	let related = relation::list_related(&app, auth.identity(), &uid, entry_id, &field)
		.await?
		.into_iter()
		.map(|(relation, entry)| RelatedEntry { entry, relation })
		.collect();
	Ok((StatusCode::OK, Json(ApiResponse::new(related))))
}

// vim: ts=4
