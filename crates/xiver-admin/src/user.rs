//! User listing and role assignment

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use crate::prelude::*;
use xiver_types::meta_adapter::User;
use xiver_types::types::{ApiResponse, DEFAULT_PAGE_SIZE};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
	pub page: Option<u32>,
	pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserRoles {
	pub role_ids: Vec<u64>,
}

pub async fn list_users(
	State(app): State<App>,
	Query(q): Query<ListUsersQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<User>>>)> {
	let page = Page::new(q.page, q.page_size, DEFAULT_PAGE_SIZE);
	let (users, total) = app.meta_adapter.list_users(page).await?;
	Ok((StatusCode::OK, Json(ApiResponse::with_pagination(users, page, total))))
}

pub async fn get_user(
	State(app): State<App>,
	Path(user_id): Path<u64>,
) -> XvResult<(StatusCode, Json<ApiResponse<User>>)> {
	let user = app.meta_adapter.read_user(user_id).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(user))))
}

/// PUT /api/users/{id}/roles - replaces the role set of a user
pub async fn put_user_roles(
	State(app): State<App>,
	Path(user_id): Path<u64>,
	Json(body): Json<SetUserRoles>,
) -> XvResult<(StatusCode, Json<ApiResponse<User>>)> {
	app.meta_adapter.set_user_roles(user_id, &body.role_ids).await?;
	let user = app.meta_adapter.read_user(user_id).await?;

	info!(user_id = user_id, roles = ?body.role_ids, "user roles replaced");
	Ok((StatusCode::OK, Json(ApiResponse::new(user))))
}

// vim: ts=4
