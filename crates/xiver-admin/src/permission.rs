//! Permission management handlers
//!
//! `properties` and `conditions` are stored verbatim and returned to
//! clients. The access evaluator only matches `action` and `subject`.

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};

use crate::prelude::*;
use xiver_types::meta_adapter::{CreatePermission, Permission, UpdatePermission};
use xiver_types::types::ApiResponse;

fn check_part(name: &str, value: &str) -> XvResult<()> {
	if value.trim().is_empty() {
		return Err(Error::ValidationError(format!("{} is required", name)));
	}
	Ok(())
}

pub async fn list_permissions(
	State(app): State<App>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<Permission>>>)> {
	let perms = app.meta_adapter.list_permissions().await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(perms))))
}

pub async fn get_permission(
	State(app): State<App>,
	Path(perm_id): Path<u64>,
) -> XvResult<(StatusCode, Json<ApiResponse<Permission>>)> {
	let perm = app.meta_adapter.read_permission(perm_id).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(perm))))
}

pub async fn post_permission(
	State(app): State<App>,
	Json(perm): Json<CreatePermission>,
) -> XvResult<(StatusCode, Json<ApiResponse<Permission>>)> {
	check_part("action", &perm.action)?;
	check_part("subject", &perm.subject)?;
	let created = app.meta_adapter.create_permission(&perm).await?;

	info!(perm_id = created.id, action = %created.action, subject = %created.subject, "permission created");
	Ok((StatusCode::CREATED, Json(ApiResponse::new(created))))
}

pub async fn put_permission(
	State(app): State<App>,
	Path(perm_id): Path<u64>,
	Json(upd): Json<UpdatePermission>,
) -> XvResult<(StatusCode, Json<ApiResponse<Permission>>)> {
	if upd.action.is_null() || upd.subject.is_null() {
		return Err(Error::ValidationError("action and subject cannot be null".into()));
	}
	if let Some(action) = upd.action.value() {
		check_part("action", action)?;
	}
	if let Some(subject) = upd.subject.value() {
		check_part("subject", subject)?;
	}
	let perm = app.meta_adapter.update_permission(perm_id, &upd).await?;

	info!(perm_id = perm_id, "permission updated");
	Ok((StatusCode::OK, Json(ApiResponse::new(perm))))
}

pub async fn delete_permission(
	State(app): State<App>,
	Path(perm_id): Path<u64>,
) -> XvResult<StatusCode> {
	app.meta_adapter.delete_permission(perm_id).await?;
	info!(perm_id = perm_id, "permission deleted");
	Ok(StatusCode::NO_CONTENT)
}

// vim: ts=4
