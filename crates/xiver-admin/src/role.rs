//! Role management handlers

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use crate::prelude::*;
use xiver_types::meta_adapter::{CreateRole, Role, RoleType, UpdateRole};
use xiver_types::types::ApiResponse;

#[derive(Debug, Default, Deserialize)]
pub struct ListRolesQuery {
	#[serde(rename = "type")]
	pub role_type: Option<RoleType>,
}

fn check_name(name: &str) -> XvResult<()> {
	if name.trim().is_empty() {
		return Err(Error::ValidationError("role name is required".into()));
	}
	Ok(())
}

/// GET /api/roles
pub async fn list_roles(
	State(app): State<App>,
	Query(q): Query<ListRolesQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<Role>>>)> {
	let roles = app.meta_adapter.list_roles(q.role_type).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(roles))))
}

/// GET /api/roles/public - roles of type `public`, no authentication needed
pub async fn list_public_roles(
	State(app): State<App>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<Role>>>)> {
	let roles = app.meta_adapter.list_roles(Some(RoleType::Public)).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(roles))))
}

pub async fn get_role(
	State(app): State<App>,
	Path(role_id): Path<u64>,
) -> XvResult<(StatusCode, Json<ApiResponse<Role>>)> {
	let role = app.meta_adapter.read_role(role_id).await?;
	Ok((StatusCode::OK, Json(ApiResponse::new(role))))
}

pub async fn post_role(
	State(app): State<App>,
	Json(role): Json<CreateRole>,
) -> XvResult<(StatusCode, Json<ApiResponse<Role>>)> {
	check_name(&role.name)?;
	let created = app.meta_adapter.create_role(&role).await?;

	info!(role_id = created.id, name = %created.name, "role created");
	Ok((StatusCode::CREATED, Json(ApiResponse::new(created))))
}

pub async fn put_role(
	State(app): State<App>,
	Path(role_id): Path<u64>,
	Json(upd): Json<UpdateRole>,
) -> XvResult<(StatusCode, Json<ApiResponse<Role>>)> {
	if let Some(name) = upd.name.value() {
		check_name(name)?;
	}
	let role = app.meta_adapter.update_role(role_id, &upd).await?;

	info!(role_id = role_id, "role updated");
	Ok((StatusCode::OK, Json(ApiResponse::new(role))))
}

pub async fn delete_role(
	State(app): State<App>,
	Path(role_id): Path<u64>,
) -> XvResult<StatusCode> {
	app.meta_adapter.delete_role(role_id).await?;
	info!(role_id = role_id, "role deleted");
	Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_role_name_required() {
		assert!(check_name("Editor").is_ok());
		assert!(matches!(check_name("  "), Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_list_query_type() {
		let q: ListRolesQuery = serde_json::from_str(r#"{"type":"public"}"#).unwrap();
		assert_eq!(q.role_type, Some(RoleType::Public));
	}
}

// vim: ts=4
