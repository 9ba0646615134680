//! Audit log listing

use axum::{
	Json,
	extract::{Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use crate::prelude::*;
use xiver_types::meta_adapter::{AuditLog, ListAuditLogOptions};
use xiver_types::types::ApiResponse;

pub const AUDIT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditLogsQuery {
	pub action: Option<String>,
	pub subject: Option<String>,
	pub user_id: Option<u64>,
	pub page: Option<u32>,
	pub page_size: Option<u32>,
}

/// GET /api/audit-logs - newest first
pub async fn list_audit_logs(
	State(app): State<App>,
	Query(q): Query<ListAuditLogsQuery>,
) -> XvResult<(StatusCode, Json<ApiResponse<Vec<AuditLog>>>)> {
	let page = Page::new(q.page, q.page_size, AUDIT_PAGE_SIZE);
	let opts = ListAuditLogOptions {
		action: q.action.as_deref(),
		subject: q.subject.as_deref(),
		user_id: q.user_id,
		page,
	};
	let (logs, total) = app.meta_adapter.list_audit_logs(&opts).await?;

	Ok((StatusCode::OK, Json(ApiResponse::with_pagination(logs, page, total))))
}

// vim: ts=4
