//! Audit log and content history

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use xiver::event::ChangeType;
use xiver::meta_adapter::{
	AuditLog, ContentHistory, CreateAuditLog, CreateContentHistory, ListAuditLogOptions,
};
use xiver::prelude::*;

use crate::utils::*;

fn audit_from_row(row: &SqliteRow) -> Result<AuditLog, sqlx::Error> {
	let metadata: Option<String> = row.try_get("metadata")?;
	Ok(AuditLog {
		id: get_id(row, "id")?,
		action: row.try_get("action")?,
		subject: row.try_get("subject")?,
		subject_id: row.try_get("subject_id")?,
		description: row.try_get("description")?,
		user_id: get_opt_id(row, "user_id")?,
		metadata: metadata.as_deref().map(from_json).transpose()?,
		created_at: get_ts(row, "created_at")?,
	})
}

fn history_from_row(row: &SqliteRow) -> Result<ContentHistory, sqlx::Error> {
	let data: String = row.try_get("data")?;
	Ok(ContentHistory {
		id: get_id(row, "id")?,
		entry_id: get_id(row, "entry_id")?,
		data: from_json(&data)?,
		change_type: get_enum(row, "change_type", ChangeType::parse)?,
		change_note: row.try_get("change_note")?,
		changed_by: get_opt_id(row, "changed_by")?,
		created_at: get_ts(row, "created_at")?,
	})
}

pub(crate) async fn create_log(db: &SqlitePool, log: &CreateAuditLog<'_>) -> XvResult<u64> {
	let metadata = log.metadata.map(serde_json::to_string).transpose()?;
	let id: i64 = sqlx::query_scalar(
		"INSERT INTO audit_logs (action, subject, subject_id, description, user_id, metadata)
		VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
	)
	.bind(log.action)
	.bind(log.subject)
	.bind(log.subject_id)
	.bind(log.description)
	.bind(log.user_id.map(|id| id as i64))
	.bind(metadata)
	.fetch_one(db)
	.await
	.map_err(map_db_err)?;

	Ok(id as u64)
}

fn push_filters(query: &mut sqlx::QueryBuilder<'_, sqlx::Sqlite>, opts: &ListAuditLogOptions<'_>) {
	query.push(" WHERE 1=1");
	if let Some(action) = opts.action {
		query.push(" AND action=").push_bind(action.to_string());
	}
	if let Some(subject) = opts.subject {
		query.push(" AND subject=").push_bind(subject.to_string());
	}
	if let Some(user_id) = opts.user_id {
		query.push(" AND user_id=").push_bind(user_id as i64);
	}
}

pub(crate) async fn list_logs(
	db: &SqlitePool,
	opts: &ListAuditLogOptions<'_>,
) -> XvResult<(Vec<AuditLog>, u64)> {
	let mut count = sqlx::QueryBuilder::<sqlx::Sqlite>::new("SELECT count(*) FROM audit_logs");
	push_filters(&mut count, opts);
	let total: i64 = count.build_query_scalar().fetch_one(db).await.map_err(map_db_err)?;

	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
		"SELECT id, action, subject, subject_id, description, user_id, metadata, created_at
		FROM audit_logs",
	);
	push_filters(&mut query, opts);
	query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
	query.push_bind(i64::from(opts.page.limit()));
	query.push(" OFFSET ").push_bind(opts.page.offset() as i64);

	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	let items = collect_res(rows.iter().map(audit_from_row))?;

	Ok((items, total as u64))
}

pub(crate) async fn create_history(
	db: &SqlitePool,
	hist: &CreateContentHistory<'_>,
) -> XvResult<u64> {
	let data = serde_json::to_string(hist.data)?;
	let id: i64 = sqlx::query_scalar(
		"INSERT INTO content_history (entry_id, data, change_type, change_note, changed_by)
		VALUES (?, ?, ?, ?, ?) RETURNING id",
	)
	.bind(hist.entry_id as i64)
	.bind(data)
	.bind(hist.change_type.as_str())
	.bind(hist.change_note)
	.bind(hist.changed_by.map(|id| id as i64))
	.fetch_one(db)
	.await
	.map_err(map_db_err)?;

	Ok(id as u64)
}

pub(crate) async fn list_history(db: &SqlitePool, entry_id: u64) -> XvResult<Vec<ContentHistory>> {
	let rows = sqlx::query(
		"SELECT id, entry_id, data, change_type, change_note, changed_by, created_at
		FROM content_history WHERE entry_id=? ORDER BY created_at DESC, id DESC",
	)
	.bind(entry_id as i64)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;

	collect_res(rows.iter().map(history_from_row))
}

// vim: ts=4
