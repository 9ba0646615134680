//! Content type definitions

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use xiver::content::{AccessType, ContentKind, ContentType};
use xiver::meta_adapter::{CreateContentType, ListContentTypeOptions, UpdateContentType};
use xiver::prelude::*;

use crate::utils::*;

const COLS: &str = "id, uid, kind, display_name, description, schema, access_type, is_visible, \
	created_at, updated_at";

fn from_row(row: &SqliteRow) -> Result<ContentType, sqlx::Error> {
	let schema: String = row.try_get("schema")?;
	Ok(ContentType {
		id: get_id(row, "id")?,
		uid: row.try_get("uid")?,
		kind: get_enum(row, "kind", ContentKind::parse)?,
		display_name: row.try_get("display_name")?,
		description: row.try_get("description")?,
		schema: from_json(&schema)?,
		access_type: get_enum(row, "access_type", AccessType::parse)?,
		is_visible: row.try_get("is_visible")?,
		created_at: get_ts(row, "created_at")?,
		updated_at: get_ts(row, "updated_at")?,
	})
}

pub(crate) async fn list(
	db: &SqlitePool,
	opts: &ListContentTypeOptions,
) -> XvResult<(Vec<ContentType>, u64)> {
	let mut count = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
		"SELECT count(*) FROM content_types WHERE deleted_at IS NULL",
	);
	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
		"SELECT {COLS} FROM content_types WHERE deleted_at IS NULL"
	));
	if let Some(is_visible) = opts.is_visible {
		count.push(" AND is_visible=").push_bind(is_visible);
		query.push(" AND is_visible=").push_bind(is_visible);
	}
	query.push(" ORDER BY uid");
	if let Some(page) = opts.page {
		query.push(" LIMIT ").push_bind(i64::from(page.limit()));
		query.push(" OFFSET ").push_bind(page.offset() as i64);
	}

	let total: i64 = count.build_query_scalar().fetch_one(db).await.map_err(map_db_err)?;
	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	let items = collect_res(rows.iter().map(from_row))?;

	Ok((items, total as u64))
}

pub(crate) async fn read(db: &SqlitePool, uid: &str) -> XvResult<ContentType> {
	let res = sqlx::query(&format!(
		"SELECT {COLS} FROM content_types WHERE uid=? AND deleted_at IS NULL"
	))
	.bind(uid)
	.fetch_one(db)
	.await;

	map_res(res, |row| from_row(&row))
}

pub(crate) async fn create(db: &SqlitePool, ct: &CreateContentType<'_>) -> XvResult<ContentType> {
	let schema = serde_json::to_string(ct.schema)?;
	let res = sqlx::query(
		"INSERT INTO content_types (uid, kind, display_name, description, schema, access_type, is_visible)
		VALUES (?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(ct.uid)
	.bind(ct.kind.as_str())
	.bind(ct.display_name)
	.bind(ct.description)
	.bind(schema)
	.bind(ct.access_type.as_str())
	.bind(ct.is_visible)
	.execute(db)
	.await;

	match res {
		Ok(_) => read(db, ct.uid).await,
		Err(err) => match map_db_err(err) {
			Error::Conflict(_) => {
				Err(Error::Conflict(format!("content type '{}' already exists", ct.uid)))
			}
			err => Err(err),
		},
	}
}

pub(crate) async fn update(
	db: &SqlitePool,
	uid: &str,
	upd: &UpdateContentType,
) -> XvResult<ContentType> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	let id: i64 =
		sqlx::query_scalar("SELECT id FROM content_types WHERE uid=? AND deleted_at IS NULL")
			.bind(uid)
			.fetch_one(&mut *tx)
			.await
			.map_err(map_db_err)?;

	if let Some(new_uid) = upd.uid.as_deref().filter(|new_uid| *new_uid != uid) {
		let entries: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM content_entries WHERE content_type_id=? AND deleted_at IS NULL",
		)
		.bind(id)
		.fetch_one(&mut *tx)
		.await
		.map_err(map_db_err)?;
		if entries > 0 {
			return Err(Error::Conflict(format!(
				"content type '{}' has entries, uid cannot change to '{}'",
				uid, new_uid
			)));
		}
	}

	let schema = upd.schema.as_ref().map(serde_json::to_string).transpose()?;

	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE content_types SET ");
	let mut has_updates = false;
	has_updates = push_opt!(query, has_updates, "uid", upd.uid.as_deref());
	has_updates = push_opt!(query, has_updates, "kind", upd.kind.map(|k| k.as_str()));
	has_updates = push_opt!(query, has_updates, "display_name", upd.display_name.as_deref());
	has_updates = push_patch!(query, has_updates, "description", &upd.description);
	has_updates = push_opt!(query, has_updates, "schema", schema);
	has_updates = push_opt!(query, has_updates, "access_type", upd.access_type.map(|a| a.as_str()));
	has_updates = push_opt!(query, has_updates, "is_visible", upd.is_visible);

	if has_updates {
		query.push(", updated_at=unixepoch() WHERE id=").push_bind(id);
		let res = query.build().execute(&mut *tx).await;
		if let Err(err) = res {
			return match map_db_err(err) {
				Error::Conflict(_) => Err(Error::Conflict("content type uid already in use".into())),
				err => Err(err),
			};
		}
	}

	tx.commit().await.map_err(map_db_err)?;

	read(db, upd.uid.as_deref().unwrap_or(uid)).await
}

pub(crate) async fn delete(db: &SqlitePool, uid: &str) -> XvResult<()> {
	let res = sqlx::query(
		"UPDATE content_types SET deleted_at=unixepoch() WHERE uid=? AND deleted_at IS NULL",
	)
	.bind(uid)
	.execute(db)
	.await
	.map_err(map_db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

// vim: ts=4
