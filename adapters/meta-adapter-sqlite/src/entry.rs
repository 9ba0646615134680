//! Content entries
//!
//! Entry data is stored as a JSON object. Updates merge into the stored
//! object, and `published_at` is only ever set once. Relation slots sent
//! with a write commit or roll back together with the entry row.

use sqlx::{Row, SqliteConnection, SqlitePool, sqlite::SqliteRow};

use xiver::content::{ContentEntry, EntryStatus};
use xiver::meta_adapter::{CreateEntry, ListEntryOptions, SlotReplace, UpdateEntry};
use xiver::prelude::*;
use xiver::value::{EntryData, merge_data};

use crate::relation;
use crate::utils::*;

const COLS: &str = "e.id, e.content_type_id, e.data, e.status, e.published_at, e.created_by, \
	e.updated_by, e.created_at, e.updated_at";

fn from_row(row: &SqliteRow) -> Result<ContentEntry, sqlx::Error> {
	let data: String = row.try_get("data")?;
	Ok(ContentEntry {
		id: get_id(row, "id")?,
		content_type_id: get_id(row, "content_type_id")?,
		data: from_json(&data)?,
		status: get_enum(row, "status", EntryStatus::parse)?,
		published_at: get_opt_ts(row, "published_at")?,
		created_by: get_opt_id(row, "created_by")?,
		updated_by: get_opt_id(row, "updated_by")?,
		created_at: get_ts(row, "created_at")?,
		updated_at: get_ts(row, "updated_at")?,
	})
}

/// Relation edges are keyed by content type uid, entries by content type id
async fn write_relations(
	conn: &mut SqliteConnection,
	content_type_id: u64,
	entry_id: u64,
	slots: &[SlotReplace<'_>],
) -> XvResult<()> {
	if slots.is_empty() {
		return Ok(());
	}
	let uid: String = sqlx::query_scalar("SELECT uid FROM content_types WHERE id=?")
		.bind(content_type_id as i64)
		.fetch_one(&mut *conn)
		.await
		.map_err(map_db_err)?;

	relation::write_slots(conn, &uid, entry_id, slots).await
}

pub(crate) async fn create(
	db: &SqlitePool,
	content_type_id: u64,
	entry: &CreateEntry<'_>,
) -> XvResult<ContentEntry> {
	let data = serde_json::to_string(entry.data)?;
	let mut tx = db.begin().await.map_err(map_db_err)?;

	let id: i64 = sqlx::query_scalar(
		"INSERT INTO content_entries (content_type_id, data, status, published_at, created_by, updated_by)
		VALUES (?1, ?2, ?3, CASE WHEN ?3='published' THEN unixepoch() END, ?4, ?4)
		RETURNING id",
	)
	.bind(content_type_id as i64)
	.bind(data)
	.bind(entry.status.as_str())
	.bind(entry.actor.map(|a| a as i64))
	.fetch_one(&mut *tx)
	.await
	.map_err(map_db_err)?;

	write_relations(&mut tx, content_type_id, id as u64, entry.relations).await?;
	tx.commit().await.map_err(map_db_err)?;

	read(db, content_type_id, id as u64).await
}

pub(crate) async fn read(
	db: &SqlitePool,
	content_type_id: u64,
	entry_id: u64,
) -> XvResult<ContentEntry> {
	let res = sqlx::query(&format!(
		"SELECT {COLS} FROM content_entries e
		WHERE e.content_type_id=? AND e.id=? AND e.deleted_at IS NULL"
	))
	.bind(content_type_id as i64)
	.bind(entry_id as i64)
	.fetch_one(db)
	.await;

	map_res(res, |row| from_row(&row))
}

pub(crate) async fn read_by_uid(
	db: &SqlitePool,
	content_type_uid: &str,
	entry_id: u64,
) -> XvResult<ContentEntry> {
	let res = sqlx::query(&format!(
		"SELECT {COLS} FROM content_entries e
		JOIN content_types t ON t.id=e.content_type_id AND t.deleted_at IS NULL
		WHERE t.uid=? AND e.id=? AND e.deleted_at IS NULL"
	))
	.bind(content_type_uid)
	.bind(entry_id as i64)
	.fetch_one(db)
	.await;

	map_res(res, |row| from_row(&row))
}

pub(crate) async fn update(
	db: &SqlitePool,
	content_type_id: u64,
	entry_id: u64,
	upd: &UpdateEntry<'_>,
) -> XvResult<ContentEntry> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	let stored: String = sqlx::query_scalar(
		"SELECT data FROM content_entries
		WHERE content_type_id=? AND id=? AND deleted_at IS NULL",
	)
	.bind(content_type_id as i64)
	.bind(entry_id as i64)
	.fetch_one(&mut *tx)
	.await
	.map_err(map_db_err)?;

	let mut data: EntryData = from_json(&stored).inspect_err(inspect).map_err(|_| Error::DbError)?;
	merge_data(&mut data, upd.data.clone());
	let data = serde_json::to_string(&data)?;

	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE content_entries SET data=");
	query.push_bind(data);
	query.push(", updated_at=unixepoch()");
	if let Some(actor) = upd.actor {
		query.push(", updated_by=").push_bind(actor as i64);
	}
	if let Some(status) = upd.status {
		query.push(", status=").push_bind(status.as_str());
		if status == EntryStatus::Published {
			query.push(", published_at=coalesce(published_at, unixepoch())");
		}
	}
	query.push(" WHERE id=").push_bind(entry_id as i64);
	query.build().execute(&mut *tx).await.map_err(map_db_err)?;

	write_relations(&mut tx, content_type_id, entry_id, upd.relations).await?;
	tx.commit().await.map_err(map_db_err)?;

	read(db, content_type_id, entry_id).await
}

pub(crate) async fn delete(db: &SqlitePool, content_type_id: u64, entry_id: u64) -> XvResult<()> {
	let res = sqlx::query(
		"UPDATE content_entries SET deleted_at=unixepoch()
		WHERE content_type_id=? AND id=? AND deleted_at IS NULL",
	)
	.bind(content_type_id as i64)
	.bind(entry_id as i64)
	.execute(db)
	.await
	.map_err(map_db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

fn push_filters(
	query: &mut sqlx::QueryBuilder<'_, sqlx::Sqlite>,
	content_type_id: u64,
	opts: &ListEntryOptions<'_>,
) {
	query.push(" WHERE e.deleted_at IS NULL AND e.content_type_id=").push_bind(content_type_id as i64);
	if let Some(status) = opts.status {
		query.push(" AND e.status=").push_bind(status.as_str());
	}
	if let Some(search) = opts.search.filter(|s| !s.is_empty()) {
		query.push(" AND e.data LIKE '%' || ").push_bind(search.to_string()).push(" || '%'");
	}
}

pub(crate) async fn list(
	db: &SqlitePool,
	content_type_id: u64,
	opts: &ListEntryOptions<'_>,
) -> XvResult<(Vec<ContentEntry>, u64)> {
	let mut count =
		sqlx::QueryBuilder::<sqlx::Sqlite>::new("SELECT count(*) FROM content_entries e");
	push_filters(&mut count, content_type_id, opts);
	let total: i64 = count.build_query_scalar().fetch_one(db).await.map_err(map_db_err)?;

	let mut query =
		sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!("SELECT {COLS} FROM content_entries e"));
	push_filters(&mut query, content_type_id, opts);
	query.push(" ORDER BY e.created_at DESC, e.id DESC LIMIT ");
	query.push_bind(i64::from(opts.page.limit()));
	query.push(" OFFSET ").push_bind(opts.page.offset() as i64);

	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	let items = collect_res(rows.iter().map(from_row))?;

	Ok((items, total as u64))
}

// vim: ts=4
