//! Relation edges
//!
//! Edges reference entries by (content type uid, entry id) without foreign
//! keys, so targets may dangle after deletes.

use sqlx::{Row, SqliteConnection, SqlitePool, sqlite::SqliteRow};

use xiver::content::{ContentRelation, RelationEdge, RelationSlot, RelationType};
use xiver::meta_adapter::{CreateRelation, SlotReplace};
use xiver::prelude::*;

use crate::utils::*;

const COLS: &str = "id, source_content_type_uid, source_entry_id, source_field_name, \
	target_content_type_uid, target_entry_id, relation_type, ord, created_at";

fn from_row(row: &SqliteRow) -> Result<ContentRelation, sqlx::Error> {
	Ok(ContentRelation {
		id: get_id(row, "id")?,
		source_content_type_uid: row.try_get("source_content_type_uid")?,
		source_entry_id: get_id(row, "source_entry_id")?,
		source_field_name: row.try_get("source_field_name")?,
		target_content_type_uid: row.try_get("target_content_type_uid")?,
		target_entry_id: get_id(row, "target_entry_id")?,
		relation_type: get_enum(row, "relation_type", RelationType::parse)?,
		order: row.try_get("ord")?,
		created_at: get_ts(row, "created_at")?,
	})
}

/// Deletes every edge of the slot and inserts `edges` on `conn`
async fn replace_slot(
	conn: &mut SqliteConnection,
	slot: &RelationSlot<'_>,
	target_content_type_uid: &str,
	relation_type: RelationType,
	edges: &[RelationEdge],
) -> XvResult<()> {
	sqlx::query(
		"DELETE FROM content_relations
		WHERE source_content_type_uid=? AND source_entry_id=? AND source_field_name=?",
	)
	.bind(slot.content_type_uid)
	.bind(slot.entry_id as i64)
	.bind(slot.field)
	.execute(&mut *conn)
	.await
	.map_err(map_db_err)?;

	for (i, edge) in edges.iter().enumerate() {
		sqlx::query(
			"INSERT INTO content_relations (source_content_type_uid, source_entry_id,
				source_field_name, target_content_type_uid, target_entry_id, relation_type, ord)
			VALUES (?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(slot.content_type_uid)
		.bind(slot.entry_id as i64)
		.bind(slot.field)
		.bind(target_content_type_uid)
		.bind(edge.target_entry_id as i64)
		.bind(relation_type.as_str())
		.bind(edge.order.unwrap_or(i as i64))
		.execute(&mut *conn)
		.await
		.map_err(map_db_err)?;
	}
	Ok(())
}

/// Replaces the slots of an entry inside the caller's transaction
pub(crate) async fn write_slots(
	conn: &mut SqliteConnection,
	content_type_uid: &str,
	entry_id: u64,
	slots: &[SlotReplace<'_>],
) -> XvResult<()> {
	for write in slots {
		let slot = RelationSlot { content_type_uid, entry_id, field: write.field };
		replace_slot(conn, &slot, write.target_content_type_uid, write.relation_type, write.edges)
			.await?;
	}
	Ok(())
}

/// Deletes every edge of the slot and inserts `edges` in one transaction
pub(crate) async fn replace(
	db: &SqlitePool,
	slot: &RelationSlot<'_>,
	target_content_type_uid: &str,
	relation_type: RelationType,
	edges: &[RelationEdge],
) -> XvResult<()> {
	let mut tx = db.begin().await.map_err(map_db_err)?;
	replace_slot(&mut tx, slot, target_content_type_uid, relation_type, edges).await?;
	tx.commit().await.map_err(map_db_err)?;
	Ok(())
}

pub(crate) async fn list(
	db: &SqlitePool,
	content_type_uid: &str,
	entry_id: u64,
	field: Option<&str>,
) -> XvResult<Vec<ContentRelation>> {
	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
		"SELECT {COLS} FROM content_relations WHERE source_content_type_uid="
	));
	query.push_bind(content_type_uid);
	query.push(" AND source_entry_id=").push_bind(entry_id as i64);
	if let Some(field) = field {
		query.push(" AND source_field_name=").push_bind(field);
	}
	query.push(" ORDER BY ord, id");

	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	collect_res(rows.iter().map(from_row))
}

async fn read(db: &SqlitePool, relation_id: i64) -> XvResult<ContentRelation> {
	let res = sqlx::query(&format!("SELECT {COLS} FROM content_relations WHERE id=?"))
		.bind(relation_id)
		.fetch_one(db)
		.await;

	map_res(res, |row| from_row(&row))
}

pub(crate) async fn create(db: &SqlitePool, rel: &CreateRelation<'_>) -> XvResult<ContentRelation> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	let order = match rel.order {
		Some(order) => order,
		None => sqlx::query_scalar(
			"SELECT coalesce(max(ord) + 1, 0) FROM content_relations
			WHERE source_content_type_uid=? AND source_entry_id=? AND source_field_name=?",
		)
		.bind(rel.slot.content_type_uid)
		.bind(rel.slot.entry_id as i64)
		.bind(rel.slot.field)
		.fetch_one(&mut *tx)
		.await
		.map_err(map_db_err)?,
	};

	let id: i64 = sqlx::query_scalar(
		"INSERT INTO content_relations (source_content_type_uid, source_entry_id,
			source_field_name, target_content_type_uid, target_entry_id, relation_type, ord)
		VALUES (?, ?, ?, ?, ?, ?, ?)
		RETURNING id",
	)
	.bind(rel.slot.content_type_uid)
	.bind(rel.slot.entry_id as i64)
	.bind(rel.slot.field)
	.bind(rel.target_content_type_uid)
	.bind(rel.target_entry_id as i64)
	.bind(rel.relation_type.as_str())
	.bind(order)
	.fetch_one(&mut *tx)
	.await
	.map_err(map_db_err)?;

	tx.commit().await.map_err(map_db_err)?;

	read(db, id).await
}

pub(crate) async fn delete(
	db: &SqlitePool,
	content_type_uid: &str,
	entry_id: u64,
	relation_id: u64,
) -> XvResult<()> {
	let res = sqlx::query(
		"DELETE FROM content_relations
		WHERE id=? AND source_content_type_uid=? AND source_entry_id=?",
	)
	.bind(relation_id as i64)
	.bind(content_type_uid)
	.bind(entry_id as i64)
	.execute(db)
	.await
	.map_err(map_db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

// vim: ts=4
