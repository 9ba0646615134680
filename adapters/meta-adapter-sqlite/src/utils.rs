//! Shared utilities for SQLite adapter
//!
//! Helper functions, macros, and error mapping used across all domain modules.

use sqlx::sqlite::SqliteRow;

use xiver::prelude::*;

/// Applies a Patch field to an UPDATE query. Returns true if the field was added.
macro_rules! push_patch {
	($query:expr, $has_updates:expr, $field:literal, $patch:expr) => {{
		match $patch {
			Patch::Undefined => $has_updates,
			Patch::Null => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=NULL"));
				true
			}
			Patch::Value(v) => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=")).push_bind(v);
				true
			}
		}
	}};
	// For fields that need conversion before binding
	($query:expr, $has_updates:expr, $field:literal, $patch:expr, |$v:ident| $convert:expr) => {{
		match $patch {
			Patch::Undefined => $has_updates,
			Patch::Null => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=NULL"));
				true
			}
			Patch::Value($v) => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=")).push_bind($convert);
				true
			}
		}
	}};
}

/// Applies an optional (non-nullable) field to an UPDATE query
macro_rules! push_opt {
	($query:expr, $has_updates:expr, $field:literal, $opt:expr) => {{
		match $opt {
			None => $has_updates,
			Some(v) => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=")).push_bind(v);
				true
			}
		}
	}};
}

pub(crate) use push_opt;
pub(crate) use push_patch;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Translates a driver error: missing rows become `NotFound`, unique
/// violations `Conflict`, everything else is logged and reported as `DbError`.
pub(crate) fn map_db_err(err: sqlx::Error) -> Error {
	match err {
		sqlx::Error::RowNotFound => Error::NotFound,
		sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
			debug!("DB unique violation: {}", db_err);
			Error::Conflict("already exists".into())
		}
		err => {
			inspect(&err);
			Error::DbError
		}
	}
}

/// Map a single-row query result, translating SQL errors to XvResult
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> XvResult<T>
where
	F: FnOnce(SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(err) => Err(map_db_err(err)),
	}
}

/// Collect an iterator of query results, translating errors
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> XvResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

/// Decodes a JSON column
pub(crate) fn from_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, sqlx::Error> {
	serde_json::from_str(s).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Reads an integer id column as u64
pub(crate) fn get_id(row: &SqliteRow, col: &str) -> Result<u64, sqlx::Error> {
	use sqlx::Row;
	Ok(row.try_get::<i64, _>(col)? as u64)
}

pub(crate) fn get_opt_id(row: &SqliteRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
	use sqlx::Row;
	Ok(row.try_get::<Option<i64>, _>(col)?.map(|v| v as u64))
}

pub(crate) fn get_ts(row: &SqliteRow, col: &str) -> Result<Timestamp, sqlx::Error> {
	use sqlx::Row;
	Ok(Timestamp(row.try_get::<i64, _>(col)?))
}

pub(crate) fn get_opt_ts(row: &SqliteRow, col: &str) -> Result<Option<Timestamp>, sqlx::Error> {
	use sqlx::Row;
	Ok(row.try_get::<Option<i64>, _>(col)?.map(Timestamp))
}

/// Decodes a text column through a `parse` function of an enum
pub(crate) fn get_enum<T>(
	row: &SqliteRow,
	col: &str,
	parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, sqlx::Error> {
	use sqlx::Row;
	let s: String = row.try_get(col)?;
	parse(&s).ok_or_else(|| sqlx::Error::Decode(format!("invalid {} value: {}", col, s).into()))
}

// vim: ts=4
