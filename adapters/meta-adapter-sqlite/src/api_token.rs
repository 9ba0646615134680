//! API tokens
//!
//! Only a SHA-256 hash of each token is stored, next to a short clear-text
//! prefix used to find candidates.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use xiver::identity::TokenType;
use xiver::meta_adapter::{ApiToken, ApiTokenValidation, CreateApiToken, CreatedApiToken};
use xiver::prelude::*;
use xiver::utils;

use crate::utils::*;

const COLS: &str =
	"id, name, description, token_prefix, type, expires_at, last_used_at, user_id, created_at";

fn from_row(row: &SqliteRow) -> Result<ApiToken, sqlx::Error> {
	Ok(ApiToken {
		id: get_id(row, "id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		token_prefix: row.try_get("token_prefix")?,
		token_type: get_enum(row, "type", TokenType::parse)?,
		expires_at: get_opt_ts(row, "expires_at")?,
		last_used_at: get_opt_ts(row, "last_used_at")?,
		user_id: get_id(row, "user_id")?,
		created_at: get_ts(row, "created_at")?,
	})
}

pub(crate) async fn create(db: &SqlitePool, token: &CreateApiToken<'_>) -> XvResult<CreatedApiToken> {
	let (plaintext, prefix) = utils::generate_api_token();
	let hash = utils::hash_api_token(&plaintext);

	let id: i64 = sqlx::query_scalar(
		"INSERT INTO api_tokens (name, description, token_prefix, token_hash, type, expires_at, user_id)
		VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
	)
	.bind(token.name)
	.bind(token.description)
	.bind(&prefix)
	.bind(&hash)
	.bind(token.token_type.as_str())
	.bind(token.expires_at.map(|t| t.0))
	.bind(token.user_id as i64)
	.fetch_one(db)
	.await
	.map_err(map_db_err)?;

	let info = read(db, id as u64).await?;
	Ok(CreatedApiToken { info, plaintext })
}

pub(crate) async fn list(db: &SqlitePool) -> XvResult<Vec<ApiToken>> {
	let rows = sqlx::query(&format!("SELECT {COLS} FROM api_tokens ORDER BY id"))
		.fetch_all(db)
		.await
		.map_err(map_db_err)?;

	collect_res(rows.iter().map(from_row))
}

pub(crate) async fn read(db: &SqlitePool, token_id: u64) -> XvResult<ApiToken> {
	let res = sqlx::query(&format!("SELECT {COLS} FROM api_tokens WHERE id=?"))
		.bind(token_id as i64)
		.fetch_one(db)
		.await;

	map_res(res, |row| from_row(&row))
}

pub(crate) async fn delete(db: &SqlitePool, token_id: u64) -> XvResult<()> {
	let res = sqlx::query("DELETE FROM api_tokens WHERE id=?")
		.bind(token_id as i64)
		.execute(db)
		.await
		.map_err(map_db_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn validate(db: &SqlitePool, token: &str) -> XvResult<ApiTokenValidation> {
	let Some(prefix) = utils::api_token_prefix(token) else {
		return Err(Error::Unauthorized);
	};
	let hash = utils::hash_api_token(token);

	let candidates = sqlx::query(
		"SELECT id, user_id, token_hash, type, expires_at FROM api_tokens WHERE token_prefix=?",
	)
	.bind(prefix)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;

	let now = Timestamp::now();
	for row in &candidates {
		let stored: String = row.try_get("token_hash").inspect_err(inspect).map_err(|_| Error::DbError)?;
		if stored != hash {
			continue;
		}

		let expires_at = get_opt_ts(row, "expires_at").map_err(|_| Error::DbError)?;
		if expires_at.is_some_and(|exp| exp < now) {
			debug!("expired API token presented");
			return Err(Error::Unauthorized);
		}

		let token_id = get_id(row, "id").map_err(|_| Error::DbError)?;
		sqlx::query("UPDATE api_tokens SET last_used_at=unixepoch() WHERE id=?")
			.bind(token_id as i64)
			.execute(db)
			.await
			.map_err(map_db_err)?;

		return Ok(ApiTokenValidation {
			token_id,
			user_id: get_id(row, "user_id").map_err(|_| Error::DbError)?,
			token_type: get_enum(row, "type", TokenType::parse).map_err(|_| Error::DbError)?,
		});
	}

	Err(Error::Unauthorized)
}

// vim: ts=4
