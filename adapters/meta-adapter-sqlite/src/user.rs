//! Users, role assignments and resolved identities

use std::collections::HashMap;

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use xiver::identity::{Identity, PermissionGrant, RoleGrant};
use xiver::meta_adapter::{CreateUser, RoleRef, User};
use xiver::prelude::*;

use crate::utils::*;

fn from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
	Ok(User {
		id: get_id(row, "id")?,
		username: row.try_get("username")?,
		email: row.try_get("email")?,
		is_active: row.try_get("is_active")?,
		is_super_admin: row.try_get("is_super_admin")?,
		roles: Vec::new(),
		created_at: get_ts(row, "created_at")?,
		updated_at: get_ts(row, "updated_at")?,
	})
}

async fn read_role_refs(db: &SqlitePool, user_id: u64) -> XvResult<Vec<RoleRef>> {
	let rows = sqlx::query(
		"SELECT r.id, r.name FROM roles r
		JOIN user_roles ur ON ur.role_id=r.id
		WHERE ur.user_id=? ORDER BY r.name",
	)
	.bind(user_id as i64)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;

	collect_res(rows.iter().map(|row| -> Result<RoleRef, sqlx::Error> {
		Ok(RoleRef { id: get_id(row, "id")?, name: row.try_get("name")? })
	}))
}

pub(crate) async fn count(db: &SqlitePool) -> XvResult<u64> {
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
		.fetch_one(db)
		.await
		.map_err(map_db_err)?;
	Ok(count as u64)
}

pub(crate) async fn list(db: &SqlitePool, page: Page) -> XvResult<(Vec<User>, u64)> {
	let total = count(db).await?;
	let rows = sqlx::query(
		"SELECT id, username, email, is_active, is_super_admin, created_at, updated_at
		FROM users ORDER BY id LIMIT ? OFFSET ?",
	)
	.bind(i64::from(page.limit()))
	.bind(page.offset() as i64)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;

	let mut users = collect_res(rows.iter().map(from_row))?;
	for user in &mut users {
		user.roles = read_role_refs(db, user.id).await?;
	}
	Ok((users, total))
}

pub(crate) async fn read(db: &SqlitePool, user_id: u64) -> XvResult<User> {
	let res = sqlx::query(
		"SELECT id, username, email, is_active, is_super_admin, created_at, updated_at
		FROM users WHERE id=?",
	)
	.bind(user_id as i64)
	.fetch_one(db)
	.await;

	let mut user = map_res(res, |row| from_row(&row))?;
	user.roles = read_role_refs(db, user_id).await?;
	Ok(user)
}

pub(crate) async fn create(db: &SqlitePool, user: &CreateUser<'_>) -> XvResult<User> {
	let id: i64 = sqlx::query_scalar(
		"INSERT INTO users (username, email, is_active, is_super_admin)
		VALUES (?, ?, ?, ?) RETURNING id",
	)
	.bind(user.username)
	.bind(user.email)
	.bind(user.is_active)
	.bind(user.is_super_admin)
	.fetch_one(db)
	.await
	.map_err(map_db_err)?;

	read(db, id as u64).await
}

pub(crate) async fn set_roles(db: &SqlitePool, user_id: u64, role_ids: &[u64]) -> XvResult<()> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id=?")
		.bind(user_id as i64)
		.fetch_one(&mut *tx)
		.await
		.map_err(map_db_err)?;

	sqlx::query("DELETE FROM user_roles WHERE user_id=?")
		.bind(user_id as i64)
		.execute(&mut *tx)
		.await
		.map_err(map_db_err)?;

	for role_id in role_ids {
		let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE id=?")
			.bind(*role_id as i64)
			.fetch_optional(&mut *tx)
			.await
			.map_err(map_db_err)?;
		if exists.is_none() {
			return Err(Error::ValidationError(format!("unknown role id {}", role_id)));
		}

		sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
			.bind(user_id as i64)
			.bind(*role_id as i64)
			.execute(&mut *tx)
			.await
			.map_err(map_db_err)?;
	}

	tx.commit().await.map_err(map_db_err)?;
	Ok(())
}

pub(crate) async fn read_identity(db: &SqlitePool, user_id: u64) -> XvResult<Identity> {
	let res = sqlx::query("SELECT id, username, is_super_admin FROM users WHERE id=?")
		.bind(user_id as i64)
		.fetch_one(db)
		.await;
	let (username, is_super_admin) = map_res(res, |row| {
		Ok((row.try_get::<String, _>("username")?, row.try_get::<bool, _>("is_super_admin")?))
	})?;

	let role_refs = read_role_refs(db, user_id).await?;

	let rows = sqlx::query(
		"SELECT rp.role_id, p.action, p.subject FROM role_permissions rp
		JOIN permissions p ON p.id=rp.permission_id
		JOIN user_roles ur ON ur.role_id=rp.role_id
		WHERE ur.user_id=? ORDER BY p.id",
	)
	.bind(user_id as i64)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;

	let grants = collect_res(rows.iter().map(|row| -> Result<_, sqlx::Error> {
		Ok((
			get_id(row, "role_id")?,
			PermissionGrant { action: row.try_get("action")?, subject: row.try_get("subject")? },
		))
	}))?;

	let mut by_role: HashMap<u64, Vec<PermissionGrant>> = HashMap::new();
	for (role_id, grant) in grants {
		by_role.entry(role_id).or_default().push(grant);
	}

	let roles = role_refs
		.into_iter()
		.map(|r| RoleGrant { permissions: by_role.remove(&r.id).unwrap_or_default(), name: r.name })
		.collect();

	Ok(Identity { user_id, username, is_super_admin, roles })
}

// vim: ts=4
