//! Roles and permissions

use std::collections::HashMap;

use sqlx::{Row, Sqlite, SqlitePool, Transaction, sqlite::SqliteRow};

use xiver::meta_adapter::{
	CreatePermission, CreateRole, Permission, Role, RoleType, UpdatePermission, UpdateRole,
};
use xiver::prelude::*;

use crate::utils::*;

fn permission_from_row(row: &SqliteRow) -> Result<Permission, sqlx::Error> {
	let properties: Option<String> = row.try_get("properties")?;
	let conditions: Option<String> = row.try_get("conditions")?;
	Ok(Permission {
		id: get_id(row, "id")?,
		action: row.try_get("action")?,
		subject: row.try_get("subject")?,
		properties: properties.as_deref().map(from_json).transpose()?,
		conditions: conditions.as_deref().map(from_json).transpose()?,
		created_at: get_ts(row, "created_at")?,
	})
}

fn role_from_row(row: &SqliteRow) -> Result<Role, sqlx::Error> {
	Ok(Role {
		id: get_id(row, "id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		role_type: get_enum(row, "type", RoleType::parse)?,
		permissions: Vec::new(),
		created_at: get_ts(row, "created_at")?,
		updated_at: get_ts(row, "updated_at")?,
	})
}

/// Permissions of all roles, keyed by role id
async fn read_role_permissions(db: &SqlitePool) -> XvResult<HashMap<u64, Vec<Permission>>> {
	let rows = sqlx::query(
		"SELECT rp.role_id, p.id, p.action, p.subject, p.properties, p.conditions, p.created_at
		FROM role_permissions rp JOIN permissions p ON p.id=rp.permission_id
		ORDER BY p.id",
	)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;

	let perms = collect_res(rows.iter().map(|row| -> Result<_, sqlx::Error> {
		Ok((get_id(row, "role_id")?, permission_from_row(row)?))
	}))?;

	let mut by_role: HashMap<u64, Vec<Permission>> = HashMap::new();
	for (role_id, perm) in perms {
		by_role.entry(role_id).or_default().push(perm);
	}
	Ok(by_role)
}

async fn replace_role_permissions(
	tx: &mut Transaction<'_, Sqlite>,
	role_id: i64,
	permission_ids: &[u64],
) -> XvResult<()> {
	sqlx::query("DELETE FROM role_permissions WHERE role_id=?")
		.bind(role_id)
		.execute(&mut **tx)
		.await
		.map_err(map_db_err)?;

	for perm_id in permission_ids {
		let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM permissions WHERE id=?")
			.bind(*perm_id as i64)
			.fetch_optional(&mut **tx)
			.await
			.map_err(map_db_err)?;
		if exists.is_none() {
			return Err(Error::ValidationError(format!("unknown permission id {}", perm_id)));
		}

		sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
			.bind(role_id)
			.bind(*perm_id as i64)
			.execute(&mut **tx)
			.await
			.map_err(map_db_err)?;
	}
	Ok(())
}

fn name_conflict(err: Error, name: Option<&str>) -> Error {
	match (err, name) {
		(Error::Conflict(_), Some(name)) => Error::Conflict(format!("role '{}' already exists", name)),
		(err, _) => err,
	}
}

// Roles //
//*******//
pub(crate) async fn list_roles(db: &SqlitePool, role_type: Option<RoleType>) -> XvResult<Vec<Role>> {
	let mut query = sqlx::QueryBuilder::<Sqlite>::new(
		"SELECT id, name, description, type, created_at, updated_at FROM roles",
	);
	if let Some(role_type) = role_type {
		query.push(" WHERE type=").push_bind(role_type.as_str());
	}
	query.push(" ORDER BY id");

	let rows = query.build().fetch_all(db).await.map_err(map_db_err)?;
	let mut roles = collect_res(rows.iter().map(role_from_row))?;

	let mut perms = read_role_permissions(db).await?;
	for role in &mut roles {
		role.permissions = perms.remove(&role.id).unwrap_or_default();
	}
	Ok(roles)
}

pub(crate) async fn read_role(db: &SqlitePool, role_id: u64) -> XvResult<Role> {
	let res = sqlx::query(
		"SELECT id, name, description, type, created_at, updated_at FROM roles WHERE id=?",
	)
	.bind(role_id as i64)
	.fetch_one(db)
	.await;
	let mut role = map_res(res, |row| role_from_row(&row))?;

	let rows = sqlx::query(
		"SELECT p.id, p.action, p.subject, p.properties, p.conditions, p.created_at
		FROM role_permissions rp JOIN permissions p ON p.id=rp.permission_id
		WHERE rp.role_id=? ORDER BY p.id",
	)
	.bind(role_id as i64)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;
	role.permissions = collect_res(rows.iter().map(permission_from_row))?;

	Ok(role)
}

pub(crate) async fn create_role(db: &SqlitePool, role: &CreateRole) -> XvResult<Role> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	let role_id: i64 = sqlx::query_scalar(
		"INSERT INTO roles (name, description, type) VALUES (?, ?, ?) RETURNING id",
	)
	.bind(&role.name)
	.bind(&role.description)
	.bind(role.role_type.as_str())
	.fetch_one(&mut *tx)
	.await
	.map_err(|err| name_conflict(map_db_err(err), Some(&role.name)))?;

	replace_role_permissions(&mut tx, role_id, &role.permission_ids).await?;
	tx.commit().await.map_err(map_db_err)?;

	read_role(db, role_id as u64).await
}

pub(crate) async fn update_role(db: &SqlitePool, role_id: u64, upd: &UpdateRole) -> XvResult<Role> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE id=?")
		.bind(role_id as i64)
		.fetch_one(&mut *tx)
		.await
		.map_err(map_db_err)?;

	if upd.name.is_null() || upd.role_type.is_null() {
		return Err(Error::ValidationError("role name and type cannot be null".into()));
	}

	let mut query = sqlx::QueryBuilder::<Sqlite>::new("UPDATE roles SET ");
	let mut has_updates = false;
	has_updates = push_patch!(query, has_updates, "name", &upd.name);
	has_updates = push_patch!(query, has_updates, "description", &upd.description);
	has_updates = push_patch!(query, has_updates, "type", &upd.role_type, |t| t.as_str());

	if has_updates {
		query.push(", updated_at=unixepoch() WHERE id=").push_bind(role_id as i64);
		query
			.build()
			.execute(&mut *tx)
			.await
			.map_err(|err| name_conflict(map_db_err(err), upd.name.value().map(String::as_str)))?;
	}

	match &upd.permission_ids {
		Patch::Value(ids) => replace_role_permissions(&mut tx, role_id as i64, ids).await?,
		Patch::Null => replace_role_permissions(&mut tx, role_id as i64, &[]).await?,
		Patch::Undefined => (),
	}

	tx.commit().await.map_err(map_db_err)?;

	read_role(db, role_id).await
}

pub(crate) async fn delete_role(db: &SqlitePool, role_id: u64) -> XvResult<()> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	let res = sqlx::query("DELETE FROM roles WHERE id=?")
		.bind(role_id as i64)
		.execute(&mut *tx)
		.await
		.map_err(map_db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	sqlx::query("DELETE FROM role_permissions WHERE role_id=?")
		.bind(role_id as i64)
		.execute(&mut *tx)
		.await
		.map_err(map_db_err)?;
	sqlx::query("DELETE FROM user_roles WHERE role_id=?")
		.bind(role_id as i64)
		.execute(&mut *tx)
		.await
		.map_err(map_db_err)?;

	tx.commit().await.map_err(map_db_err)?;
	Ok(())
}

// Permissions //
//*************//
pub(crate) async fn list_permissions(db: &SqlitePool) -> XvResult<Vec<Permission>> {
	let rows = sqlx::query(
		"SELECT id, action, subject, properties, conditions, created_at
		FROM permissions ORDER BY subject, action, id",
	)
	.fetch_all(db)
	.await
	.map_err(map_db_err)?;

	collect_res(rows.iter().map(permission_from_row))
}

pub(crate) async fn read_permission(db: &SqlitePool, perm_id: u64) -> XvResult<Permission> {
	let res = sqlx::query(
		"SELECT id, action, subject, properties, conditions, created_at
		FROM permissions WHERE id=?",
	)
	.bind(perm_id as i64)
	.fetch_one(db)
	.await;

	map_res(res, |row| permission_from_row(&row))
}

pub(crate) async fn create_permission(
	db: &SqlitePool,
	perm: &CreatePermission,
) -> XvResult<Permission> {
	let properties = perm.properties.as_ref().map(serde_json::to_string).transpose()?;
	let conditions = perm.conditions.as_ref().map(serde_json::to_string).transpose()?;

	let id: i64 = sqlx::query_scalar(
		"INSERT INTO permissions (action, subject, properties, conditions)
		VALUES (?, ?, ?, ?) RETURNING id",
	)
	.bind(&perm.action)
	.bind(&perm.subject)
	.bind(properties)
	.bind(conditions)
	.fetch_one(db)
	.await
	.map_err(map_db_err)?;

	read_permission(db, id as u64).await
}

pub(crate) async fn update_permission(
	db: &SqlitePool,
	perm_id: u64,
	upd: &UpdatePermission,
) -> XvResult<Permission> {
	if upd.action.is_null() || upd.subject.is_null() {
		return Err(Error::ValidationError("permission action and subject cannot be null".into()));
	}

	let properties = match &upd.properties {
		Patch::Value(v) => Patch::Value(serde_json::to_string(v)?),
		Patch::Null => Patch::Null,
		Patch::Undefined => Patch::Undefined,
	};
	let conditions = match &upd.conditions {
		Patch::Value(v) => Patch::Value(serde_json::to_string(v)?),
		Patch::Null => Patch::Null,
		Patch::Undefined => Patch::Undefined,
	};

	let mut query = sqlx::QueryBuilder::<Sqlite>::new("UPDATE permissions SET ");
	let mut has_updates = false;
	has_updates = push_patch!(query, has_updates, "action", &upd.action);
	has_updates = push_patch!(query, has_updates, "subject", &upd.subject);
	has_updates = push_patch!(query, has_updates, "properties", properties);
	has_updates = push_patch!(query, has_updates, "conditions", conditions);

	if has_updates {
		query.push(" WHERE id=").push_bind(perm_id as i64);
		let res = query.build().execute(db).await.map_err(map_db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
	}

	read_permission(db, perm_id).await
}

pub(crate) async fn delete_permission(db: &SqlitePool, perm_id: u64) -> XvResult<()> {
	let mut tx = db.begin().await.map_err(map_db_err)?;

	let res = sqlx::query("DELETE FROM permissions WHERE id=?")
		.bind(perm_id as i64)
		.execute(&mut *tx)
		.await
		.map_err(map_db_err)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	sqlx::query("DELETE FROM role_permissions WHERE permission_id=?")
		.bind(perm_id as i64)
		.execute(&mut *tx)
		.await
		.map_err(map_db_err)?;

	tx.commit().await.map_err(map_db_err)?;
	Ok(())
}

// vim: ts=4
