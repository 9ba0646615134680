//! Database schema initialization
//!
//! Creates tables and indexes if they don't exist yet.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Content types
	//***************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS content_types (
		id integer NOT NULL,
		uid text NOT NULL,
		kind text NOT NULL DEFAULT 'collectionType',
		display_name text NOT NULL,
		description text,
		schema json NOT NULL DEFAULT '{}',
		access_type text NOT NULL DEFAULT 'public',
		is_visible integer NOT NULL DEFAULT 1,
		created_at datetime DEFAULT (unixepoch()),
		updated_at datetime DEFAULT (unixepoch()),
		deleted_at datetime,
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_content_types_uid ON content_types(uid)
		WHERE deleted_at IS NULL",
	)
	.execute(&mut *tx)
	.await?;

	// Entries
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS content_entries (
		id integer NOT NULL,
		content_type_id integer NOT NULL,
		data json NOT NULL DEFAULT '{}',
		status text NOT NULL DEFAULT 'draft',
		published_at datetime,
		created_by integer,
		updated_by integer,
		created_at datetime DEFAULT (unixepoch()),
		updated_at datetime DEFAULT (unixepoch()),
		deleted_at datetime,
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_content_entries_type
		ON content_entries(content_type_id, status)",
	)
	.execute(&mut *tx)
	.await?;

	// Relations
	//***********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS content_relations (
		id integer NOT NULL,
		source_content_type_uid text NOT NULL,
		source_entry_id integer NOT NULL,
		source_field_name text NOT NULL,
		target_content_type_uid text NOT NULL,
		target_entry_id integer NOT NULL,
		relation_type text NOT NULL DEFAULT 'manyToOne',
		ord integer NOT NULL DEFAULT 0,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_content_relations_slot
		ON content_relations(source_content_type_uid, source_entry_id, source_field_name)",
	)
	.execute(&mut *tx)
	.await?;

	// Users, roles, permissions
	//***************************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
		id integer NOT NULL,
		username text NOT NULL UNIQUE,
		email text NOT NULL UNIQUE,
		is_active integer NOT NULL DEFAULT 1,
		is_super_admin integer NOT NULL DEFAULT 0,
		created_at datetime DEFAULT (unixepoch()),
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS roles (
		id integer NOT NULL,
		name text NOT NULL UNIQUE,
		description text,
		type text NOT NULL DEFAULT 'custom',
		created_at datetime DEFAULT (unixepoch()),
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS permissions (
		id integer NOT NULL,
		action text NOT NULL,
		subject text NOT NULL,
		properties json,
		conditions json,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS role_permissions (
		role_id integer NOT NULL,
		permission_id integer NOT NULL,
		PRIMARY KEY(role_id, permission_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS user_roles (
		user_id integer NOT NULL,
		role_id integer NOT NULL,
		PRIMARY KEY(user_id, role_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// API tokens
	//************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS api_tokens (
		id integer NOT NULL,
		name text NOT NULL,
		description text,
		token_prefix text NOT NULL,
		token_hash text NOT NULL,
		type text NOT NULL DEFAULT 'read-only',
		expires_at datetime,
		last_used_at datetime,
		user_id integer NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_api_tokens_prefix ON api_tokens(token_prefix)")
		.execute(&mut *tx)
		.await?;

	// Audit log, history
	//********************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS audit_logs (
		id integer NOT NULL,
		action text NOT NULL,
		subject text NOT NULL,
		subject_id text,
		description text,
		user_id integer,
		metadata json,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS content_history (
		id integer NOT NULL,
		entry_id integer NOT NULL,
		data json NOT NULL,
		change_type text NOT NULL,
		change_note text,
		changed_by integer,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_content_history_entry ON content_history(entry_id)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
