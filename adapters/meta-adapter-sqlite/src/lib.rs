//! SQLite implementation of the Xiver meta adapter.
//!
//! Every content type shares the same entry table: entry data is a JSON
//! object column and relation edges live in their own table, so defining a
//! new content type never needs a migration.

mod api_token;
mod audit;
mod content_type;
mod entry;
mod relation;
mod role;
mod schema;
mod user;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use xiver::content::{ContentEntry, ContentRelation, ContentType, RelationEdge, RelationSlot, RelationType};
use xiver::identity::Identity;
use xiver::meta_adapter::{
	self, ApiToken, ApiTokenValidation, AuditLog, ContentHistory, CreateApiToken, CreateAuditLog,
	CreateContentHistory, CreateContentType, CreateEntry, CreatePermission, CreateRelation,
	CreateRole, CreateUser, CreatedApiToken, ListAuditLogOptions, ListContentTypeOptions,
	ListEntryOptions, Permission, Role, RoleType, UpdateContentType, UpdateEntry,
	UpdatePermission, UpdateRole, User,
};
use xiver::prelude::*;

use crate::schema::init_db;

pub const DB_FILE: &str = "xiver.db";

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (or creates) the database inside `dir`
	pub async fn new(dir: impl AsRef<Path>) -> XvResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		Ok(Self { db })
	}
}

#[async_trait]
impl meta_adapter::MetaAdapter for MetaAdapterSqlite {
	// Content types
	//***************
	async fn list_content_types(
		&self,
		opts: &ListContentTypeOptions,
	) -> XvResult<(Vec<ContentType>, u64)> {
		content_type::list(&self.db, opts).await
	}

	async fn read_content_type(&self, uid: &str) -> XvResult<ContentType> {
		content_type::read(&self.db, uid).await
	}

	async fn create_content_type(&self, ct: &CreateContentType<'_>) -> XvResult<ContentType> {
		content_type::create(&self.db, ct).await
	}

	async fn update_content_type(
		&self,
		uid: &str,
		upd: &UpdateContentType,
	) -> XvResult<ContentType> {
		content_type::update(&self.db, uid, upd).await
	}

	async fn delete_content_type(&self, uid: &str) -> XvResult<()> {
		content_type::delete(&self.db, uid).await
	}

	// Entries
	//*********
	async fn create_entry(
		&self,
		content_type_id: u64,
		entry: &CreateEntry<'_>,
	) -> XvResult<ContentEntry> {
		entry::create(&self.db, content_type_id, entry).await
	}

	async fn read_entry(&self, content_type_id: u64, entry_id: u64) -> XvResult<ContentEntry> {
		entry::read(&self.db, content_type_id, entry_id).await
	}

	async fn read_entry_by_uid(
		&self,
		content_type_uid: &str,
		entry_id: u64,
	) -> XvResult<ContentEntry> {
		entry::read_by_uid(&self.db, content_type_uid, entry_id).await
	}

	async fn update_entry(
		&self,
		content_type_id: u64,
		entry_id: u64,
		upd: &UpdateEntry<'_>,
	) -> XvResult<ContentEntry> {
		entry::update(&self.db, content_type_id, entry_id, upd).await
	}

	async fn delete_entry(&self, content_type_id: u64, entry_id: u64) -> XvResult<()> {
		entry::delete(&self.db, content_type_id, entry_id).await
	}

	async fn list_entries(
		&self,
		content_type_id: u64,
		opts: &ListEntryOptions<'_>,
	) -> XvResult<(Vec<ContentEntry>, u64)> {
		entry::list(&self.db, content_type_id, opts).await
	}

	// Relations
	//***********
	async fn replace_relations(
		&self,
		slot: &RelationSlot<'_>,
		target_content_type_uid: &str,
		relation_type: RelationType,
		edges: &[RelationEdge],
	) -> XvResult<()> {
		relation::replace(&self.db, slot, target_content_type_uid, relation_type, edges).await
	}

	async fn list_relations(
		&self,
		content_type_uid: &str,
		entry_id: u64,
		field: Option<&str>,
	) -> XvResult<Vec<ContentRelation>> {
		relation::list(&self.db, content_type_uid, entry_id, field).await
	}

	async fn create_relation(&self, rel: &CreateRelation<'_>) -> XvResult<ContentRelation> {
		relation::create(&self.db, rel).await
	}

	async fn delete_relation(
		&self,
		content_type_uid: &str,
		entry_id: u64,
		relation_id: u64,
	) -> XvResult<()> {
		relation::delete(&self.db, content_type_uid, entry_id, relation_id).await
	}

	// Users and identities
	//**********************
	async fn count_users(&self) -> XvResult<u64> {
		user::count(&self.db).await
	}

	async fn list_users(&self, page: Page) -> XvResult<(Vec<User>, u64)> {
		user::list(&self.db, page).await
	}

	async fn read_user(&self, user_id: u64) -> XvResult<User> {
		user::read(&self.db, user_id).await
	}

	async fn create_user(&self, user: &CreateUser<'_>) -> XvResult<User> {
		user::create(&self.db, user).await
	}

	async fn set_user_roles(&self, user_id: u64, role_ids: &[u64]) -> XvResult<()> {
		user::set_roles(&self.db, user_id, role_ids).await
	}

	async fn read_identity(&self, user_id: u64) -> XvResult<Identity> {
		user::read_identity(&self.db, user_id).await
	}

	// Roles
	//*******
	async fn list_roles(&self, role_type: Option<RoleType>) -> XvResult<Vec<Role>> {
		role::list_roles(&self.db, role_type).await
	}

	async fn read_role(&self, role_id: u64) -> XvResult<Role> {
		role::read_role(&self.db, role_id).await
	}

	async fn create_role(&self, new_role: &CreateRole) -> XvResult<Role> {
		role::create_role(&self.db, new_role).await
	}

	async fn update_role(&self, role_id: u64, upd: &UpdateRole) -> XvResult<Role> {
		role::update_role(&self.db, role_id, upd).await
	}

	async fn delete_role(&self, role_id: u64) -> XvResult<()> {
		role::delete_role(&self.db, role_id).await
	}

	// Permissions
	//*************
	async fn list_permissions(&self) -> XvResult<Vec<Permission>> {
		role::list_permissions(&self.db).await
	}

	async fn read_permission(&self, perm_id: u64) -> XvResult<Permission> {
		role::read_permission(&self.db, perm_id).await
	}

	async fn create_permission(&self, perm: &CreatePermission) -> XvResult<Permission> {
		role::create_permission(&self.db, perm).await
	}

	async fn update_permission(
		&self,
		perm_id: u64,
		upd: &UpdatePermission,
	) -> XvResult<Permission> {
		role::update_permission(&self.db, perm_id, upd).await
	}

	async fn delete_permission(&self, perm_id: u64) -> XvResult<()> {
		role::delete_permission(&self.db, perm_id).await
	}

	// API tokens
	//************
	async fn create_api_token(&self, token: &CreateApiToken<'_>) -> XvResult<CreatedApiToken> {
		api_token::create(&self.db, token).await
	}

	async fn list_api_tokens(&self) -> XvResult<Vec<ApiToken>> {
		api_token::list(&self.db).await
	}

	async fn read_api_token(&self, token_id: u64) -> XvResult<ApiToken> {
		api_token::read(&self.db, token_id).await
	}

	async fn delete_api_token(&self, token_id: u64) -> XvResult<()> {
		api_token::delete(&self.db, token_id).await
	}

	async fn validate_api_token(&self, token: &str) -> XvResult<ApiTokenValidation> {
		api_token::validate(&self.db, token).await
	}

	// Audit log and history
	//***********************
	async fn create_audit_log(&self, log: &CreateAuditLog<'_>) -> XvResult<u64> {
		audit::create_log(&self.db, log).await
	}

	async fn list_audit_logs(
		&self,
		opts: &ListAuditLogOptions<'_>,
	) -> XvResult<(Vec<AuditLog>, u64)> {
		audit::list_logs(&self.db, opts).await
	}

	async fn create_content_history(&self, hist: &CreateContentHistory<'_>) -> XvResult<u64> {
		audit::create_history(&self.db, hist).await
	}

	async fn list_entry_history(&self, entry_id: u64) -> XvResult<Vec<ContentHistory>> {
		audit::list_history(&self.db, entry_id).await
	}
}

// vim: ts=4
