//! Adapter that stores content types, entries, relations and the identity model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::content::{
	AccessType, ContentEntry, ContentKind, ContentRelation, ContentType, EntryStatus,
	RelationEdge, RelationSlot, RelationType, Schema,
};
use crate::error::XvResult;
use crate::event::ChangeType;
use crate::identity::{Identity, TokenType};
use crate::types::{Page, Patch, Timestamp};
use crate::value::EntryData;

// Content types //
//***************//
#[derive(Debug, Clone)]
pub struct CreateContentType<'a> {
	pub uid: &'a str,
	pub kind: ContentKind,
	pub display_name: &'a str,
	pub description: Option<&'a str>,
	pub schema: &'a Schema,
	pub access_type: AccessType,
	pub is_visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateContentType {
	pub uid: Option<String>,
	pub kind: Option<ContentKind>,
	pub display_name: Option<String>,
	pub description: Patch<String>,
	pub schema: Option<Schema>,
	pub access_type: Option<AccessType>,
	pub is_visible: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListContentTypeOptions {
	pub is_visible: Option<bool>,
	/// All matching types when `None`
	pub page: Option<Page>,
}

// Entries //
//*********//
/// New edge set of one relation field of the entry being written
#[derive(Debug, Clone)]
pub struct SlotReplace<'a> {
	pub field: &'a str,
	pub target_content_type_uid: &'a str,
	pub relation_type: RelationType,
	pub edges: &'a [RelationEdge],
}

#[derive(Debug, Clone)]
pub struct CreateEntry<'a> {
	pub data: &'a EntryData,
	pub status: EntryStatus,
	pub actor: Option<u64>,
	pub relations: &'a [SlotReplace<'a>],
}

/// Partial entry update. `data` is merged into the stored data key by key,
/// and only the slots listed in `relations` are replaced.
#[derive(Debug, Clone)]
pub struct UpdateEntry<'a> {
	pub data: &'a EntryData,
	pub status: Option<EntryStatus>,
	pub actor: Option<u64>,
	pub relations: &'a [SlotReplace<'a>],
}

#[derive(Debug, Clone, Default)]
pub struct ListEntryOptions<'a> {
	pub status: Option<EntryStatus>,
	/// Substring match over the serialized data
	pub search: Option<&'a str>,
	pub page: Page,
}

// Relations //
//***********//
#[derive(Debug, Clone)]
pub struct CreateRelation<'a> {
	pub slot: RelationSlot<'a>,
	pub target_content_type_uid: &'a str,
	pub target_entry_id: u64,
	pub relation_type: RelationType,
	/// Appended after the last edge of the slot when `None`
	pub order: Option<i64>,
}

// Users, roles, permissions //
//***************************//
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
	Public,
	#[default]
	Custom,
}

impl RoleType {
	pub fn as_str(&self) -> &'static str {
		match self {
			RoleType::Public => "public",
			RoleType::Custom => "custom",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"public" => Some(RoleType::Public),
			"custom" => Some(RoleType::Custom),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
	pub id: u64,
	pub action: String,
	pub subject: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub properties: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub conditions: Option<serde_json::Value>,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePermission {
	pub action: String,
	pub subject: String,
	pub properties: Option<serde_json::Value>,
	pub conditions: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePermission {
	#[serde(default)]
	pub action: Patch<String>,
	#[serde(default)]
	pub subject: Patch<String>,
	#[serde(default)]
	pub properties: Patch<serde_json::Value>,
	#[serde(default)]
	pub conditions: Patch<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
	pub id: u64,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(rename = "type")]
	pub role_type: RoleType,
	pub permissions: Vec<Permission>,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
	pub name: String,
	pub description: Option<String>,
	#[serde(rename = "type", default)]
	pub role_type: RoleType,
	#[serde(rename = "permissionIds", default)]
	pub permission_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRole {
	#[serde(default)]
	pub name: Patch<String>,
	#[serde(default)]
	pub description: Patch<String>,
	#[serde(rename = "type", default)]
	pub role_type: Patch<RoleType>,
	/// Replaces the permission set when present
	#[serde(rename = "permissionIds", default)]
	pub permission_ids: Patch<Vec<u64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleRef {
	pub id: u64,
	pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: u64,
	pub username: String,
	pub email: String,
	pub is_active: bool,
	pub is_super_admin: bool,
	pub roles: Vec<RoleRef>,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateUser<'a> {
	pub username: &'a str,
	pub email: &'a str,
	pub is_active: bool,
	pub is_super_admin: bool,
}

// API tokens //
//************//
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
	pub id: u64,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub token_prefix: String,
	#[serde(rename = "type")]
	pub token_type: TokenType,
	pub expires_at: Option<Timestamp>,
	pub last_used_at: Option<Timestamp>,
	pub user_id: u64,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateApiToken<'a> {
	pub name: &'a str,
	pub description: Option<&'a str>,
	pub token_type: TokenType,
	pub expires_at: Option<Timestamp>,
	pub user_id: u64,
}

/// Newly issued token; the plaintext is only available here
#[derive(Debug, Clone)]
pub struct CreatedApiToken {
	pub info: ApiToken,
	pub plaintext: String,
}

#[derive(Debug, Clone)]
pub struct ApiTokenValidation {
	pub token_id: u64,
	pub user_id: u64,
	pub token_type: TokenType,
}

// Audit log, history //
//********************//
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
	pub id: u64,
	pub action: String,
	pub subject: String,
	pub subject_id: Option<String>,
	pub description: Option<String>,
	pub user_id: Option<u64>,
	pub metadata: Option<serde_json::Value>,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateAuditLog<'a> {
	pub action: &'a str,
	pub subject: &'a str,
	pub subject_id: Option<&'a str>,
	pub description: Option<&'a str>,
	pub user_id: Option<u64>,
	pub metadata: Option<&'a serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ListAuditLogOptions<'a> {
	pub action: Option<&'a str>,
	pub subject: Option<&'a str>,
	pub user_id: Option<u64>,
	pub page: Page,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentHistory {
	pub id: u64,
	pub entry_id: u64,
	pub data: EntryData,
	pub change_type: ChangeType,
	pub change_note: Option<String>,
	pub changed_by: Option<u64>,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateContentHistory<'a> {
	pub entry_id: u64,
	pub data: &'a EntryData,
	pub change_type: ChangeType,
	pub change_note: Option<&'a str>,
	pub changed_by: Option<u64>,
}

#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	// Content types
	//***************
	/// Lists live content types ordered by uid, with the total before paging
	async fn list_content_types(
		&self,
		opts: &ListContentTypeOptions,
	) -> XvResult<(Vec<ContentType>, u64)>;
	async fn read_content_type(&self, uid: &str) -> XvResult<ContentType>;
	/// Fails with `Conflict` if a live type already uses the uid
	async fn create_content_type(&self, ct: &CreateContentType<'_>) -> XvResult<ContentType>;
	/// Fails with `Conflict` when renaming a type that still has live entries
	async fn update_content_type(
		&self,
		uid: &str,
		upd: &UpdateContentType,
	) -> XvResult<ContentType>;
	async fn delete_content_type(&self, uid: &str) -> XvResult<()>;

	// Entries
	//*********
	/// Inserts the entry and its relation slots in one transaction
	async fn create_entry(
		&self,
		content_type_id: u64,
		entry: &CreateEntry<'_>,
	) -> XvResult<ContentEntry>;
	async fn read_entry(&self, content_type_id: u64, entry_id: u64) -> XvResult<ContentEntry>;
	/// Reads a live entry of a live content type addressed by uid
	async fn read_entry_by_uid(&self, content_type_uid: &str, entry_id: u64)
	-> XvResult<ContentEntry>;
	/// Merges the update into the stored entry and replaces the listed slots
	/// in one transaction. `publishedAt` is only set when it was previously
	/// unset.
	async fn update_entry(
		&self,
		content_type_id: u64,
		entry_id: u64,
		upd: &UpdateEntry<'_>,
	) -> XvResult<ContentEntry>;
	async fn delete_entry(&self, content_type_id: u64, entry_id: u64) -> XvResult<()>;
	/// Newest first, with the total before paging
	async fn list_entries(
		&self,
		content_type_id: u64,
		opts: &ListEntryOptions<'_>,
	) -> XvResult<(Vec<ContentEntry>, u64)>;

	// Relations
	//***********
	/// Atomically replaces every edge of the slot with `edges`
	async fn replace_relations(
		&self,
		slot: &RelationSlot<'_>,
		target_content_type_uid: &str,
		relation_type: RelationType,
		edges: &[RelationEdge],
	) -> XvResult<()>;
	/// Edges of an entry (optionally of one field), ordered by `order`
	async fn list_relations(
		&self,
		content_type_uid: &str,
		entry_id: u64,
		field: Option<&str>,
	) -> XvResult<Vec<ContentRelation>>;
	async fn create_relation(&self, rel: &CreateRelation<'_>) -> XvResult<ContentRelation>;
	/// Deletes an edge only if it originates from the given entry
	async fn delete_relation(
		&self,
		content_type_uid: &str,
		entry_id: u64,
		relation_id: u64,
	) -> XvResult<()>;

	// Users and identities
	//**********************
	async fn count_users(&self) -> XvResult<u64>;
	async fn list_users(&self, page: Page) -> XvResult<(Vec<User>, u64)>;
	async fn read_user(&self, user_id: u64) -> XvResult<User>;
	async fn create_user(&self, user: &CreateUser<'_>) -> XvResult<User>;
	async fn set_user_roles(&self, user_id: u64, role_ids: &[u64]) -> XvResult<()>;
	/// The user with all roles and permissions, as used for access checks
	async fn read_identity(&self, user_id: u64) -> XvResult<Identity>;

	// Roles
	//*******
	async fn list_roles(&self, role_type: Option<RoleType>) -> XvResult<Vec<Role>>;
	async fn read_role(&self, role_id: u64) -> XvResult<Role>;
	async fn create_role(&self, role: &CreateRole) -> XvResult<Role>;
	async fn update_role(&self, role_id: u64, upd: &UpdateRole) -> XvResult<Role>;
	async fn delete_role(&self, role_id: u64) -> XvResult<()>;

	// Permissions
	//*************
	async fn list_permissions(&self) -> XvResult<Vec<Permission>>;
	async fn read_permission(&self, perm_id: u64) -> XvResult<Permission>;
	async fn create_permission(&self, perm: &CreatePermission) -> XvResult<Permission>;
	async fn update_permission(&self, perm_id: u64, upd: &UpdatePermission)
	-> XvResult<Permission>;
	async fn delete_permission(&self, perm_id: u64) -> XvResult<()>;

	// API tokens
	//************
	async fn create_api_token(&self, token: &CreateApiToken<'_>) -> XvResult<CreatedApiToken>;
	async fn list_api_tokens(&self) -> XvResult<Vec<ApiToken>>;
	async fn read_api_token(&self, token_id: u64) -> XvResult<ApiToken>;
	async fn delete_api_token(&self, token_id: u64) -> XvResult<()>;
	/// Resolves a plaintext token; unknown or expired tokens are `Unauthorized`.
	/// Touches `lastUsedAt` on success.
	async fn validate_api_token(&self, token: &str) -> XvResult<ApiTokenValidation>;

	// Audit log and history
	//***********************
	async fn create_audit_log(&self, log: &CreateAuditLog<'_>) -> XvResult<u64>;
	async fn list_audit_logs(&self, opts: &ListAuditLogOptions<'_>)
	-> XvResult<(Vec<AuditLog>, u64)>;
	async fn create_content_history(&self, hist: &CreateContentHistory<'_>) -> XvResult<u64>;
	/// Newest first
	async fn list_entry_history(&self, entry_id: u64) -> XvResult<Vec<ContentHistory>>;
}

// vim: ts=4
