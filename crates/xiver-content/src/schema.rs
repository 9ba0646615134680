//! Schema registry
//!
//! Content type definitions are plain data kept by the meta adapter. Nothing
//! is cached here, so every read reflects the latest committed definition.

use serde::Deserialize;

use crate::prelude::*;
use xiver_types::content::{
	self, AccessType, ContentKind, ContentType, FieldType, validate_uid,
};
use xiver_types::meta_adapter::{CreateContentType, ListContentTypeOptions, UpdateContentType};

fn default_visible() -> bool {
	true
}

/// Definition of a new content type as submitted by an operator
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineContentType {
	pub uid: String,
	#[serde(default)]
	pub kind: ContentKind,
	pub display_name: String,
	pub description: Option<String>,
	/// Field definitions, parsed by [`content::parse_schema`]
	pub schema: serde_json::Value,
	#[serde(default)]
	pub access_type: AccessType,
	#[serde(default = "default_visible")]
	pub is_visible: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypePatch {
	pub uid: Option<String>,
	pub kind: Option<ContentKind>,
	pub display_name: Option<String>,
	#[serde(default)]
	pub description: Patch<String>,
	pub schema: Option<serde_json::Value>,
	pub access_type: Option<AccessType>,
	pub is_visible: Option<bool>,
}

pub async fn define(app: &App, def: DefineContentType) -> XvResult<ContentType> {
	validate_uid(&def.uid)?;
	if def.display_name.trim().is_empty() {
		return Err(Error::ValidationError("displayName is required".into()));
	}
	let schema = content::parse_schema(def.schema)?;

	let ct = app
		.meta_adapter
		.create_content_type(&CreateContentType {
			uid: &def.uid,
			kind: def.kind,
			display_name: &def.display_name,
			description: def.description.as_deref(),
			schema: &schema,
			access_type: def.access_type,
			is_visible: def.is_visible,
		})
		.await?;

	info!(uid = %ct.uid, kind = ct.kind.as_str(), fields = ct.schema.len(), "content type defined");
	Ok(ct)
}

pub async fn get(app: &App, uid: &str) -> XvResult<ContentType> {
	app.meta_adapter.read_content_type(uid).await
}

/// Field type of `field`, `None` when the schema does not describe it
pub fn field_type(ct: &ContentType, field: &str) -> Option<FieldType> {
	ct.field_type(field)
}

pub async fn list(
	app: &App,
	is_visible: Option<bool>,
	page: Option<Page>,
) -> XvResult<(Vec<ContentType>, u64)> {
	app.meta_adapter.list_content_types(&ListContentTypeOptions { is_visible, page }).await
}

pub async fn update(app: &App, uid: &str, patch: ContentTypePatch) -> XvResult<ContentType> {
	if let Some(new_uid) = &patch.uid {
		validate_uid(new_uid)?;
	}
	if patch.display_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
		return Err(Error::ValidationError("displayName cannot be empty".into()));
	}
	let schema = patch.schema.map(content::parse_schema).transpose()?;

	let upd = UpdateContentType {
		uid: patch.uid,
		kind: patch.kind,
		display_name: patch.display_name,
		description: patch.description,
		schema,
		access_type: patch.access_type,
		is_visible: patch.is_visible,
	};
	let ct = app.meta_adapter.update_content_type(uid, &upd).await?;

	info!(uid = %uid, new_uid = %ct.uid, "content type updated");
	Ok(ct)
}

pub async fn delete(app: &App, uid: &str) -> XvResult<()> {
	app.meta_adapter.delete_content_type(uid).await?;
	info!(uid = %uid, "content type deleted");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_define_defaults() {
		let def: DefineContentType = serde_json::from_value(serde_json::json!({
			"uid": "articles",
			"displayName": "Articles",
			"schema": {}
		}))
		.unwrap();

		assert_eq!(def.kind, ContentKind::Collection);
		assert_eq!(def.access_type, AccessType::Public);
		assert!(def.is_visible);
	}

	#[test]
	fn test_patch_distinguishes_null_description() {
		let patch: ContentTypePatch =
			serde_json::from_value(serde_json::json!({ "description": null })).unwrap();
		assert!(patch.description.is_null());

		let patch: ContentTypePatch = serde_json::from_value(serde_json::json!({})).unwrap();
		assert!(patch.description.is_undefined());
	}
}

// vim: ts=4
