//! Content types, entries and relation edges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, XvResult};
use crate::types::Timestamp;
use crate::value::{EntryData, FieldValue};

/// Path segments owned by the system API. They can never name a content type.
pub const RESERVED_UIDS: &[&str] = &[
	"auth",
	"roles",
	"users",
	"permissions",
	"api-tokens",
	"upload",
	"media-files",
	"content-types",
	"admin",
	"audit-logs",
];

pub fn is_reserved_uid(uid: &str) -> bool {
	RESERVED_UIDS.contains(&uid)
}

/// Checks a content type UID: non-empty, lowercase letters, digits, `-`, `_`,
/// and not reserved.
pub fn validate_uid(uid: &str) -> XvResult<()> {
	if uid.is_empty() || uid.len() > 64 {
		return Err(Error::ValidationError("uid must be 1-64 characters".into()));
	}
	if !uid.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_') {
		return Err(Error::ValidationError(
			"uid may only contain lowercase letters, digits, '-' and '_'".into(),
		));
	}
	if is_reserved_uid(uid) {
		return Err(Error::ValidationError(format!("uid '{}' is reserved", uid)));
	}
	Ok(())
}

// Enums //
//*******//
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
	#[default]
	#[serde(rename = "collectionType", alias = "collection")]
	Collection,
	#[serde(rename = "singleType", alias = "single")]
	Single,
}

impl ContentKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ContentKind::Collection => "collectionType",
			ContentKind::Single => "singleType",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"collectionType" | "collection" => Some(ContentKind::Collection),
			"singleType" | "single" => Some(ContentKind::Single),
			_ => None,
		}
	}
}

/// Access tier of a content type, ordered from least to most restrictive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
	#[default]
	Public,
	Authenticated,
	Moderator,
	Admin,
}

impl AccessType {
	pub fn as_str(&self) -> &'static str {
		match self {
			AccessType::Public => "public",
			AccessType::Authenticated => "authenticated",
			AccessType::Moderator => "moderator",
			AccessType::Admin => "admin",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"public" => Some(AccessType::Public),
			"authenticated" => Some(AccessType::Authenticated),
			"moderator" => Some(AccessType::Moderator),
			"admin" => Some(AccessType::Admin),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
	#[default]
	Draft,
	Published,
}

impl EntryStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			EntryStatus::Draft => "draft",
			EntryStatus::Published => "published",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"draft" => Some(EntryStatus::Draft),
			"published" => Some(EntryStatus::Published),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
	OneToOne,
	#[default]
	ManyToOne,
	OneToMany,
	ManyToMany,
}

impl RelationType {
	/// Whether the slot holds an ordered list of targets
	pub fn is_many(&self) -> bool {
		matches!(self, RelationType::OneToMany | RelationType::ManyToMany)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RelationType::OneToOne => "oneToOne",
			RelationType::ManyToOne => "manyToOne",
			RelationType::OneToMany => "oneToMany",
			RelationType::ManyToMany => "manyToMany",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"oneToOne" => Some(RelationType::OneToOne),
			"manyToOne" => Some(RelationType::ManyToOne),
			"oneToMany" => Some(RelationType::OneToMany),
			"manyToMany" => Some(RelationType::ManyToMany),
			_ => None,
		}
	}
}

// Schema //
//********//
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	String,
	Text,
	Number,
	Boolean,
	Date,
	Relation,
	Media,
	Component,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConstraints {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_length: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_length: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pattern: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberConstraints {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationTarget {
	pub relation_type: RelationType,
	pub target_content_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaOptions {
	#[serde(default)]
	pub multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOptions {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub component_type: Option<String>,
}

/// Field kind together with the constraints that belong to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
	String(TextConstraints),
	Text(TextConstraints),
	Number(NumberConstraints),
	Boolean,
	Date,
	Relation(RelationTarget),
	Media(MediaOptions),
	Component(ComponentOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
	#[serde(flatten)]
	pub kind: FieldKind,
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub unique: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<FieldValue>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

impl FieldDef {
	pub fn field_type(&self) -> FieldType {
		match self.kind {
			FieldKind::String(_) => FieldType::String,
			FieldKind::Text(_) => FieldType::Text,
			FieldKind::Number(_) => FieldType::Number,
			FieldKind::Boolean => FieldType::Boolean,
			FieldKind::Date => FieldType::Date,
			FieldKind::Relation(_) => FieldType::Relation,
			FieldKind::Media(_) => FieldType::Media,
			FieldKind::Component(_) => FieldType::Component,
		}
	}

	pub fn relation(&self) -> Option<&RelationTarget> {
		match &self.kind {
			FieldKind::Relation(target) => Some(target),
			_ => None,
		}
	}
}

pub type Schema = BTreeMap<String, FieldDef>;

/// Parses a schema from its JSON form, reporting malformed definitions as
/// validation errors.
pub fn parse_schema(value: serde_json::Value) -> XvResult<Schema> {
	serde_json::from_value(value)
		.map_err(|err| Error::ValidationError(format!("invalid schema: {}", err)))
}

// ContentType //
//*************//
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
	pub id: u64,
	pub uid: String,
	pub kind: ContentKind,
	pub display_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub schema: Schema,
	pub access_type: AccessType,
	pub is_visible: bool,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

impl ContentType {
	pub fn field(&self, name: &str) -> Option<&FieldDef> {
		self.schema.get(name)
	}

	/// `None` for keys the schema does not describe
	pub fn field_type(&self, name: &str) -> Option<FieldType> {
		self.schema.get(name).map(FieldDef::field_type)
	}

	/// Splits raw request data into plain entry data and relation values.
	///
	/// Keys unknown to the schema stay in the entry data.
	pub fn split_data(&self, raw: EntryData) -> (EntryData, BTreeMap<String, FieldValue>) {
		let mut data = EntryData::new();
		let mut relations = BTreeMap::new();
		for (key, value) in raw {
			if self.field_type(&key) == Some(FieldType::Relation) {
				relations.insert(key, value);
			} else {
				data.insert(key, value);
			}
		}
		(data, relations)
	}

	/// Converts RFC 3339 strings stored under `date` fields into dates
	pub fn coerce_dates(&self, data: &mut EntryData) {
		for (key, value) in data.iter_mut() {
			if self.field_type(key) == Some(FieldType::Date) {
				*value = std::mem::replace(value, FieldValue::Null).into_date();
			}
		}
	}
}

// ContentEntry //
//**************//
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
	pub id: u64,
	pub content_type_id: u64,
	pub data: EntryData,
	pub status: EntryStatus,
	pub published_at: Option<Timestamp>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub created_by: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub updated_by: Option<u64>,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

impl ContentEntry {
	/// Embeddable form used when hydrating relation fields
	pub fn to_field_value(&self) -> FieldValue {
		let mut map = BTreeMap::new();
		map.insert("id".to_string(), FieldValue::from(self.id));
		map.insert("status".to_string(), FieldValue::from(self.status.as_str()));
		map.insert(
			"publishedAt".to_string(),
			self.published_at.map_or(FieldValue::Null, |t| FieldValue::Number(t.0.into())),
		);
		map.insert("createdAt".to_string(), FieldValue::Number(self.created_at.0.into()));
		map.insert("updatedAt".to_string(), FieldValue::Number(self.updated_at.0.into()));
		map.insert("data".to_string(), FieldValue::Object(self.data.clone()));
		FieldValue::Object(map)
	}
}

// Relations //
//***********//
/// Identifies one relation field of one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSlot<'a> {
	pub content_type_uid: &'a str,
	pub entry_id: u64,
	pub field: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRelation {
	pub id: u64,
	pub source_content_type_uid: String,
	pub source_entry_id: u64,
	pub source_field_name: String,
	pub target_content_type_uid: String,
	pub target_entry_id: u64,
	pub relation_type: RelationType,
	pub order: i64,
	pub created_at: Timestamp,
}

/// New edge for a slot; `order` defaults to the edge position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationEdge {
	pub target_entry_id: u64,
	pub order: Option<i64>,
}

/// Relation value as accepted from clients: a raw id, a list of ids, or
/// objects carrying an `id` key. `null` clears the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationValue {
	Clear,
	One(u64),
	Many(Vec<u64>),
}

fn unwrap_id(value: &FieldValue) -> XvResult<u64> {
	let id = match value {
		FieldValue::Number(_) => value.as_u64(),
		FieldValue::Object(_) => value.get("id").and_then(FieldValue::as_u64),
		_ => None,
	};
	match id {
		Some(id) if id > 0 => Ok(id),
		_ => Err(Error::ValidationError("relation target must be a positive id or {id}".into())),
	}
}

impl RelationValue {
	pub fn parse(value: &FieldValue, relation_type: RelationType) -> XvResult<Self> {
		match value {
			FieldValue::Null => Ok(RelationValue::Clear),
			FieldValue::List(items) => {
				if !relation_type.is_many() {
					return Err(Error::ValidationError(format!(
						"{} relation takes a single target",
						relation_type.as_str()
					)));
				}
				let ids = items.iter().map(unwrap_id).collect::<XvResult<Vec<_>>>()?;
				Ok(RelationValue::Many(ids))
			}
			_ => {
				let id = unwrap_id(value)?;
				if relation_type.is_many() {
					Ok(RelationValue::Many(vec![id]))
				} else {
					Ok(RelationValue::One(id))
				}
			}
		}
	}

	/// Edges that make up the new slot value, ordered by position
	pub fn into_edges(self) -> Vec<RelationEdge> {
		match self {
			RelationValue::Clear => Vec::new(),
			RelationValue::One(id) => vec![RelationEdge { target_entry_id: id, order: Some(0) }],
			RelationValue::Many(ids) => ids
				.into_iter()
				.enumerate()
				.map(|(i, id)| RelationEdge { target_entry_id: id, order: Some(i as i64) })
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn articles() -> ContentType {
		ContentType {
			id: 1,
			uid: "articles".into(),
			kind: ContentKind::Collection,
			display_name: "Articles".into(),
			description: None,
			schema: parse_schema(json!({
				"title": { "type": "string", "required": true, "maxLength": 120 },
				"publishDate": { "type": "date" },
				"views": { "type": "number", "default": 0 },
				"author": {
					"type": "relation",
					"relationType": "manyToOne",
					"targetContentType": "users"
				},
				"tags": {
					"type": "relation",
					"relationType": "manyToMany",
					"targetContentType": "tags"
				}
			}))
			.unwrap(),
			access_type: AccessType::Public,
			is_visible: true,
			created_at: Timestamp(0),
			updated_at: Timestamp(0),
		}
	}

	#[test]
	fn test_schema_parsing() {
		let ct = articles();
		assert_eq!(ct.field_type("title"), Some(FieldType::String));
		assert_eq!(ct.field_type("author"), Some(FieldType::Relation));
		assert_eq!(ct.field_type("missing"), None);

		let title = ct.field("title").unwrap();
		assert!(title.required);
		match &title.kind {
			FieldKind::String(c) => assert_eq!(c.max_length, Some(120)),
			other => panic!("unexpected kind {:?}", other),
		}

		let author = ct.field("author").and_then(FieldDef::relation).unwrap();
		assert_eq!(author.relation_type, RelationType::ManyToOne);
		assert_eq!(author.target_content_type, "users");
	}

	#[test]
	fn test_schema_rejects_incomplete_relation() {
		let res = parse_schema(json!({ "author": { "type": "relation" } }));
		assert!(matches!(res, Err(Error::ValidationError(_))));

		let res = parse_schema(json!({ "x": { "type": "blob" } }));
		assert!(matches!(res, Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_schema_serializes_back_to_tagged_form() {
		let ct = articles();
		let json = serde_json::to_value(&ct.schema).unwrap();
		assert_eq!(json["author"]["type"], "relation");
		assert_eq!(json["author"]["targetContentType"], "users");
		assert_eq!(json["title"]["required"], true);
	}

	#[test]
	fn test_split_data() {
		let ct = articles();
		let raw: EntryData = serde_json::from_value(json!({
			"title": "Hi",
			"author": { "id": 7 },
			"unknown": 1
		}))
		.unwrap();

		let (data, relations) = ct.split_data(raw);
		assert_eq!(data.len(), 2);
		assert!(data.contains_key("unknown"));
		assert!(relations.contains_key("author"));
		assert!(!data.contains_key("author"));
	}

	#[test]
	fn test_coerce_dates() {
		let ct = articles();
		let mut data: EntryData = serde_json::from_value(json!({
			"publishDate": "2024-01-02T03:04:05Z",
			"title": "2024-01-02T03:04:05Z"
		}))
		.unwrap();
		ct.coerce_dates(&mut data);

		assert!(matches!(data.get("publishDate"), Some(FieldValue::Date(_))));
		assert!(matches!(data.get("title"), Some(FieldValue::String(_))));
	}

	#[test]
	fn test_relation_value_forms() {
		let one = RelationType::ManyToOne;
		let many = RelationType::ManyToMany;

		let v = FieldValue::from(json!(7));
		assert_eq!(RelationValue::parse(&v, one).unwrap(), RelationValue::One(7));
		assert_eq!(RelationValue::parse(&v, many).unwrap(), RelationValue::Many(vec![7]));

		let v = FieldValue::from(json!({ "id": 9, "title": "x" }));
		assert_eq!(RelationValue::parse(&v, one).unwrap(), RelationValue::One(9));

		let v = FieldValue::from(json!([1, { "id": 2 }]));
		assert_eq!(RelationValue::parse(&v, many).unwrap(), RelationValue::Many(vec![1, 2]));
		assert!(RelationValue::parse(&v, one).is_err());

		assert_eq!(RelationValue::parse(&FieldValue::Null, one).unwrap(), RelationValue::Clear);
		assert!(RelationValue::parse(&FieldValue::from("7"), one).is_err());
		assert!(RelationValue::parse(&FieldValue::from(json!(0)), one).is_err());
	}

	#[test]
	fn test_relation_edges_are_ordered() {
		let edges = RelationValue::Many(vec![5, 3]).into_edges();
		assert_eq!(edges[0], RelationEdge { target_entry_id: 5, order: Some(0) });
		assert_eq!(edges[1], RelationEdge { target_entry_id: 3, order: Some(1) });
		assert!(RelationValue::Clear.into_edges().is_empty());
	}

	#[test]
	fn test_validate_uid() {
		assert!(validate_uid("articles").is_ok());
		assert!(validate_uid("blog-posts_2").is_ok());
		assert!(validate_uid("").is_err());
		assert!(validate_uid("Articles").is_err());
		assert!(validate_uid("users").is_err());
		assert!(validate_uid("audit-logs").is_err());
	}

	#[test]
	fn test_kind_aliases() {
		let kind: ContentKind = serde_json::from_value(json!("single")).unwrap();
		assert_eq!(kind, ContentKind::Single);
		assert_eq!(serde_json::to_value(kind).unwrap(), json!("singleType"));
	}
}

// vim: ts=4
