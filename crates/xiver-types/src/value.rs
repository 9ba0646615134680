//! Entry payload values.
//!
//! Entry data is a map from field name to a small closed set of value
//! variants. Values arrive as JSON; `date` fields are recognized through the
//! content type schema (see [`crate::content::ContentType::coerce_dates`]).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Field name → value map stored for an entry
pub type EntryData = BTreeMap<String, FieldValue>;

/// Parsed RFC 3339 timestamp that serializes back to the text it was parsed
/// from, offset and fraction digits included
#[derive(Debug, Clone, PartialEq)]
pub struct DateValue {
	instant: DateTime<FixedOffset>,
	text: String,
}

impl DateValue {
	pub fn parse(text: String) -> Result<Self, String> {
		match DateTime::parse_from_rfc3339(&text) {
			Ok(instant) => Ok(Self { instant, text }),
			Err(_) => Err(text),
		}
	}

	pub fn instant(&self) -> DateTime<FixedOffset> {
		self.instant
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	Null,
	Bool(bool),
	Number(serde_json::Number),
	String(String),
	Date(DateValue),
	List(Vec<FieldValue>),
	Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
	pub fn is_null(&self) -> bool {
		matches!(self, FieldValue::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			FieldValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_u64(&self) -> Option<u64> {
		match self {
			FieldValue::Number(n) => n.as_u64(),
			_ => None,
		}
	}

	pub fn get(&self, key: &str) -> Option<&FieldValue> {
		match self {
			FieldValue::Object(map) => map.get(key),
			_ => None,
		}
	}

	/// Turns an RFC 3339 string into a `Date`. Other values are returned unchanged.
	pub fn into_date(self) -> FieldValue {
		match self {
			FieldValue::String(s) => match DateValue::parse(s) {
				Ok(date) => FieldValue::Date(date),
				Err(s) => FieldValue::String(s),
			},
			other => other,
		}
	}
}

impl From<serde_json::Value> for FieldValue {
	fn from(value: serde_json::Value) -> Self {
		use serde_json::Value;
		match value {
			Value::Null => FieldValue::Null,
			Value::Bool(b) => FieldValue::Bool(b),
			Value::Number(n) => FieldValue::Number(n),
			Value::String(s) => FieldValue::String(s),
			Value::Array(items) => FieldValue::List(items.into_iter().map(Into::into).collect()),
			Value::Object(map) => {
				FieldValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
			}
		}
	}
}

impl From<FieldValue> for serde_json::Value {
	fn from(value: FieldValue) -> Self {
		use serde_json::Value;
		match value {
			FieldValue::Null => Value::Null,
			FieldValue::Bool(b) => Value::Bool(b),
			FieldValue::Number(n) => Value::Number(n),
			FieldValue::String(s) => Value::String(s),
			FieldValue::Date(date) => Value::String(date.text),
			FieldValue::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
			FieldValue::Object(map) => {
				Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
			}
		}
	}
}

impl From<&str> for FieldValue {
	fn from(s: &str) -> Self {
		FieldValue::String(s.to_string())
	}
}

impl From<bool> for FieldValue {
	fn from(b: bool) -> Self {
		FieldValue::Bool(b)
	}
}

impl From<u64> for FieldValue {
	fn from(n: u64) -> Self {
		FieldValue::Number(n.into())
	}
}

impl Serialize for FieldValue {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			FieldValue::Null => serializer.serialize_unit(),
			FieldValue::Bool(b) => serializer.serialize_bool(*b),
			FieldValue::Number(n) => n.serialize(serializer),
			FieldValue::String(s) => serializer.serialize_str(s),
			FieldValue::Date(date) => serializer.serialize_str(date.as_str()),
			FieldValue::List(items) => items.serialize(serializer),
			FieldValue::Object(map) => map.serialize(serializer),
		}
	}
}

impl<'de> Deserialize<'de> for FieldValue {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(serde_json::Value::deserialize(deserializer)?.into())
	}
}

/// Merges `patch` into `base` key by key.
///
/// Keys absent from `patch` are kept, keys present overwrite (an explicit
/// null included).
pub fn merge_data(base: &mut EntryData, patch: EntryData) {
	for (key, value) in patch {
		base.insert(key, value);
	}
}


// vim: ts=4
