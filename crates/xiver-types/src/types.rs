//! Common types used throughout Xiver.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::SystemTime;

// Timestamp //
//***********//
/// Unix timestamp in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs() as i64)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

// Patch //
//*******//
/// Tri-state field for partial updates.
///
/// A missing JSON key deserializes to `Undefined` (requires `#[serde(default)]`
/// on the field), an explicit `null` to `Null`, anything else to `Value`.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch<T> {
	Undefined,
	Null,
	Value(T),
}

impl<T> Default for Patch<T> {
	fn default() -> Self {
		Patch::Undefined
	}
}

impl<T> Patch<T> {
	pub fn is_undefined(&self) -> bool {
		matches!(self, Patch::Undefined)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Patch::Null)
	}

	pub fn value(&self) -> Option<&T> {
		match self {
			Patch::Value(v) => Some(v),
			_ => None,
		}
	}

	/// `None` if undefined, `Some(None)` if null, `Some(Some(v))` if set
	pub fn as_option(&self) -> Option<Option<&T>> {
		match self {
			Patch::Undefined => None,
			Patch::Null => Some(None),
			Patch::Value(v) => Some(Some(v)),
		}
	}
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
	T: Deserialize<'de>,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		Ok(match Option::<T>::deserialize(deserializer)? {
			Some(v) => Patch::Value(v),
			None => Patch::Null,
		})
	}
}

impl<T: Serialize> Serialize for Patch<T> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Patch::Undefined | Patch::Null => serializer.serialize_none(),
			Patch::Value(v) => v.serialize(serializer),
		}
	}
}

// Pagination //
//************//
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page selector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
	pub page: u32,
	pub page_size: u32,
}

impl Page {
	/// Normalizes raw query values: page starts at 1, page size is clamped
	/// to `1..=MAX_PAGE_SIZE`.
	pub fn new(page: Option<u32>, page_size: Option<u32>, default_size: u32) -> Self {
		let page = page.filter(|p| *p > 0).unwrap_or(1);
		let page_size = page_size.filter(|s| *s > 0).unwrap_or(default_size).min(MAX_PAGE_SIZE);
		Self { page, page_size }
	}

	pub fn offset(&self) -> u64 {
		u64::from(self.page - 1) * u64::from(self.page_size)
	}

	pub fn limit(&self) -> u32 {
		self.page_size
	}
}

impl Default for Page {
	fn default() -> Self {
		Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
	pub page: u32,
	#[serde(rename = "pageSize")]
	pub page_size: u32,
	pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
	pub pagination: Pagination,
}

/// Envelope for list responses: `{"data": [...], "meta": {"pagination": {...}}}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
	pub data: T,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<ResponseMeta>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, meta: None }
	}

	pub fn with_pagination(data: T, page: Page, total: u64) -> Self {
		Self {
			data,
			meta: Some(ResponseMeta {
				pagination: Pagination { page: page.page, page_size: page.page_size, total },
			}),
		}
	}
}


// vim: ts=4
