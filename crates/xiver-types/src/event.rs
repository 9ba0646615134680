//! Content change events emitted after successful entry writes.

use serde::{Deserialize, Serialize};

use crate::content::EntryStatus;
use crate::value::EntryData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
	Created,
	Updated,
	Published,
	Deleted,
}

impl ChangeType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ChangeType::Created => "created",
			ChangeType::Updated => "updated",
			ChangeType::Published => "published",
			ChangeType::Deleted => "deleted",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"created" => Some(ChangeType::Created),
			"updated" => Some(ChangeType::Updated),
			"published" => Some(ChangeType::Published),
			"deleted" => Some(ChangeType::Deleted),
			_ => None,
		}
	}
}

/// Post-write snapshot of an entry change
#[derive(Debug, Clone)]
pub struct ContentEvent {
	pub entry_id: u64,
	pub content_type_uid: String,
	pub change: ChangeType,
	pub status: EntryStatus,
	/// Full entry data after the write
	pub data: EntryData,
	pub actor: Option<u64>,
}

// vim: ts=4
