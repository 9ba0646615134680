//! Relation graph
//!
//! Relation values never live inside entry data. Each relation field of an
//! entry is a slot whose edges are its current value; edges point at
//! `(content type uid, entry id)` pairs and may dangle. Dangling or filtered
//! targets are dropped on resolution, they are not errors.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::prelude::*;
use xiver_core::access;
use xiver_types::content::{
	ContentEntry, ContentRelation, ContentType, EntryStatus, FieldType, RelationEdge,
	RelationSlot, RelationTarget, RelationType, RelationValue,
};
use xiver_types::identity::Identity;
use xiver_types::meta_adapter::{CreateRelation, MetaAdapter, SlotReplace};
use xiver_types::value::{EntryData, FieldValue};

/// Replaces every edge of a slot in one transaction
pub async fn replace(
	meta: &dyn MetaAdapter,
	slot: &RelationSlot<'_>,
	target_content_type_uid: &str,
	relation_type: RelationType,
	edges: &[RelationEdge],
) -> XvResult<()> {
	meta.replace_relations(slot, target_content_type_uid, relation_type, edges).await?;
	debug!(
		uid = %slot.content_type_uid,
		entry_id = slot.entry_id,
		field = %slot.field,
		edges = edges.len(),
		"relation slot replaced"
	);
	Ok(())
}

/// New value of one relation field
#[derive(Debug, Clone)]
pub struct SlotWrite<'a> {
	pub field: &'a str,
	pub target: &'a RelationTarget,
	pub edges: Vec<RelationEdge>,
}

impl SlotWrite<'_> {
	pub fn as_replace(&self) -> SlotReplace<'_> {
		SlotReplace {
			field: self.field,
			target_content_type_uid: &self.target.target_content_type,
			relation_type: self.target.relation_type,
			edges: &self.edges,
		}
	}
}

/// Parses client relation values against the schema.
///
/// Runs before anything is written, so a malformed value rejects the whole
/// request.
pub fn plan_slots<'a>(
	ct: &'a ContentType,
	relations: &'a BTreeMap<String, FieldValue>,
) -> XvResult<Vec<SlotWrite<'a>>> {
	let mut writes = Vec::with_capacity(relations.len());
	for (field, value) in relations {
		let Some(target) = ct.field(field).and_then(|def| def.relation()) else {
			continue;
		};
		let edges = RelationValue::parse(value, target.relation_type)
			.map_err(|err| match err {
				Error::ValidationError(msg) => Error::ValidationError(format!("{}: {}", field, msg)),
				err => err,
			})?
			.into_edges();
		writes.push(SlotWrite { field, target, edges });
	}
	Ok(writes)
}

/// Edges of an entry, optionally of one field, ordered by `order`
pub async fn list_by_source(
	meta: &dyn MetaAdapter,
	content_type_uid: &str,
	entry_id: u64,
	field: Option<&str>,
) -> XvResult<Vec<ContentRelation>> {
	meta.list_relations(content_type_uid, entry_id, field).await
}

/// Relation targets a reader may have embedded
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetScope<'a> {
	pub identity: Option<&'a Identity>,
	/// Only targets in this status when set
	pub status: Option<EntryStatus>,
	/// Skip targets whose content type is hidden
	pub visible_only: bool,
}

impl<'a> TargetScope<'a> {
	/// Public reads: published targets of visible types the caller may access
	pub fn public(identity: Option<&'a Identity>) -> Self {
		Self { identity, status: Some(EntryStatus::Published), visible_only: true }
	}

	/// Management reads: any status, hidden types included
	pub fn management(identity: &'a Identity) -> Self {
		Self { identity: Some(identity), status: None, visible_only: false }
	}

	fn admits(&self, ct: &ContentType) -> bool {
		(ct.is_visible || !self.visible_only) && access::check_access(self.identity, ct.access_type)
	}
}

/// Looks up the target entry of every edge, keeping edge order.
///
/// Edges whose target is gone, or falls outside `scope`, are skipped.
pub async fn resolve<'a>(
	meta: &dyn MetaAdapter,
	edges: &'a [ContentRelation],
	scope: &TargetScope<'_>,
) -> XvResult<Vec<(&'a ContentRelation, ContentEntry)>> {
	let mut admitted: BTreeMap<&str, bool> = BTreeMap::new();
	let mut resolved = Vec::with_capacity(edges.len());
	for edge in edges {
		let uid = edge.target_content_type_uid.as_str();
		let allowed = match admitted.get(uid) {
			Some(allowed) => *allowed,
			None => {
				let allowed = match meta.read_content_type(uid).await {
					Ok(ct) => scope.admits(&ct),
					Err(Error::NotFound) => false,
					Err(err) => return Err(err),
				};
				admitted.insert(uid, allowed);
				allowed
			}
		};
		if !allowed {
			debug!(target_uid = %uid, target_id = edge.target_entry_id, "skipping relation target");
			continue;
		}

		let entry = match meta.read_entry_by_uid(uid, edge.target_entry_id).await {
			Ok(entry) => entry,
			Err(Error::NotFound) => {
				debug!(
					target_uid = %uid,
					target_id = edge.target_entry_id,
					"skipping dangling relation"
				);
				continue;
			}
			Err(err) => return Err(err),
		};
		if scope.status.is_some_and(|status| entry.status != status) {
			continue;
		}
		resolved.push((edge, entry));
	}
	Ok(resolved)
}

/// Returns a copy of `entry.data` with relation fields embedded.
///
/// To-one fields become the target object, to-many fields a list in edge
/// order. Keys the schema declares as relations only ever hold resolved
/// targets; fields without one are left out. The stored entry is never
/// modified.
pub async fn hydrate(
	meta: &dyn MetaAdapter,
	ct: &ContentType,
	entry: &ContentEntry,
	scope: &TargetScope<'_>,
) -> XvResult<EntryData> {
	let edges = list_by_source(meta, &ct.uid, entry.id, None).await?;
	let resolved = resolve(meta, &edges, scope).await?;

	let mut data = entry.data.clone();
	data.retain(|key, _| ct.field_type(key) != Some(FieldType::Relation));
	for (edge, target) in resolved {
		let value = target.to_field_value();
		if edge.relation_type.is_many() {
			match data.get_mut(&edge.source_field_name) {
				Some(FieldValue::List(items)) => items.push(value),
				_ => {
					data.insert(edge.source_field_name.clone(), FieldValue::List(vec![value]));
				}
			}
		} else {
			data.insert(edge.source_field_name.clone(), value);
		}
	}
	Ok(data)
}

/// Single edge to add to a slot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelation {
	pub source_field_name: String,
	pub target_content_type_uid: String,
	pub target_entry_id: u64,
	#[serde(default)]
	pub relation_type: RelationType,
	pub order: Option<i64>,
}

/// Appends one edge to a slot of an existing entry
pub async fn upsert(
	app: &App,
	content_type_uid: &str,
	entry_id: u64,
	rel: &NewRelation,
) -> XvResult<ContentRelation> {
	if rel.target_entry_id == 0 {
		return Err(Error::ValidationError("targetEntryId must be positive".into()));
	}
	app.meta_adapter.read_entry_by_uid(content_type_uid, entry_id).await?;

	let created = app
		.meta_adapter
		.create_relation(&CreateRelation {
			slot: RelationSlot {
				content_type_uid,
				entry_id,
				field: &rel.source_field_name,
			},
			target_content_type_uid: &rel.target_content_type_uid,
			target_entry_id: rel.target_entry_id,
			relation_type: rel.relation_type,
			order: rel.order,
		})
		.await?;

	info!(
		uid = %content_type_uid,
		entry_id = entry_id,
		field = %rel.source_field_name,
		relation_id = created.id,
		"relation created"
	);
	Ok(created)
}

pub async fn delete(
	app: &App,
	content_type_uid: &str,
	entry_id: u64,
	relation_id: u64,
) -> XvResult<()> {
	app.meta_adapter.delete_relation(content_type_uid, entry_id, relation_id).await?;
	info!(uid = %content_type_uid, entry_id = entry_id, relation_id = relation_id, "relation deleted");
	Ok(())
}

/// Live entries of one relation field that the caller may read, together
/// with their edges
pub async fn list_related(
	app: &App,
	identity: &Identity,
	content_type_uid: &str,
	entry_id: u64,
	field: &str,
) -> XvResult<Vec<(ContentRelation, ContentEntry)>> {
	let meta = app.meta_adapter.as_ref();
	let edges = list_by_source(meta, content_type_uid, entry_id, Some(field)).await?;
	let resolved = resolve(meta, &edges, &TargetScope::management(identity)).await?;
	Ok(resolved.into_iter().map(|(edge, entry)| (edge.clone(), entry)).collect())
}

// vim: ts=4
