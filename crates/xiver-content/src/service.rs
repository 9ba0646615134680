//! Entry service
//!
//! Orchestrates the schema registry, the entry store and the relation graph.
//! Incoming data is split by field type: relation fields go to the relation
//! graph, everything else (including keys the schema does not know) is entry
//! data. An entry and its relation slots are written in one transaction, and
//! every successful write emits a [`ContentEvent`].

use serde::Deserialize;

use crate::prelude::*;
use crate::relation::{self, SlotWrite, TargetScope};
use crate::schema;
use xiver_core::access;
use xiver_types::content::{ContentEntry, ContentKind, ContentType, EntryStatus};
use xiver_types::event::{ChangeType, ContentEvent};
use xiver_types::identity::Identity;
use xiver_types::meta_adapter::{CreateEntry, ListEntryOptions, UpdateEntry};
use xiver_types::value::EntryData;

/// Entry payload of create and update requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
	#[serde(default)]
	pub data: EntryData,
	pub status: Option<EntryStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct EntryFilter<'a> {
	pub status: Option<EntryStatus>,
	pub search: Option<&'a str>,
	pub page: Page,
}

/// Resolves a content type and runs the tiered access check against it
pub async fn authorize_type(
	app: &App,
	uid: &str,
	identity: Option<&Identity>,
) -> XvResult<ContentType> {
	let ct = schema::get(app, uid).await?;
	access::require_access(identity, ct.access_type)?;
	Ok(ct)
}

fn emit(app: &App, ct: &ContentType, entry: &ContentEntry, change: ChangeType, actor: Option<u64>) {
	app.emit(ContentEvent {
		entry_id: entry.id,
		content_type_uid: ct.uid.clone(),
		change,
		status: entry.status,
		data: entry.data.clone(),
		actor,
	});
}

fn with_dates(ct: &ContentType, mut entry: ContentEntry) -> ContentEntry {
	ct.coerce_dates(&mut entry.data);
	entry
}

pub async fn create_entry(
	app: &App,
	ct: &ContentType,
	input: EntryInput,
	actor: Option<u64>,
) -> XvResult<ContentEntry> {
	if ct.kind == ContentKind::Single {
		let (_, total) =
			app.meta_adapter.list_entries(ct.id, &ListEntryOptions::default()).await?;
		if total > 0 {
			return Err(Error::Conflict(format!("single type '{}' already has an entry", ct.uid)));
		}
	}

	let (mut data, relations) = ct.split_data(input.data);
	ct.coerce_dates(&mut data);
	let slots = relation::plan_slots(ct, &relations)?;
	let replaces: Vec<_> = slots.iter().map(SlotWrite::as_replace).collect();

	let entry = app
		.meta_adapter
		.create_entry(
			ct.id,
			&CreateEntry {
				data: &data,
				status: input.status.unwrap_or_default(),
				actor,
				relations: &replaces,
			},
		)
		.await?;

	let entry = with_dates(ct, entry);
	info!(uid = %ct.uid, entry_id = entry.id, status = entry.status.as_str(), "entry created");
	emit(app, ct, &entry, ChangeType::Created, actor);
	Ok(entry)
}

/// Merges `input.data` into the stored entry. Relation fields present in
/// the input replace their slots; absent relation fields stay as they are.
pub async fn update_entry(
	app: &App,
	ct: &ContentType,
	entry_id: u64,
	input: EntryInput,
	actor: Option<u64>,
) -> XvResult<ContentEntry> {
	let (mut data, relations) = ct.split_data(input.data);
	ct.coerce_dates(&mut data);
	let slots = relation::plan_slots(ct, &relations)?;
	let replaces: Vec<_> = slots.iter().map(SlotWrite::as_replace).collect();

	let entry = app
		.meta_adapter
		.update_entry(
			ct.id,
			entry_id,
			&UpdateEntry { data: &data, status: input.status, actor, relations: &replaces },
		)
		.await?;

	let change = if input.status == Some(EntryStatus::Published) {
		ChangeType::Published
	} else {
		ChangeType::Updated
	};
	let entry = with_dates(ct, entry);
	info!(uid = %ct.uid, entry_id = entry.id, change = change.as_str(), "entry updated");
	emit(app, ct, &entry, change, actor);
	Ok(entry)
}

/// Reads one entry. With `populate`, relation fields are embedded in the
/// returned data, limited to the targets `scope` admits.
pub async fn get_entry(
	app: &App,
	ct: &ContentType,
	entry_id: u64,
	populate: bool,
	scope: TargetScope<'_>,
) -> XvResult<ContentEntry> {
	let mut entry = with_dates(ct, app.meta_adapter.read_entry(ct.id, entry_id).await?);
	if populate {
		entry.data = relation::hydrate(app.meta_adapter.as_ref(), ct, &entry, &scope).await?;
	}
	Ok(entry)
}

pub async fn list_entries(
	app: &App,
	ct: &ContentType,
	filter: &EntryFilter<'_>,
) -> XvResult<(Vec<ContentEntry>, u64)> {
	let (entries, total) = app
		.meta_adapter
		.list_entries(
			ct.id,
			&ListEntryOptions { status: filter.status, search: filter.search, page: filter.page },
		)
		.await?;
	Ok((entries.into_iter().map(|e| with_dates(ct, e)).collect(), total))
}

/// Soft-deletes an entry. Its relation edges are kept and simply stop
/// resolving.
pub async fn delete_entry(
	app: &App,
	ct: &ContentType,
	entry_id: u64,
	actor: Option<u64>,
) -> XvResult<()> {
	let entry = app.meta_adapter.read_entry(ct.id, entry_id).await?;
	app.meta_adapter.delete_entry(ct.id, entry_id).await?;

	info!(uid = %ct.uid, entry_id = entry_id, "entry deleted");
	emit(app, ct, &entry, ChangeType::Deleted, actor);
	Ok(())
}

// vim: ts=4
