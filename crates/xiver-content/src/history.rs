//! Audit log and content history recorder
//!
//! Consumes [`ContentEvent`]s from the app's event channel and writes one
//! audit log record and one history snapshot per event. Recording failures
//! are logged and never reach the request that caused the event.

use std::sync::Arc;

use crate::prelude::*;
use xiver_types::event::{ChangeType, ContentEvent};
use xiver_types::meta_adapter::{CreateAuditLog, CreateContentHistory, MetaAdapter};

pub const AUDIT_SUBJECT: &str = "content-entry";

fn describe(change: ChangeType) -> (&'static str, &'static str, &'static str) {
	match change {
		ChangeType::Created => ("create", "Created content entry", "Entry created"),
		ChangeType::Updated => ("update", "Updated content entry", "Entry updated"),
		ChangeType::Published => ("update", "Published content entry", "Entry published"),
		ChangeType::Deleted => ("delete", "Deleted content entry", "Entry deleted"),
	}
}

/// Persists a single event
pub async fn record(meta: &dyn MetaAdapter, event: &ContentEvent) -> XvResult<()> {
	let (action, description, note) = describe(event.change);
	let subject_id = event.entry_id.to_string();
	let metadata = serde_json::json!({
		"contentType": event.content_type_uid,
		"status": event.status.as_str(),
	});

	meta.create_audit_log(&CreateAuditLog {
		action,
		subject: AUDIT_SUBJECT,
		subject_id: Some(&subject_id),
		description: Some(description),
		user_id: event.actor,
		metadata: Some(&metadata),
	})
	.await?;

	meta.create_content_history(&CreateContentHistory {
		entry_id: event.entry_id,
		data: &event.data,
		change_type: event.change,
		change_note: Some(note),
		changed_by: event.actor,
	})
	.await?;

	Ok(())
}

/// Runs until every sender of the channel is dropped
pub async fn run_recorder(meta: Arc<dyn MetaAdapter>, events: flume::Receiver<ContentEvent>) {
	info!("content event recorder started");
	while let Ok(event) = events.recv_async().await {
		if let Err(err) = record(meta.as_ref(), &event).await {
			tracing::warn!(
				entry_id = event.entry_id,
				change = event.change.as_str(),
				error = %err,
				"failed to record content event"
			);
		}
	}
	debug!("content event channel closed, recorder stopped");
}

// vim: ts=4
