//! Entry service tests: relation slots, hydration, publishing and events

use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use xiver_content::schema::{self, DefineContentType};
use xiver_content::service::{self, EntryFilter, EntryInput};
use xiver_content::history;
use xiver_content::relation::{self, TargetScope};
use xiver_core::{App, AppState};
use xiver_meta_adapter_sqlite::MetaAdapterSqlite;
use xiver_types::content::{
	ContentEntry, ContentType, EntryStatus, RelationEdge, RelationSlot, RelationType,
};
use xiver_types::error::Error;
use xiver_types::event::{ChangeType, ContentEvent};
use xiver_types::meta_adapter::ListAuditLogOptions;
use xiver_types::value::FieldValue;

async fn create_test_app() -> (App, flume::Receiver<ContentEvent>, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	let (app, events) = AppState::new(Arc::new(adapter));
	(app, events, temp_dir)
}

async fn define(app: &App, def: serde_json::Value) -> ContentType {
	let def: DefineContentType = serde_json::from_value(def).expect("valid definition");
	schema::define(app, def).await.expect("define content type")
}

/// users, tags and articles (author: manyToOne users, tags: manyToMany tags)
async fn define_blog(app: &App) -> (ContentType, ContentType, ContentType) {
	let users = define(
		app,
		json!({
			"uid": "people",
			"displayName": "People",
			"schema": { "name": { "type": "string", "required": true } }
		}),
	)
	.await;
	let tags = define(
		app,
		json!({
			"uid": "tags",
			"displayName": "Tags",
			"schema": { "label": { "type": "string" } }
		}),
	)
	.await;
	let articles = define(
		app,
		json!({
			"uid": "articles",
			"displayName": "Articles",
			"schema": {
				"title": { "type": "string", "required": true },
				"releasedOn": { "type": "date" },
				"author": { "type": "relation", "relationType": "manyToOne", "targetContentType": "people" },
				"tags": { "type": "relation", "relationType": "manyToMany", "targetContentType": "tags" }
			}
		}),
	)
	.await;
	(users, tags, articles)
}

fn input(value: serde_json::Value) -> EntryInput {
	serde_json::from_value(value).expect("valid entry input")
}

async fn create(app: &App, ct: &ContentType, value: serde_json::Value) -> ContentEntry {
	service::create_entry(app, ct, input(value), Some(1)).await.expect("create entry")
}

async fn read(app: &App, ct: &ContentType, entry_id: u64, populate: bool) -> ContentEntry {
	service::get_entry(app, ct, entry_id, populate, TargetScope::default())
		.await
		.expect("read entry")
}

fn object_id(value: &FieldValue) -> Option<u64> {
	value.get("id").and_then(FieldValue::as_u64)
}

#[tokio::test]
async fn test_relation_fields_stay_out_of_entry_data() {
	let (app, _events, _tmp) = create_test_app().await;
	let (users, _, articles) = define_blog(&app).await;

	let ada = create(&app, &users, json!({ "data": { "name": "Ada" } })).await;
	let article =
		create(&app, &articles, json!({ "data": { "title": "Hello", "author": ada.id } })).await;

	assert_eq!(article.status, EntryStatus::Draft);
	assert!(article.data.contains_key("title"));
	assert!(!article.data.contains_key("author"));

	let edges = relation::list_by_source(app.meta_adapter.as_ref(), "articles", article.id, None)
		.await
		.unwrap();
	assert_eq!(edges.len(), 1);
	assert_eq!(edges[0].source_field_name, "author");
	assert_eq!(edges[0].target_content_type_uid, "people");
	assert_eq!(edges[0].target_entry_id, ada.id);
}

#[tokio::test]
async fn test_populate_embeds_targets() {
	let (app, _events, _tmp) = create_test_app().await;
	let (users, tags, articles) = define_blog(&app).await;

	let ada = create(&app, &users, json!({ "data": { "name": "Ada" } })).await;
	let rust = create(&app, &tags, json!({ "data": { "label": "rust" } })).await;
	let cms = create(&app, &tags, json!({ "data": { "label": "cms" } })).await;
	let article = create(
		&app,
		&articles,
		json!({ "data": { "title": "Hello", "author": { "id": ada.id }, "tags": [cms.id, rust.id] } }),
	)
	.await;

	let plain = read(&app, &articles, article.id, false).await;
	assert!(!plain.data.contains_key("author"));

	let full = read(&app, &articles, article.id, true).await;
	let author = full.data.get("author").expect("author embedded");
	assert_eq!(object_id(author), Some(ada.id));

	let Some(FieldValue::List(embedded)) = full.data.get("tags") else {
		panic!("tags should be a list");
	};
	let ids: Vec<_> = embedded.iter().filter_map(object_id).collect();
	assert_eq!(ids, vec![cms.id, rust.id]);
}

#[tokio::test]
async fn test_populate_omits_missing_targets() {
	let (app, _events, _tmp) = create_test_app().await;
	let (users, _, articles) = define_blog(&app).await;

	let ada = create(&app, &users, json!({ "data": { "name": "Ada" } })).await;
	let article =
		create(&app, &articles, json!({ "data": { "title": "Hello", "author": ada.id } })).await;
	let orphan =
		create(&app, &articles, json!({ "data": { "title": "Orphan", "author": 999 } })).await;

	let full = read(&app, &articles, orphan.id, true).await;
	assert!(!full.data.contains_key("author"));

	service::delete_entry(&app, &users, ada.id, Some(1)).await.unwrap();
	let full = read(&app, &articles, article.id, true).await;
	assert!(!full.data.contains_key("author"));
	assert_eq!(full.data.get("title"), Some(&FieldValue::from("Hello")));
}

#[tokio::test]
async fn test_populate_ignores_plain_values_under_relation_fields() {
	let (app, _events, _tmp) = create_test_app().await;
	let (_, tags, _) = define_blog(&app).await;
	let posts = define(
		&app,
		json!({
			"uid": "posts",
			"displayName": "Posts",
			"schema": { "title": { "type": "string" } }
		}),
	)
	.await;
	let post =
		create(&app, &posts, json!({ "data": { "title": "Old", "tags": ["legacy"] } })).await;
	let rust = create(&app, &tags, json!({ "data": { "label": "rust" } })).await;

	let patch: schema::ContentTypePatch = serde_json::from_value(json!({
		"schema": {
			"title": { "type": "string" },
			"tags": { "type": "relation", "relationType": "manyToMany", "targetContentType": "tags" }
		}
	}))
	.unwrap();
	let posts = schema::update(&app, "posts", patch).await.unwrap();

	let full = read(&app, &posts, post.id, true).await;
	assert!(!full.data.contains_key("tags"));

	let slot = RelationSlot { content_type_uid: "posts", entry_id: post.id, field: "tags" };
	let edges = [RelationEdge { target_entry_id: rust.id, order: None }];
	relation::replace(app.meta_adapter.as_ref(), &slot, "tags", RelationType::ManyToMany, &edges)
		.await
		.unwrap();

	let full = read(&app, &posts, post.id, true).await;
	let Some(FieldValue::List(embedded)) = full.data.get("tags") else {
		panic!("tags should be a list");
	};
	assert_eq!(embedded.iter().filter_map(object_id).collect::<Vec<_>>(), [rust.id]);
	assert_eq!(full.data.get("title"), Some(&FieldValue::from("Old")));
}

#[tokio::test]
async fn test_update_replaces_only_given_slots() {
	let (app, _events, _tmp) = create_test_app().await;
	let (users, tags, articles) = define_blog(&app).await;

	let ada = create(&app, &users, json!({ "data": { "name": "Ada" } })).await;
	let t1 = create(&app, &tags, json!({ "data": { "label": "one" } })).await;
	let t2 = create(&app, &tags, json!({ "data": { "label": "two" } })).await;
	let t3 = create(&app, &tags, json!({ "data": { "label": "three" } })).await;
	let article = create(
		&app,
		&articles,
		json!({ "data": { "title": "Hello", "author": ada.id, "tags": [t1.id, t2.id] } }),
	)
	.await;

	let patch = input(json!({ "data": { "tags": [t3.id] } }));
	service::update_entry(&app, &articles, article.id, patch, None).await.unwrap();

	let meta = app.meta_adapter.as_ref();
	let tag_edges =
		relation::list_by_source(meta, "articles", article.id, Some("tags")).await.unwrap();
	assert_eq!(tag_edges.len(), 1);
	assert_eq!(tag_edges[0].target_entry_id, t3.id);
	assert_eq!(tag_edges[0].order, 0);

	let author_edges =
		relation::list_by_source(meta, "articles", article.id, Some("author")).await.unwrap();
	assert_eq!(author_edges.len(), 1);

	let patch = input(json!({ "data": { "author": null } }));
	service::update_entry(&app, &articles, article.id, patch, None).await.unwrap();
	let author_edges =
		relation::list_by_source(meta, "articles", article.id, Some("author")).await.unwrap();
	assert!(author_edges.is_empty());
}

#[tokio::test]
async fn test_invalid_relation_value_writes_nothing() {
	let (app, _events, _tmp) = create_test_app().await;
	let (_, _, articles) = define_blog(&app).await;

	let res = service::create_entry(
		&app,
		&articles,
		input(json!({ "data": { "title": "Bad", "author": [1, 2] } })),
		None,
	)
	.await;
	let Err(Error::ValidationError(msg)) = res else {
		panic!("expected validation error, got {:?}", res);
	};
	assert!(msg.starts_with("author:"));

	let res = service::create_entry(
		&app,
		&articles,
		input(json!({ "data": { "title": "Bad", "tags": [0] } })),
		None,
	)
	.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let (_, total) =
		service::list_entries(&app, &articles, &EntryFilter::default()).await.unwrap();
	assert_eq!(total, 0);
}

#[tokio::test]
async fn test_publish_keeps_first_published_at() {
	let (app, _events, _tmp) = create_test_app().await;
	let (_, _, articles) = define_blog(&app).await;

	let draft = create(&app, &articles, json!({ "data": { "title": "Draft" } })).await;
	assert!(draft.published_at.is_none());

	let published = service::update_entry(
		&app,
		&articles,
		draft.id,
		input(json!({ "status": "published" })),
		None,
	)
	.await
	.unwrap();
	let first = published.published_at.expect("publishedAt set");
	assert_eq!(published.data.get("title"), Some(&FieldValue::from("Draft")));

	let again = service::update_entry(
		&app,
		&articles,
		draft.id,
		input(json!({ "data": { "title": "Final" }, "status": "published" })),
		None,
	)
	.await
	.unwrap();
	assert_eq!(again.published_at, Some(first));
	assert_eq!(again.data.get("title"), Some(&FieldValue::from("Final")));
}

#[tokio::test]
async fn test_date_fields_are_coerced() {
	let (app, _events, _tmp) = create_test_app().await;
	let (_, _, articles) = define_blog(&app).await;

	let entry = create(
		&app,
		&articles,
		json!({ "data": { "title": "2024-01-01T00:00:00Z", "releasedOn": "2024-05-01T10:00:00Z" } }),
	)
	.await;
	let stored = read(&app, &articles, entry.id, false).await;

	assert!(matches!(stored.data.get("releasedOn"), Some(FieldValue::Date(_))));
	assert!(matches!(stored.data.get("title"), Some(FieldValue::String(_))));
}

#[tokio::test]
async fn test_date_round_trips_offset_and_fraction() {
	let (app, _events, _tmp) = create_test_app().await;
	let (_, _, articles) = define_blog(&app).await;

	let submitted = "2024-05-01T10:00:00.123456+02:00";
	let entry =
		create(&app, &articles, json!({ "data": { "title": "Dated", "releasedOn": submitted } }))
			.await;
	assert_eq!(serde_json::to_value(&entry.data).unwrap()["releasedOn"], submitted);

	let stored = read(&app, &articles, entry.id, false).await;
	assert_eq!(
		serde_json::to_value(&stored.data).unwrap(),
		json!({ "title": "Dated", "releasedOn": submitted })
	);
}

#[tokio::test]
async fn test_single_type_allows_one_entry() {
	let (app, _events, _tmp) = create_test_app().await;
	let homepage = define(
		&app,
		json!({
			"uid": "homepage",
			"kind": "single",
			"displayName": "Homepage",
			"schema": { "headline": { "type": "string" } }
		}),
	)
	.await;

	let first = create(&app, &homepage, json!({ "data": { "headline": "Hi" } })).await;
	let res = service::create_entry(
		&app,
		&homepage,
		input(json!({ "data": { "headline": "Again" } })),
		None,
	)
	.await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	service::delete_entry(&app, &homepage, first.id, None).await.unwrap();
	create(&app, &homepage, json!({ "data": { "headline": "Fresh" } })).await;
}

#[tokio::test]
async fn test_list_entries_filters_by_status() {
	let (app, _events, _tmp) = create_test_app().await;
	let (_, _, articles) = define_blog(&app).await;

	create(&app, &articles, json!({ "data": { "title": "Draft" } })).await;
	create(&app, &articles, json!({ "data": { "title": "Live" }, "status": "published" })).await;

	let filter = EntryFilter { status: Some(EntryStatus::Published), ..EntryFilter::default() };
	let (entries, total) = service::list_entries(&app, &articles, &filter).await.unwrap();
	assert_eq!(total, 1);
	assert_eq!(entries[0].data.get("title"), Some(&FieldValue::from("Live")));

	let (_, total) =
		service::list_entries(&app, &articles, &EntryFilter::default()).await.unwrap();
	assert_eq!(total, 2);
}

#[tokio::test]
async fn test_events_are_recorded() {
	let (app, events, _tmp) = create_test_app().await;
	let (_, _, articles) = define_blog(&app).await;

	let entry = create(&app, &articles, json!({ "data": { "title": "Hello" } })).await;
	service::update_entry(&app, &articles, entry.id, input(json!({ "status": "published" })), Some(2))
		.await
		.unwrap();
	service::delete_entry(&app, &articles, entry.id, Some(2)).await.unwrap();

	let drained: Vec<ContentEvent> = events.drain().collect();
	let changes: Vec<_> = drained.iter().map(|e| e.change).collect();
	assert_eq!(changes, vec![ChangeType::Created, ChangeType::Published, ChangeType::Deleted]);
	assert_eq!(drained[0].actor, Some(1));
	assert_eq!(drained[1].status, EntryStatus::Published);

	for event in &drained {
		history::record(app.meta_adapter.as_ref(), event).await.unwrap();
	}

	let snapshots = app.meta_adapter.list_entry_history(entry.id).await.unwrap();
	assert_eq!(snapshots.len(), 3);
	assert_eq!(snapshots[0].change_type, ChangeType::Deleted);
	assert_eq!(snapshots[0].changed_by, Some(2));

	let (logs, total) = app
		.meta_adapter
		.list_audit_logs(&ListAuditLogOptions {
			subject: Some(history::AUDIT_SUBJECT),
			..ListAuditLogOptions::default()
		})
		.await
		.unwrap();
	assert_eq!(total, 3);
	assert!(logs.iter().any(|log| log.action == "create"));
	assert!(logs.iter().all(|log| log.subject_id.as_deref() == Some(entry.id.to_string().as_str())));
}

// vim: ts=4
