//! Public read API tests: visibility, access tiers and published-only reads

use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use xiver_content::public;
use xiver_content::schema::{self, DefineContentType};
use xiver_content::service::{self, EntryInput};
use xiver_core::{App, AppState};
use xiver_meta_adapter_sqlite::MetaAdapterSqlite;
use xiver_types::content::{ContentEntry, ContentType};
use xiver_types::error::Error;
use xiver_types::identity::{Identity, RoleGrant};
use xiver_types::types::Page;
use xiver_types::value::FieldValue;

async fn create_test_app() -> (App, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	let (app, _events) = AppState::new(Arc::new(adapter));
	(app, temp_dir)
}

fn identity(roles: &[&str]) -> Identity {
	Identity {
		user_id: 7,
		username: "reader".into(),
		is_super_admin: false,
		roles: roles
			.iter()
			.map(|name| RoleGrant { name: (*name).to_string(), permissions: Vec::new() })
			.collect(),
	}
}

async fn define(app: &App, uid: &str, access_type: &str, is_visible: bool) -> ContentType {
	let def: DefineContentType = serde_json::from_value(json!({
		"uid": uid,
		"displayName": uid,
		"accessType": access_type,
		"isVisible": is_visible,
		"schema": {
			"title": { "type": "string" },
			"related": { "type": "relation", "relationType": "oneToMany", "targetContentType": uid }
		}
	}))
	.expect("valid definition");
	schema::define(app, def).await.expect("define content type")
}

async fn create(app: &App, ct: &ContentType, value: serde_json::Value) -> ContentEntry {
	let input: EntryInput = serde_json::from_value(value).expect("valid entry input");
	service::create_entry(app, ct, input, None).await.expect("create entry")
}

#[tokio::test]
async fn test_type_listing_respects_visibility_and_tier() {
	let (app, _tmp) = create_test_app().await;
	define(&app, "articles", "public", true).await;
	define(&app, "drafts", "public", false).await;
	define(&app, "members", "authenticated", true).await;
	define(&app, "staff", "moderator", true).await;

	let page = Page::default();
	let (types, total) = public::list_content_types(&app, None, page).await.unwrap();
	assert_eq!(total, 1);
	assert_eq!(types[0].uid, "articles");

	let member = identity(&[]);
	let (types, total) = public::list_content_types(&app, Some(&member), page).await.unwrap();
	assert_eq!(total, 2);
	let uids: Vec<_> = types.iter().map(|ct| ct.uid.as_str()).collect();
	assert_eq!(uids, vec!["articles", "members"]);

	let moderator = identity(&["Moderator"]);
	let (_, total) = public::list_content_types(&app, Some(&moderator), page).await.unwrap();
	assert_eq!(total, 3);

	let admin = identity(&["Admin"]);
	let (_, total) = public::list_content_types(&app, Some(&admin), page).await.unwrap();
	assert_eq!(total, 4);
}

#[tokio::test]
async fn test_type_listing_pages_after_filtering() {
	let (app, _tmp) = create_test_app().await;
	for uid in ["a1", "a2", "a3"] {
		define(&app, uid, "public", true).await;
	}
	define(&app, "a0", "admin", true).await;

	let page = Page::new(Some(2), Some(2), 10);
	let (types, total) = public::list_content_types(&app, None, page).await.unwrap();
	assert_eq!(total, 3);
	assert_eq!(types.len(), 1);
	assert_eq!(types[0].uid, "a3");
}

#[tokio::test]
async fn test_get_content_type_hides_and_denies() {
	let (app, _tmp) = create_test_app().await;
	define(&app, "drafts", "public", false).await;
	define(&app, "staff", "admin", true).await;

	let res = public::get_content_type(&app, None, "drafts").await;
	assert!(matches!(res, Err(Error::NotFound)));
	let res = public::get_content_type(&app, None, "staff").await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	let admin = identity(&["Admin"]);
	let ct = public::get_content_type(&app, Some(&admin), "drafts").await.unwrap();
	assert!(!ct.is_visible);
}

#[tokio::test]
async fn test_entries_are_published_only() {
	let (app, _tmp) = create_test_app().await;
	let articles = define(&app, "articles", "public", true).await;

	let draft = create(&app, &articles, json!({ "data": { "title": "Draft" } })).await;
	let live =
		create(&app, &articles, json!({ "data": { "title": "Live" }, "status": "published" }))
			.await;

	let (entries, total) =
		public::list_entries(&app, None, "articles", None, Page::default()).await.unwrap();
	assert_eq!(total, 1);
	assert_eq!(entries[0].id, live.id);

	let res = public::get_entry(&app, None, "articles", draft.id, false).await;
	assert!(matches!(res, Err(Error::NotFound)));
	let entry = public::get_entry(&app, None, "articles", live.id, false).await.unwrap();
	assert_eq!(entry.data.get("title"), Some(&FieldValue::from("Live")));
}

#[tokio::test]
async fn test_populate_skips_unpublished_targets() {
	let (app, _tmp) = create_test_app().await;
	let articles = define(&app, "articles", "public", true).await;

	let draft = create(&app, &articles, json!({ "data": { "title": "Draft" } })).await;
	let live =
		create(&app, &articles, json!({ "data": { "title": "Live" }, "status": "published" }))
			.await;
	let hub = create(
		&app,
		&articles,
		json!({ "data": { "title": "Hub", "related": [draft.id, live.id] }, "status": "published" }),
	)
	.await;

	let entry = public::get_entry(&app, None, "articles", hub.id, true).await.unwrap();
	let Some(FieldValue::List(related)) = entry.data.get("related") else {
		panic!("related should be a list");
	};
	assert_eq!(related.len(), 1);
	assert_eq!(related[0].get("id").and_then(FieldValue::as_u64), Some(live.id));
}

#[tokio::test]
async fn test_populate_checks_target_type_access() {
	let (app, _tmp) = create_test_app().await;
	let secrets = define(&app, "secrets", "admin", false).await;
	let staff = define(&app, "staff", "admin", true).await;
	let def: DefineContentType = serde_json::from_value(json!({
		"uid": "posts",
		"displayName": "Posts",
		"schema": {
			"title": { "type": "string" },
			"secret": { "type": "relation", "relationType": "manyToOne", "targetContentType": "secrets" },
			"reviewer": { "type": "relation", "relationType": "manyToOne", "targetContentType": "staff" }
		}
	}))
	.unwrap();
	let posts = schema::define(&app, def).await.unwrap();

	let secret = create(
		&app,
		&secrets,
		json!({ "data": { "title": "TOP-SECRET" }, "status": "published" }),
	)
	.await;
	let reviewer =
		create(&app, &staff, json!({ "data": { "title": "Grace" }, "status": "published" })).await;
	let post = create(
		&app,
		&posts,
		json!({
			"data": { "title": "Hello", "secret": secret.id, "reviewer": reviewer.id },
			"status": "published"
		}),
	)
	.await;

	let res = public::get_entry(&app, None, "secrets", secret.id, false).await;
	assert!(matches!(res, Err(Error::NotFound)));

	let entry = public::get_entry(&app, None, "posts", post.id, true).await.unwrap();
	assert!(!entry.data.contains_key("secret"));
	assert!(!entry.data.contains_key("reviewer"));
	assert_eq!(entry.data.get("title"), Some(&FieldValue::from("Hello")));

	let admin = identity(&["Admin"]);
	let entry = public::get_entry(&app, Some(&admin), "posts", post.id, true).await.unwrap();
	assert!(!entry.data.contains_key("secret"));
	let embedded = entry.data.get("reviewer").expect("reviewer embedded for admins");
	assert_eq!(embedded.get("id").and_then(FieldValue::as_u64), Some(reviewer.id));
}

#[tokio::test]
async fn test_entry_paths_check_type() {
	let (app, _tmp) = create_test_app().await;
	define(&app, "hidden", "public", false).await;
	define(&app, "members", "authenticated", true).await;

	let res = public::list_entries(&app, None, "users", None, Page::default()).await;
	assert!(matches!(res, Err(Error::NotFound)));
	let res = public::list_entries(&app, None, "hidden", None, Page::default()).await;
	assert!(matches!(res, Err(Error::NotFound)));
	let res = public::list_entries(&app, None, "missing", None, Page::default()).await;
	assert!(matches!(res, Err(Error::NotFound)));
	let res = public::list_entries(&app, None, "members", None, Page::default()).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	let member = identity(&[]);
	let (_, total) =
		public::list_entries(&app, Some(&member), "members", None, Page::default()).await.unwrap();
	assert_eq!(total, 0);
}

// vim: ts=4
