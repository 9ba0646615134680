//! Relation edge storage tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

use xiver::content::{RelationEdge, RelationSlot, RelationType};
use xiver::error::Error;
use xiver::meta_adapter::{CreateRelation, MetaAdapter};
use xiver_meta_adapter_sqlite::MetaAdapterSqlite;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	(adapter, temp_dir)
}

fn edges(ids: &[u64]) -> Vec<RelationEdge> {
	ids.iter().map(|id| RelationEdge { target_entry_id: *id, order: None }).collect()
}

const TAGS: RelationSlot<'static> =
	RelationSlot { content_type_uid: "articles", entry_id: 1, field: "tags" };

#[tokio::test]
async fn test_replace_relations_orders_by_position() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &edges(&[30, 10, 20]))
		.await
		.expect("Should replace relations");

	let rels = adapter.list_relations("articles", 1, Some("tags")).await.expect("Should list");
	assert_eq!(rels.iter().map(|r| r.target_entry_id).collect::<Vec<_>>(), [30, 10, 20]);
	assert_eq!(rels.iter().map(|r| r.order).collect::<Vec<_>>(), [0, 1, 2]);
	assert!(rels.iter().all(|r| r.relation_type == RelationType::ManyToMany));
	assert!(rels.iter().all(|r| r.target_content_type_uid == "tags"));
}

#[tokio::test]
async fn test_replace_relations_overwrites_slot_only() {
	let (adapter, _temp) = create_test_adapter().await;
	let author = RelationSlot { content_type_uid: "articles", entry_id: 1, field: "author" };

	adapter
		.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &edges(&[1, 2]))
		.await
		.expect("Should set tags");
	adapter
		.replace_relations(&author, "authors", RelationType::ManyToOne, &edges(&[5]))
		.await
		.expect("Should set author");

	adapter
		.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &edges(&[3]))
		.await
		.expect("Should replace tags");

	let tags = adapter.list_relations("articles", 1, Some("tags")).await.expect("Should list");
	assert_eq!(tags.len(), 1);
	assert_eq!(tags[0].target_entry_id, 3);

	let all = adapter.list_relations("articles", 1, None).await.expect("Should list all");
	assert_eq!(all.len(), 2);

	adapter
		.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &[])
		.await
		.expect("Should clear tags");
	let tags = adapter.list_relations("articles", 1, Some("tags")).await.expect("Should list");
	assert!(tags.is_empty());
}

#[tokio::test]
async fn test_create_relation_appends() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &edges(&[1, 2]))
		.await
		.expect("Should set tags");

	let rel = adapter
		.create_relation(&CreateRelation {
			slot: TAGS,
			target_content_type_uid: "tags",
			target_entry_id: 9,
			relation_type: RelationType::ManyToMany,
			order: None,
		})
		.await
		.expect("Should create relation");
	assert_eq!(rel.order, 2);
	assert_eq!(rel.source_field_name, "tags");

	let first = adapter
		.create_relation(&CreateRelation {
			slot: TAGS,
			target_content_type_uid: "tags",
			target_entry_id: 8,
			relation_type: RelationType::ManyToMany,
			order: Some(-1),
		})
		.await
		.expect("Should create relation with explicit order");

	let rels = adapter.list_relations("articles", 1, Some("tags")).await.expect("Should list");
	assert_eq!(rels[0].id, first.id);
	assert_eq!(rels.last().map(|r| r.target_entry_id), Some(9));
}

#[tokio::test]
async fn test_delete_relation_scoped_to_source() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &edges(&[1]))
		.await
		.expect("Should set tags");
	let rel_id = adapter.list_relations("articles", 1, None).await.expect("Should list")[0].id;

	let res = adapter.delete_relation("articles", 2, rel_id).await;
	assert!(matches!(res, Err(Error::NotFound)));

	adapter.delete_relation("articles", 1, rel_id).await.expect("Should delete relation");
	assert!(adapter.list_relations("articles", 1, None).await.expect("Should list").is_empty());
}

#[tokio::test]
async fn test_replace_is_atomic_for_concurrent_readers() {
	let (adapter, _temp) = create_test_adapter().await;
	let adapter = Arc::new(adapter);
	adapter
		.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &edges(&[1, 2]))
		.await
		.expect("Should set tags");

	let done = Arc::new(AtomicBool::new(false));
	let reader = tokio::spawn({
		let adapter = adapter.clone();
		let done = done.clone();
		async move {
			let mut seen = Vec::new();
			loop {
				let rels = adapter.list_relations("articles", 1, Some("tags")).await.expect("list");
				let mut ids: Vec<u64> = rels.iter().map(|r| r.target_entry_id).collect();
				ids.sort_unstable();
				seen.push(ids);
				if done.load(Ordering::Acquire) {
					break seen;
				}
				tokio::task::yield_now().await;
			}
		}
	});

	for round in 0..40 {
		let ids: &[u64] = if round % 2 == 0 { &[3] } else { &[1, 2] };
		adapter
			.replace_relations(&TAGS, "tags", RelationType::ManyToMany, &edges(ids))
			.await
			.expect("Should replace tags");
		tokio::task::yield_now().await;
	}
	done.store(true, Ordering::Release);

	let seen = reader.await.expect("reader task");
	assert!(!seen.is_empty());
	for ids in seen {
		assert!(ids == [1, 2] || ids == [3], "reader saw a partial slot: {:?}", ids);
	}
}

// vim: ts=4
