//! HTTP-level tests driving the full router

use axum::{
	Router,
	body::Body,
	http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use xiver::bootstrap;
use xiver::config::Config;
use xiver::routes;
use xiver_core::{App, AppState};
use xiver_meta_adapter_sqlite::MetaAdapterSqlite;
use xiver_types::identity::TokenType;
use xiver_types::meta_adapter::{CreateApiToken, CreatePermission, CreateRole, CreateUser, RoleType};

struct TestServer {
	app: App,
	router: Router,
	admin_token: String,
	_tmp: TempDir,
}

async fn setup() -> TestServer {
	let tmp = TempDir::new().expect("Failed to create temp directory");
	let meta = Arc::new(MetaAdapterSqlite::new(tmp.path()).await.expect("Failed to create adapter"));
	let (app, _events) = AppState::new(meta);
	let config = Config::from_lookup(|_| None);
	let admin_token = bootstrap::run(&app, &config)
		.await
		.expect("bootstrap")
		.expect("admin token on first start");
	let router = routes::init(app.clone(), &config.allowed_origins);
	TestServer { app, router, admin_token, _tmp: tmp }
}

async fn call(
	router: &Router,
	method: Method,
	uri: &str,
	token: Option<&str>,
	body: Option<Value>,
) -> (StatusCode, Value) {
	let mut req = Request::builder().method(method).uri(uri);
	if let Some(token) = token {
		req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
	}
	let req = match body {
		Some(body) => req
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string())),
		None => req.body(Body::empty()),
	}
	.unwrap();

	let res = router.clone().oneshot(req).await.unwrap();
	let status = res.status();
	let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
	let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
	(status, json)
}

#[tokio::test]
async fn test_health() {
	let srv = setup().await;
	let (status, body) = call(&srv.router, Method::GET, "/health", None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
	let srv = setup().await;
	let config = Config::from_lookup(|_| None);
	let token = bootstrap::run(&srv.app, &config).await.unwrap();
	assert!(token.is_none());

	let (status, body) = call(&srv.router, Method::GET, "/api/roles/public", None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_content_lifecycle() {
	let srv = setup().await;
	let admin = Some(srv.admin_token.as_str());
	let definition = json!({
		"uid": "articles",
		"displayName": "Articles",
		"schema": { "title": { "type": "string", "required": true } }
	});

	let (status, _) =
		call(&srv.router, Method::POST, "/api/content-types", None, Some(definition.clone())).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, body) =
		call(&srv.router, Method::POST, "/api/content-types", admin, Some(definition.clone())).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["data"]["uid"], "articles");

	let (status, _) =
		call(&srv.router, Method::POST, "/api/content-types", admin, Some(definition)).await;
	assert_eq!(status, StatusCode::CONFLICT);

	let (status, body) = call(&srv.router, Method::GET, "/api/content-types", None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["meta"]["pagination"]["total"], 1);

	let entries = "/api/admin/content-types/articles/entries";
	let (status, body) = call(
		&srv.router,
		Method::POST,
		entries,
		admin,
		Some(json!({ "data": { "title": "Hello" } })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["data"]["status"], "draft");
	let id = body["data"]["id"].as_u64().unwrap();

	let (_, body) = call(&srv.router, Method::GET, "/api/articles", None, None).await;
	assert_eq!(body["meta"]["pagination"]["total"], 0);
	let (status, _) =
		call(&srv.router, Method::GET, &format!("/api/articles/{}", id), None, None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, body) = call(
		&srv.router,
		Method::PUT,
		&format!("{}/{}", entries, id),
		admin,
		Some(json!({ "status": "published" })),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["status"], "published");
	assert!(body["data"]["publishedAt"].is_number());

	let (_, body) = call(&srv.router, Method::GET, "/api/articles", None, None).await;
	assert_eq!(body["meta"]["pagination"]["total"], 1);
	let (status, body) =
		call(&srv.router, Method::GET, &format!("/api/articles/{}", id), None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["data"]["title"], "Hello");

	let (status, _) =
		call(&srv.router, Method::DELETE, &format!("{}/{}", entries, id), admin, None).await;
	assert_eq!(status, StatusCode::NO_CONTENT);
	let (_, body) = call(&srv.router, Method::GET, "/api/articles", None, None).await;
	assert_eq!(body["meta"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_authentication_errors() {
	let srv = setup().await;

	let (status, _) =
		call(&srv.router, Method::GET, "/api/content-types", Some("xvc_forged"), None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, _) = call(&srv.router, Method::GET, "/api/audit-logs", None, None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, body) = call(&srv.router, Method::GET, "/api/upload", None, None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"]["code"], "E-CORE-NOTFOUND");
}

#[tokio::test]
async fn test_read_only_token() {
	let srv = setup().await;
	let admin = Some(srv.admin_token.as_str());

	let (status, body) =
		call(&srv.router, Method::POST, "/api/api-tokens", admin, Some(json!({ "name": "ro" })))
			.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["data"]["type"], "read-only");
	let ro_token = body["data"]["accessKey"].as_str().unwrap().to_string();

	let (status, _) = call(&srv.router, Method::GET, "/api/roles", Some(&ro_token), None).await;
	assert_eq!(status, StatusCode::OK);

	let (status, _) = call(
		&srv.router,
		Method::POST,
		"/api/roles",
		Some(&ro_token),
		Some(json!({ "name": "Editor" })),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, body) = call(&srv.router, Method::GET, "/api/api-tokens", admin, None).await;
	assert_eq!(status, StatusCode::OK);
	let tokens = body["data"].as_array().unwrap();
	assert_eq!(tokens.len(), 2);
	assert!(tokens.iter().all(|token| token.get("accessKey").is_none()));
}

#[tokio::test]
async fn test_rbac_gates_management_routes() {
	let srv = setup().await;
	let meta = srv.app.meta_adapter.as_ref();

	let perm = meta
		.create_permission(&CreatePermission {
			action: "read".into(),
			subject: "content-type".into(),
			properties: None,
			conditions: None,
		})
		.await
		.unwrap();
	let role = meta
		.create_role(&CreateRole {
			name: "Reviewer".into(),
			description: None,
			role_type: RoleType::Custom,
			permission_ids: vec![perm.id],
		})
		.await
		.unwrap();
	let user = meta
		.create_user(&CreateUser {
			username: "reviewer",
			email: "reviewer@example.com",
			is_active: true,
			is_super_admin: false,
		})
		.await
		.unwrap();
	meta.set_user_roles(user.id, &[role.id]).await.unwrap();
	let token = meta
		.create_api_token(&CreateApiToken {
			name: "reviewer",
			description: None,
			token_type: TokenType::FullAccess,
			expires_at: None,
			user_id: user.id,
		})
		.await
		.unwrap()
		.plaintext;

	let (status, _) =
		call(&srv.router, Method::GET, "/api/admin/content-types", Some(&token), None).await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = call(
		&srv.router,
		Method::POST,
		"/api/content-types",
		Some(&token),
		Some(json!({ "uid": "pages", "displayName": "Pages", "schema": {} })),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["error"]["message"], "insufficient access");

	let (status, _) = call(&srv.router, Method::GET, "/api/users", Some(&token), None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

// vim: ts=4
