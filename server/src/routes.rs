//! HTTP routes
//!
//! The public router attaches an identity when a token is presented. The
//! protected router requires one, and management routes additionally pass
//! an RBAC check per `(action, subject)`.

use axum::{
	Json, Router,
	http::{HeaderValue, Method, header},
	middleware,
	routing::{delete, get, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::prelude::*;
use xiver_admin::{audit, permission, role, token, user};
use xiver_content::{handler, public};
use xiver_core::app::VERSION;
use xiver_core::middleware::{optional_auth, require_auth};
use xiver_core::perm::require_permission;

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

fn guarded(
	app: &App,
	action: &'static str,
	subject: &'static str,
	router: Router<App>,
) -> Router<App> {
	router.route_layer(middleware::from_fn_with_state(
		app.clone(),
		require_permission(action, subject),
	))
}

fn init_public(app: &App) -> Router<App> {
	Router::new()
		.route("/api/content-types", get(public::get_content_types))
		.route("/api/content-types/{uid}", get(public::get_content_type_by_uid))
		.route("/api/roles/public", get(role::list_public_roles))
		.route("/api/{uid}", get(public::get_entries))
		.route("/api/{uid}/{id}", get(public::get_entry_by_id))
		.route_layer(middleware::from_fn_with_state(app.clone(), optional_auth))
}

fn init_content_types(app: &App) -> Router<App> {
	Router::new()
		.merge(guarded(
			app,
			"read",
			"content-type",
			Router::new()
				.route("/api/admin/content-types", get(handler::list_content_types))
				.route("/api/admin/content-types/{uid}", get(handler::get_content_type)),
		))
		.merge(guarded(
			app,
			"create",
			"content-type",
			Router::new().route("/api/content-types", post(handler::post_content_type)),
		))
		.merge(guarded(
			app,
			"update",
			"content-type",
			Router::new().route("/api/content-types/{uid}", put(handler::put_content_type)),
		))
		.merge(guarded(
			app,
			"delete",
			"content-type",
			Router::new().route("/api/content-types/{uid}", delete(handler::delete_content_type)),
		))
}

/// Entry and relation routes; the content type's access tier is checked by
/// the handlers
fn init_entries() -> Router<App> {
	let base = "/api/admin/content-types/{uid}/entries";
	Router::new()
		.route(base, get(handler::list_entries).post(handler::post_entry))
		.route(
			&format!("{base}/{{id}}"),
			get(handler::get_entry).put(handler::put_entry).delete(handler::delete_entry),
		)
		.route(&format!("{base}/{{id}}/history"), get(handler::get_entry_history))
		.route(
			&format!("{base}/{{id}}/relations"),
			get(handler::list_relations).post(handler::post_relation),
		)
		.route(
			&format!("{base}/{{id}}/relations/{{rel}}"),
			get(handler::list_related_entries).delete(handler::delete_relation),
		)
}

fn init_admin(app: &App) -> Router<App> {
	Router::new()
		// Roles
		.merge(guarded(
			app,
			"read",
			"role",
			Router::new()
				.route("/api/roles", get(role::list_roles))
				.route("/api/roles/{id}", get(role::get_role)),
		))
		.merge(guarded(
			app,
			"create",
			"role",
			Router::new().route("/api/roles", post(role::post_role)),
		))
		.merge(guarded(
			app,
			"update",
			"role",
			Router::new().route("/api/roles/{id}", put(role::put_role)),
		))
		.merge(guarded(
			app,
			"delete",
			"role",
			Router::new().route("/api/roles/{id}", delete(role::delete_role)),
		))
		// Permissions
		.merge(guarded(
			app,
			"read",
			"permission",
			Router::new()
				.route("/api/permissions", get(permission::list_permissions))
				.route("/api/permissions/{id}", get(permission::get_permission)),
		))
		.merge(guarded(
			app,
			"create",
			"permission",
			Router::new().route("/api/permissions", post(permission::post_permission)),
		))
		.merge(guarded(
			app,
			"update",
			"permission",
			Router::new().route("/api/permissions/{id}", put(permission::put_permission)),
		))
		.merge(guarded(
			app,
			"delete",
			"permission",
			Router::new().route("/api/permissions/{id}", delete(permission::delete_permission)),
		))
		// Users
		.merge(guarded(
			app,
			"read",
			"user",
			Router::new()
				.route("/api/users", get(user::list_users))
				.route("/api/users/{id}", get(user::get_user)),
		))
		.merge(guarded(
			app,
			"update",
			"user",
			Router::new().route("/api/users/{id}/roles", put(user::put_user_roles)),
		))
		// API tokens
		.merge(guarded(
			app,
			"read",
			"api-token",
			Router::new()
				.route("/api/api-tokens", get(token::list_tokens))
				.route("/api/api-tokens/{id}", get(token::get_token)),
		))
		.merge(guarded(
			app,
			"create",
			"api-token",
			Router::new().route("/api/api-tokens", post(token::post_token)),
		))
		.merge(guarded(
			app,
			"delete",
			"api-token",
			Router::new().route("/api/api-tokens/{id}", delete(token::delete_token)),
		))
		// Audit log
		.merge(guarded(
			app,
			"read",
			"audit-log",
			Router::new().route("/api/audit-logs", get(audit::list_audit_logs)),
		))
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
	let origins: Vec<HeaderValue> = allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse() {
			Ok(value) => Some(value),
			Err(_) => {
				warn!(origin = %origin, "ignoring invalid CORS origin");
				None
			}
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
		.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn init(app: App, allowed_origins: &[String]) -> Router {
	let protected = Router::new()
		.merge(init_content_types(&app))
		.merge(init_entries())
		.merge(init_admin(&app))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	Router::new()
		.route("/health", get(health))
		.merge(init_public(&app))
		.merge(protected)
		.layer(cors(allowed_origins))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
