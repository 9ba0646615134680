//! Xiver headless CMS server
//!
//! Wires the SQLite meta adapter, the content event recorder and the HTTP
//! routers together. The binary in `main.rs` only sets up logging and calls
//! [`run`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod config;
pub mod routes;

mod prelude;

use std::sync::Arc;

use crate::config::Config;
use crate::prelude::*;
use xiver_content::history;
use xiver_core::AppState;
use xiver_core::app::VERSION;
use xiver_meta_adapter_sqlite::MetaAdapterSqlite;

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		warn!("cannot listen for shutdown signal: {}", err);
		std::future::pending::<()>().await;
	}
	info!("shutdown requested");
}

/// Opens the store, seeds it and serves the API until Ctrl-C
pub async fn run(config: Config) -> XvResult<()> {
	let meta = Arc::new(MetaAdapterSqlite::new(&config.db_dir).await?);
	let (app, events) = AppState::new(meta.clone());
	tokio::spawn(history::run_recorder(meta, events));

	bootstrap::run(&app, &config).await?;

	let router = routes::init(app, &config.allowed_origins);
	let listener = tokio::net::TcpListener::bind(&config.listen).await?;
	info!(listen = %config.listen, version = VERSION, "xiver listening");

	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
	Ok(())
}

// vim: ts=4
