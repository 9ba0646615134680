//! App state type

use std::sync::Arc;

use crate::prelude::*;
use xiver_types::event::ContentEvent;
use xiver_types::meta_adapter::MetaAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub meta_adapter: Arc<dyn MetaAdapter>,
	/// Content change events, consumed by the audit/history recorder
	pub events: flume::Sender<ContentEvent>,
}

pub type App = Arc<AppState>;

impl AppState {
	/// Creates the shared state and the receiving end of the event channel
	pub fn new(meta_adapter: Arc<dyn MetaAdapter>) -> (App, flume::Receiver<ContentEvent>) {
		let (tx, rx) = flume::unbounded();
		(Arc::new(AppState { meta_adapter, events: tx }), rx)
	}

	pub fn emit(&self, event: ContentEvent) {
		let entry_id = event.entry_id;
		if self.events.send(event).is_err() {
			warn!(entry_id = entry_id, "content event dropped: recorder is not running");
		}
	}
}

// vim: ts=4
