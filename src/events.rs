//! Event messaging between the shell and its display surfaces.
//!
//! Handlers are identified by their `Arc` allocation, so the same handler
//! value used with `on` / `once` can later be passed to `remove_listener`.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tauri::{AppHandle, Emitter, EventId, EventTarget, Listener, Runtime, Wry};

use crate::error::{Result, ShellError};
use crate::window::focused_window;

pub type EventHandler = Arc<dyn Fn(Value) + Send + Sync>;

pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(Value) + Send + Sync + 'static,
{
    Arc::new(f)
}

fn handler_key(handler: &EventHandler) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}

/// Parse an event payload, keeping non-JSON payloads as strings.
fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Host listener ids per `(event, handler)`.
#[derive(Default)]
pub(crate) struct HandlerTable {
    registrations: Mutex<HashMap<(String, usize), Vec<EventId>>>,
}

impl HandlerTable {
    /// Record the id returned by `register`. The table stays locked while
    /// `register` runs, so a listener firing right away finds its entry.
    pub(crate) fn record_with(
        &self,
        event: &str,
        handler: &EventHandler,
        register: impl FnOnce() -> EventId,
    ) -> EventId {
        let mut registrations = self.registrations.lock();
        let id = register();
        registrations
            .entry((event.to_string(), handler_key(handler)))
            .or_default()
            .push(id);
        id
    }

    /// Drop one id, and the entry once it has none left.
    pub(crate) fn forget(&self, event: &str, key: usize, id: EventId) {
        let mut registrations = self.registrations.lock();
        let entry_key = (event.to_string(), key);
        if let Some(ids) = registrations.get_mut(&entry_key) {
            ids.retain(|&existing| existing != id);
            if ids.is_empty() {
                registrations.remove(&entry_key);
            }
        }
    }

    pub(crate) fn take(&self, event: &str, handler: &EventHandler) -> Vec<EventId> {
        self.registrations
            .lock()
            .remove(&(event.to_string(), handler_key(handler)))
            .unwrap_or_default()
    }

    pub(crate) fn take_event(&self, event: &str) -> Vec<EventId> {
        let mut registrations = self.registrations.lock();
        let keys: Vec<_> = registrations
            .keys()
            .filter(|(name, _)| name == event)
            .cloned()
            .collect();
        keys.into_iter()
            .filter_map(|k| registrations.remove(&k))
            .flatten()
            .collect()
    }

    pub(crate) fn count(&self, event: &str, handler: &EventHandler) -> usize {
        self.registrations
            .lock()
            .get(&(event.to_string(), handler_key(handler)))
            .map_or(0, Vec::len)
    }
}

pub struct EventBus<R: Runtime = Wry> {
    app: AppHandle<R>,
    handlers: Arc<HandlerTable>,
}

impl<R: Runtime> EventBus<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self {
            app,
            handlers: Arc::new(HandlerTable::default()),
        }
    }

    /// Send `event` to the focused window.
    pub fn emit<S: Serialize + Clone>(&self, event: &str, payload: S) -> Result<()> {
        let window = focused_window(&self.app).ok_or(ShellError::NoWindow)?;
        self.app
            .emit_to(EventTarget::webview_window(window.label()), event, payload)?;
        Ok(())
    }

    pub fn on(&self, event: &str, handler: &EventHandler) -> EventId {
        let callback = handler.clone();
        self.handlers.record_with(event, handler, || {
            self.app
                .listen(event, move |e| callback(parse_payload(e.payload())))
        })
    }

    /// Like [`on`](Self::on), for a single delivery. The registration is
    /// forgotten once it fires.
    pub fn once(&self, event: &str, handler: &EventHandler) -> EventId {
        let callback = handler.clone();
        let table = self.handlers.clone();
        let name = event.to_string();
        let key = handler_key(handler);
        self.handlers.record_with(event, handler, || {
            self.app.once(event, move |e| {
                table.forget(&name, key, e.id());
                callback(parse_payload(e.payload()));
            })
        })
    }

    /// Remove every registration of `handler` for `event`.
    pub fn remove_listener(&self, event: &str, handler: &EventHandler) {
        for id in self.handlers.take(event, handler) {
            self.app.unlisten(id);
        }
    }

    /// Remove every handler registered through this bus for `event`.
    pub fn remove_all_listeners(&self, event: &str) {
        let ids = self.handlers.take_event(event);
        tracing::debug!(event, count = ids.len(), "removing listeners");
        for id in ids {
            self.app.unlisten(id);
        }
    }
}
