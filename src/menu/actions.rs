//! Action tables and the three-tier action resolver.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;

use super::install::MenuActivation;

/// Callable bound to a menu leaf. Invoked by the host on activation, never by
/// the compiler.
pub type MenuAction = Arc<dyn Fn(&MenuActivation) + Send + Sync>;

/// Wrap a closure as a [`MenuAction`].
pub fn action<F>(f: F) -> MenuAction
where
    F: Fn(&MenuActivation) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identity comparison on the allocation, ignoring vtables.
pub fn same_action(a: &MenuAction, b: &MenuAction) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Symbolic name -> callable.
///
/// An entry may be registered without a callable (`insert_unset`); lookups
/// treat it exactly like a missing entry so resolution falls through to the
/// next tier.
#[derive(Clone, Default)]
pub struct ActionTable {
    entries: HashMap<String, Option<MenuAction>>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&MenuActivation) + Send + Sync + 'static,
    {
        self.insert(name, action(f));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, action: MenuAction) {
        self.entries.insert(name.into(), Some(action));
    }

    pub fn insert_unset(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), None);
    }

    pub fn get(&self, name: &str) -> Option<&MenuAction> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn toggle_full_screen(activation: &MenuActivation) {
    let Some(window) = &activation.window else {
        tracing::debug!("onToggleFullScreen without a focused window");
        return;
    };
    let result = window
        .is_fullscreen()
        .and_then(|current| window.set_fullscreen(!current));
    if let Err(e) = result {
        tracing::warn!(window = window.label(), "failed to toggle fullscreen: {e}");
    }
}

fn quit(activation: &MenuActivation) {
    activation.app.exit(0);
}

lazy_static! {
    static ref DEFAULT_ACTIONS: ActionTable = ActionTable::new()
        .with("onToggleFullScreen", toggle_full_screen)
        .with("onQuit", quit);
    static ref NOOP: MenuAction = action(|_| {});
}

/// Built-in actions consulted after the caller's table.
pub fn default_actions() -> &'static ActionTable {
    &DEFAULT_ACTIONS
}

/// Shared do-nothing action for string leaves whose name resolves nowhere.
pub fn noop() -> MenuAction {
    NOOP.clone()
}

/// Named lookup: caller table first, then the built-in defaults.
pub fn resolve_named(actions: &ActionTable, name: &str) -> Option<MenuAction> {
    actions
        .get(name)
        .or_else(|| default_actions().get(name))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_quit_and_fullscreen() {
        assert!(default_actions().contains("onQuit"));
        assert!(default_actions().contains("onToggleFullScreen"));
        assert_eq!(default_actions().len(), 2);
    }

    #[test]
    fn caller_table_wins_over_defaults() {
        let mine = action(|_| {});
        let mut table = ActionTable::new();
        table.insert("onQuit", mine.clone());

        let resolved = resolve_named(&table, "onQuit").unwrap();
        assert!(same_action(&resolved, &mine));
    }

    #[test]
    fn falls_back_to_defaults() {
        let resolved = resolve_named(&ActionTable::new(), "onQuit").unwrap();
        assert!(same_action(&resolved, default_actions().get("onQuit").unwrap()));
    }

    #[test]
    fn unset_entry_falls_through() {
        let mut table = ActionTable::new();
        table.insert_unset("onQuit");
        assert!(!table.contains("onQuit"));
        assert_eq!(table.len(), 1);

        let resolved = resolve_named(&table, "onQuit").unwrap();
        assert!(same_action(&resolved, default_actions().get("onQuit").unwrap()));
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert!(resolve_named(&ActionTable::new(), "nope").is_none());
    }

    #[test]
    fn noop_is_shared() {
        assert!(same_action(&noop(), &noop()));
    }

    #[test]
    fn distinct_actions_differ() {
        assert!(!same_action(&action(|_| {}), &action(|_| {})));
    }
}
