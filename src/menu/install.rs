//! Native menu installation and click dispatch.
//!
//! Click leaves get generated ids (`menu-<n>`) that map back to their bound
//! action. A new set of bindings replaces the previous one only once its menu
//! is installed.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tauri::menu::{IsMenuItem, Menu, MenuEvent, MenuItem as NativeItem, MenuItemBuilder, PredefinedMenuItem, Submenu};
use tauri::{AppHandle, Runtime, WebviewWindow};

use super::actions::MenuAction;
use super::node::{MenuItem, MenuNode};
use crate::window::focused_window;

type BindingMap = HashMap<String, (String, MenuAction)>;

/// What a bound action receives when its item is activated.
pub struct MenuActivation {
    pub id: String,
    pub label: String,
    pub app: AppHandle,
    /// Focused window at activation time, if any.
    pub window: Option<WebviewWindow>,
}

/// Live id -> action table for the installed menu.
#[derive(Default)]
pub struct MenuBindings {
    actions: RwLock<BindingMap>,
    next_id: AtomicU64,
}

impl MenuBindings {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> String {
        format!("menu-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Start collecting bindings for a menu about to be built. The live table
    /// is untouched until [`commit`](Self::commit).
    pub fn stage(&self) -> PendingBindings<'_> {
        PendingBindings {
            owner: self,
            actions: HashMap::new(),
        }
    }

    /// Replace the live bindings with `pending`.
    pub fn commit(&self, pending: PendingBindings<'_>) {
        *self.actions.write() = pending.actions;
    }

    pub(crate) fn lookup(&self, id: &str) -> Option<(String, MenuAction)> {
        self.actions.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }

    /// Run the action bound to the event's item. Returns `false` when the id
    /// is not one of ours.
    pub fn dispatch(&self, app: &AppHandle, event: &MenuEvent) -> bool {
        let id = event.id().0.as_str();
        // Clone out before calling so an action may reinstall the menu.
        let Some((label, action)) = self.lookup(id) else {
            return false;
        };
        tracing::debug!(id, label = %label, "menu item activated");
        let activation = MenuActivation {
            id: id.to_string(),
            label,
            app: app.clone(),
            window: focused_window(app),
        };
        action(&activation);
        true
    }
}

/// Bindings of a menu under construction. Ids come from the owning
/// [`MenuBindings`] so they never collide with the installed menu's.
pub struct PendingBindings<'a> {
    owner: &'a MenuBindings,
    actions: BindingMap,
}

impl PendingBindings<'_> {
    /// Register `action` under a fresh id and return the id.
    pub(crate) fn bind(&mut self, label: &str, action: MenuAction) -> String {
        let id = self.owner.allocate_id();
        self.actions.insert(id.clone(), (label.to_string(), action));
        id
    }

    fn allocate_id(&self) -> String {
        self.owner.allocate_id()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

enum Built<R: Runtime> {
    Item(NativeItem<R>),
    Submenu(Submenu<R>),
    Predefined(PredefinedMenuItem<R>),
}

impl<R: Runtime> Built<R> {
    fn as_menu_item(&self) -> &dyn IsMenuItem<R> {
        match self {
            Built::Item(item) => item,
            Built::Submenu(sub) => sub,
            Built::Predefined(item) => item,
        }
    }
}

/// Build a native menu from compiled nodes, binding click actions into
/// `bindings`.
pub fn build_menu<R: Runtime>(
    app: &AppHandle<R>,
    nodes: &[MenuNode],
    bindings: &mut PendingBindings<'_>,
) -> tauri::Result<Menu<R>> {
    let menu = Menu::new(app)?;
    for node in nodes {
        menu.append(build_node(app, node, bindings)?.as_menu_item())?;
    }
    Ok(menu)
}

/// Replace the application menu with `nodes`. On failure the previous menu
/// and its bindings stay in place.
pub fn install<R: Runtime>(app: &AppHandle<R>, nodes: &[MenuNode], bindings: &MenuBindings) -> tauri::Result<()> {
    let mut pending = bindings.stage();
    let menu = build_menu(app, nodes, &mut pending)?;
    app.set_menu(menu)?;
    let bound = pending.len();
    bindings.commit(pending);
    tracing::info!(top_level = nodes.len(), bound, "application menu installed");
    Ok(())
}

fn build_node<R: Runtime>(
    app: &AppHandle<R>,
    node: &MenuNode,
    bindings: &mut PendingBindings<'_>,
) -> tauri::Result<Built<R>> {
    let item = match node {
        MenuNode::Separator => return Ok(Built::Predefined(PredefinedMenuItem::separator(app)?)),
        MenuNode::Item(item) => item,
    };

    if let Some(children) = &item.submenu {
        return build_submenu(app, item, children, bindings).map(Built::Submenu);
    }

    if let Some(role) = &item.role {
        if let Some(predefined) = predefined_item(app, role, &item.label)? {
            return Ok(Built::Predefined(predefined));
        }
        tracing::debug!(role = %role, label = %item.label, "unknown role, building plain item");
    }

    let id = match &item.click {
        Some(action) => bindings.bind(&item.label, action.clone()),
        None => bindings.allocate_id(),
    };
    plain_item(app, id, item).map(Built::Item)
}

fn build_submenu<R: Runtime>(
    app: &AppHandle<R>,
    item: &MenuItem,
    children: &[MenuNode],
    bindings: &mut PendingBindings<'_>,
) -> tauri::Result<Submenu<R>> {
    let submenu = Submenu::new(app, &item.label, true)?;
    for child in children {
        submenu.append(build_node(app, child, bindings)?.as_menu_item())?;
    }

    #[cfg(target_os = "macos")]
    {
        match item.role.as_deref() {
            Some("window") => submenu.set_as_windows_menu_for_nsapp()?,
            Some("help") => submenu.set_as_help_menu_for_nsapp()?,
            _ => {}
        }
    }

    Ok(submenu)
}

fn plain_item<R: Runtime>(app: &AppHandle<R>, id: String, item: &MenuItem) -> tauri::Result<NativeItem<R>> {
    let Some(accelerator) = &item.accelerator else {
        return MenuItemBuilder::with_id(id, &item.label).build(app);
    };
    match MenuItemBuilder::with_id(id.clone(), &item.label)
        .accelerator(accelerator)
        .build(app)
    {
        Ok(native) => Ok(native),
        Err(e) => {
            tracing::warn!(label = %item.label, accelerator = %accelerator, "accelerator rejected: {e}");
            MenuItemBuilder::with_id(id, &item.label).build(app)
        }
    }
}

/// Role names are matched case-insensitively (`selectAll` == `selectall`).
fn predefined_item<R: Runtime>(
    app: &AppHandle<R>,
    role: &str,
    label: &str,
) -> tauri::Result<Option<PredefinedMenuItem<R>>> {
    let text = (!label.is_empty()).then_some(label);
    let item = match role.to_ascii_lowercase().as_str() {
        "undo" => PredefinedMenuItem::undo(app, text)?,
        "redo" => PredefinedMenuItem::redo(app, text)?,
        "cut" => PredefinedMenuItem::cut(app, text)?,
        "copy" => PredefinedMenuItem::copy(app, text)?,
        "paste" => PredefinedMenuItem::paste(app, text)?,
        "selectall" => PredefinedMenuItem::select_all(app, text)?,
        "minimize" => PredefinedMenuItem::minimize(app, text)?,
        "zoom" => PredefinedMenuItem::maximize(app, text)?,
        "close" => PredefinedMenuItem::close_window(app, text)?,
        "quit" => PredefinedMenuItem::quit(app, text)?,
        "about" => PredefinedMenuItem::about(app, text, None)?,
        "hide" => PredefinedMenuItem::hide(app, text)?,
        "hideothers" => PredefinedMenuItem::hide_others(app, text)?,
        "unhide" => PredefinedMenuItem::show_all(app, text)?,
        "services" => PredefinedMenuItem::services(app, text)?,
        "togglefullscreen" => PredefinedMenuItem::fullscreen(app, text)?,
        _ => return Ok(None),
    };
    Ok(Some(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::actions::{action, same_action};

    #[test]
    fn staged_bind_allocates_distinct_ids() {
        let bindings = MenuBindings::new();
        let mut pending = bindings.stage();
        let a = pending.bind("A", action(|_| {}));
        let b = pending.bind("B", action(|_| {}));
        assert_ne!(a, b);
        assert!(a.starts_with("menu-"));
        assert_eq!(pending.len(), 2);
        // Nothing is live before commit.
        assert!(bindings.is_empty());
    }

    #[test]
    fn commit_publishes_label_and_action() {
        let bindings = MenuBindings::new();
        let save = action(|_| {});
        let mut pending = bindings.stage();
        let id = pending.bind("Save", save.clone());
        bindings.commit(pending);

        let (label, found) = bindings.lookup(&id).unwrap();
        assert_eq!(label, "Save");
        assert!(same_action(&found, &save));
        assert!(bindings.lookup("menu-999").is_none());
    }

    #[test]
    fn abandoned_stage_keeps_installed_bindings() {
        let bindings = MenuBindings::new();
        let quit = action(|_| {});
        let mut first = bindings.stage();
        let quit_id = first.bind("Quit", quit.clone());
        bindings.commit(first);

        // A build that fails drops its pending bindings without committing.
        let mut second = bindings.stage();
        let half_built = second.bind("Other", action(|_| {}));
        drop(second);

        let (label, found) = bindings.lookup(&quit_id).unwrap();
        assert_eq!(label, "Quit");
        assert!(same_action(&found, &quit));
        assert!(bindings.lookup(&half_built).is_none());
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn commit_replaces_and_ids_keep_counting() {
        let bindings = MenuBindings::new();
        let mut first = bindings.stage();
        let old = first.bind("A", action(|_| {}));
        bindings.commit(first);

        let mut second = bindings.stage();
        let new = second.bind("A", action(|_| {}));
        bindings.commit(second);

        assert_ne!(old, new);
        assert!(bindings.lookup(&old).is_none());
        assert!(bindings.lookup(&new).is_some());
    }
}
