//! Menu tree compiler.
//!
//! Walks a [`MenuDescription`] level by level, writing into a mutable parent
//! container. Splice directives (`__default`, `__macOnly`, `__exceptMac`)
//! recurse into the *current* parent; everything else either appends,
//! replaces in place (string leaves) or replaces by move-to-end (containers).
//! Entries no case accepts are dropped without error.

use super::Platform;
use super::actions::{ActionTable, noop, resolve_named};
use super::defaults::DefaultsTable;
use super::description::{Directive, Entry, MenuDescription, SkipReason, classify};
use super::node::{Binding, MenuItem, MenuNode};

/// Compile `description` into the ordered list of top-level nodes.
///
/// The tree is built under an unlabeled root that is discarded on return.
pub fn compile(
    description: &MenuDescription,
    defaults: &DefaultsTable,
    actions: &ActionTable,
    platform: Platform,
) -> Vec<MenuNode> {
    let compiler = Compiler {
        defaults,
        actions,
        platform,
    };
    let mut root = MenuItem::container("");
    let mut expanding = Vec::new();
    compiler.walk(&mut root, description, &mut expanding);
    root.into_children()
}

struct Compiler<'a> {
    defaults: &'a DefaultsTable,
    actions: &'a ActionTable,
    platform: Platform,
}

impl<'a> Compiler<'a> {
    /// `expanding` holds the `__default` names currently being spliced so a
    /// fragment referencing itself is not re-entered.
    fn walk(&self, parent: &mut MenuItem, level: &'a MenuDescription, expanding: &mut Vec<&'a str>) {
        for (key, value) in level.iter() {
            match classify(key, value) {
                Directive::ListLeaf { label, parts } => {
                    parent.push(MenuNode::Item(self.list_leaf(label, parts)));
                }
                Directive::Separator => parent.push(MenuNode::Separator),
                Directive::DefaultRef(name) => {
                    let Some(fragment) = self.defaults.fragment(name) else {
                        tracing::debug!(default = name, "no default fragment to splice");
                        continue;
                    };
                    if expanding.contains(&name) {
                        tracing::warn!(default = name, "recursive default reference skipped");
                        continue;
                    }
                    expanding.push(name);
                    self.walk(parent, fragment, expanding);
                    expanding.pop();
                }
                Directive::RoleAssign(role) => parent.role = Some(role.to_string()),
                Directive::ActionLeaf { label, action } => {
                    let click = resolve_named(self.actions, action).unwrap_or_else(noop);
                    parent.upsert_leaf(MenuItem::leaf(label, None, Binding::Click(click)));
                }
                Directive::MacOnly(body) => {
                    if self.platform.is_darwin() {
                        self.walk(parent, body, expanding);
                    }
                }
                Directive::ExceptMac(body) => {
                    if !self.platform.is_darwin() {
                        self.walk(parent, body, expanding);
                    }
                }
                Directive::Container { label, body } => {
                    let mut container = MenuItem::container(label);
                    self.walk(&mut container, body, expanding);
                    parent.upsert_container(container);
                }
                Directive::Skip(SkipReason::NoChildren) => {
                    tracing::trace!(key, "entry marked __noChildren skipped");
                }
                Directive::Skip(SkipReason::Unrecognized) => {
                    tracing::trace!(key, "unrecognized entry dropped");
                }
            }
        }
    }

    /// `[shortcut?, click-or-role?, actionName?]`
    fn list_leaf(&self, label: &str, parts: &[Entry]) -> MenuItem {
        let accelerator = parts
            .first()
            .and_then(|shortcut| resolve_shortcut(shortcut, self.platform));

        let binding = match parts.get(1) {
            Some(inline) if inline.is_truthy() => match inline {
                Entry::Callable(f) => Binding::Click(f.clone()),
                Entry::Text(role) => Binding::Role(role.clone()),
                _ => Binding::None,
            },
            _ => parts
                .get(2)
                .and_then(Entry::as_action_key)
                .and_then(|name| resolve_named(self.actions, &name))
                .map_or(Binding::None, Binding::Click),
        };

        MenuItem::leaf(label, accelerator, binding)
    }
}

/// Pick the accelerator for `platform`. Variant objects use `mac` on Darwin
/// when set, else `default`, else nothing.
pub fn resolve_shortcut(shortcut: &Entry, platform: Platform) -> Option<String> {
    if !shortcut.is_truthy() {
        return None;
    }
    let picked = match shortcut {
        Entry::Object(variants) => variants
            .get("mac")
            .filter(|mac| mac.is_truthy() && platform.is_darwin())
            .or_else(|| variants.get("default").filter(|d| d.is_truthy()))?,
        other => other,
    };
    picked.as_scalar_str().map(|s| s.into_owned())
}
