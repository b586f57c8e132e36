//! Compiled menu tree.
//!
//! A node is a separator or an item. Items with a `submenu` are containers;
//! the rest are leaves carrying at most one of `role` / `click`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use super::actions::{MenuAction, same_action};

/// How a leaf reacts to activation.
#[derive(Clone)]
pub enum Binding {
    Click(MenuAction),
    Role(String),
    None,
}

#[derive(Clone, PartialEq)]
pub enum MenuNode {
    Separator,
    Item(MenuItem),
}

#[derive(Clone, Default)]
pub struct MenuItem {
    pub label: String,
    pub accelerator: Option<String>,
    pub role: Option<String>,
    pub click: Option<MenuAction>,
    pub submenu: Option<Vec<MenuNode>>,
}

impl MenuItem {
    /// Leaf item. The binding decides whether it gets a `click` or a `role`.
    pub fn leaf(label: impl Into<String>, accelerator: Option<String>, binding: Binding) -> Self {
        let mut item = Self {
            label: label.into(),
            accelerator,
            ..Self::default()
        };
        match binding {
            Binding::Click(action) => item.click = Some(action),
            Binding::Role(role) => item.role = Some(role),
            Binding::None => {}
        }
        item
    }

    /// Empty container item.
    pub fn container(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            submenu: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn is_container(&self) -> bool {
        self.submenu.is_some()
    }

    pub fn children(&self) -> &[MenuNode] {
        self.submenu.as_deref().unwrap_or_default()
    }

    fn children_mut(&mut self) -> &mut Vec<MenuNode> {
        self.submenu.get_or_insert_with(Vec::new)
    }

    /// Append a node at the end of this container.
    pub fn push(&mut self, node: MenuNode) {
        self.children_mut().push(node);
    }

    /// Insert a leaf, overwriting every sibling slot that carries the same
    /// label in place. Appends when no sibling matches.
    pub fn upsert_leaf(&mut self, leaf: MenuItem) {
        let children = self.children_mut();
        let mut found = false;
        for slot in children.iter_mut() {
            if slot.label() == Some(leaf.label.as_str()) {
                *slot = MenuNode::Item(leaf.clone());
                found = true;
            }
        }
        if !found {
            children.push(MenuNode::Item(leaf));
        }
    }

    /// Insert a container at the end, removing the first sibling that carries
    /// the same label. Overridden containers therefore move to the end.
    pub fn upsert_container(&mut self, container: MenuItem) {
        let children = self.children_mut();
        if let Some(pos) = children
            .iter()
            .position(|n| n.label() == Some(container.label.as_str()))
        {
            children.remove(pos);
        }
        children.push(MenuNode::Item(container));
    }

    /// Consume the container, returning its children.
    pub fn into_children(self) -> Vec<MenuNode> {
        self.submenu.unwrap_or_default()
    }
}

impl MenuNode {
    pub fn label(&self) -> Option<&str> {
        match self {
            MenuNode::Separator => None,
            MenuNode::Item(item) => Some(&item.label),
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, MenuNode::Separator)
    }

    pub fn as_item(&self) -> Option<&MenuItem> {
        match self {
            MenuNode::Separator => None,
            MenuNode::Item(item) => Some(item),
        }
    }
}

impl PartialEq for MenuItem {
    fn eq(&self, other: &Self) -> bool {
        let click_eq = match (&self.click, &other.click) {
            (Some(a), Some(b)) => same_action(a, b),
            (None, None) => true,
            _ => false,
        };
        click_eq
            && self.label == other.label
            && self.accelerator == other.accelerator
            && self.role == other.role
            && self.submenu == other.submenu
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MenuItem");
        s.field("label", &self.label);
        if let Some(accel) = &self.accelerator {
            s.field("accelerator", accel);
        }
        if let Some(role) = &self.role {
            s.field("role", role);
        }
        if self.click.is_some() {
            s.field("click", &"<action>");
        }
        if let Some(children) = &self.submenu {
            s.field("submenu", children);
        }
        s.finish()
    }
}

impl fmt::Debug for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuNode::Separator => f.write_str("Separator"),
            MenuNode::Item(item) => item.fmt(f),
        }
    }
}

/// Serializes to the host template shape: `{label, accelerator?, role?,
/// click?, submenu?}` for items and `{type: "separator"}` for separators.
/// `click` is emitted as `true` since callables have no JSON form.
impl Serialize for MenuNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MenuNode::Separator => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", "separator")?;
                map.end()
            }
            MenuNode::Item(item) => item.serialize(serializer),
        }
    }
}

impl Serialize for MenuItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("label", &self.label)?;
        if let Some(accel) = &self.accelerator {
            map.serialize_entry("accelerator", accel)?;
        }
        if let Some(role) = &self.role {
            map.serialize_entry("role", role)?;
        }
        if self.click.is_some() {
            map.serialize_entry("click", &true)?;
        }
        if let Some(children) = &self.submenu {
            map.serialize_entry("submenu", children)?;
        }
        map.end()
    }
}
