//! Declarative application menus.
//!
//! Descriptions (usually template-resolved JSON) compile into a [`MenuNode`]
//! tree which `install` turns into the native Tauri menu.

pub mod actions;
pub mod compiler;
pub mod defaults;
pub mod description;
pub mod install;
pub mod node;

pub use actions::{ActionTable, MenuAction, action, default_actions};
pub use compiler::compile;
pub use defaults::DefaultsTable;
pub use description::{Entry, MenuDescription};
pub use install::{MenuActivation, MenuBindings};
pub use node::{Binding, MenuItem, MenuNode};

/// Host platform as far as menus care: Apple desktop or anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Darwin,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Other
        }
    }

    /// Parse a host platform tag (`"darwin"`, `"linux"`, `"win32"`, ...).
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("darwin") {
            Platform::Darwin
        } else {
            Platform::Other
        }
    }

    pub fn is_darwin(self) -> bool {
        self == Platform::Darwin
    }
}
