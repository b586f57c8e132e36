pub mod config;
pub mod error;
pub mod events;
pub mod interface;
pub mod logging;
pub mod menu;
pub mod protocol;
pub mod shell;
pub mod template;
pub mod view;
pub mod window;

use std::path::Path;
use std::sync::Arc;

pub use config::AppConfig;
pub use error::{Result, ShellError};
pub use events::{EventBus, EventHandler};
pub use interface::{Interface, InterfaceKind};
pub use menu::{ActionTable, MenuAction, MenuActivation, MenuNode, Platform};
pub use shell::Shell;
pub use window::ShellWindow;

/// Tauri builder wired to a shell loaded from `app_dir`.
///
/// Installs logging, the `view` protocol, menu dispatch and the shell
/// commands. Menus and windows are created from `setup` through the managed
/// `Arc<Shell>`.
pub fn builder(app_dir: impl AsRef<Path>) -> Result<(Arc<Shell>, tauri::Builder<tauri::Wry>)> {
    logging::init();
    let shell = Arc::new(Shell::new(app_dir)?);
    let builder = shell.clone().attach(tauri::Builder::default());
    Ok((shell, builder))
}
