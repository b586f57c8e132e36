//! Windows opened by the shell.

use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tauri::{AppHandle, Manager, Runtime, WebviewWindow};

use crate::error::Result;
use crate::shell::Shell;
use crate::view::AssembledView;

/// Window currently holding input focus, if any.
pub(crate) fn focused_window<R: Runtime>(app: &AppHandle<R>) -> Option<WebviewWindow<R>> {
    app.webview_windows()
        .into_values()
        .find(|w| w.is_focused().unwrap_or(false))
}

/// A webview window that renders shell views.
pub struct ShellWindow {
    shell: Arc<Shell>,
    window: WebviewWindow,
    current_view: RwLock<Option<PathBuf>>,
}

impl ShellWindow {
    pub(crate) fn new(shell: Arc<Shell>, window: WebviewWindow, view: Option<PathBuf>) -> Self {
        Self {
            shell,
            window,
            current_view: RwLock::new(view),
        }
    }

    /// Render `view` and navigate this window to it.
    pub fn load_view(&self, view: &str) -> Result<AssembledView> {
        let assembled = self.shell.render_view(view)?;
        self.window.navigate(assembled.url.clone())?;
        *self.current_view.write() = Some(assembled.path.clone());
        Ok(assembled)
    }

    /// Directory of the view last loaded into this window.
    pub fn current_view(&self) -> Option<PathBuf> {
        self.current_view.read().clone()
    }

    pub fn is_fullscreen(&self) -> Result<bool> {
        Ok(self.window.is_fullscreen()?)
    }

    pub fn set_fullscreen(&self, fullscreen: bool) -> Result<()> {
        Ok(self.window.set_fullscreen(fullscreen)?)
    }

    pub fn window(&self) -> &WebviewWindow {
        &self.window
    }
}
