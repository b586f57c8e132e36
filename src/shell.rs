//! The application shell: configuration, menu loading, views and windows.

use parking_lot::RwLock;
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tauri::{AppHandle, State, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use crate::config::AppConfig;
use crate::error::{Result, ShellError};
use crate::interface::{Interface, InterfaceKind, alert_script};
use crate::menu::defaults::{DEFAULT_MENU_ASSET, builtin_asset};
use crate::menu::{self, ActionTable, DefaultsTable, MenuBindings, MenuDescription, MenuNode, Platform};
use crate::protocol::{self, ResourceInterceptor};
use crate::template::TemplateResolver;
use crate::view::{AssembledView, DEFAULT_VIEW_DIR, assemble_view};
use crate::window::ShellWindow;

pub struct Shell {
    app_dir: PathBuf,
    view_dir: String,
    platform: Platform,
    config: AppConfig,
    defaults: DefaultsTable,
    templates: TemplateResolver,
    interceptor: Arc<ResourceInterceptor>,
    bindings: Arc<MenuBindings>,
    current_window: Arc<RwLock<Option<WebviewWindow>>>,
    /// Functions acting on the current window (`alert` built in).
    pub web: Interface,
    /// Functions display surfaces may call through `call_main_function`.
    pub main: Interface,
}

impl Shell {
    /// Load `{app_dir}/app.json` and the built-in menu defaults.
    pub fn new(app_dir: impl AsRef<Path>) -> Result<Self> {
        let app_dir = app_dir.as_ref();
        if app_dir.as_os_str().is_empty() {
            return Err(ShellError::MissingAppDir);
        }
        let app_dir = std::fs::canonicalize(app_dir)
            .or_else(|_| std::path::absolute(app_dir))
            .map_err(|e| ShellError::io(app_dir, e))?;

        let config = AppConfig::load(&app_dir)?;
        let templates = TemplateResolver::new();
        let defaults = DefaultsTable::builtin(config.values(), &templates)?;

        let current_window: Arc<RwLock<Option<WebviewWindow>>> = Arc::new(RwLock::new(None));
        let web = Interface::new(InterfaceKind::Web);
        let target = current_window.clone();
        web.add_function(
            "alert",
            move |args| {
                if let Some(window) = target.read().as_ref() {
                    let script = alert_script(args.first().unwrap_or(&Value::Null));
                    if let Err(e) = window.eval(&script) {
                        tracing::warn!(window = window.label(), "alert failed: {e}");
                    }
                }
                Value::Null
            },
            false,
        )?;

        tracing::info!(app_dir = %app_dir.display(), title = %config.title_bar_name(), "shell created");
        Ok(Self {
            interceptor: Arc::new(ResourceInterceptor::new(app_dir.clone())),
            app_dir,
            view_dir: DEFAULT_VIEW_DIR.to_string(),
            platform: Platform::current(),
            config,
            defaults,
            templates,
            bindings: Arc::new(MenuBindings::new()),
            current_window,
            web,
            main: Interface::new(InterfaceKind::Main),
        })
    }

    pub fn with_view_dir(mut self, view_dir: impl Into<String>) -> Self {
        self.view_dir = view_dir.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace the built-in defaults with `source`, resolved against the app
    /// configuration.
    pub fn with_defaults_source(mut self, source: &str, origin: &Path) -> Result<Self> {
        self.defaults = DefaultsTable::load(source, self.config.values(), &self.templates, origin)?;
        Ok(self)
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn defaults(&self) -> &DefaultsTable {
        &self.defaults
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn bindings(&self) -> &MenuBindings {
        &self.bindings
    }

    pub fn interceptor(&self) -> &ResourceInterceptor {
        &self.interceptor
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.app_dir.join(path)
        }
    }

    /// Template-resolve, parse and compile a menu document. `None` selects the
    /// built-in default menu; relative paths are taken from the app directory.
    pub fn compile_menu_file(&self, menu_json: Option<&Path>, actions: &ActionTable) -> Result<Vec<MenuNode>> {
        let (source, origin) = match menu_json {
            None => (Cow::Borrowed(builtin_asset(DEFAULT_MENU_ASSET)?), PathBuf::from(DEFAULT_MENU_ASSET)),
            Some(path) => {
                let path = self.resolve_path(path);
                let source = std::fs::read_to_string(&path).map_err(|e| ShellError::io(&path, e))?;
                (Cow::Owned(source), path)
            }
        };
        self.compile_menu_source(&source, &origin, actions)
    }

    /// Like [`compile_menu_file`](Self::compile_menu_file) for an in-memory
    /// document. A document that is not an object compiles to an empty menu.
    pub fn compile_menu_source(&self, source: &str, origin: &Path, actions: &ActionTable) -> Result<Vec<MenuNode>> {
        let value = self.templates.render_json(source, self.config.values(), origin)?;
        let description = MenuDescription::from_value(value).unwrap_or_default();
        Ok(menu::compile(&description, &self.defaults, actions, self.platform))
    }

    /// Compile a menu document and install it as the application menu.
    pub fn load_menu(&self, app: &AppHandle, menu_json: Option<&Path>, actions: &ActionTable) -> Result<()> {
        let nodes = self.compile_menu_file(menu_json, actions)?;
        menu::install::install(app, &nodes, &self.bindings)?;
        Ok(())
    }

    /// Render `view` and register it with the resource loader.
    pub fn render_view(&self, view: &str) -> Result<AssembledView> {
        let views_root = self.app_dir.join(&self.view_dir);
        let assembled = assemble_view(&views_root, view, &self.config, &self.templates)?;
        self.interceptor
            .intercept(assembled.document.clone(), assembled.html.clone());
        Ok(assembled)
    }

    /// Open a window showing `view`. It becomes the current window.
    pub fn open_window(self: &Arc<Self>, app: &AppHandle, label: &str, view: &str) -> Result<ShellWindow> {
        let assembled = self.render_view(view)?;
        let window = WebviewWindowBuilder::new(app, label, WebviewUrl::CustomProtocol(assembled.url.clone()))
            .title(self.config.title_bar_name())
            .build()?;
        *self.current_window.write() = Some(window.clone());
        Ok(ShellWindow::new(self.clone(), window, Some(assembled.path)))
    }

    pub fn current_window(&self) -> Option<WebviewWindow> {
        self.current_window.read().clone()
    }

    /// Register the view protocol, menu dispatch and shell commands on
    /// `builder`, and put the shell into managed state.
    pub fn attach(self: Arc<Self>, builder: tauri::Builder<tauri::Wry>) -> tauri::Builder<tauri::Wry> {
        let builder = protocol::register_view_protocol(builder, self.interceptor.clone());
        let bindings = self.bindings.clone();
        builder
            .manage(self)
            .on_menu_event(move |app, event| {
                if !bindings.dispatch(app, &event) {
                    tracing::debug!(id = %event.id().0, "menu event without binding");
                }
            })
            .invoke_handler(tauri::generate_handler![call_main_function])
    }
}

/// Call a function registered on the shell's `main` interface.
#[tauri::command]
fn call_main_function(shell: State<'_, Arc<Shell>>, name: String, args: Vec<Value>) -> Result<Value, String> {
    shell.main.call(&name, &args).map_err(|e| e.to_string())
}
