//! View documents: `{app_dir}/{view_dir}/{view}/` holding an optional
//! `view.json` and an HTML main document, both template-resolved.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use url::Url;

use crate::config::AppConfig;
use crate::error::{Result, ShellError};
use crate::protocol::view_url;
use crate::template::TemplateResolver;

pub const DEFAULT_VIEW_DIR: &str = "views";
pub const VIEW_CONFIG_FILE: &str = "view.json";
pub const DEFAULT_VIEW_MAIN: &str = "index.html";

/// A rendered view ready to be served and navigated to.
#[derive(Debug, Clone)]
pub struct AssembledView {
    /// View directory.
    pub path: PathBuf,
    /// Main document on disk.
    pub document: PathBuf,
    pub url: Url,
    pub html: String,
}

/// Render view `view` found under `views_root`.
///
/// `view.json` is optional; when it cannot be read the view gets
/// `{"pageTitle": titleBarName}`. The main document is rendered against the
/// app configuration overlaid with the view configuration.
pub fn assemble_view(
    views_root: &Path,
    view: &str,
    config: &AppConfig,
    templates: &TemplateResolver,
) -> Result<AssembledView> {
    let path = views_root.join(view);
    let view_cfg = load_view_config(&path, config, templates)?;

    let main = view_cfg
        .get("viewMainHtml")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_VIEW_MAIN);
    let document = path.join(main);

    let source = std::fs::read_to_string(&document).map_err(|e| ShellError::io(&document, e))?;
    let html = templates.render(&source, &config.merged_with(&view_cfg))?;
    let url = view_url(&document)?;

    tracing::info!(view, document = %document.display(), "view assembled");
    Ok(AssembledView {
        path,
        document,
        url,
        html,
    })
}

fn load_view_config(path: &Path, config: &AppConfig, templates: &TemplateResolver) -> Result<Map<String, Value>> {
    let cfg_path = path.join(VIEW_CONFIG_FILE);
    let source = match std::fs::read_to_string(&cfg_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(path = %cfg_path.display(), "no view config ({e}), using page title");
            let mut fallback = Map::new();
            fallback.insert("pageTitle".into(), config.title_bar_name().into());
            return Ok(fallback);
        }
    };
    match templates.render_json(&source, config.values(), &cfg_path)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}
