//! Named description fragments substituted for `__default` references.

use include_dir::{Dir, include_dir};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use super::description::{Entry, MenuDescription};
use crate::error::{Result, ShellError};
use crate::template::TemplateResolver;

static MENU_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/menu");

pub const DEFAULTS_ASSET: &str = "menuDefaults.json";
pub const DEFAULT_MENU_ASSET: &str = "defaultMenu.json";

/// Text of an embedded menu asset.
pub fn builtin_asset(name: &'static str) -> Result<&'static str> {
    MENU_ASSETS
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .ok_or(ShellError::MissingAsset(name))
}

#[derive(Clone, Default)]
pub struct DefaultsTable {
    fragments: HashMap<String, Entry>,
}

impl DefaultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, fragment: MenuDescription) -> Self {
        self.insert(name, fragment);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, fragment: MenuDescription) {
        self.fragments.insert(name.into(), Entry::Object(fragment));
    }

    /// Table from a parsed defaults document. A non-object document yields an
    /// empty table.
    pub fn from_value(value: Value) -> Self {
        let fragments = match value {
            Value::Object(map) => map.into_iter().map(|(k, v)| (k, Entry::from(v))).collect(),
            _ => HashMap::new(),
        };
        Self { fragments }
    }

    /// Template-resolve `source` against `mapping`, then parse it.
    pub fn load<T: Serialize>(
        source: &str,
        mapping: &T,
        templates: &TemplateResolver,
        origin: &Path,
    ) -> Result<Self> {
        let value = templates.render_json(source, mapping, origin)?;
        Ok(Self::from_value(value))
    }

    /// The embedded defaults, resolved against `mapping`.
    pub fn builtin<T: Serialize>(mapping: &T, templates: &TemplateResolver) -> Result<Self> {
        Self::load(
            builtin_asset(DEFAULTS_ASSET)?,
            mapping,
            templates,
            Path::new(DEFAULTS_ASSET),
        )
    }

    /// Fragment to splice for `name`. Entries that are not objects have
    /// nothing to splice.
    pub fn fragment(&self, name: &str) -> Option<&MenuDescription> {
        match self.fragments.get(name) {
            Some(Entry::Object(fragment)) => Some(fragment),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fragments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_defaults_resolve_title() {
        let table = DefaultsTable::builtin(&json!({"titleBarName": "Demo"}), &TemplateResolver::new()).unwrap();
        assert_eq!(table.names(), vec!["appMenu", "edit", "file", "help", "view", "window"]);

        let app_menu = table.fragment("appMenu").unwrap();
        assert!(app_menu.get("About Demo").is_some());
        assert!(app_menu.get("Quit Demo").is_some());
    }

    #[test]
    fn builtin_default_menu_parses() {
        let source = builtin_asset(DEFAULT_MENU_ASSET).unwrap();
        let value = TemplateResolver::new()
            .render_json(source, &json!({"titleBarName": "Demo"}), Path::new(DEFAULT_MENU_ASSET))
            .unwrap();
        let desc = MenuDescription::from_value(value).unwrap();
        let keys: Vec<&str> = desc.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["__macOnly", "File", "Edit", "View", "Window", "Help"]);
    }

    #[test]
    fn missing_asset_is_reported() {
        assert!(matches!(builtin_asset("nope.json"), Err(ShellError::MissingAsset("nope.json"))));
    }

    #[test]
    fn non_object_fragments_have_nothing_to_splice() {
        let table = DefaultsTable::from_value(json!({"str": "x", "list": [1], "obj": {"A": "a"}}));
        assert!(table.fragment("str").is_none());
        assert!(table.fragment("list").is_none());
        assert!(table.fragment("missing").is_none());
        assert_eq!(table.fragment("obj").unwrap().len(), 1);
    }

    #[test]
    fn non_object_document_is_empty() {
        assert!(DefaultsTable::from_value(json!([1, 2])).names().is_empty());
    }

    #[test]
    fn load_resolves_templates() {
        let source = r#"{"std": {"Save {{doc}}": "save"}}"#;
        let table = DefaultsTable::load(
            source,
            &json!({"doc": "Draft"}),
            &TemplateResolver::new(),
            Path::new("defaults.json"),
        )
        .unwrap();
        assert!(table.fragment("std").unwrap().get("Save Draft").is_some());
    }
}
