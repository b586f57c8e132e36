use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{Result, ShellError};

pub const APP_CONFIG_FILE: &str = "app.json";

const FALLBACK_APP_TITLE: &str = "app";

/// Application configuration from `{app_dir}/app.json`.
///
/// A flat JSON object that doubles as the template mapping for menu, view and
/// defaults documents. `appTitle` and `titleBarName` are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    values: Map<String, Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut values = Map::new();
        values.insert("appTitle".into(), FALLBACK_APP_TITLE.into());
        values.insert("titleBarName".into(), capitalize(FALLBACK_APP_TITLE).into());
        Self { values }
    }
}

impl AppConfig {
    /// Load `app.json` from `app_dir`. A missing file yields the defaults;
    /// unreadable or malformed files are errors.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(APP_CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no app config, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ShellError::io(&path, e)),
        };
        let value: Value = serde_json::from_str(&content).map_err(|e| ShellError::json(&path, e))?;
        Self::from_value(value).map_err(|reason| ShellError::InvalidConfig { path, reason })
    }

    /// Validate a parsed configuration and derive `titleBarName` from
    /// `appTitle` when it is unset or empty.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(mut values) = value else {
            return Err("expected a JSON object".into());
        };
        if !values.get("titleBarName").is_some_and(is_truthy) {
            let title = values
                .get("appTitle")
                .and_then(Value::as_str)
                .ok_or_else(|| "appTitle must be a string when titleBarName is not set".to_string())?;
            let derived = capitalize(title);
            values.insert("titleBarName".into(), derived.into());
        }
        Ok(Self { values })
    }

    pub fn app_title(&self) -> &str {
        self.values
            .get("appTitle")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_APP_TITLE)
    }

    pub fn title_bar_name(&self) -> String {
        match self.values.get("titleBarName") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => capitalize(self.app_title()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// This configuration with `overlay`'s keys assigned on top.
    pub fn merged_with(&self, overlay: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = self.values.clone();
        for (k, v) in overlay {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Upper-case the first character.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.app_title(), "app");
        assert_eq!(cfg.title_bar_name(), "App");
    }

    #[test]
    fn derives_title_bar_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(APP_CONFIG_FILE), r#"{"appTitle": "notes", "version": 2}"#).unwrap();
        let cfg = AppConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.title_bar_name(), "Notes");
        assert_eq!(cfg.get("version"), Some(&json!(2)));
    }

    #[test]
    fn explicit_title_bar_name_wins() {
        let cfg = AppConfig::from_value(json!({"appTitle": "notes", "titleBarName": "My Notes"})).unwrap();
        assert_eq!(cfg.title_bar_name(), "My Notes");
    }

    #[test]
    fn empty_title_bar_name_is_derived() {
        let cfg = AppConfig::from_value(json!({"appTitle": "élan", "titleBarName": ""})).unwrap();
        assert_eq!(cfg.title_bar_name(), "Élan");
    }

    #[test]
    fn title_bar_name_without_app_title_is_fine() {
        let cfg = AppConfig::from_value(json!({"titleBarName": "Shell"})).unwrap();
        assert_eq!(cfg.title_bar_name(), "Shell");
    }

    #[test]
    fn missing_app_title_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(APP_CONFIG_FILE), r#"{"version": 1}"#).unwrap();
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ShellError::InvalidConfig { .. }));
    }

    #[test]
    fn non_object_is_an_error() {
        assert!(AppConfig::from_value(json!(["appTitle"])).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(APP_CONFIG_FILE), "{oops").unwrap();
        assert!(matches!(AppConfig::load(dir.path()), Err(ShellError::Json { .. })));
    }

    #[test]
    fn merged_with_overlays_keys() {
        let cfg = AppConfig::from_value(json!({"appTitle": "a", "pageTitle": "base"})).unwrap();
        let overlay = json!({"pageTitle": "view", "extra": 1});
        let merged = cfg.merged_with(overlay.as_object().unwrap());
        assert_eq!(merged.get("pageTitle"), Some(&json!("view")));
        assert_eq!(merged.get("extra"), Some(&json!(1)));
        assert_eq!(merged.get("titleBarName"), Some(&json!("A")));
    }

    #[test]
    fn capitalize_handles_empty() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("x"), "X");
    }
}
