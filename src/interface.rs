//! Named function registries exposed to either side of the shell.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, ShellError};

pub type ShellFunction = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    /// Functions acting on the display surface.
    Web,
    /// Functions acting in the privileged process.
    Main,
}

pub struct Interface {
    kind: InterfaceKind,
    functions: RwLock<HashMap<String, ShellFunction>>,
}

impl Interface {
    pub fn new(kind: InterfaceKind) -> Self {
        Self {
            kind,
            functions: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Register `f` as `name`. Fails if the name is taken unless
    /// `override_existing` is set.
    pub fn add_function<F>(&self, name: &str, f: F, override_existing: bool) -> Result<()>
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let mut functions = self.functions.write();
        if functions.contains_key(name) && !override_existing {
            return Err(ShellError::FunctionExists(name.to_string()));
        }
        functions.insert(name.to_string(), Arc::new(f));
        Ok(())
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        // Release the lock before calling so functions may register others.
        let f = self
            .functions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ShellError::FunctionNotFound(name.to_string()))?;
        Ok(f(args))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Script showing a native alert with `text` in a webview.
pub(crate) fn alert_script(text: &Value) -> String {
    let message = match text {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    // JSON string literals are valid JavaScript string literals.
    let literal = serde_json::to_string(&message).unwrap_or_else(|_| "\"\"".to_string());
    format!("alert({literal})")
}
