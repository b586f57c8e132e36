//! Menu descriptions: the ordered, mixed-shape input of the compiler.
//!
//! Descriptions usually come from JSON (`serde_json` with `preserve_order`, so
//! keys keep their source order) but can also be assembled in Rust, which is
//! the only way to attach inline callables to list entries.

use serde_json::Value;
use std::borrow::Cow;

use super::actions::MenuAction;

pub(crate) const SEPARATOR_KEY: &str = "__separator";
pub(crate) const DEFAULT_KEY: &str = "__default";
pub(crate) const ROLE_KEY: &str = "__role";
pub(crate) const MAC_ONLY_KEY: &str = "__macOnly";
pub(crate) const EXCEPT_MAC_KEY: &str = "__exceptMac";
pub(crate) const NO_CHILDREN_KEY: &str = "__noChildren";

/// One value in a description.
#[derive(Clone)]
pub enum Entry {
    /// `[shortcut?, click-or-role?, actionName?]`
    List(Vec<Entry>),
    Text(String),
    Object(MenuDescription),
    Callable(MenuAction),
    /// `null`, booleans and numbers.
    Scalar(Value),
}

/// Ordered `key -> entry` pairs. Duplicate keys are kept and visited in order.
#[derive(Clone, Default)]
pub struct MenuDescription {
    entries: Vec<(String, Entry)>,
}

impl MenuDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Entry>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Entry>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Property lookup. With duplicate keys the last one wins, as in a parsed
    /// JSON object.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build from a parsed JSON document. Only objects describe a menu level;
    /// anything else yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }
}

impl From<serde_json::Map<String, Value>> for MenuDescription {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter().map(|(k, v)| (k, Entry::from(v))).collect(),
        }
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Entry::List(items.into_iter().map(Entry::from).collect()),
            Value::String(s) => Entry::Text(s),
            Value::Object(map) => Entry::Object(MenuDescription::from(map)),
            scalar => Entry::Scalar(scalar),
        }
    }
}

impl From<&str> for Entry {
    fn from(s: &str) -> Self {
        Entry::Text(s.to_string())
    }
}

impl From<String> for Entry {
    fn from(s: String) -> Self {
        Entry::Text(s)
    }
}

impl From<MenuDescription> for Entry {
    fn from(d: MenuDescription) -> Self {
        Entry::Object(d)
    }
}

impl From<MenuAction> for Entry {
    fn from(f: MenuAction) -> Self {
        Entry::Callable(f)
    }
}

impl From<Vec<Entry>> for Entry {
    fn from(items: Vec<Entry>) -> Self {
        Entry::List(items)
    }
}

impl Entry {
    pub fn null() -> Self {
        Entry::Scalar(Value::Null)
    }

    /// JavaScript truthiness: empty strings, `null`, `false`, `0` and `NaN`
    /// are falsy; lists, objects and callables are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Entry::List(_) | Entry::Object(_) | Entry::Callable(_) => true,
            Entry::Text(s) => !s.is_empty(),
            Entry::Scalar(Value::Bool(b)) => *b,
            Entry::Scalar(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Entry::Scalar(_) => false,
        }
    }

    /// Scalar rendered as a string: text as-is, numbers and booleans
    /// stringified. Structured values have no string form.
    pub(crate) fn as_scalar_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Entry::Text(s) => Some(Cow::Borrowed(s)),
            Entry::Scalar(Value::Number(n)) => Some(Cow::Owned(n.to_string())),
            Entry::Scalar(Value::Bool(b)) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    /// Key used to look an action up by name. Numbers index by their decimal
    /// form.
    pub(crate) fn as_action_key(&self) -> Option<Cow<'_, str>> {
        match self {
            Entry::Text(s) => Some(Cow::Borrowed(s)),
            Entry::Scalar(Value::Number(n)) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }
}

/// Why an entry produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    /// Object carrying a truthy `__noChildren`.
    NoChildren,
    /// Scalar or bare callable: no case applies.
    Unrecognized,
}

/// The single classification of a `(key, value)` pair.
#[derive(Clone, Copy)]
pub(crate) enum Directive<'a> {
    ListLeaf { label: &'a str, parts: &'a [Entry] },
    Separator,
    DefaultRef(&'a str),
    RoleAssign(&'a str),
    ActionLeaf { label: &'a str, action: &'a str },
    MacOnly(&'a MenuDescription),
    ExceptMac(&'a MenuDescription),
    Container { label: &'a str, body: &'a MenuDescription },
    Skip(SkipReason),
}

pub(crate) fn classify<'a>(key: &'a str, value: &'a Entry) -> Directive<'a> {
    match value {
        Entry::List(parts) => Directive::ListLeaf { label: key, parts },
        Entry::Text(text) => match key {
            SEPARATOR_KEY if text == SEPARATOR_KEY => Directive::Separator,
            DEFAULT_KEY => Directive::DefaultRef(text),
            ROLE_KEY => Directive::RoleAssign(text),
            _ => Directive::ActionLeaf {
                label: key,
                action: text,
            },
        },
        Entry::Object(body) => {
            if body.get(NO_CHILDREN_KEY).is_some_and(Entry::is_truthy) {
                return Directive::Skip(SkipReason::NoChildren);
            }
            match key {
                MAC_ONLY_KEY => Directive::MacOnly(body),
                EXCEPT_MAC_KEY => Directive::ExceptMac(body),
                _ => Directive::Container { label: key, body },
            }
        }
        Entry::Callable(_) | Entry::Scalar(_) => Directive::Skip(SkipReason::Unrecognized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Entry {
        Entry::from(value)
    }

    #[test]
    fn from_value_keeps_source_order() {
        let desc = MenuDescription::from_value(json!({"Zeta": "a", "Alpha": "b", "Mid": "c"})).unwrap();
        let keys: Vec<&str> = desc.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(MenuDescription::from_value(json!(["a"])).is_none());
        assert!(MenuDescription::from_value(json!("a")).is_none());
    }

    #[test]
    fn get_returns_last_duplicate() {
        let desc = MenuDescription::new().entry("k", "first").entry("k", "second");
        assert!(matches!(desc.get("k"), Some(Entry::Text(s)) if s == "second"));
        assert_eq!(desc.len(), 2);
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!entry(json!(null)).is_truthy());
        assert!(!entry(json!(false)).is_truthy());
        assert!(!entry(json!(0)).is_truthy());
        assert!(!entry(json!("")).is_truthy());
        assert!(entry(json!(1)).is_truthy());
        assert!(entry(json!("x")).is_truthy());
        assert!(entry(json!([])).is_truthy());
        assert!(entry(json!({})).is_truthy());
    }

    #[test]
    fn classifies_reserved_string_keys() {
        let sep = entry(json!("__separator"));
        assert!(matches!(classify("__separator", &sep), Directive::Separator));

        let name = entry(json!("edit"));
        assert!(matches!(classify("__default", &name), Directive::DefaultRef("edit")));
        assert!(matches!(classify("__role", &name), Directive::RoleAssign("edit")));
        assert!(matches!(
            classify("Edit", &name),
            Directive::ActionLeaf { label: "Edit", action: "edit" }
        ));
    }

    #[test]
    fn malformed_separator_is_an_action_leaf() {
        let value = entry(json!("something"));
        assert!(matches!(
            classify("__separator", &value),
            Directive::ActionLeaf { label: "__separator", action: "something" }
        ));
    }

    #[test]
    fn classifies_objects() {
        let body = entry(json!({"A": "a"}));
        assert!(matches!(classify("__macOnly", &body), Directive::MacOnly(_)));
        assert!(matches!(classify("__exceptMac", &body), Directive::ExceptMac(_)));
        assert!(matches!(classify("File", &body), Directive::Container { label: "File", .. }));

        let hidden = entry(json!({"__noChildren": true, "A": "a"}));
        assert!(matches!(
            classify("File", &hidden),
            Directive::Skip(SkipReason::NoChildren)
        ));
        assert!(matches!(
            classify("__macOnly", &hidden),
            Directive::Skip(SkipReason::NoChildren)
        ));

        let falsy_marker = entry(json!({"__noChildren": false}));
        assert!(matches!(classify("File", &falsy_marker), Directive::Container { .. }));
    }

    #[test]
    fn scalars_are_unrecognized() {
        for value in [json!(null), json!(true), json!(3)] {
            let value = entry(value);
            assert!(matches!(
                classify("Key", &value),
                Directive::Skip(SkipReason::Unrecognized)
            ));
        }
    }

    #[test]
    fn list_leaf_carries_spec() {
        let value = entry(json!(["CmdOrCtrl+S", null, "save"]));
        match classify("Save", &value) {
            Directive::ListLeaf { label, parts } => {
                assert_eq!(label, "Save");
                assert_eq!(parts.len(), 3);
            }
            _ => panic!("expected a list leaf"),
        }
    }
}
