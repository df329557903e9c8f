//! Navigable building-description document.
//!
//! The document is an element tree held as a `serde_json::Value`:
//! elements are objects, repeated elements are arrays, attributes are
//! `@`-prefixed keys, and text-only elements are scalars (or `#text` for
//! mixed content). JSON and YAML encodings load into the same tree.

mod path;
pub mod scrub;

pub use path::ElementPath;
pub use scrub::scrub;

use crate::error::{TranslateError, TranslateResult};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Name of the root element (and of its optional wrapper key).
pub const ROOT_ELEMENT: &str = "HPXML";

/// A loaded document. Owns the tree; [`Node`] borrows from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wrap a tree. A single-key `{"HPXML": {...}}` wrapper is unwrapped.
    pub fn from_value(value: Value) -> Self {
        let root = match value {
            Value::Object(mut map) if map.len() == 1 && map.contains_key(ROOT_ELEMENT) => {
                map.remove(ROOT_ELEMENT).unwrap_or(Value::Null)
            }
            other => other,
        };
        Self { root }
    }

    pub fn from_json_str(text: &str) -> TranslateResult<Self> {
        Ok(Self::from_value(serde_json::from_str(text)?))
    }

    pub fn from_yaml_str(text: &str) -> TranslateResult<Self> {
        Ok(Self::from_value(serde_yaml::from_str(text)?))
    }

    /// Load from a file; `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    pub fn load(path: &Path) -> TranslateResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            name: ROOT_ELEMENT,
            value: &self.root,
            path: ROOT_ELEMENT.to_string(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.root
    }

    /// Schema version from the root `@schemaVersion` attribute, padded to
    /// three components.
    pub fn schema_version(&self) -> TranslateResult<SchemaVersion> {
        let raw = self.root().require_text("@schemaVersion")?;
        SchemaVersion::parse(&raw)
    }
}

/// `major.minor.patch` schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub fn parse(raw: &str) -> TranslateResult<Self> {
        let mut parts = Vec::new();
        for part in raw.trim().split('.') {
            let n = part
                .parse::<u32>()
                .map_err(|_| TranslateError::UnsupportedSchemaVersion(raw.to_string()))?;
            parts.push(n);
        }
        if parts.is_empty() || parts.len() > 3 {
            return Err(TranslateError::UnsupportedSchemaVersion(raw.to_string()));
        }
        parts.resize(3, 0);
        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A borrowed element with its location in the tree (for error messages).
#[derive(Debug, Clone)]
pub struct Node<'a> {
    name: &'a str,
    value: &'a Value,
    path: String,
}

impl<'a> Node<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Slash-separated element path from the root, with 1-based indices on
    /// repeated elements.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    fn descend(&self, name: &'a str, value: &'a Value, index: Option<usize>) -> Node<'a> {
        let path = match index {
            Some(i) => format!("{}/{}[{}]", self.path, name, i + 1),
            None => format!("{}/{}", self.path, name),
        };
        Node { name, value, path }
    }

    pub(crate) fn same_element(&self, other: &Node<'_>) -> bool {
        std::ptr::eq(self.value, other.value)
    }

    fn expand(&self, name: &'a str, value: &'a Value) -> Vec<Node<'a>> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.descend(name, item, (items.len() > 1).then_some(i)))
                .collect(),
            other => vec![self.descend(name, other, None)],
        }
    }

    /// Child elements with the given name (`*` for every child element).
    pub fn children(&self, name: &str) -> Vec<Node<'a>> {
        if name == "*" {
            return self.element_children();
        }
        let Some(map) = self.value.as_object() else {
            return Vec::new();
        };
        match map.get_key_value(name) {
            Some((key, value)) => self.expand(key.as_str(), value),
            None => Vec::new(),
        }
    }

    /// All child elements in document order (attributes and text excluded).
    pub fn element_children(&self) -> Vec<Node<'a>> {
        let Some(map) = self.value.as_object() else {
            return Vec::new();
        };
        map.iter()
            .filter(|(key, _)| !key.starts_with('@') && !key.starts_with('#'))
            .flat_map(|(key, value)| self.expand(key.as_str(), value))
            .collect()
    }

    /// Descendant elements with the given name, in document order.
    pub fn descendants(&self, name: &str) -> Vec<Node<'a>> {
        let mut found = Vec::new();
        for child in self.element_children() {
            if name == "*" || child.name == name {
                found.push(child.clone());
            }
            found.extend(child.descendants(name));
        }
        found
    }

    /// Text content of a scalar element (or its `#text`).
    pub fn text(&self) -> Option<String> {
        scalar_text(self.value).or_else(|| self.value.get("#text").and_then(scalar_text))
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.value
            .as_object()
            .and_then(|map| map.get(&format!("@{}", name)))
            .and_then(scalar_text)
    }

    pub fn find(&self, path: &str) -> Option<Node<'a>> {
        ElementPath::parse(path).select(self).into_iter().next()
    }

    pub fn find_all(&self, path: &str) -> Vec<Node<'a>> {
        ElementPath::parse(path).select(self)
    }

    pub fn exists(&self, path: &str) -> bool {
        let query = ElementPath::parse(path);
        if query.is_attribute() {
            !query.values(self).is_empty()
        } else {
            !query.select(self).is_empty()
        }
    }

    /// First scalar at the path.
    pub fn text_at(&self, path: &str) -> Option<String> {
        ElementPath::parse(path).values(self).into_iter().next()
    }

    pub fn texts_at(&self, path: &str) -> Vec<String> {
        ElementPath::parse(path).values(self)
    }

    pub fn require_text(&self, path: &str) -> TranslateResult<String> {
        self.text_at(path).ok_or_else(|| self.missing(path))
    }

    pub fn float_at(&self, path: &str) -> TranslateResult<Option<f64>> {
        self.text_at(path)
            .map(|text| parse_float(&text, &self.join(path)))
            .transpose()
    }

    pub fn require_float(&self, path: &str) -> TranslateResult<f64> {
        self.float_at(path)?.ok_or_else(|| self.missing(path))
    }

    pub fn int_at(&self, path: &str) -> TranslateResult<Option<i64>> {
        match self.text_at(path) {
            None => Ok(None),
            Some(text) => text.trim().parse::<i64>().map(Some).map_err(|_| {
                TranslateError::translation(format!(
                    "Expected an integer at {}, found \"{}\"",
                    self.join(path),
                    text
                ))
            }),
        }
    }

    pub fn require_int(&self, path: &str) -> TranslateResult<i64> {
        self.int_at(path)?.ok_or_else(|| self.missing(path))
    }

    /// Boolean text (`true`/`false`/`1`/`0`).
    pub fn flag_at(&self, path: &str) -> TranslateResult<Option<bool>> {
        match self.text_at(path).as_deref().map(str::trim) {
            None => Ok(None),
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(other) => Err(TranslateError::translation(format!(
                "Expected a boolean at {}, found \"{}\"",
                self.join(path),
                other
            ))),
        }
    }

    /// True only when the path holds the text `true`.
    pub fn is_true(&self, path: &str) -> bool {
        matches!(self.flag_at(path), Ok(Some(true)))
    }

    /// Sum of every numeric value at the path (0 when nothing matches).
    pub fn sum_at(&self, path: &str) -> TranslateResult<f64> {
        let target = self.join(path);
        self.texts_at(path)
            .iter()
            .map(|text| parse_float(text, &target))
            .sum()
    }

    /// Name of the first child element under the path (e.g. the variant
    /// element inside `WallType`).
    pub fn first_child_name(&self, path: &str) -> Option<&'a str> {
        self.find(path)
            .and_then(|node| node.element_children().into_iter().next())
            .map(|child| child.name)
    }

    pub fn id(&self) -> Option<String> {
        self.text_at("SystemIdentifier/@id")
    }

    pub fn require_id(&self) -> TranslateResult<String> {
        self.require_text("SystemIdentifier/@id")
    }

    /// `idref` attributes of every child element with the given name.
    pub fn idrefs(&self, name: &str) -> Vec<String> {
        self.children(name)
            .iter()
            .filter_map(|n| n.attr("idref"))
            .collect()
    }

    fn join(&self, path: &str) -> String {
        format!("{}/{}", self.path, path.trim_start_matches('/'))
    }

    pub(crate) fn missing(&self, path: &str) -> TranslateError {
        TranslateError::not_found(self.join(path))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_float(text: &str, location: &str) -> TranslateResult<f64> {
    text.trim().parse::<f64>().map_err(|_| {
        TranslateError::translation(format!(
            "Expected a number at {}, found \"{}\"",
            location, text
        ))
    })
}
