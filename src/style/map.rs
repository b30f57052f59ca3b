//! Plain style descriptions: selectors mapped to declaration blocks.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::StyleError;

/// One entry of a declaration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Declaration {
    /// A property value, `color: red`.
    Value(String),
    /// The same property written once per value, in order, so later values
    /// act as fallbacks for engines that reject them.
    Fallbacks(Vec<String>),
    /// A nested block: a nested selector (`&:hover`, `.child`), an at-rule
    /// (`@media (...)`), or at the top level a whole rule.
    Block(Declarations),
}

/// A block of CSS declarations and nested blocks.
///
/// Insertion order is preserved so rendered output follows the order the
/// declarations were written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Declarations {
    entries: IndexMap<String, Declaration>,
}

impl Declarations {
    /// Creates an empty declaration block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, returning the updated block for chaining.
    pub fn set(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(property, Declaration::Value(value.into()));
        self
    }

    /// Adds a nested block, returning the updated block for chaining.
    ///
    /// ```rust
    /// use stylemount::Declarations;
    ///
    /// let link = Declarations::new()
    ///     .set("color", "blue")
    ///     .nest("&:hover", Declarations::new().set("color", "navy"));
    /// assert_eq!(link.block("&:hover").unwrap().get("color"), Some("navy"));
    /// ```
    pub fn nest(mut self, key: impl Into<String>, block: Declarations) -> Self {
        self.insert(key, Declaration::Block(block));
        self
    }

    /// Sets an entry in place. A repeated key keeps its original position
    /// and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, declaration: Declaration) {
        self.entries.insert(key.into(), declaration);
    }

    /// Returns a plain property value.
    pub fn get(&self, property: &str) -> Option<&str> {
        match self.entries.get(property)? {
            Declaration::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a nested block.
    pub fn block(&self, key: &str) -> Option<&Declarations> {
        match self.entries.get(key)? {
            Declaration::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn declaration(&self, key: &str) -> Option<&Declaration> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A style description: CSS selectors (or at-rules) mapped to their
/// declaration blocks.
///
/// The description is a plain mapping; what each key means is up to the
/// style engine. [`CssEngine`](crate::CssEngine) reads top-level blocks as
/// rules and at-rules and ignores top-level plain values.
///
/// # Example
///
/// ```rust
/// use stylemount::{Declarations, StyleMap};
///
/// let styles = StyleMap::new()
///     .rule(".foo", Declarations::new().set("color", "red"))
///     .rule("html, body", Declarations::new().set("margin", "0"));
///
/// assert_eq!(styles.len(), 2);
/// assert_eq!(styles.get(".foo").unwrap().get("color"), Some("red"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleMap {
    root: Declarations,
}

impl StyleMap {
    /// Creates an empty style description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, returning the updated map for chaining.
    pub fn rule(mut self, selector: impl Into<String>, declarations: Declarations) -> Self {
        self.insert(selector, declarations);
        self
    }

    /// Adds a rule in place, replacing any rule with the same selector text.
    pub fn insert(&mut self, selector: impl Into<String>, declarations: Declarations) {
        self.root
            .insert(selector, Declaration::Block(declarations));
    }

    /// Returns the block for a selector or at-rule.
    pub fn get(&self, selector: &str) -> Option<&Declarations> {
        self.root.block(selector)
    }

    /// Returns any top-level entry, including plain values.
    pub fn declaration(&self, key: &str) -> Option<&Declaration> {
        self.root.declaration(key)
    }

    /// Iterates over top-level entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.root.iter()
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Builds a style description from a dynamic value.
    ///
    /// The value must be an object. Inside it, strings, numbers and
    /// booleans become values, arrays become fallback lists, objects become
    /// nested blocks and `null` entries are left out.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidStyleInput`] if the value is not an
    /// object, or if an array holds anything but plain values.
    pub fn from_value(value: Value) -> Result<Self, StyleError> {
        parse_value(value, |reason| StyleError::input(reason))
    }

    /// Same as [`from_value`](Self::from_value), but reports failures as
    /// [`StyleError::InvalidStyleResult`]. Used for derived-style output.
    pub(crate) fn from_derived(value: Value) -> Result<Self, StyleError> {
        parse_value(value, |reason| StyleError::result(reason))
    }

    /// Parses a style description from JSON text.
    pub fn from_json(source: &str) -> Result<Self, StyleError> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| StyleError::input(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Parses a style description from YAML text.
    ///
    /// ```rust
    /// use stylemount::StyleMap;
    ///
    /// let styles = StyleMap::from_yaml(".foo:\n  color: red\n  zIndex: 2\n").unwrap();
    /// assert_eq!(styles.get(".foo").unwrap().get("zIndex"), Some("2"));
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self, StyleError> {
        let value: Value = serde_yaml::from_str(source)
            .map_err(|e| StyleError::input(format!("invalid YAML: {}", e)))?;
        Self::from_value(value)
    }

    /// Loads a style description from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StyleError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let content = std::fs::read_to_string(path).map_err(|e| {
            StyleError::input(format!("failed to read \"{}\": {}", path.display(), e))
        })?;

        match extension.as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            other => Err(StyleError::input(format!(
                "unsupported style file extension \"{}\" for \"{}\"",
                other,
                path.display()
            ))),
        }
    }
}

type Fail = fn(String) -> StyleError;

fn parse_value(value: Value, fail: Fail) -> Result<StyleMap, StyleError> {
    let Value::Object(entries) = value else {
        return Err(fail(format!("expected an object, found {}", kind(&value))));
    };
    Ok(StyleMap {
        root: parse_block(entries, "", fail)?,
    })
}

fn parse_block(
    entries: Map<String, Value>,
    path: &str,
    fail: Fail,
) -> Result<Declarations, StyleError> {
    let mut declarations = Declarations::new();
    for (key, value) in entries {
        let location = if path.is_empty() {
            key.clone()
        } else {
            format!("{} > {}", path, key)
        };
        let declaration = match value {
            Value::Null => continue,
            Value::Object(nested) => Declaration::Block(parse_block(nested, &location, fail)?),
            Value::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    flatten_into(item, &location, fail, &mut values)?;
                }
                Declaration::Fallbacks(values)
            }
            scalar => match scalar_text(&scalar) {
                Some(text) => Declaration::Value(text),
                None => continue,
            },
        };
        declarations.insert(key, declaration);
    }
    Ok(declarations)
}

fn flatten_into(
    item: Value,
    location: &str,
    fail: Fail,
    values: &mut Vec<String>,
) -> Result<(), StyleError> {
    match item {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, location, fail, values)?;
            }
            Ok(())
        }
        Value::Object(_) => Err(fail(format!(
            "\"{}\" lists an object where only values are allowed",
            location
        ))),
        scalar => {
            values.extend(scalar_text(&scalar));
            Ok(())
        }
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

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
