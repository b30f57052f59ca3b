//! Stylesheet options.

use serde::{Deserialize, Serialize};

/// Configuration handed to the style engine when a stylesheet is created.
///
/// Every field is optional. Field names serialize in camelCase so options
/// can be read from the same JSON or YAML documents as style descriptions.
///
/// # Example
///
/// ```rust
/// use stylemount::Options;
///
/// let options = Options::new().id("app-shell").hash_selectors(true);
/// assert_eq!(options.id.as_deref(), Some("app-shell"));
///
/// let parsed: Options = serde_json::from_str(r#"{ "minify": true, "id": "nav" }"#).unwrap();
/// assert!(parsed.minify);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Mount the stylesheet as soon as it is created. Always forced off for
    /// stylesheets created through the registry, which owns mount timing.
    pub auto_mount: bool,
    /// Rewrite class names into unique, hashed names.
    pub hash_selectors: bool,
    /// Explicit stylesheet identifier, shared by everything that names it.
    ///
    /// For derived styles this also disables per-instance stylesheets: every
    /// instance shares one entry, created from the first instance's props,
    /// and each instance renders with the handle from its own last mount or
    /// update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub minify: bool,
    pub source_map: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_mount(mut self, enabled: bool) -> Self {
        self.auto_mount = enabled;
        self
    }

    pub fn hash_selectors(mut self, enabled: bool) -> Self {
        self.hash_selectors = enabled;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    pub fn source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    /// Returns a copy with auto-mount disabled and the resolved identifier
    /// stamped in. Other fields pass through untouched.
    pub fn normalized(&self, id: impl Into<String>) -> Self {
        Self {
            auto_mount: false,
            id: Some(id.into()),
            ..self.clone()
        }
    }
}
