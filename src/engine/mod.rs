//! Style engine collaborator.
//!
//! The registry never builds stylesheets itself. It asks a [`StyleEngine`]
//! for a [`StyleHandle`] and only decides when that handle is mounted and
//! unmounted. [`CssEngine`] is the built-in engine, mounting into a shared
//! in-memory [`Document`].

mod css;
mod document;

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::style::{Options, StyleMap};

pub use css::{CssEngine, CssHandle};
pub use document::Document;

/// A created stylesheet that can be mounted and unmounted.
///
/// Handles are called while the registry lock is held and must not call
/// back into the registry.
pub trait StyleHandle: Send + Sync + fmt::Debug {
    /// Identifier the stylesheet was created with.
    fn id(&self) -> &str;

    /// Mounts the stylesheet into the rendering environment.
    fn add(&self);

    /// Unmounts the stylesheet from the rendering environment.
    fn remove(&self);

    /// Logical class names mapped to the names actually rendered.
    fn selectors(&self) -> &Selectors;

    /// The stylesheet text.
    fn css(&self) -> String;

    /// Token for the sheet this handle mounts, when the rendering
    /// environment tracks mounted sheets individually.
    fn sheet(&self) -> Option<u64> {
        None
    }

    /// Called when this handle replaces `previous` while `previous` is
    /// mounted. The replacement inherits the mounted sheet instead of being
    /// added on its own, so a later [`remove`](Self::remove) on it unmounts
    /// what `previous` mounted. Does nothing by default.
    fn take_over(&self, previous: &dyn StyleHandle) {
        let _ = previous;
    }
}

/// Turns a style description into a [`StyleHandle`].
///
/// Creating a handle must not change what is mounted, unless
/// `options.auto_mount` asks for it.
pub trait StyleEngine: Send + Sync {
    fn create(&self, styles: &StyleMap, options: &Options) -> Arc<dyn StyleHandle>;
}

impl<F> StyleEngine for F
where
    F: Fn(&StyleMap, &Options) -> Arc<dyn StyleHandle> + Send + Sync,
{
    fn create(&self, styles: &StyleMap, options: &Options) -> Arc<dyn StyleHandle> {
        self(styles, options)
    }
}

/// Translation table from logical class names to rendered class names.
///
/// ```rust
/// use stylemount::Selectors;
///
/// let mut selectors = Selectors::new();
/// selectors.insert("foo", "foo_1a2b3c4d");
/// assert_eq!(&selectors["foo"], "foo_1a2b3c4d");
/// assert_eq!(selectors.get("bar"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selectors {
    names: IndexMap<String, String>,
}

impl Selectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, logical: impl Into<String>, rendered: impl Into<String>) {
        self.names.insert(logical.into(), rendered.into());
    }

    pub fn get(&self, logical: &str) -> Option<&str> {
        self.names.get(logical).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Index<&str> for Selectors {
    type Output = str;

    /// # Panics
    ///
    /// Panics if the logical name is not present.
    fn index(&self, logical: &str) -> &str {
        match self.names.get(logical) {
            Some(rendered) => rendered,
            None => panic!("no selector named \"{}\"", logical),
        }
    }
}
