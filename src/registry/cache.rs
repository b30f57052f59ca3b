//! The stylesheet cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::entry::{EntryKey, RegistryEntry};
use super::generate_id;
use super::token::ComponentToken;
use crate::engine::StyleEngine;
use crate::style::{Options, StyleMap};

/// Reference-counted cache of stylesheets shared by styled components.
///
/// Entries are keyed by [`EntryKey`] (component identity plus stylesheet
/// id), created lazily on first resolution, and kept after their counter
/// drops back to zero so a later mount reuses them. Only the stylesheet is
/// unmounted at zero.
///
/// Cloning a registry yields another handle to the same cache. Every counter
/// change and entry swap happens under one lock, so the 0 to 1 and 1 to 0
/// transitions are never lost, and mount/unmount calls on handles run while
/// that lock is held.
///
/// # Example
///
/// ```rust
/// use stylemount::{ComponentToken, CssEngine, Declarations, Options, StyleMap, StyleRegistry};
///
/// struct Header;
///
/// let registry = StyleRegistry::new(CssEngine::default());
/// let styles = StyleMap::new().rule(".title", Declarations::new().set("fontWeight", "bold"));
///
/// let entry = registry.resolve_entry(
///     ComponentToken::of::<Header>(),
///     &styles,
///     &Options::new().id("header"),
///     None,
/// );
/// assert_eq!(entry.counter(), 0);
///
/// assert_eq!(registry.acquire(&entry), 1);
/// assert_eq!(registry.release(entry.key()), 0);
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone)]
pub struct StyleRegistry {
    engine: Arc<dyn StyleEngine>,
    entries: Arc<Mutex<HashMap<EntryKey, RegistryEntry>>>,
}

impl StyleRegistry {
    /// Creates an empty registry building handles with `engine`.
    pub fn new(engine: impl StyleEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<EntryKey, RegistryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Finds or creates the entry for a component.
    ///
    /// The stylesheet id is `options.id`, or a freshly generated id when none
    /// is given, suffixed with `_<instance_key>` when an instance key is
    /// passed. An existing entry for `(component, id)` is returned as is;
    /// `styles` is only used when the entry has to be created. New entries
    /// start with a counter of zero and an unmounted handle.
    pub fn resolve_entry(
        &self,
        component: ComponentToken,
        styles: &StyleMap,
        options: &Options,
        instance_key: Option<&str>,
    ) -> RegistryEntry {
        let mut id = options.id.clone().unwrap_or_else(generate_id);
        if let Some(instance_key) = instance_key {
            id.push('_');
            id.push_str(instance_key);
        }
        let key = EntryKey::new(component, id.clone());

        let mut entries = self.entries();
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }

        let options = options.normalized(id);
        let handle = self.engine.create(styles, &options);
        debug!(id = %key.id, component = %component, "created stylesheet entry");

        let entry = RegistryEntry {
            key: key.clone(),
            counter: 0,
            handle,
            options,
        };
        entries.insert(key, entry.clone());
        entry
    }

    /// Rebuilds the handle for `entry` from new styles and stores the result
    /// in its place.
    ///
    /// The counter and options are kept and no mount or unmount call is made.
    /// While the entry has live instances the new handle
    /// [takes over](crate::StyleHandle::take_over) the mounted one, so the
    /// updated styles are visible and the next unmount removes them.
    pub fn refresh_entry(&self, styles: &StyleMap, entry: &RegistryEntry) -> RegistryEntry {
        let mut entries = self.entries();
        let handle = self.engine.create(styles, &entry.options);
        let current = entries.get(&entry.key).unwrap_or(entry);
        let counter = current.counter;
        if counter > 0 {
            handle.take_over(current.handle.as_ref());
        }

        let refreshed = RegistryEntry {
            handle,
            counter,
            ..entry.clone()
        };
        debug!(id = %entry.key.id, counter, "refreshed stylesheet entry");
        entries.insert(entry.key.clone(), refreshed.clone());
        refreshed
    }

    /// Records a new live instance of `entry`, mounting the stylesheet on
    /// the 0 to 1 transition. Returns the new counter.
    ///
    /// An entry missing from the cache (after [`reset`](Self::reset)) is
    /// stored again first.
    pub fn acquire(&self, entry: &RegistryEntry) -> usize {
        let mut entries = self.entries();
        let current = entries
            .entry(entry.key.clone())
            .or_insert_with(|| RegistryEntry {
                counter: 0,
                ..entry.clone()
            });

        current.counter += 1;
        if current.counter == 1 {
            debug!(id = %current.key.id, "mounting stylesheet");
            current.handle.add();
        }
        current.counter
    }

    /// Records that a live instance went away, unmounting the stylesheet on
    /// the 1 to 0 transition. Returns the new counter.
    ///
    /// Releasing an entry with no live instances changes nothing.
    pub fn release(&self, key: &EntryKey) -> usize {
        let mut entries = self.entries();
        let Some(current) = entries.get_mut(key) else {
            warn!(id = %key.id, "released a stylesheet that is not registered");
            return 0;
        };
        if current.counter == 0 {
            warn!(id = %key.id, "released a stylesheet with no live instances");
            return 0;
        }

        current.counter -= 1;
        if current.counter == 0 {
            debug!(id = %key.id, "unmounting stylesheet");
            current.handle.remove();
        }
        current.counter
    }

    /// Returns a snapshot of the entry for `(component, id)`.
    pub fn get(&self, component: ComponentToken, id: &str) -> Option<RegistryEntry> {
        self.entry(&EntryKey::new(component, id))
    }

    /// Returns a snapshot of the entry stored under `key`.
    pub fn entry(&self, key: &EntryKey) -> Option<RegistryEntry> {
        self.entries().get(key).cloned()
    }

    /// Live instances for `key`; zero when the key is unknown.
    pub fn counter(&self, key: &EntryKey) -> usize {
        self.entries().get(key).map_or(0, |entry| entry.counter)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Forgets every entry without unmounting anything.
    ///
    /// Meant for isolating tests that share a registry.
    pub fn reset(&self) {
        self.entries().clear();
    }
}

impl fmt::Debug for StyleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
