//! Per-instance lifecycle binding.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::component::Styled;
use crate::registry::{ComponentToken, RegistryEntry, StyleRegistry};
use crate::style::{Options, StyleError, StyleSource};

/// Framework-neutral lifecycle of one styled component instance.
///
/// A host framework calls `on_acquire` when an instance is constructed,
/// `on_inputs_changed` before it receives new props, and `on_release` when
/// it is removed.
pub trait Scope<P> {
    fn on_acquire(&mut self, props: &P) -> Result<(), StyleError>;
    fn on_inputs_changed(&mut self, props: &P) -> Result<(), StyleError>;
    fn on_release(&mut self);
}

/// Decoration-time state shared by every instance of a wrapped component.
pub(crate) struct Binder<P> {
    pub(crate) registry: StyleRegistry,
    pub(crate) source: StyleSource<P>,
    pub(crate) options: Options,
    pub(crate) component: ComponentToken,
    /// Entry shared by all instances; only set for static sources.
    pub(crate) shared: Option<RegistryEntry>,
    instances: AtomicU64,
}

impl<P> Binder<P> {
    pub(crate) fn new(
        registry: StyleRegistry,
        source: StyleSource<P>,
        options: Options,
        component: ComponentToken,
    ) -> Self {
        let shared = match &source {
            StyleSource::Static(styles) => {
                Some(registry.resolve_entry(component, styles, &options, None))
            }
            StyleSource::Derived(_) => None,
        };
        Self {
            registry,
            source,
            options,
            component,
            shared,
            instances: AtomicU64::new(0),
        }
    }

    /// Derived instances get an entry of their own unless an id was given.
    fn instance_key(&self) -> Option<String> {
        if self.options.id.is_some() {
            return None;
        }
        Some(self.instances.fetch_add(1, Ordering::Relaxed).to_string())
    }
}

/// Lifecycle state of one instance: which registry entry it holds, if any.
///
/// Dropping an acquired binding releases it.
pub struct Binding<P> {
    binder: Arc<Binder<P>>,
    entry: Option<RegistryEntry>,
}

impl<P> Binding<P> {
    pub(crate) fn new(binder: Arc<Binder<P>>) -> Self {
        Self {
            binder,
            entry: None,
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.entry.is_some()
    }

    /// The entry this instance holds, as of its last acquire or refresh.
    pub fn entry(&self) -> Option<&RegistryEntry> {
        self.entry.as_ref()
    }

    pub fn styled(&self) -> Option<Styled> {
        self.entry.as_ref().map(Styled::from)
    }

    /// Resolves the instance's entry and counts the instance as live,
    /// mounting the stylesheet if it is the first.
    ///
    /// Acquiring twice is a no-op returning the held entry.
    ///
    /// # Errors
    ///
    /// Fails with [`StyleError::InvalidStyleResult`] if derived styles cannot
    /// be computed from `props`; the registry is left untouched.
    pub fn acquire(&mut self, props: &P) -> Result<&RegistryEntry, StyleError> {
        let entry = match self.entry.take() {
            Some(entry) => entry,
            None => {
                let binder = &self.binder;
                let entry = match &binder.shared {
                    Some(shared) => shared.clone(),
                    None => {
                        let styles = binder.source.compute(props)?;
                        let instance_key = binder.instance_key();
                        binder.registry.resolve_entry(
                            binder.component,
                            &styles,
                            &binder.options,
                            instance_key.as_deref(),
                        )
                    }
                };
                let counter = binder.registry.acquire(&entry);
                debug!(id = %entry.id(), counter, "acquired styled instance");
                entry
            }
        };
        Ok(&*self.entry.insert(entry))
    }

    /// Recomputes derived styles from new props and swaps the refreshed
    /// entry in. Mount state is untouched.
    ///
    /// Returns the held entry, or `None` if the binding is not acquired.
    /// Static sources are never recomputed.
    pub fn refresh(&mut self, props: &P) -> Result<Option<&RegistryEntry>, StyleError> {
        if !self.binder.source.is_derived() {
            return Ok(self.entry.as_ref());
        }
        let Some(current) = self.entry.as_ref() else {
            return Ok(None);
        };

        let styles = self.binder.source.compute(props)?;
        let refreshed = self.binder.registry.refresh_entry(&styles, current);
        Ok(Some(&*self.entry.insert(refreshed)))
    }

    /// Counts the instance as gone, unmounting the stylesheet if it was the
    /// last. Does nothing if the binding is not acquired.
    pub fn release(&mut self) {
        if let Some(entry) = self.entry.take() {
            let counter = self.binder.registry.release(entry.key());
            debug!(id = %entry.id(), counter, "released styled instance");
        }
    }
}

impl<P> Scope<P> for Binding<P> {
    fn on_acquire(&mut self, props: &P) -> Result<(), StyleError> {
        self.acquire(props).map(|_| ())
    }

    fn on_inputs_changed(&mut self, props: &P) -> Result<(), StyleError> {
        self.refresh(props).map(|_| ())
    }

    fn on_release(&mut self) {
        self.release();
    }
}

impl<P> Drop for Binding<P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<P> fmt::Debug for Binding<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("component", &self.binder.component)
            .field("entry", &self.entry.as_ref().map(RegistryEntry::id))
            .finish()
    }
}
