//! Decorating components with stylesheets.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::binding::{Binder, Binding};
use super::component::{Component, Styled};
use crate::engine::{Selectors, StyleHandle};
use crate::registry::{ComponentToken, RegistryEntry, StyleRegistry};
use crate::style::{IntoStyleSource, Options, StyleError, StyleSource};

/// Validates a style source and returns a [`Decorator`] that wraps
/// components with it.
///
/// # Errors
///
/// Returns [`StyleError::InvalidStyleInput`] if `source` is a dynamic value
/// that is not a mapping of selectors to declarations.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use stylemount::{decorate, CssEngine, Document, Options, StyleRegistry, Styled};
///
/// struct Props { label: String }
///
/// let document = Document::new();
/// let registry = StyleRegistry::new(CssEngine::new(document.clone()));
///
/// let button = decorate(&registry, json!({ ".button": { "color": "red" } }), Options::new())
///     .unwrap()
///     .wrap(|props: &Props, styled: &Styled| {
///         format!("<button class=\"{}\">{}</button>", styled.class("button"), props.label)
///     });
///
/// let instance = button.mount(Props { label: "Save".into() }).unwrap();
/// assert_eq!(instance.render(), "<button class=\"button\">Save</button>");
/// assert_eq!(document.len(), 1);
///
/// drop(instance);
/// assert!(document.is_empty());
/// ```
pub fn decorate<P, S>(
    registry: &StyleRegistry,
    source: S,
    options: Options,
) -> Result<Decorator<P>, StyleError>
where
    S: IntoStyleSource<P>,
{
    Ok(Decorator {
        registry: registry.clone(),
        source: source.into_style_source()?,
        options,
    })
}

/// A validated style source and options, ready to wrap components.
///
/// With derived styles and an explicit `id`, all instances of a wrapped
/// component share one entry. Updating one instance swaps the entry's
/// handle, but the other instances keep rendering with the handle from
/// their own last mount or update until they are updated too.
pub struct Decorator<P> {
    registry: StyleRegistry,
    source: StyleSource<P>,
    options: Options,
}

impl<P> Decorator<P> {
    /// Wraps a component, identified by its type.
    ///
    /// Static styles resolve their shared registry entry here; derived
    /// styles resolve one per instance when it is mounted.
    pub fn wrap<C>(&self, component: C) -> StyledComponent<C, P>
    where
        C: Component<P> + 'static,
    {
        self.wrap_as(component, ComponentToken::of::<C>())
    }

    /// Wraps a component under an explicit identity.
    pub fn wrap_as<C>(&self, component: C, token: ComponentToken) -> StyledComponent<C, P>
    where
        C: Component<P>,
    {
        debug!(component = %token, derived = self.source.is_derived(), "wrapping component");
        let binder = Binder::new(
            self.registry.clone(),
            self.source.clone(),
            self.options.clone(),
            token,
        );
        StyledComponent {
            component: Arc::new(component),
            binder: Arc::new(binder),
        }
    }

    pub fn source(&self) -> &StyleSource<P> {
        &self.source
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl<P> fmt::Debug for Decorator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("source", &self.source)
            .field("options", &self.options)
            .finish()
    }
}

/// A component wrapped with a stylesheet.
///
/// Every instance mounted from it is counted in the registry; the
/// stylesheet is mounted with the first live instance and unmounted with
/// the last.
pub struct StyledComponent<C, P> {
    component: Arc<C>,
    binder: Arc<Binder<P>>,
}

impl<C, P> StyledComponent<C, P> {
    pub fn token(&self) -> ComponentToken {
        self.binder.component
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    /// The entry shared by all instances, for static styles.
    pub fn shared_entry(&self) -> Option<&RegistryEntry> {
        self.binder.shared.as_ref()
    }

    /// A fresh, unacquired lifecycle binding for a host framework to drive
    /// through [`Scope`](super::Scope).
    pub fn binding(&self) -> Binding<P> {
        Binding::new(Arc::clone(&self.binder))
    }
}

impl<C, P> StyledComponent<C, P>
where
    C: Component<P>,
{
    /// Constructs an instance, mounting the stylesheet if it is the first.
    ///
    /// # Errors
    ///
    /// Fails with [`StyleError::InvalidStyleResult`] if derived styles cannot
    /// be computed from `props`.
    pub fn mount(&self, props: P) -> Result<Instance<C, P>, StyleError> {
        let mut binding = self.binding();
        let styled = Styled::from(binding.acquire(&props)?);
        Ok(Instance {
            component: Arc::clone(&self.component),
            binding,
            props,
            styled,
        })
    }
}

impl<C, P> Clone for StyledComponent<C, P> {
    fn clone(&self) -> Self {
        Self {
            component: Arc::clone(&self.component),
            binder: Arc::clone(&self.binder),
        }
    }
}

impl<C, P> fmt::Debug for StyledComponent<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyledComponent")
            .field("component", &self.binder.component)
            .field("shared", &self.binder.shared.as_ref().map(RegistryEntry::id))
            .finish()
    }
}

/// A live instance of a [`StyledComponent`].
///
/// Dropping the instance (or calling [`unmount`](Self::unmount)) releases it.
pub struct Instance<C, P> {
    component: Arc<C>,
    binding: Binding<P>,
    props: P,
    styled: Styled,
}

impl<C, P> Instance<C, P>
where
    C: Component<P>,
{
    /// Replaces the props. Derived styles are recomputed and the refreshed
    /// stylesheet swapped in without remounting.
    ///
    /// # Errors
    ///
    /// Fails with [`StyleError::InvalidStyleResult`] if derived styles cannot
    /// be computed; the instance keeps its previous props and styles.
    pub fn update(&mut self, props: P) -> Result<(), StyleError> {
        if let Some(entry) = self.binding.refresh(&props)? {
            self.styled = Styled::from(entry);
        }
        self.props = props;
        Ok(())
    }

    /// Renders the wrapped component with the current props plus the live
    /// stylesheet handle and selectors.
    pub fn render(&self) -> C::Output {
        self.component.render(&self.props, &self.styled)
    }
}

impl<C, P> Instance<C, P> {
    pub fn props(&self) -> &P {
        &self.props
    }

    pub fn styled(&self) -> &Styled {
        &self.styled
    }

    pub fn handle(&self) -> &Arc<dyn StyleHandle> {
        self.styled.handle()
    }

    pub fn selectors(&self) -> &Selectors {
        self.styled.selectors()
    }

    pub fn entry(&self) -> Option<&RegistryEntry> {
        self.binding.entry()
    }

    /// Releases the instance now, unmounting the stylesheet if this was its
    /// last live instance.
    pub fn unmount(mut self) {
        self.binding.release();
    }
}

impl<C, P> fmt::Debug for Instance<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("binding", &self.binding)
            .field("styled", &self.styled)
            .finish_non_exhaustive()
    }
}
