//! The component side of the binding.

use std::fmt;
use std::sync::Arc;

use crate::engine::{Selectors, StyleHandle};
use crate::registry::RegistryEntry;

/// Extra render input handed to a wrapped component next to its own props:
/// the live stylesheet handle and its selector mapping.
#[derive(Clone)]
pub struct Styled {
    handle: Arc<dyn StyleHandle>,
}

impl Styled {
    pub fn new(handle: Arc<dyn StyleHandle>) -> Self {
        Self { handle }
    }

    /// The live stylesheet handle.
    pub fn handle(&self) -> &Arc<dyn StyleHandle> {
        &self.handle
    }

    /// Logical class names mapped to the rendered class names.
    pub fn selectors(&self) -> &Selectors {
        self.handle.selectors()
    }

    /// Rendered class name for `logical`, or `logical` itself when the
    /// stylesheet does not define it.
    pub fn class<'a>(&'a self, logical: &'a str) -> &'a str {
        self.selectors().get(logical).unwrap_or(logical)
    }
}

impl From<&RegistryEntry> for Styled {
    fn from(entry: &RegistryEntry) -> Self {
        Self::new(Arc::clone(entry.handle()))
    }
}

impl fmt::Debug for Styled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Styled")
            .field("id", &self.handle.id())
            .field("selectors", self.selectors())
            .finish()
    }
}

/// A renderable component definition.
///
/// Implemented for every `Fn(&P, &Styled) -> O`, so plain closures and
/// functions can be wrapped directly.
pub trait Component<P> {
    type Output;

    fn render(&self, props: &P, styled: &Styled) -> Self::Output;
}

impl<P, O, F> Component<P> for F
where
    F: Fn(&P, &Styled) -> O,
{
    type Output = O;

    fn render(&self, props: &P, styled: &Styled) -> O {
        self(props, styled)
    }
}
