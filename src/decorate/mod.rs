//! Binding stylesheet lifecycles to component instances.
//!
//! - [`decorate`] / [`Decorator`]: validate a style source and wrap components
//! - [`StyledComponent`] / [`Instance`]: a wrapped component and its live instances
//! - [`Scope`] / [`Binding`]: the framework-neutral lifecycle hooks
//! - [`Component`] / [`Styled`]: what a wrapped component renders with

mod binding;
mod component;
mod decorator;

pub use binding::{Binding, Scope};
pub use component::{Component, Styled};
pub use decorator::{decorate, Decorator, Instance, StyledComponent};
