//! # Stylemount - Reference-Counted Stylesheets for Components
//!
//! `stylemount` attaches generated CSS to UI components. A stylesheet is
//! mounted when the first instance of a styled component appears and
//! removed when the last one goes away. Styles can be fixed when the
//! component is decorated, or derived from each instance's props and
//! recomputed whenever they change.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use stylemount::{decorate, CssEngine, Document, Options, StyleRegistry, Styled};
//!
//! struct Props { open: bool }
//!
//! let document = Document::new();
//! let registry = StyleRegistry::new(CssEngine::new(document.clone()));
//!
//! let decorator = decorate(
//!     &registry,
//!     json!({ ".menu": { "display": "block" } }),
//!     Options::new().hash_selectors(true),
//! )
//! .unwrap();
//!
//! let menu = decorator.wrap(|props: &Props, styled: &Styled| {
//!     format!("<nav class=\"{}\" data-open=\"{}\">", styled.class("menu"), props.open)
//! });
//!
//! let first = menu.mount(Props { open: true }).unwrap();
//! let second = menu.mount(Props { open: false }).unwrap();
//! assert_eq!(document.len(), 1);
//! assert!(first.render().contains("menu_"));
//!
//! drop(first);
//! drop(second);
//! assert!(document.is_empty());
//! ```
//!
//! ## Derived Styles
//!
//! ```rust
//! use serde_json::json;
//! use stylemount::{decorate, CssEngine, Document, Options, StyleRegistry, StyleSource, Styled};
//!
//! struct Props { count: u32 }
//!
//! let document = Document::new();
//! let registry = StyleRegistry::new(CssEngine::new(document.clone()));
//!
//! let source = StyleSource::derived(|props: &Props| {
//!     json!({ ".badge": { "color": if props.count > 9 { "red" } else { "gray" } } })
//! });
//! let badge = decorate(&registry, source, Options::new().minify(true))
//!     .unwrap()
//!     .wrap(|props: &Props, _: &Styled| props.count.to_string());
//!
//! let mut instance = badge.mount(Props { count: 3 }).unwrap();
//! assert_eq!(document.render(), ".badge{color:gray}");
//!
//! instance.update(Props { count: 12 }).unwrap();
//! assert_eq!(document.render(), ".badge{color:red}");
//! ```
//!
//! ## Core Concepts
//!
//! - [`StyleRegistry`]: cache of stylesheets keyed by component and id, with
//!   a live-instance counter per entry
//! - [`decorate`] / [`Decorator`]: wrap components with a [`StyleSource`]
//! - [`StyledComponent`] / [`Instance`]: a wrapped component and its instances
//! - [`Scope`] / [`Binding`]: lifecycle hooks for driving instances from any
//!   UI framework
//! - [`StyleEngine`] / [`StyleHandle`]: the collaborator that builds and
//!   mounts stylesheets; [`CssEngine`] is the built-in one

pub mod decorate;
pub mod engine;
pub mod registry;
pub mod style;

pub use decorate::{decorate, Binding, Component, Decorator, Instance, Scope, Styled, StyledComponent};
pub use engine::{CssEngine, CssHandle, Document, Selectors, StyleEngine, StyleHandle};
pub use registry::{generate_id, ComponentToken, EntryKey, RegistryEntry, StyleRegistry};
pub use style::{Declaration, Declarations, IntoStyleSource, Options, StyleError, StyleMap, StyleSource};
