//! Reference-counted stylesheet registry.
//!
//! - [`StyleRegistry`]: the cache of stylesheets shared by component instances
//! - [`RegistryEntry`] / [`EntryKey`]: one cached stylesheet and its key
//! - [`ComponentToken`]: identity of a component definition

mod cache;
mod entry;
mod token;

pub use cache::StyleRegistry;
pub use entry::{EntryKey, RegistryEntry};
pub use token::ComponentToken;

/// Generates a unique stylesheet id of the form `sheet_<uuid>`.
pub fn generate_id() -> String {
    format!("sheet_{}", uuid::Uuid::new_v4())
}
