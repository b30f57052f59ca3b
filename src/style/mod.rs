//! Style descriptions and the options used to turn them into stylesheets.
//!
//! - [`StyleMap`] / [`Declarations`] / [`Declaration`]: plain selector to
//!   declaration mappings, with nested blocks
//! - [`StyleSource`]: static styles, or styles derived from component props
//! - [`Options`]: stylesheet configuration passed to the style engine
//! - [`StyleError`]: validation failures

mod error;
mod map;
mod options;
mod source;

pub use error::StyleError;
pub use map::{Declaration, Declarations, StyleMap};
pub use options::Options;
pub use source::{IntoStyleSource, StyleSource};
