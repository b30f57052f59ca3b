//! Static and input-derived style sources.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::error::StyleError;
use super::map::StyleMap;

type DeriveFn<P> = dyn Fn(&P) -> Result<Value, StyleError> + Send + Sync;

/// Where a styled component gets its styles from.
///
/// `Static` styles are fixed when the component is decorated and shared by
/// every instance. `Derived` styles are computed from an instance's current
/// props, on construction and again on every props update.
pub enum StyleSource<P> {
    Static(StyleMap),
    Derived(Arc<DeriveFn<P>>),
}

impl<P: 'static> StyleSource<P> {
    /// Wraps a function computing styles from props.
    ///
    /// The function may return anything serializable; the result is checked
    /// to be a mapping of selectors to declarations each time it runs.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use stylemount::StyleSource;
    ///
    /// struct Props { active: bool }
    ///
    /// let source = StyleSource::derived(|props: &Props| {
    ///     json!({ ".tab": { "color": if props.active { "blue" } else { "gray" } } })
    /// });
    /// assert!(source.is_derived());
    /// ```
    pub fn derived<F, R>(derive: F) -> Self
    where
        F: Fn(&P) -> R + Send + Sync + 'static,
        R: Serialize,
    {
        StyleSource::Derived(Arc::new(move |props: &P| {
            serde_json::to_value(derive(props))
                .map_err(|e| StyleError::result(format!("failed to serialize styles: {}", e)))
        }))
    }
}

impl<P> StyleSource<P> {
    pub fn is_derived(&self) -> bool {
        matches!(self, StyleSource::Derived(_))
    }

    /// Returns the styles for the given props.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidStyleResult`] when a derived function
    /// does not produce a mapping. There is no fallback to earlier styles.
    pub fn compute(&self, props: &P) -> Result<StyleMap, StyleError> {
        match self {
            StyleSource::Static(styles) => Ok(styles.clone()),
            StyleSource::Derived(derive) => StyleMap::from_derived(derive(props)?),
        }
    }
}

impl<P> Clone for StyleSource<P> {
    fn clone(&self) -> Self {
        match self {
            StyleSource::Static(styles) => StyleSource::Static(styles.clone()),
            StyleSource::Derived(derive) => StyleSource::Derived(Arc::clone(derive)),
        }
    }
}

impl<P> fmt::Debug for StyleSource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleSource::Static(styles) => f.debug_tuple("Static").field(styles).finish(),
            StyleSource::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Conversion into a [`StyleSource`], validated at the decoration boundary.
pub trait IntoStyleSource<P> {
    fn into_style_source(self) -> Result<StyleSource<P>, StyleError>;
}

impl<P> IntoStyleSource<P> for StyleSource<P> {
    fn into_style_source(self) -> Result<StyleSource<P>, StyleError> {
        Ok(self)
    }
}

impl<P> IntoStyleSource<P> for StyleMap {
    fn into_style_source(self) -> Result<StyleSource<P>, StyleError> {
        Ok(StyleSource::Static(self))
    }
}

/// Dynamic values must be a mapping of selectors to declarations.
impl<P> IntoStyleSource<P> for Value {
    fn into_style_source(self) -> Result<StyleSource<P>, StyleError> {
        StyleMap::from_value(self).map(StyleSource::Static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    struct Props {
        count: u32,
    }

    #[test]
    fn test_static_compute_ignores_props() {
        let styles = StyleMap::from_value(json!({ ".foo": { "color": "red" } })).unwrap();
        let source: StyleSource<Props> = StyleSource::Static(styles.clone());

        assert_eq!(source.compute(&Props { count: 1 }).unwrap(), styles);
        assert!(!source.is_derived());
    }

    #[test]
    fn test_derived_compute_uses_props() {
        let source = StyleSource::derived(|props: &Props| {
            let color = if props.count % 2 == 0 { "blue" } else { "green" };
            json!({ ".foo": { "color": color } })
        });

        let even = source.compute(&Props { count: 2 }).unwrap();
        let odd = source.compute(&Props { count: 3 }).unwrap();
        assert_eq!(even.get(".foo").unwrap().get("color"), Some("blue"));
        assert_eq!(odd.get(".foo").unwrap().get("color"), Some("green"));
    }

    #[test]
    fn test_derived_accepts_typed_maps() {
        let source = StyleSource::derived(|props: &Props| {
            let mut rule = BTreeMap::new();
            rule.insert("width", format!("{}px", props.count));
            let mut styles = BTreeMap::new();
            styles.insert(".bar", rule);
            styles
        });

        let styles = source.compute(&Props { count: 10 }).unwrap();
        assert_eq!(styles.get(".bar").unwrap().get("width"), Some("10px"));
    }

    #[test]
    fn test_derived_non_mapping_result_fails() {
        let source = StyleSource::derived(|_: &Props| "color: red");
        let err = source.compute(&Props { count: 0 }).unwrap_err();
        assert!(matches!(err, StyleError::InvalidStyleResult { .. }));
    }

    #[test]
    fn test_value_into_source_rejects_non_mapping() {
        let result: Result<StyleSource<Props>, _> = json!([1, 2]).into_style_source();
        assert!(matches!(result, Err(StyleError::InvalidStyleInput { .. })));

        let result: Result<StyleSource<Props>, _> = Value::Null.into_style_source();
        assert!(matches!(result, Err(StyleError::InvalidStyleInput { .. })));
    }

    #[test]
    fn test_value_into_source_accepts_mapping() {
        let source: StyleSource<Props> = json!({}).into_style_source().unwrap();
        assert!(matches!(source, StyleSource::Static(ref s) if s.is_empty()));
    }
}
