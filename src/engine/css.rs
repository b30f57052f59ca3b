//! Built-in CSS engine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cssparser::{ParseError, Parser, ParserInput, Token};
use heck::ToKebabCase;
use tracing::debug;

use super::document::Document;
use super::{Selectors, StyleEngine, StyleHandle};
use crate::registry::generate_id;
use crate::style::{Declaration, Declarations, Options, StyleMap};

/// Renders style descriptions to CSS text and mounts them into a [`Document`].
///
/// - Top-level keys are selectors, or at-rules when they start with `@`.
///   Blocks under an at-rule are rules (or further at-rules); plain values
///   under it are the at-rule's own declarations (`@font-face`). A plain
///   value under a top-level `@` key is written as a statement
///   (`@import url(a.css);`). Other top-level plain values are ignored.
/// - Inside a rule, a block keyed with `&` is a nested selector with `&`
///   standing for the parent (`&:hover`, `& > li`); a block keyed with a
///   plain selector applies to descendants; a block keyed with `@` wraps
///   the parent rule in that at-rule.
/// - A list value writes the property once per entry, in order.
/// - Class selectors (`.name`) are collected into the handle's [`Selectors`],
///   including those inside functional pseudo-classes such as `:not(.name)`.
/// - With `hash_selectors`, every class is renamed to `name_<hash>` where the
///   hash is derived from the stylesheet id.
/// - camelCase property names are written in kebab-case; a leading capital
///   marks a vendor prefix (`WebkitTransition` becomes `-webkit-transition`).
/// - `minify` drops all optional whitespace. `source_map` is accepted but no
///   source map is produced.
///
/// Creating a handle mounts nothing unless `auto_mount` is set. Each handle
/// mounts its own sheet, so handles sharing an id never overwrite each other.
///
/// # Example
///
/// ```rust
/// use stylemount::{CssEngine, Declarations, Document, Options, StyleEngine, StyleMap};
///
/// let document = Document::new();
/// let engine = CssEngine::new(document.clone());
/// let styles = StyleMap::new().rule(
///     ".foo",
///     Declarations::new()
///         .set("backgroundColor", "red")
///         .nest("&:hover", Declarations::new().set("backgroundColor", "blue")),
/// );
///
/// let handle = engine.create(&styles, &Options::new().id("demo").minify(true));
/// assert_eq!(
///     handle.css(),
///     ".foo{background-color:red}.foo:hover{background-color:blue}"
/// );
/// assert_eq!(handle.selectors().get("foo"), Some("foo"));
///
/// handle.add();
/// assert!(document.is_mounted("demo"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CssEngine {
    document: Document,
}

impl CssEngine {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document handles from this engine mount into.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl StyleEngine for CssEngine {
    fn create(&self, styles: &StyleMap, options: &Options) -> Arc<dyn StyleHandle> {
        let id = options.id.clone().unwrap_or_else(generate_id);
        let suffix = if options.hash_selectors {
            format!("_{:08x}", fnv1a(&id))
        } else {
            String::new()
        };

        let mut builder = Builder {
            suffix: &suffix,
            selectors: Selectors::new(),
        };
        let mut nodes = Vec::new();
        for (key, declaration) in styles.iter() {
            match declaration {
                Declaration::Block(block) if key.starts_with('@') => {
                    nodes.push(builder.at_rule(key, block));
                }
                Declaration::Block(block) => {
                    let selector = builder.rewrite(key);
                    builder.rule(&selector, block, &mut nodes);
                }
                _ if key.starts_with('@') => {
                    nodes.extend(values(declaration).map(|value| {
                        Node::Statement(format!("{} {}", key.trim(), value))
                    }));
                }
                _ => debug!(key = %key, "ignoring top-level value outside a rule"),
            }
        }

        let mut css = String::new();
        for node in &nodes {
            render(&mut css, node, 0, options.minify);
        }

        let handle = Arc::new(CssHandle {
            id,
            css,
            selectors: builder.selectors,
            slot: AtomicU64::new(self.document.allocate()),
            document: self.document.clone(),
        });
        if options.auto_mount {
            handle.add();
        }
        handle
    }
}

/// A stylesheet produced by [`CssEngine`].
#[derive(Debug)]
pub struct CssHandle {
    id: String,
    css: String,
    selectors: Selectors,
    slot: AtomicU64,
    document: Document,
}

impl CssHandle {
    fn slot(&self) -> u64 {
        self.slot.load(Ordering::SeqCst)
    }
}

impl StyleHandle for CssHandle {
    fn id(&self) -> &str {
        &self.id
    }

    fn add(&self) {
        self.document.mount(self.slot(), &self.id, &self.css);
    }

    fn remove(&self) {
        self.document.unmount(self.slot());
    }

    fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    fn css(&self) -> String {
        self.css.clone()
    }

    fn sheet(&self) -> Option<u64> {
        Some(self.slot())
    }

    fn take_over(&self, previous: &dyn StyleHandle) {
        if let Some(slot) = previous.sheet() {
            self.slot.store(slot, Ordering::SeqCst);
            self.document.refresh(slot, &self.css);
        }
    }
}

enum Node {
    Rule {
        selector: String,
        properties: Vec<(String, String)>,
    },
    AtRule {
        prelude: String,
        properties: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Statement(String),
}

struct Builder<'a> {
    suffix: &'a str,
    selectors: Selectors,
}

impl Builder<'_> {
    fn rewrite(&mut self, selector: &str) -> String {
        rewrite_selector(selector, self.suffix, &mut self.selectors)
            .trim()
            .to_string()
    }

    fn rule(&mut self, selector: &str, block: &Declarations, out: &mut Vec<Node>) {
        let properties = properties(block);
        if !properties.is_empty() || block.is_empty() {
            out.push(Node::Rule {
                selector: selector.to_string(),
                properties,
            });
        }

        for (key, declaration) in block.iter() {
            let Declaration::Block(child) = declaration else {
                continue;
            };
            if key.starts_with('@') {
                let mut children = Vec::new();
                self.rule(selector, child, &mut children);
                out.push(Node::AtRule {
                    prelude: key.trim().to_string(),
                    properties: Vec::new(),
                    children,
                });
            } else {
                let nested = nest_selector(selector, &self.rewrite(key));
                self.rule(&nested, child, out);
            }
        }
    }

    fn at_rule(&mut self, prelude: &str, block: &Declarations) -> Node {
        let mut children = Vec::new();
        for (key, declaration) in block.iter() {
            let Declaration::Block(child) = declaration else {
                continue;
            };
            if key.starts_with('@') {
                children.push(self.at_rule(key, child));
            } else {
                let selector = self.rewrite(key);
                self.rule(&selector, child, &mut children);
            }
        }
        Node::AtRule {
            prelude: prelude.trim().to_string(),
            properties: properties(block),
            children,
        }
    }
}

fn values(declaration: &Declaration) -> impl Iterator<Item = &str> {
    let values: &[String] = match declaration {
        Declaration::Value(value) => std::slice::from_ref(value),
        Declaration::Fallbacks(values) => values,
        Declaration::Block(_) => &[],
    };
    values.iter().map(String::as_str)
}

fn properties(block: &Declarations) -> Vec<(String, String)> {
    let mut properties = Vec::new();
    for (property, declaration) in block.iter() {
        for value in values(declaration) {
            properties.push((property_name(property), value.to_string()));
        }
    }
    properties
}

/// Resolves a nested selector against its parent. Every comma-separated
/// part of the parent is combined with every part of the nested selector.
fn nest_selector(parent: &str, nested: &str) -> String {
    let mut parts = Vec::new();
    for parent in parent.split(',').map(str::trim) {
        for part in nested.split(',').map(str::trim) {
            if part.contains('&') {
                parts.push(part.replace('&', parent));
            } else {
                parts.push(format!("{} {}", parent, part));
            }
        }
    }
    parts.join(", ")
}

fn rewrite_selector(selector: &str, suffix: &str, selectors: &mut Selectors) -> String {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let mut out = String::with_capacity(selector.len() + suffix.len());
    rewrite_tokens(&mut parser, suffix, selectors, &mut out);
    out
}

fn rewrite_tokens<'i>(
    parser: &mut Parser<'i, '_>,
    suffix: &str,
    selectors: &mut Selectors,
    out: &mut String,
) {
    let mut after_dot = false;
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::Delim('.') => {
                out.push_str(parser.slice_from(start));
                after_dot = true;
                continue;
            }
            Token::Ident(ref name) if after_dot => {
                let logical: &str = name;
                let rendered = format!("{}{}", logical, suffix);
                out.push_str(&rendered);
                selectors.insert(logical, rendered);
            }
            Token::Function(_) | Token::ParenthesisBlock => {
                out.push_str(parser.slice_from(start));
                let _ = parser.parse_nested_block(|nested| {
                    rewrite_tokens(nested, suffix, selectors, out);
                    Ok::<(), ParseError<'i, ()>>(())
                });
                out.push(')');
            }
            Token::SquareBracketBlock | Token::CurlyBracketBlock => {
                let _ = parser.parse_nested_block(|nested| {
                    while nested.next_including_whitespace().is_ok() {}
                    Ok::<(), ParseError<'i, ()>>(())
                });
                out.push_str(parser.slice_from(start));
            }
            _ => out.push_str(parser.slice_from(start)),
        }
        after_dot = false;
    }
}

fn render(out: &mut String, node: &Node, depth: usize, minify: bool) {
    let indent = if minify { String::new() } else { "  ".repeat(depth) };
    match node {
        Node::Rule {
            selector,
            properties,
        } => render_block(out, &indent, selector, properties, &[], depth, minify),
        Node::AtRule {
            prelude,
            properties,
            children,
        } => render_block(out, &indent, prelude, properties, children, depth, minify),
        Node::Statement(statement) => {
            out.push_str(&indent);
            out.push_str(statement);
            out.push(';');
            if !minify {
                out.push('\n');
            }
        }
    }
}

fn render_block(
    out: &mut String,
    indent: &str,
    head: &str,
    properties: &[(String, String)],
    children: &[Node],
    depth: usize,
    minify: bool,
) {
    if minify {
        out.push_str(head);
        out.push('{');
        let body: Vec<String> = properties
            .iter()
            .map(|(property, value)| format!("{}:{}", property, value))
            .collect();
        out.push_str(&body.join(";"));
        if !body.is_empty() && !children.is_empty() {
            out.push(';');
        }
        for child in children {
            render(out, child, depth + 1, minify);
        }
        out.push('}');
    } else {
        out.push_str(&format!("{}{} {{\n", indent, head));
        for (property, value) in properties {
            out.push_str(&format!("{}  {}: {};\n", indent, property, value));
        }
        for child in children {
            render(out, child, depth + 1, minify);
        }
        out.push_str(&format!("{}}}\n", indent));
    }
}

fn property_name(property: &str) -> String {
    if property.contains('-') {
        return property.to_string();
    }
    let kebab = property.to_kebab_case();
    if property.starts_with(|c: char| c.is_ascii_uppercase()) {
        format!("-{}", kebab)
    } else {
        kebab
    }
}

// 32-bit FNV-1a.
fn fnv1a(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles() -> StyleMap {
        StyleMap::new()
            .rule(".foo", Declarations::new().set("color", "red"))
            .rule(
                "html, body",
                Declarations::new().set("margin", "0").set("padding", "0"),
            )
    }

    #[test]
    fn test_render_pretty() {
        let engine = CssEngine::default();
        let handle = engine.create(&styles(), &Options::new().id("pretty"));

        assert_eq!(
            handle.css(),
            ".foo {\n  color: red;\n}\nhtml, body {\n  margin: 0;\n  padding: 0;\n}\n"
        );
        assert_eq!(handle.id(), "pretty");
    }

    #[test]
    fn test_render_minified() {
        let engine = CssEngine::default();
        let handle = engine.create(&styles(), &Options::new().id("min").minify(true));

        assert_eq!(handle.css(), ".foo{color:red}html, body{margin:0;padding:0}");
    }

    #[test]
    fn test_selectors_collected_without_hashing() {
        let engine = CssEngine::default();
        let handle = engine.create(&styles(), &Options::new().id("plain"));

        assert_eq!(handle.selectors().len(), 1);
        assert_eq!(&handle.selectors()["foo"], "foo");
    }

    #[test]
    fn test_hash_selectors_rewrites_classes() {
        let engine = CssEngine::default();
        let styles = StyleMap::new().rule(
            ".list > .item:not(.active):hover",
            Declarations::new().set("opacity", "0.5"),
        );
        let handle = engine.create(
            &styles,
            &Options::new().id("hashed").hash_selectors(true).minify(true),
        );

        let suffix = format!("_{:08x}", fnv1a("hashed"));
        for logical in ["list", "item", "active"] {
            assert_eq!(
                handle.selectors().get(logical),
                Some(format!("{}{}", logical, suffix).as_str())
            );
        }
        assert_eq!(
            handle.css(),
            format!(
                ".list{s} > .item{s}:not(.active{s}):hover{{opacity:0.5}}",
                s = suffix
            )
        );
    }

    #[test]
    fn test_hash_depends_on_id() {
        let engine = CssEngine::default();
        let options = Options::new().hash_selectors(true);
        let a = engine.create(&styles(), &options.clone().id("a"));
        let b = engine.create(&styles(), &options.id("b"));

        assert_ne!(a.selectors().get("foo"), b.selectors().get("foo"));
    }

    #[test]
    fn test_attribute_selectors_kept_verbatim() {
        let engine = CssEngine::default();
        let styles = StyleMap::new().rule(
            "input[type=\"text\"].field",
            Declarations::new().set("border", "none"),
        );
        let handle = engine.create(&styles, &Options::new().id("attr").minify(true));

        assert_eq!(handle.css(), "input[type=\"text\"].field{border:none}");
        assert_eq!(handle.selectors().get("field"), Some("field"));
    }

    #[test]
    fn test_property_names() {
        assert_eq!(property_name("backgroundColor"), "background-color");
        assert_eq!(property_name("WebkitTransition"), "-webkit-transition");
        assert_eq!(property_name("margin-top"), "margin-top");
        assert_eq!(property_name("--accent"), "--accent");
        assert_eq!(property_name("color"), "color");
    }

    #[test]
    fn test_add_and_remove_mount_into_document() {
        let document = Document::new();
        let engine = CssEngine::new(document.clone());
        let handle = engine.create(&styles(), &Options::new().id("mounted"));

        assert!(document.is_empty());
        handle.add();
        assert_eq!(document.css("mounted"), Some(handle.css()));
        handle.remove();
        assert!(document.is_empty());
    }

    #[test]
    fn test_auto_mount() {
        let document = Document::new();
        let engine = CssEngine::new(document.clone());
        engine.create(&styles(), &Options::new().id("auto").auto_mount(true));

        assert!(document.is_mounted("auto"));
    }

    #[test]
    fn test_create_leaves_mounted_sheets_alone() {
        let document = Document::new();
        let engine = CssEngine::new(document.clone());
        let options = Options::new().id("live").minify(true);

        engine.create(&styles(), &options).add();
        let blue = StyleMap::new().rule(".foo", Declarations::new().set("color", "blue"));
        engine.create(&blue, &options);

        assert_eq!(document.count("live"), 1);
        assert_eq!(
            document.css("live").as_deref(),
            Some(".foo{color:red}html, body{margin:0;padding:0}")
        );
    }

    #[test]
    fn test_take_over_inherits_mounted_sheet() {
        let document = Document::new();
        let engine = CssEngine::new(document.clone());
        let options = Options::new().id("live").minify(true);

        let red = engine.create(&styles(), &options);
        red.add();
        let blue = engine.create(
            &StyleMap::new().rule(".foo", Declarations::new().set("color", "blue")),
            &options,
        );
        blue.take_over(red.as_ref());

        assert_eq!(blue.sheet(), red.sheet());
        assert_eq!(document.css("live").as_deref(), Some(".foo{color:blue}"));

        blue.remove();
        assert!(document.is_empty());
    }

    #[test]
    fn test_handles_sharing_an_id_mount_separately() {
        let document = Document::new();
        let engine = CssEngine::new(document.clone());
        let options = Options::new().id("shared").minify(true);

        let a = engine.create(
            &StyleMap::new().rule(".a", Declarations::new().set("color", "red")),
            &options,
        );
        let b = engine.create(
            &StyleMap::new().rule(".b", Declarations::new().set("color", "blue")),
            &options,
        );
        a.add();
        b.add();
        assert_eq!(document.css("shared").as_deref(), Some(".a{color:red}.b{color:blue}"));

        b.remove();
        assert_eq!(document.css("shared").as_deref(), Some(".a{color:red}"));
    }

    #[test]
    fn test_nested_selectors() {
        let engine = CssEngine::default();
        let styles = StyleMap::new().rule(
            ".a, .b",
            Declarations::new()
                .set("color", "red")
                .nest("&:hover", Declarations::new().set("color", "blue"))
                .nest(".icon", Declarations::new().set("width", "1em")),
        );
        let handle = engine.create(&styles, &Options::new().id("nested").minify(true));

        assert_eq!(
            handle.css(),
            ".a, .b{color:red}.a:hover, .b:hover{color:blue}.a .icon, .b .icon{width:1em}"
        );
        assert_eq!(handle.selectors().get("icon"), Some("icon"));
    }

    #[test]
    fn test_nested_media_wraps_parent_rule() {
        let engine = CssEngine::default();
        let styles = StyleMap::new().rule(
            ".a",
            Declarations::new().set("display", "block").nest(
                "@media (max-width: 600px)",
                Declarations::new().set("display", "none"),
            ),
        );
        let handle = engine.create(&styles, &Options::new().id("media"));

        assert_eq!(
            handle.css(),
            ".a {\n  display: block;\n}\n@media (max-width: 600px) {\n  .a {\n    display: none;\n  }\n}\n"
        );
    }

    #[test]
    fn test_top_level_at_rules() {
        let engine = CssEngine::default();
        let styles = StyleMap::from_value(serde_json::json!({
            "@import": "url(base.css)",
            "@media print": { ".a": { "display": "none" } },
            "@font-face": { "fontFamily": "Mono", "src": "url(mono.woff)" },
            "display": "block"
        }))
        .unwrap();
        let handle = engine.create(
            &styles,
            &Options::new().id("at").hash_selectors(true).minify(true),
        );

        let a = handle.selectors().get("a").unwrap().to_string();
        assert_eq!(
            handle.css(),
            format!(
                "@import url(base.css);@media print{{.{}{{display:none}}}}@font-face{{font-family:Mono;src:url(mono.woff)}}",
                a
            )
        );
    }

    #[test]
    fn test_fallback_values_repeat_property() {
        let engine = CssEngine::default();
        let styles = StyleMap::from_value(serde_json::json!({
            ".row": { "display": ["-webkit-box", "flex"] }
        }))
        .unwrap();
        let handle = engine.create(&styles, &Options::new().id("row").minify(true));

        assert_eq!(handle.css(), ".row{display:-webkit-box;display:flex}");
    }

    #[test]
    fn test_generated_id_without_explicit_id() {
        let engine = CssEngine::default();
        let handle = engine.create(&styles(), &Options::new());
        assert!(handle.id().starts_with("sheet_"));
    }
}
