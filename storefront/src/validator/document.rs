//! Parsed HTML documents
//!
//! Wraps a `scraper` tree together with the original source so rules can
//! query elements and findings can point back at a line.

use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Attributes worth showing when describing an element, in display order
const DESCRIBE_ATTRS: &[&str] = &[
    "id", "name", "type", "property", "rel", "src", "href", "class",
];

/// Longest attribute value shown in a locator
const MAX_ATTR_CHARS: usize = 40;

/// Comments, raw-text `<script>`/`<style>` blocks, and opening tags
const TAG_PATTERN: &str = r"(?is)<!--.*?-->|<(script|style)\b[^>]*>.*?</(?:script|style)\s*>|<([a-z][a-z0-9-]*)[\s/>]";

/// Where in a file a finding points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    /// 1-based line of the element's opening tag, when it could be found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Short element description, e.g. `<img src="hero.jpg">`
    pub element: String,
}

/// One HTML file, parsed
pub struct Document {
    path: PathBuf,
    source: String,
    html: Html,
    tag_offsets: OnceLock<HashMap<String, Vec<usize>>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("bytes", &self.source.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parse raw file contents
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the bytes are not UTF-8
    /// or the file holds no markup at all. The HTML parser itself recovers
    /// from any malformed markup.
    pub fn parse(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self, String> {
        let mut source =
            String::from_utf8(bytes).map_err(|e| format!("file is not valid UTF-8 ({e})"))?;
        if source.starts_with('\u{feff}') {
            source.remove(0);
        }
        if source.trim().is_empty() {
            return Err("document is empty".to_string());
        }

        let html = Html::parse_document(&source);
        Ok(Self {
            path: path.into(),
            source,
            html,
            tag_offsets: OnceLock::new(),
        })
    }

    /// Path of the file, relative to the template directory
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original markup
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed tree
    #[must_use]
    pub const fn html(&self) -> &Html {
        &self.html
    }

    /// Every element in document order
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    /// Elements with the given (lowercase) tag name, in document order
    pub fn elements_named<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = ElementRef<'s>> + 's {
        self.elements().filter(move |el| el.value().name() == name)
    }

    /// `<meta>` content keyed by `name` or `property`, ignoring blank values
    #[must_use]
    pub fn meta_content(&self, key_attr: &str, key: &str) -> Option<&str> {
        self.elements_named("meta")
            .find(|el| {
                el.value()
                    .attr(key_attr)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(key))
            })
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }

    /// The `<title>` inside `<head>`, if any
    #[must_use]
    pub fn head_title(&self) -> Option<ElementRef<'_>> {
        self.elements_named("title")
            .find(|el| has_ancestor(*el, "head"))
    }

    /// Locator for an element: description plus best-effort line number
    #[must_use]
    pub fn locate(&self, element: ElementRef<'_>) -> Locator {
        Locator {
            line: self.line_of(element),
            element: describe(element),
        }
    }

    /// Line of the element's opening tag
    ///
    /// The element is matched to the n-th `<name` occurrence in the source,
    /// where n is its position among same-named elements. Tags inside
    /// comments or script and style bodies are not counted. Elements the
    /// parser synthesized (an implied `<body>`) have no line.
    fn line_of(&self, element: ElementRef<'_>) -> Option<usize> {
        let name = element.value().name();
        let index = self
            .elements_named(name)
            .position(|candidate| candidate.id() == element.id())?;

        let offset = *self
            .tag_offsets()
            .get(&name.to_ascii_lowercase())?
            .get(index)?;
        Some(self.source[..offset].matches('\n').count() + 1)
    }

    /// Byte offsets of opening tags in the source, keyed by lowercase name
    fn tag_offsets(&self) -> &HashMap<String, Vec<usize>> {
        self.tag_offsets.get_or_init(|| {
            let mut offsets: HashMap<String, Vec<usize>> = HashMap::new();
            let Some(pattern) = tag_pattern() else {
                return offsets;
            };
            for caps in pattern.captures_iter(&self.source) {
                let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
                    continue;
                };
                offsets
                    .entry(name.as_str().to_ascii_lowercase())
                    .or_default()
                    .push(name.start() - 1);
            }
            offsets
        })
    }
}

fn tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TAG_PATTERN).ok()).as_ref()
}

/// Whether any ancestor of `element` has the given tag name
#[must_use]
pub fn has_ancestor(element: ElementRef<'_>, name: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == name)
}

/// Whitespace-collapsed text content
#[must_use]
pub fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Attribute present with a non-blank value
#[must_use]
pub fn has_value(element: ElementRef<'_>, attr: &str) -> bool {
    element
        .value()
        .attr(attr)
        .is_some_and(|value| !value.trim().is_empty())
}

fn describe(element: ElementRef<'_>) -> String {
    let value = element.value();
    let mut out = format!("<{}", value.name());
    for attr in DESCRIBE_ATTRS {
        if let Some(v) = value.attr(attr) {
            let shown: String = v.chars().take(MAX_ATTR_CHARS).collect();
            let ellipsis = if v.chars().count() > MAX_ATTR_CHARS { "…" } else { "" };
            out.push_str(&format!(" {attr}=\"{shown}{ellipsis}\""));
        }
    }
    out.push('>');
    out
}
