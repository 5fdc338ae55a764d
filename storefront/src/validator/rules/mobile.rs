//! Mobile rendering rules

use super::{rule_meta, Document, Rule, Violation};
use crate::validator::document::has_ancestor;
use crate::validator::{Category, Severity};

/// Utility-class breakpoint prefixes that indicate a responsive layout
const BREAKPOINTS: &[&str] = &["sm", "md", "lg", "xl", "2xl"];

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(Viewport), Box::new(ResponsiveLayout)]
}

struct Viewport;

impl Rule for Viewport {
    rule_meta!("mobile/viewport", Category::Mobile, Severity::Error);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let viewport = doc.elements_named("meta").find(|meta| {
            meta.value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("viewport"))
        });

        let Some(meta) = viewport else {
            return vec![Violation::new("missing <meta name=\"viewport\">")];
        };

        let content = meta.value().attr("content").unwrap_or_default();
        let normalized: String = content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if normalized.split([',', ';']).any(|part| part == "width=device-width") {
            Vec::new()
        } else {
            vec![Violation::at(
                doc,
                meta,
                format!("viewport does not set width=device-width (content=\"{content}\")"),
            )]
        }
    }
}

struct ResponsiveLayout;

impl Rule for ResponsiveLayout {
    rule_meta!("mobile/responsive-layout", Category::Mobile, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let has_breakpoint_class = doc
            .elements()
            .filter(|el| has_ancestor(*el, "body"))
            .filter_map(|el| el.value().attr("class"))
            .flat_map(str::split_ascii_whitespace)
            .any(is_breakpoint_class);

        let has_media_query = doc
            .elements_named("style")
            .any(|style| style.text().any(|chunk| chunk.contains("@media")));

        if has_breakpoint_class || has_media_query {
            Vec::new()
        } else {
            vec![Violation::new(
                "no responsive breakpoints found (sm:/md:/lg:/xl: classes or @media queries)",
            )]
        }
    }
}

/// `md:flex`, `hover:lg:block` and similar variant chains
fn is_breakpoint_class(class: &str) -> bool {
    let mut variants = class.split(':');
    variants.next_back();
    variants.any(|variant| BREAKPOINTS.contains(&variant))
}
