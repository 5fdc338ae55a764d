//! Page-weight and loading rules

use super::seo::rel_contains;
use super::{rule_meta, Document, Rule, Violation};
use crate::config::ValidationSettings;
use crate::validator::document::has_ancestor;
use crate::validator::{Category, Severity};

pub(super) fn rules(settings: &ValidationSettings) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ImgLazy {
            eager_budget: settings.eager_image_budget,
        }),
        Box::new(RenderBlockingScript),
        Box::new(InlineBlockSize {
            limit: settings.inline_block_limit_bytes,
        }),
        Box::new(StylesheetInBody),
        Box::new(DocumentSize {
            max: settings.max_document_bytes,
        }),
    ]
}

struct ImgLazy {
    eager_budget: usize,
}

impl Rule for ImgLazy {
    rule_meta!("perf/img-lazy", Category::Performance, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements_named("img")
            .skip(self.eager_budget)
            .filter(|img| img.value().attr("loading").is_none())
            .map(|img| {
                Violation::at(
                    doc,
                    img,
                    "below-the-fold image has no loading attribute (add loading=\"lazy\")",
                )
            })
            .collect()
    }
}

struct RenderBlockingScript;

impl Rule for RenderBlockingScript {
    rule_meta!("perf/render-blocking-script", Category::Performance, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements_named("script")
            .filter(|script| {
                let attrs = script.value();
                attrs.attr("src").is_some()
                    && attrs.attr("defer").is_none()
                    && attrs.attr("async").is_none()
                    && !attrs
                        .attr("type")
                        .is_some_and(|t| t.trim().eq_ignore_ascii_case("module"))
                    && has_ancestor(*script, "head")
            })
            .map(|script| {
                Violation::at(
                    doc,
                    script,
                    "script in <head> blocks rendering (add defer or async)",
                )
            })
            .collect()
    }
}

struct InlineBlockSize {
    limit: usize,
}

impl Rule for InlineBlockSize {
    rule_meta!("perf/inline-block-size", Category::Performance, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements()
            .filter(|el| match el.value().name() {
                "style" => true,
                "script" => el.value().attr("src").is_none(),
                _ => false,
            })
            .filter_map(|el| {
                let bytes: usize = el.text().map(str::len).sum();
                (bytes > self.limit).then(|| {
                    Violation::at(
                        doc,
                        el,
                        format!(
                            "inline <{}> is {bytes} bytes (limit {}); move it to an external file",
                            el.value().name(),
                            self.limit
                        ),
                    )
                })
            })
            .collect()
    }
}

struct StylesheetInBody;

impl Rule for StylesheetInBody {
    rule_meta!("perf/stylesheet-in-body", Category::Performance, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements_named("link")
            .filter(|link| {
                link.value()
                    .attr("rel")
                    .is_some_and(|rel| rel_contains(rel, "stylesheet"))
                    && has_ancestor(*link, "body")
            })
            .map(|link| Violation::at(doc, link, "stylesheet loaded inside <body>; move it to <head>"))
            .collect()
    }
}

struct DocumentSize {
    max: usize,
}

impl Rule for DocumentSize {
    rule_meta!("perf/document-size", Category::Performance, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let size = doc.source().len();
        if size > self.max {
            vec![Violation::new(format!(
                "document is {:.1} KiB (limit {:.1} KiB)",
                kib(size),
                kib(self.max)
            ))]
        } else {
            Vec::new()
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn kib(bytes: usize) -> f64 {
    bytes as f64 / 1024.0
}
