//! General markup hygiene rules

use std::collections::HashSet;

use super::{rule_meta, Document, Rule, Violation};
use crate::validator::{Category, Severity};

/// Fragments browsers resolve without a matching element
const IMPLICIT_FRAGMENTS: &[&str] = &["top"];

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(Doctype),
        Box::new(Charset),
        Box::new(InlineHandlers),
        Box::new(ImgAttributes),
        Box::new(EmptyLink),
        Box::new(BrokenAnchor),
    ]
}

struct Doctype;

impl Rule for Doctype {
    rule_meta!("bp/doctype", Category::BestPractices, Severity::Error);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let declared = doc.html().tree.root().children().any(|node| {
            node.value()
                .as_doctype()
                .is_some_and(|doctype| doctype.name().eq_ignore_ascii_case("html"))
        });
        if declared {
            Vec::new()
        } else {
            vec![Violation::new("missing <!DOCTYPE html>")]
        }
    }
}

struct Charset;

impl Rule for Charset {
    rule_meta!("bp/charset", Category::BestPractices, Severity::Error);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let declared = doc.elements_named("meta").any(|meta| {
            let attrs = meta.value();
            let direct = attrs
                .attr("charset")
                .is_some_and(|charset| is_utf8(charset.trim()));
            let http_equiv = attrs
                .attr("http-equiv")
                .is_some_and(|h| h.trim().eq_ignore_ascii_case("content-type"))
                && attrs.attr("content").is_some_and(|content| {
                    content
                        .split(';')
                        .filter_map(|part| part.trim().split_once('='))
                        .any(|(key, value)| {
                            key.trim().eq_ignore_ascii_case("charset") && is_utf8(value.trim())
                        })
                });
            direct || http_equiv
        });
        if declared {
            Vec::new()
        } else {
            vec![Violation::new("missing <meta charset=\"UTF-8\">")]
        }
    }
}

fn is_utf8(label: &str) -> bool {
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}

struct InlineHandlers;

impl Rule for InlineHandlers {
    rule_meta!("bp/inline-handlers", Category::BestPractices, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements()
            .filter_map(|el| {
                let handlers: Vec<&str> = el
                    .value()
                    .attrs()
                    .map(|(name, _)| name)
                    .filter(|name| name.len() > 2 && name.starts_with("on"))
                    .collect();
                (!handlers.is_empty()).then(|| {
                    Violation::at(
                        doc,
                        el,
                        format!(
                            "inline event handler {}; attach listeners from script instead",
                            handlers.join(", ")
                        ),
                    )
                })
            })
            .collect()
    }
}

struct ImgAttributes;

impl Rule for ImgAttributes {
    rule_meta!("bp/img-attributes", Category::BestPractices, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements_named("img")
            .filter_map(|img| {
                let missing: Vec<&str> = ["width", "height", "alt"]
                    .into_iter()
                    .filter(|attr| img.value().attr(attr).is_none())
                    .collect();
                (!missing.is_empty()).then(|| {
                    Violation::at(doc, img, format!("image is missing {}", missing.join(", ")))
                })
            })
            .collect()
    }
}

struct EmptyLink;

impl Rule for EmptyLink {
    rule_meta!("bp/empty-link", Category::BestPractices, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements_named("a")
            .filter(|a| a.value().attr("href").is_some_and(|href| href.trim().is_empty()))
            .map(|a| Violation::at(doc, a, "link has an empty href"))
            .collect()
    }
}

struct BrokenAnchor;

impl Rule for BrokenAnchor {
    rule_meta!("bp/broken-anchor", Category::BestPractices, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let targets: HashSet<&str> = doc
            .elements()
            .flat_map(|el| {
                let id = el.value().attr("id");
                let name = (el.value().name() == "a")
                    .then(|| el.value().attr("name"))
                    .flatten();
                id.into_iter().chain(name)
            })
            .collect();

        doc.elements_named("a")
            .filter_map(|a| {
                let fragment = a.value().attr("href")?.trim().strip_prefix('#')?;
                let missing = !fragment.is_empty()
                    && !IMPLICIT_FRAGMENTS.contains(&fragment)
                    && !targets.contains(fragment);
                missing.then(|| {
                    Violation::at(doc, a, format!("link target #{fragment} does not exist"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::check;
    use super::*;

    #[test]
    fn test_doctype() {
        assert!(check(&Doctype, "<!DOCTYPE html><html></html>").is_empty());
        assert!(check(&Doctype, "<!doctype HTML><html></html>").is_empty());
        assert_eq!(check(&Doctype, "<html><body></body></html>").len(), 1);
    }

    #[test]
    fn test_charset() {
        assert!(check(&Charset, r#"<head><meta charset="utf-8"></head>"#).is_empty());
        assert!(check(
            &Charset,
            r#"<head><meta http-equiv="Content-Type" content="text/html; charset=UTF-8"></head>"#
        )
        .is_empty());
        assert_eq!(check(&Charset, r#"<head><meta charset="iso-8859-1"></head>"#).len(), 1);
        assert_eq!(check(&Charset, "<head></head>").len(), 1);
    }

    #[test]
    fn test_inline_handlers_one_per_element() {
        let source = r#"<body onload="init()">
<button onclick="buy()" onmouseover="hint()">Buy</button>
<div data-on="x" on="y">plain</div>
</body>"#;
        let found = check(&InlineHandlers, source);
        assert_eq!(found.len(), 2);
        assert!(found[1].message.contains("onclick"));
        assert!(found[1].message.contains("onmouseover"));
        assert_eq!(found[1].locator.as_ref().unwrap().line, Some(2));
    }

    #[test]
    fn test_img_attributes() {
        let found = check(
            &ImgAttributes,
            r#"<img src="a.png" alt="A" width="10" height="10"><img src="b.png" width="10">"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "image is missing height, alt");
    }

    #[test]
    fn test_empty_link() {
        let found = check(&EmptyLink, r#"<a href="">x</a><a href=" /shop ">y</a><a>z</a>"#);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_broken_anchor() {
        let source = r##"<body>
<a href="#products">Shop</a>
<a href="#reviews">Reviews</a>
<a href="#top">Top</a>
<a href="#">Nowhere</a>
<a href="/about#team">About</a>
<section id="products"></section>
</body>"##;
        let found = check(&BrokenAnchor, source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "link target #reviews does not exist");
    }
}
