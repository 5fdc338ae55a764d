//! Search-engine visibility rules

use super::{rule_meta, Document, Rule, Violation};
use crate::config::ValidationSettings;
use crate::validator::document::{has_value, text_of};
use crate::validator::{Category, Severity};

/// Open Graph properties every page should declare
const OPEN_GRAPH_PROPERTIES: &[&str] = &["og:title", "og:description", "og:image"];

pub(super) fn rules(settings: &ValidationSettings) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(Title),
        Box::new(TitleLength {
            min: settings.title_min_chars,
            max: settings.title_max_chars,
        }),
        Box::new(MetaDescription),
        Box::new(MetaDescriptionLength {
            min: settings.description_min_chars,
        }),
        Box::new(Canonical),
        Box::new(OpenGraph),
        Box::new(H1Missing),
        Box::new(H1Multiple),
        Box::new(HeadingOrder),
        Box::new(HtmlLang),
    ]
}

struct Title;

impl Rule for Title {
    rule_meta!("seo/title", Category::Seo, Severity::Error);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        match doc.head_title() {
            None => vec![Violation::new("missing <title> in <head>")],
            Some(title) if text_of(title).is_empty() => {
                vec![Violation::at(doc, title, "<title> is empty")]
            }
            Some(_) => Vec::new(),
        }
    }
}

struct TitleLength {
    min: usize,
    max: usize,
}

impl Rule for TitleLength {
    rule_meta!("seo/title-length", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let Some(title) = doc.head_title() else {
            return Vec::new();
        };
        let text = text_of(title);
        let chars = text.chars().count();
        if chars == 0 {
            return Vec::new();
        }

        let problem = if chars < self.min {
            "short"
        } else if chars > self.max {
            "long"
        } else {
            return Vec::new();
        };
        vec![Violation::at(
            doc,
            title,
            format!(
                "title is too {problem}: {chars} characters (expected {}-{})",
                self.min, self.max
            ),
        )]
    }
}

struct MetaDescription;

impl Rule for MetaDescription {
    rule_meta!("seo/meta-description", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        if doc.meta_content("name", "description").is_some() {
            Vec::new()
        } else {
            vec![Violation::new("missing or empty <meta name=\"description\">")]
        }
    }
}

struct MetaDescriptionLength {
    min: usize,
}

impl Rule for MetaDescriptionLength {
    rule_meta!("seo/meta-description-length", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        match doc.meta_content("name", "description") {
            Some(description) if description.chars().count() < self.min => {
                vec![Violation::new(format!(
                    "meta description is too short: {} characters (expected at least {})",
                    description.chars().count(),
                    self.min
                ))]
            }
            _ => Vec::new(),
        }
    }
}

struct Canonical;

impl Rule for Canonical {
    rule_meta!("seo/canonical", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let found = doc.elements_named("link").any(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel_contains(rel, "canonical"))
                && has_value(link, "href")
        });
        if found {
            Vec::new()
        } else {
            vec![Violation::new("missing <link rel=\"canonical\" href=\"...\">")]
        }
    }
}

struct OpenGraph;

impl Rule for OpenGraph {
    rule_meta!("seo/open-graph", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        OPEN_GRAPH_PROPERTIES
            .iter()
            .filter(|property| doc.meta_content("property", property).is_none())
            .map(|property| {
                Violation::new(format!(
                    "missing Open Graph tag <meta property=\"{property}\">"
                ))
            })
            .collect()
    }
}

struct H1Missing;

impl Rule for H1Missing {
    rule_meta!("seo/h1-missing", Category::Seo, Severity::Error);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        if doc.elements_named("h1").next().is_some() {
            Vec::new()
        } else {
            vec![Violation::new("page has no <h1> heading")]
        }
    }
}

struct H1Multiple;

impl Rule for H1Multiple {
    rule_meta!("seo/h1-multiple", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements_named("h1")
            .skip(1)
            .map(|h1| Violation::at(doc, h1, "additional <h1>; a page should have exactly one"))
            .collect()
    }
}

struct HeadingOrder;

impl Rule for HeadingOrder {
    rule_meta!("seo/heading-order", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let mut previous = 1;
        let mut violations = Vec::new();
        for element in doc.elements() {
            let Some(level) = heading_level(element.value().name()) else {
                continue;
            };
            if level > previous + 1 {
                violations.push(Violation::at(
                    doc,
                    element,
                    format!("heading level skipped: <h{level}> follows <h{previous}>"),
                ));
            }
            previous = level;
        }
        violations
    }
}

struct HtmlLang;

impl Rule for HtmlLang {
    rule_meta!("seo/html-lang", Category::Seo, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let root = doc.html().root_element();
        if has_value(root, "lang") {
            Vec::new()
        } else {
            vec![Violation::new("<html> has no lang attribute")]
        }
    }
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Whether a space-separated `rel` value contains `token`
pub(super) fn rel_contains(rel: &str, token: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|part| part.eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::check;
    use super::*;

    const COMPLETE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Minimal Store | Everyday Goods</title>
  <meta name="description" content="Thoughtfully made everyday goods, shipped free on orders over fifty dollars.">
  <link rel="canonical" href="https://yourstore.com/">
  <meta property="og:title" content="Minimal Store">
  <meta property="og:description" content="Everyday goods">
  <meta property="og:image" content="https://yourstore.com/og.png">
</head>
<body><h1>Everyday Goods</h1><h2>Featured</h2></body>
</html>"#;

    fn all_seo(source: &str) -> Vec<(&'static str, Violation)> {
        rules(&ValidationSettings::default())
            .iter()
            .flat_map(|rule| {
                let id = rule.id();
                check(rule.as_ref(), source).into_iter().map(move |v| (id, v))
            })
            .collect()
    }

    #[test]
    fn test_complete_head_passes_every_seo_rule() {
        assert_eq!(all_seo(COMPLETE_HEAD), Vec::new());
    }

    #[test]
    fn test_missing_title_is_single_error() {
        let source = COMPLETE_HEAD.replace("<title>Minimal Store | Everyday Goods</title>", "");
        let found = all_seo(&source);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "seo/title");
    }

    #[test]
    fn test_empty_title() {
        let found = check(&Title, "<html><head><title>  </title></head></html>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "<title> is empty");
        assert!(found[0].locator.is_some());
    }

    #[test]
    fn test_title_length_bounds() {
        let rule = TitleLength { min: 10, max: 70 };
        assert_eq!(check(&rule, "<head><title>Shop</title></head>").len(), 1);
        let long = format!("<head><title>{}</title></head>", "a".repeat(71));
        assert!(check(&rule, &long)[0].message.contains("too long"));
        assert!(check(&rule, "<head><title>Just Right Title</title></head>").is_empty());
    }

    #[test]
    fn test_short_description() {
        let rule = MetaDescriptionLength { min: 50 };
        let found = check(&rule, r#"<head><meta name="description" content="Too short"></head>"#);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("9 characters"));
        assert!(check(&rule, "<head></head>").is_empty());
    }

    #[test]
    fn test_canonical_requires_href() {
        assert_eq!(check(&Canonical, r#"<head><link rel="canonical"></head>"#).len(), 1);
        assert!(check(&Canonical, r#"<head><link rel="Canonical" href="/"></head>"#).is_empty());
    }

    #[test]
    fn test_open_graph_one_finding_per_missing_tag() {
        let found = check(
            &OpenGraph,
            r#"<head><meta property="og:title" content="Store"></head>"#,
        );
        let messages: Vec<&str> = found.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("og:description"));
        assert!(messages[1].contains("og:image"));
    }

    #[test]
    fn test_h1_rules() {
        assert_eq!(check(&H1Missing, "<body><h2>x</h2></body>").len(), 1);
        let found = check(&H1Multiple, "<body><h1>a</h1><h1>b</h1><h1>c</h1></body>");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_heading_order() {
        assert!(check(&HeadingOrder, "<h2>a</h2><h3>b</h3><h2>c</h2><h1>d</h1>").is_empty());

        let found = check(&HeadingOrder, "<h1>a</h1><h2>b</h2><h4>c</h4>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "heading level skipped: <h4> follows <h2>");

        assert_eq!(check(&HeadingOrder, "<h3>first</h3>").len(), 1);
    }

    #[test]
    fn test_html_lang() {
        assert_eq!(check(&HtmlLang, "<html><body></body></html>").len(), 1);
        assert!(check(&HtmlLang, r#"<html lang="en"><body></body></html>"#).is_empty());
    }
}
