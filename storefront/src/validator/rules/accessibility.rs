//! Accessibility rules

use scraper::ElementRef;
use std::collections::HashSet;

use super::{rule_meta, Document, Rule, Violation};
use crate::validator::document::{has_ancestor, has_value, text_of};
use crate::validator::{Category, Severity};

/// `<input>` types that never need a label
const UNLABELLED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// Landmark elements and the ARIA role that stands in for each
const LANDMARKS: &[(&str, &str)] = &[
    ("header", "banner"),
    ("nav", "navigation"),
    ("main", "main"),
    ("footer", "contentinfo"),
];

pub(super) fn rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ImgAlt),
        Box::new(FormLabel),
        Box::new(Landmarks),
        Box::new(AccessibleName),
    ]
}

struct ImgAlt;

impl Rule for ImgAlt {
    rule_meta!("a11y/img-alt", Category::Accessibility, Severity::Error);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements_named("img")
            .filter(|img| img.value().attr("alt").is_none())
            .map(|img| {
                Violation::at(
                    doc,
                    img,
                    "image has no alt attribute (use alt=\"\" for decorative images)",
                )
            })
            .collect()
    }
}

struct FormLabel;

impl Rule for FormLabel {
    rule_meta!("a11y/form-label", Category::Accessibility, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        let label_targets: HashSet<&str> = doc
            .elements_named("label")
            .filter_map(|label| label.value().attr("for"))
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .collect();

        doc.elements()
            .filter(|el| needs_label(*el))
            .filter(|el| !is_labelled(*el, &label_targets))
            .map(|el| {
                Violation::at(
                    doc,
                    el,
                    format!("<{}> has no associated label", el.value().name()),
                )
            })
            .collect()
    }
}

fn needs_label(element: ElementRef<'_>) -> bool {
    match element.value().name() {
        "select" | "textarea" => true,
        "input" => {
            let kind = element.value().attr("type").unwrap_or("text").trim();
            !UNLABELLED_INPUT_TYPES
                .iter()
                .any(|skip| skip.eq_ignore_ascii_case(kind))
        }
        _ => false,
    }
}

fn is_labelled(element: ElementRef<'_>, label_targets: &HashSet<&str>) -> bool {
    has_value(element, "aria-label")
        || has_value(element, "aria-labelledby")
        || has_value(element, "title")
        || has_ancestor(element, "label")
        || element
            .value()
            .attr("id")
            .is_some_and(|id| label_targets.contains(id.trim()))
}

struct Landmarks;

impl Rule for Landmarks {
    rule_meta!("a11y/landmarks", Category::Accessibility, Severity::Warning);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        LANDMARKS
            .iter()
            .filter(|(tag, role)| {
                !doc.elements().any(|el| {
                    el.value().name() == *tag
                        || el
                            .value()
                            .attr("role")
                            .is_some_and(|r| r.trim().eq_ignore_ascii_case(role))
                })
            })
            .map(|(tag, role)| {
                Violation::new(format!(
                    "no <{tag}> landmark (or element with role=\"{role}\")"
                ))
            })
            .collect()
    }
}

struct AccessibleName;

impl Rule for AccessibleName {
    rule_meta!("a11y/accessible-name", Category::Accessibility, Severity::Error);

    fn check(&self, doc: &Document) -> Vec<Violation> {
        doc.elements()
            .filter(|el| match el.value().name() {
                "button" => true,
                "a" => el.value().attr("href").is_some(),
                _ => false,
            })
            .filter(|el| !has_accessible_name(*el))
            .map(|el| {
                let what = if el.value().name() == "button" {
                    "button"
                } else {
                    "link"
                };
                Violation::at(doc, el, format!("{what} has no accessible name"))
            })
            .collect()
    }
}

fn has_accessible_name(element: ElementRef<'_>) -> bool {
    !text_of(element).is_empty()
        || has_value(element, "aria-label")
        || has_value(element, "aria-labelledby")
        || has_value(element, "title")
        || element
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|child| child.value().name() == "img" && has_value(child, "alt"))
}
