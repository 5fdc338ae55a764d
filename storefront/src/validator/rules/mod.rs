//! Built-in rule catalog
//!
//! Every rule is an independent, side-effect free check over one parsed
//! [`Document`]. The catalog is built once from [`ValidationSettings`] and
//! fixes the order findings are reported in.

mod accessibility;
mod best_practices;
mod mobile;
mod performance;
mod seo;

use scraper::ElementRef;

use super::document::{Document, Locator};
use super::{Category, Severity};
use crate::config::ValidationSettings;

/// A rule violation before it is tied to a rule and file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Human-readable description of the problem
    pub message: String,
    /// Offending element, for element-level violations
    pub locator: Option<Locator>,
}

impl Violation {
    /// Document-level violation
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locator: None,
        }
    }

    /// Violation pointing at an element
    pub fn at(doc: &Document, element: ElementRef<'_>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locator: Some(doc.locate(element)),
        }
    }
}

/// One check in the catalog
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `seo/title`
    fn id(&self) -> &'static str;

    /// Category the rule belongs to
    fn category(&self) -> Category;

    /// Severity of every violation this rule reports
    fn severity(&self) -> Severity;

    /// Check a document, returning violations in document order
    fn check(&self, doc: &Document) -> Vec<Violation>;
}

/// Ordered, read-only collection of rules
pub struct RuleCatalog {
    rules: Vec<Box<dyn Rule>>,
}

impl std::fmt::Debug for RuleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.id()))
            .finish()
    }
}

impl RuleCatalog {
    /// Every built-in rule, with thresholds taken from `settings`
    #[must_use]
    pub fn builtin(settings: &ValidationSettings) -> Self {
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();
        rules.extend(seo::rules(settings));
        rules.extend(accessibility::rules());
        rules.extend(performance::rules(settings));
        rules.extend(mobile::rules());
        rules.extend(best_practices::rules());
        Self { rules }
    }

    /// Build a catalog from an explicit rule list
    #[must_use]
    pub fn from_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// All rules, in catalog order
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Rules whose category is in `filter`; `None` or an empty filter keeps all
    pub fn filtered<'s>(
        &'s self,
        filter: Option<&'s [Category]>,
    ) -> impl Iterator<Item = &'s dyn Rule> + 's {
        self.rules().filter(move |rule| match filter {
            Some(categories) if !categories.is_empty() => categories.contains(&rule.category()),
            _ => true,
        })
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog holds no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Declares a unit-struct rule with fixed metadata
macro_rules! rule_meta {
    ($id:literal, $category:expr, $severity:expr) => {
        fn id(&self) -> &'static str {
            $id
        }

        fn category(&self) -> $crate::validator::Category {
            $category
        }

        fn severity(&self) -> $crate::validator::Severity {
            $severity
        }
    };
}
use rule_meta;


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_are_unique_and_prefixed() {
        let catalog = RuleCatalog::builtin(&ValidationSettings::default());
        let mut seen = HashSet::new();
        for rule in catalog.rules() {
            assert!(seen.insert(rule.id()), "duplicate rule id {}", rule.id());
            let prefix = match rule.category() {
                Category::Seo => "seo/",
                Category::Accessibility => "a11y/",
                Category::Performance => "perf/",
                Category::Mobile => "mobile/",
                Category::BestPractices => "bp/",
            };
            assert!(rule.id().starts_with(prefix), "{} in wrong category", rule.id());
        }
        assert_eq!(catalog.len(), 27);
    }

    #[test]
    fn test_catalog_order_groups_categories() {
        let catalog = RuleCatalog::builtin(&ValidationSettings::default());
        let categories: Vec<Category> = catalog.rules().map(|r| r.category()).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
    }

    #[test]
    fn test_filter() {
        let catalog = RuleCatalog::builtin(&ValidationSettings::default());
        let mobile: Vec<&str> = catalog
            .filtered(Some(&[Category::Mobile]))
            .map(|r| r.id())
            .collect();
        assert_eq!(mobile, vec!["mobile/viewport", "mobile/responsive-layout"]);

        assert_eq!(catalog.filtered(Some(&[])).count(), catalog.len());
        assert_eq!(catalog.filtered(None).count(), catalog.len());
    }

    #[test]
    fn test_structural_rules_are_errors() {
        let catalog = RuleCatalog::builtin(&ValidationSettings::default());
        let errors: Vec<&str> = catalog
            .rules()
            .filter(|r| r.severity() == Severity::Error)
            .map(|r| r.id())
            .collect();
        assert_eq!(
            errors,
            vec![
                "seo/title",
                "seo/h1-missing",
                "a11y/img-alt",
                "a11y/accessible-name",
                "mobile/viewport",
                "bp/doctype",
                "bp/charset",
            ]
        );
    }
}
