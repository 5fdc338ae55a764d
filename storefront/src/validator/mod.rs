//! Rule-based template validation
//!
//! Parses every HTML file in a template and runs the rule catalog over it.
//! Rule violations are data: they come back as [`ValidationFinding`]s in a
//! [`ValidationReport`]. Only structural failures (unknown template,
//! unreadable directory or file) are returned as errors.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront::config::StorefrontConfig;
//! use storefront::registry::TemplateRegistry;
//! use storefront::validator::{Category, Validator};
//!
//! # fn main() -> storefront::Result<()> {
//! let config = StorefrontConfig::load()?;
//! let registry = TemplateRegistry::load(&config.templates)?;
//! let validator = Validator::new(&registry, &config.validation);
//!
//! let report = validator.validate("landing-product", Some(&[Category::Seo]))?;
//! for finding in &report.findings {
//!     println!("{} {}: {}", finding.rule_id, finding.file.display(), finding.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ValidationSettings;
use crate::error::{Result, StorefrontError};
use crate::registry::TemplateRegistry;
pub use document::{Document, Locator};
pub use rules::{Rule, RuleCatalog, Violation};

/// Rule id used for files that could not be parsed
pub const PARSE_RULE_ID: &str = "parse/unreadable-document";

/// Extensions treated as HTML documents
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Rule category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Search-engine visibility
    Seo,
    /// Assistive-technology support
    Accessibility,
    /// Page weight and loading behavior
    Performance,
    /// Small-screen rendering
    Mobile,
    /// General markup hygiene
    BestPractices,
}

impl Category {
    /// Every category, in catalog order
    pub const ALL: [Self; 5] = [
        Self::Seo,
        Self::Accessibility,
        Self::Performance,
        Self::Mobile,
        Self::BestPractices,
    ];

    /// Identifier used on the command line and in structured output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seo => "seo",
            Self::Accessibility => "accessibility",
            Self::Performance => "performance",
            Self::Mobile => "mobile",
            Self::BestPractices => "best-practices",
        }
    }

    /// Heading used in human-readable reports
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Seo => "SEO",
            Self::Accessibility => "Accessibility",
            Self::Performance => "Performance",
            Self::Mobile => "Mobile",
            Self::BestPractices => "Best Practices",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.as_str() == wanted
                    || (wanted == "a11y" && *category == Self::Accessibility)
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Finding severity; errors sort before warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural problem; fails validation
    Error,
    /// Heuristic problem; reported but passes
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// One rule violation in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    /// Id of the rule that produced the finding
    pub rule_id: String,
    /// Category of that rule
    pub category: Category,
    /// Severity of that rule
    pub severity: Severity,
    /// File path, relative to the template directory
    pub file: PathBuf,
    /// Element and line, for element-level findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<Locator>,
    /// Human-readable message
    pub message: String,
}

/// A document the validator looked at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    /// File path, relative to the template directory
    pub file: PathBuf,
    /// Whether the file parsed and the rules ran against it
    pub parsed: bool,
}

/// Result of validating one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Template that was validated
    pub template_id: String,
    /// Documents examined, sorted by path
    pub documents: Vec<DocumentOutcome>,
    /// Ids of the rules that were applied, in catalog order
    pub rules_applied: Vec<String>,
    /// Findings ordered by file, then rule, then position in the file
    pub findings: Vec<ValidationFinding>,
}

/// Error and warning counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// Findings with [`Severity::Error`]
    pub errors: usize,
    /// Findings with [`Severity::Warning`]
    pub warnings: usize,
}

impl SeverityCounts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
    }
}

/// Counts derived from a report's findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Total error findings
    pub errors: usize,
    /// Total warning findings
    pub warnings: usize,
    /// (document, rule) pairs that produced no finding
    pub passed: usize,
    /// Counts per category; categories without findings are omitted
    pub by_category: BTreeMap<Category, SeverityCounts>,
}

impl ValidationReport {
    /// Derive summary counts from the findings
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut totals = SeverityCounts::default();
        let mut by_category: BTreeMap<Category, SeverityCounts> = BTreeMap::new();
        for finding in &self.findings {
            totals.record(finding.severity);
            by_category
                .entry(finding.category)
                .or_default()
                .record(finding.severity);
        }

        let parsed = self.documents.iter().filter(|d| d.parsed).count();
        let checks = parsed * self.rules_applied.len();
        let failed: BTreeSet<(&Path, &str)> = self
            .findings
            .iter()
            .filter(|f| f.rule_id != PARSE_RULE_ID)
            .map(|f| (f.file.as_path(), f.rule_id.as_str()))
            .collect();

        Summary {
            errors: totals.errors,
            warnings: totals.warnings,
            passed: checks.saturating_sub(failed.len()),
            by_category,
        }
    }

    /// Whether any finding is an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}

/// Runs the rule catalog over templates
#[derive(Debug)]
pub struct Validator<'a> {
    registry: &'a TemplateRegistry,
    catalog: RuleCatalog,
}

impl<'a> Validator<'a> {
    /// Create a validator with the built-in rule catalog
    #[must_use]
    pub fn new(registry: &'a TemplateRegistry, settings: &ValidationSettings) -> Self {
        Self::with_catalog(registry, RuleCatalog::builtin(settings))
    }

    /// Create a validator with a custom rule catalog
    #[must_use]
    pub const fn with_catalog(registry: &'a TemplateRegistry, catalog: RuleCatalog) -> Self {
        Self { registry, catalog }
    }

    /// The rules this validator applies
    #[must_use]
    pub const fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Validate a registered template
    ///
    /// `filter` restricts the rules to the given categories; `None` (or an
    /// empty slice) applies every rule. Parse failures are always reported.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] for an unknown template id and
    /// [`StorefrontError::Filesystem`] when the template directory or one of
    /// its HTML files cannot be read.
    pub fn validate(
        &self,
        template_id: &str,
        filter: Option<&[Category]>,
    ) -> Result<ValidationReport> {
        let template = self.registry.resolve(template_id)?;
        self.validate_dir(template_id, &template.path, filter)
    }

    /// Validate an arbitrary directory under the given id
    ///
    /// Used for generated stores, which live outside the registry root.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Filesystem`] when the directory or one of
    /// its HTML files cannot be read.
    pub fn validate_dir(
        &self,
        template_id: &str,
        dir: &Path,
        filter: Option<&[Category]>,
    ) -> Result<ValidationReport> {
        let rules: Vec<&dyn Rule> = self.catalog.filtered(filter).collect();
        let mut report = ValidationReport {
            template_id: template_id.to_string(),
            documents: Vec::new(),
            rules_applied: rules.iter().map(|rule| rule.id().to_string()).collect(),
            findings: Vec::new(),
        };

        for relative in html_files(dir)? {
            let path = dir.join(&relative);
            let bytes =
                fs::read(&path).map_err(|e| StorefrontError::filesystem("failed to read", &path, e))?;

            let document = match Document::parse(relative.clone(), bytes) {
                Ok(document) => document,
                Err(reason) => {
                    warn!(file = %path.display(), %reason, "skipping unparseable document");
                    report.findings.push(ValidationFinding {
                        rule_id: PARSE_RULE_ID.to_string(),
                        category: Category::BestPractices,
                        severity: Severity::Error,
                        file: relative.clone(),
                        locator: None,
                        message: reason,
                    });
                    report.documents.push(DocumentOutcome {
                        file: relative,
                        parsed: false,
                    });
                    continue;
                }
            };

            for rule in &rules {
                for violation in rule.check(&document) {
                    report.findings.push(ValidationFinding {
                        rule_id: rule.id().to_string(),
                        category: rule.category(),
                        severity: rule.severity(),
                        file: relative.clone(),
                        locator: violation.locator,
                        message: violation.message,
                    });
                }
            }
            report.documents.push(DocumentOutcome {
                file: relative,
                parsed: true,
            });
        }

        let summary = report.summary();
        debug!(
            template = %template_id,
            documents = report.documents.len(),
            errors = summary.errors,
            warnings = summary.warnings,
            "validation finished"
        );

        Ok(report)
    }
}

/// HTML files under `dir`, relative to it, sorted by path
fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_html = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|k| k.eq_ignore_ascii_case(ext)));
        if !is_html {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            files.push(relative.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
