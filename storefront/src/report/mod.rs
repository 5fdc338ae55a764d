//! Validation report rendering
//!
//! Turns [`ValidationReport`]s into text. Formatting is pure: it never
//! prints and never decides exit codes.

use console::style;
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::Result;
use crate::validator::{Category, Severity, Summary, ValidationFinding, ValidationReport};

/// Output flavor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportStyle {
    /// Grouped, optionally colorized text for terminals
    #[default]
    Human,
    /// Pretty-printed JSON
    Structured,
}

impl FromStr for ReportStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "structured" | "json" => Ok(Self::Structured),
            other => Err(format!(
                "unknown format '{other}' (expected 'human' or 'structured')"
            )),
        }
    }
}

#[derive(Serialize)]
struct StructuredReport<'a> {
    #[serde(flatten)]
    report: &'a ValidationReport,
    summary: Summary,
    result: &'static str,
}

impl<'a> StructuredReport<'a> {
    fn new(report: &'a ValidationReport) -> Self {
        let summary = report.summary();
        Self {
            result: verdict(summary.errors),
            summary,
            report,
        }
    }
}

/// Render one report
///
/// `color` only affects [`ReportStyle::Human`].
///
/// # Errors
///
/// Returns [`crate::StorefrontError::Serialization`] if JSON encoding fails.
pub fn format(report: &ValidationReport, style: ReportStyle, color: bool) -> Result<String> {
    match style {
        ReportStyle::Human => Ok(human(report, color)),
        ReportStyle::Structured => Ok(serde_json::to_string_pretty(&StructuredReport::new(
            report,
        ))?),
    }
}

/// Render several reports
///
/// Structured output is a single JSON array; human output concatenates the
/// individual reports and, for more than one, appends an overall result.
///
/// # Errors
///
/// Returns [`crate::StorefrontError::Serialization`] if JSON encoding fails.
pub fn format_all(reports: &[ValidationReport], style: ReportStyle, color: bool) -> Result<String> {
    match style {
        ReportStyle::Structured => {
            let all: Vec<StructuredReport<'_>> =
                reports.iter().map(StructuredReport::new).collect();
            Ok(serde_json::to_string_pretty(&all)?)
        }
        ReportStyle::Human => {
            let mut out = reports
                .iter()
                .map(|report| human(report, color))
                .collect::<Vec<_>>()
                .join("\n");

            if reports.len() > 1 {
                let (passed, warnings, errors) = reports
                    .iter()
                    .map(ValidationReport::summary)
                    .fold((0, 0, 0), |(p, w, e), s| {
                        (p + s.passed, w + s.warnings, e + s.errors)
                    });
                let _ = writeln!(
                    out,
                    "\n{}",
                    result_line("Overall", passed, warnings, errors, color)
                );
            }
            Ok(out)
        }
    }
}

fn human(report: &ValidationReport, color: bool) -> String {
    let mut out = String::new();
    let summary = report.summary();

    let _ = writeln!(
        out,
        "{} {}",
        style("Validating").cyan().bold().force_styling(color),
        style(&report.template_id).green().bold().force_styling(color)
    );
    let _ = writeln!(
        out,
        "  {}",
        style(format!(
            "{} documents, {} rules",
            report.documents.len(),
            report.rules_applied.len()
        ))
        .dim()
        .force_styling(color)
    );

    if report.findings.is_empty() {
        let _ = writeln!(
            out,
            "\n  {} no issues found",
            style("✓").green().force_styling(color)
        );
    }

    for category in Category::ALL {
        let in_category: Vec<&ValidationFinding> = report
            .findings
            .iter()
            .filter(|f| f.category == category)
            .collect();
        if in_category.is_empty() {
            continue;
        }

        let _ = writeln!(
            out,
            "\n{}",
            style(category.title()).bold().underlined().force_styling(color)
        );
        for severity in [Severity::Error, Severity::Warning] {
            for finding in in_category.iter().filter(|f| f.severity == severity) {
                write_finding(&mut out, finding, color);
            }
        }
    }

    let _ = writeln!(
        out,
        "\n{}",
        result_line(
            "Result",
            summary.passed,
            summary.warnings,
            summary.errors,
            color
        )
    );
    out
}

fn write_finding(out: &mut String, finding: &ValidationFinding, color: bool) {
    let marker = match finding.severity {
        Severity::Error => style("✗ error  ").red().bold(),
        Severity::Warning => style("! warning").yellow(),
    }
    .force_styling(color);

    let position = match finding.locator.as_ref().and_then(|l| l.line) {
        Some(line) => format!("{}:{line}", finding.file.display()),
        None => finding.file.display().to_string(),
    };

    let _ = writeln!(
        out,
        "  {marker} {} {} {}",
        style(position).bold().force_styling(color),
        style(format!("[{}]", finding.rule_id)).dim().force_styling(color),
        finding.message
    );
    if let Some(locator) = &finding.locator {
        let _ = writeln!(
            out,
            "             {}",
            style(&locator.element).dim().force_styling(color)
        );
    }
}

fn result_line(label: &str, passed: usize, warnings: usize, errors: usize, color: bool) -> String {
    let verdict = match verdict(errors) {
        "PASS" => style("PASS").green().bold(),
        other => style(other).red().bold(),
    }
    .force_styling(color);
    format!("{label}: {verdict} ({passed} passed, {warnings} warnings, {errors} errors)")
}

const fn verdict(errors: usize) -> &'static str {
    if errors == 0 {
        "PASS"
    } else {
        "FAIL"
    }
}
