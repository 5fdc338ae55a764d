//! Template validation command

use anyhow::Result;
use clap::Args;
use console::style;
use std::process::ExitCode;
use storefront::report::{format, format_all};
use storefront::{Category, ReportStyle, ValidationReport, Validator};
use tracing::info;

use super::Session;

/// Check one template, or every registered template
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Template to validate; all templates when omitted
    pub template_id: Option<String>,

    /// Only run rules in these categories: seo, accessibility (a11y),
    /// performance, mobile, best-practices
    #[arg(long = "category", value_name = "CATEGORY", value_delimiter = ',')]
    pub categories: Vec<Category>,

    /// Output format: human or structured (JSON)
    #[arg(long, default_value = "human")]
    pub format: ReportStyle,
}

impl ValidateCommand {
    /// Execute the command
    ///
    /// Exits with status 1 when any report contains an error finding.
    pub fn execute(&self, session: &Session<'_>) -> Result<ExitCode> {
        let validator = Validator::new(session.registry, &session.config.validation);
        let filter = (!self.categories.is_empty()).then_some(self.categories.as_slice());

        let ids = match &self.template_id {
            Some(id) => vec![id.clone()],
            None => session.registry.ids(),
        };
        if ids.is_empty() {
            eprintln!(
                "{}",
                style(format!(
                    "No templates found under {}",
                    session.registry.root().display()
                ))
                .yellow()
                .for_stderr()
            );
            return Ok(ExitCode::SUCCESS);
        }

        let reports = ids
            .iter()
            .map(|id| validator.validate(id, filter))
            .collect::<storefront::Result<Vec<ValidationReport>>>()?;

        let color = console::colors_enabled();
        let rendered = match reports.as_slice() {
            [single] => format(single, self.format, color)?,
            many => format_all(many, self.format, color)?,
        };
        print!("{rendered}");
        if !rendered.ends_with('\n') {
            println!();
        }

        let failed = reports.iter().filter(|r| r.has_errors()).count();
        info!(templates = reports.len(), failed, "validation complete");

        if any_errors(&reports) {
            Ok(ExitCode::FAILURE)
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn any_errors(reports: &[ValidationReport]) -> bool {
    reports.iter().any(ValidationReport::has_errors)
}
