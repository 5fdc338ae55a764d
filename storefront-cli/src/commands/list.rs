//! Template listing command

use anyhow::Result;
use console::style;
use std::process::ExitCode;

use super::Session;

/// Print every registered template
pub struct ListCommand;

impl ListCommand {
    /// Execute the command
    pub fn execute(session: &Session<'_>) -> Result<ExitCode> {
        let templates = session.registry.list_templates();

        if templates.is_empty() {
            println!(
                "{}",
                style(format!(
                    "No templates found under {}",
                    session.registry.root().display()
                ))
                .yellow()
            );
            return Ok(ExitCode::SUCCESS);
        }

        println!("{}", style("Available templates").bold().underlined());
        println!();
        for template in templates {
            println!(
                "  {} {}",
                style(format!("{:<20}", template.id)).cyan().bold(),
                style(&template.display_name).bold()
            );
            if !template.description.is_empty() {
                println!("  {:<20} {}", "", template.description);
            }
            println!(
                "  {:<20} {}",
                "",
                style(format!("{} files", template.file_count())).dim()
            );
        }

        println!();
        println!(
            "Generate one with: {}",
            style("storefront generate <template> <destination> --name \"My Store\"").yellow()
        );

        Ok(ExitCode::SUCCESS)
    }
}
