//! Store generation command

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use storefront::generator::tokens::{CURRENCY, PRIMARY_COLOR, STORE_DOMAIN, STORE_NAME};
use storefront::{GenerationConfig, Generator};

use super::Session;

/// Create a customized copy of a template
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Template to copy (see `storefront list`)
    pub template_id: String,

    /// Directory to write the new store into
    pub destination: PathBuf,

    /// Store name shown in headings, titles and copy
    #[arg(long)]
    pub name: Option<String>,

    /// ISO 4217 currency code, e.g. EUR
    #[arg(long, value_parser = parse_currency)]
    pub currency: Option<String>,

    /// Brand color as #rgb or #rrggbb
    #[arg(long, value_parser = parse_color)]
    pub color: Option<String>,

    /// Store domain (derived from the name when omitted)
    #[arg(long)]
    pub domain: Option<String>,

    /// Extra token value, e.g. --set store_name="Acme"
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,

    /// Write into a non-empty destination, replacing files with the same name
    #[arg(long)]
    pub overwrite: bool,
}

impl GenerateCommand {
    /// Translate flags into a generation request
    ///
    /// Named flags win over `--set` entries for the same key.
    #[must_use]
    pub fn generation_config(&self) -> GenerationConfig {
        let mut config = GenerationConfig::new(&self.template_id, &self.destination)
            .with_overwrite(self.overwrite);
        for (key, value) in &self.values {
            config = config.with_value(key, value);
        }

        let named = [
            (STORE_NAME, &self.name),
            (STORE_DOMAIN, &self.domain),
            (CURRENCY, &self.currency),
            (PRIMARY_COLOR, &self.color),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                config = config.with_value(key, value);
            }
        }
        config
    }

    /// Execute the command
    pub fn execute(&self, session: &Session<'_>) -> Result<ExitCode> {
        let template = session.registry.resolve(&self.template_id)?;

        println!(
            "{} {} {} {}",
            style("Generating").green().bold(),
            style(&template.display_name).cyan().bold(),
            style("into").bold(),
            style(self.destination.display()).cyan()
        );
        println!();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner.set_message("Copying template files...");

        let result = Generator::new(session.registry).generate(&self.generation_config());
        spinner.finish_and_clear();
        let result = result?;

        for file in &result.files_written {
            println!("  {} {}", style("✓").green(), style(file.display()).dim());
        }
        if !result.ignored_keys.is_empty() {
            println!();
            println!(
                "  {} ignored unknown or empty values: {}",
                style("!").yellow().bold(),
                result.ignored_keys.join(", ")
            );
        }

        println!();
        println!(
            "{} {} files written",
            style("✨ Store generated:").green().bold(),
            result.files_written.len()
        );
        self.print_next_steps();

        Ok(ExitCode::SUCCESS)
    }

    fn print_next_steps(&self) {
        println!("\n{}", style("Next steps:").cyan().bold());
        println!(
            "  1. Open {} in a browser",
            style(self.destination.join("index.html").display()).yellow()
        );

        let parent = self
            .destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        if let Some(name) = self.destination.file_name() {
            println!(
                "  2. Check it: {}",
                style(format!(
                    "storefront --root {} validate {}",
                    parent.display(),
                    name.to_string_lossy()
                ))
                .yellow()
            );
        }
    }
}

/// Three ASCII letters, uppercased
fn parse_currency(raw: &str) -> Result<String, String> {
    let code = raw.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(format!("'{raw}' is not a three-letter currency code"))
    }
}

/// `#rgb` or `#rrggbb`
fn parse_color(raw: &str) -> Result<String, String> {
    let color = raw.trim();
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(color.to_string())
    } else {
        Err(format!("'{raw}' is not a hex color (expected #rgb or #rrggbb)"))
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("'{raw}' is not KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("'{raw}' has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use storefront::config::{StorefrontConfig, TemplateSettings};
    use storefront::TemplateRegistry;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        cmd: GenerateCommand,
    }

    fn parse(args: &[&str]) -> Result<GenerateCommand, clap::Error> {
        let mut argv = vec!["generate"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).map(|h| h.cmd)
    }

    #[test]
    fn test_currency_is_uppercased() {
        assert_eq!(parse_currency("eur").unwrap(), "EUR");
        assert!(parse_currency("EURO").is_err());
        assert!(parse_currency("E1R").is_err());
    }

    #[test]
    fn test_color_forms() {
        assert_eq!(parse_color("#FF6600").unwrap(), "#FF6600");
        assert_eq!(parse_color("#f60").unwrap(), "#f60");
        assert!(parse_color("ff6600").is_err());
        assert!(parse_color("#ff660").is_err());
        assert!(parse_color("#gg6600").is_err());
    }

    #[test]
    fn test_key_value() {
        assert_eq!(
            parse_key_value("store_name=Acme = Co").unwrap(),
            ("store_name".to_string(), "Acme = Co".to_string())
        );
        assert!(parse_key_value("store_name").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_named_flags_override_set_values() {
        let cmd = parse(&[
            "minimal-store",
            "out",
            "--set",
            "store_name=From Set",
            "--set",
            "tagline=Hello",
            "--name",
            "Acme",
            "--currency",
            "gbp",
            "--overwrite",
        ])
        .unwrap();
        let config = cmd.generation_config();
        assert_eq!(config.template_id, "minimal-store");
        assert_eq!(config.destination, PathBuf::from("out"));
        assert!(config.overwrite);
        assert_eq!(config.values.get(STORE_NAME).map(String::as_str), Some("Acme"));
        assert_eq!(config.values.get(CURRENCY).map(String::as_str), Some("GBP"));
        assert_eq!(config.values.get("tagline").map(String::as_str), Some("Hello"));
        assert!(!config.values.contains_key(PRIMARY_COLOR));
    }

    #[test]
    fn test_invalid_color_is_usage_error() {
        let err = parse(&["minimal-store", "out", "--color", "blue"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    fn template_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("corner-shop")).unwrap();
        fs::write(
            dir.path().join("corner-shop/index.html"),
            "<title>Your Store</title><p data-currency=\"USD\">Your Store</p>",
        )
        .unwrap();
        dir
    }

    fn execute(root: &Path, cmd: &GenerateCommand) -> Result<ExitCode> {
        let registry = TemplateRegistry::load(&TemplateSettings {
            root: root.to_path_buf(),
            ..TemplateSettings::default()
        })
        .unwrap();
        let config = StorefrontConfig::default();
        let session = Session {
            config: &config,
            registry: &registry,
        };
        cmd.execute(&session)
    }

    #[test]
    fn test_execute_writes_store() {
        let templates = template_root();
        let out = TempDir::new().unwrap();
        let destination = out.path().join("acme");
        let cmd = parse(&[
            "corner-shop",
            destination.to_str().unwrap(),
            "--name",
            "Acme",
            "--currency",
            "eur",
        ])
        .unwrap();

        assert_eq!(execute(templates.path(), &cmd).unwrap(), ExitCode::SUCCESS);
        let index = fs::read_to_string(destination.join("index.html")).unwrap();
        assert_eq!(index, "<title>Acme</title><p data-currency=\"EUR\">Acme</p>");
        assert!(destination.join("config.json").is_file());
    }

    #[test]
    fn test_execute_refuses_non_empty_destination() {
        let templates = template_root();
        let out = TempDir::new().unwrap();
        fs::write(out.path().join("notes.txt"), "keep").unwrap();
        let cmd = parse(&["corner-shop", out.path().to_str().unwrap()]).unwrap();

        let err = execute(templates.path(), &cmd).unwrap_err();
        let engine = err.downcast_ref::<storefront::StorefrontError>().unwrap();
        assert_eq!(engine.kind(), "DestinationConflictError");
        assert!(!out.path().join("index.html").exists());
    }
}
