//! storefront CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use storefront::config::StorefrontConfig;
use storefront::{observability, StorefrontError, TemplateRegistry};

use commands::{GenerateCommand, ListCommand, PreviewCommand, Session, ValidateCommand};

/// Exit code for operational failures (bad config, unknown template, I/O)
const EXIT_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(version)]
#[command(about = "Generate and validate static e-commerce templates", long_about = None)]
struct Cli {
    /// Directory containing the templates (defaults to the configured root)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Configuration file layered over the defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available templates
    List,
    /// Create a customized copy of a template
    Generate(GenerateCommand),
    /// Check templates for SEO, accessibility, performance and markup issues
    Validate(ValidateCommand),
    /// Serve a template over HTTP for local viewing
    Preview(PreviewCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let no_color = cli.no_color;

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            if no_color {
                console::set_colors_enabled_stderr(false);
            }
            eprintln!("{}", error_line(&err));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = StorefrontConfig::load_with(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.templates.root = root;
    }

    if cli.no_color || !config.output.color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    observability::init(config.output.log_format, cli.verbose);

    let registry = TemplateRegistry::load(&config.templates)?;
    let session = Session {
        config: &config,
        registry: &registry,
    };

    match cli.command {
        Commands::List => ListCommand::execute(&session),
        Commands::Generate(cmd) => cmd.execute(&session),
        Commands::Validate(cmd) => cmd.execute(&session),
        Commands::Preview(cmd) => cmd.execute(&session),
    }
}

/// `error[<Kind>]: <message>` for the first library error in the chain
fn error_line(err: &anyhow::Error) -> String {
    let (kind, message) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<StorefrontError>())
        .map_or_else(
            || ("Error", format!("{err:#}")),
            |engine| (engine.kind(), engine.to_string()),
        );
    format!(
        "{}: {message}",
        style(format!("error[{kind}]")).red().bold().for_stderr()
    )
}
