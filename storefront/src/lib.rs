//! storefront: generator and validator for static storefront templates
//!
//! The engine behind the `storefront` CLI. It works on a directory of
//! ready-made e-commerce page templates and offers three services:
//!
//! - **Registry**: discovers template directories (any top-level directory
//!   holding an `index.html`) and exposes their metadata
//! - **Generator**: copies a template into a new directory, substituting
//!   store-specific tokens (name, domain, currency, brand color)
//! - **Validator**: parses every HTML file and runs a fixed catalog of SEO,
//!   accessibility, performance, mobile and best-practice rules
//!
//! Reports produced by the validator are rendered by [`report`] as either
//! human-readable text or structured JSON.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use storefront::config::StorefrontConfig;
//! use storefront::generator::{GenerationConfig, Generator};
//! use storefront::registry::TemplateRegistry;
//! use storefront::validator::Validator;
//!
//! # fn main() -> storefront::Result<()> {
//! let config = StorefrontConfig::load()?;
//! let registry = TemplateRegistry::load(&config.templates)?;
//!
//! let generator = Generator::new(&registry);
//! let result = generator.generate(
//!     &GenerationConfig::new("minimal-store", "./acme")
//!         .with_value("store_name", "Acme Shop"),
//! )?;
//! println!("wrote {} files", result.files_written.len());
//!
//! let validator = Validator::new(&registry, &config.validation);
//! let report = validator.validate("minimal-store", None)?;
//! println!("{} errors", report.summary().errors);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod generator;
pub mod observability;
pub mod registry;
pub mod report;
pub mod validator;

pub use error::{Result, StorefrontError};
pub use generator::{GenerationConfig, GenerationResult, Generator};
pub use registry::{TemplateDescriptor, TemplateRegistry};
pub use report::ReportStyle;
pub use validator::{Category, Severity, ValidationFinding, ValidationReport, Validator};
