//! CLI command implementations

pub mod generate;
pub mod list;
pub mod preview;
pub mod validate;

pub use generate::GenerateCommand;
pub use list::ListCommand;
pub use preview::PreviewCommand;
pub use validate::ValidateCommand;

use storefront::config::StorefrontConfig;
use storefront::TemplateRegistry;

/// State shared by every command for one invocation
pub struct Session<'a> {
    /// Effective configuration (defaults, files, environment, flags)
    pub config: &'a StorefrontConfig,
    /// Templates discovered under the configured root
    pub registry: &'a TemplateRegistry,
}
