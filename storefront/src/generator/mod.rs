//! Template instance generation
//!
//! Copies a registered template into a destination directory, substituting
//! store-specific tokens in text files and copying everything else
//! byte-for-byte, then renders a `config.json` manifest describing the
//! generated store.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront::config::TemplateSettings;
//! use storefront::generator::{GenerationConfig, Generator};
//! use storefront::registry::TemplateRegistry;
//!
//! # fn main() -> storefront::Result<()> {
//! let registry = TemplateRegistry::load(&TemplateSettings::default())?;
//! let result = Generator::new(&registry).generate(
//!     &GenerationConfig::new("dropship-starter", "./gadget-hub")
//!         .with_value("store_name", "Gadget Hub")
//!         .with_value("currency", "EUR"),
//! )?;
//! assert!(result.ignored_keys.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod manifest;
pub mod tokens;

use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, StorefrontError};
use crate::registry::TemplateRegistry;
use manifest::{CONFIG_JSON, MANIFEST_FILE};
use tokens::{Resolution, TokenCatalog, CURRENCY, PRIMARY_COLOR, STORE_DOMAIN, STORE_NAME};

/// Extensions that receive the substitution pass
const TEXT_EXTENSIONS: &[&str] = &[
    "html", "htm", "css", "js", "mjs", "json", "svg", "txt", "xml", "webmanifest",
];

handlebars_helper!(json_helper: |value: Json| value.to_string());

/// Parameters for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Id of the template to copy
    pub template_id: String,
    /// Directory the new store is written to
    pub destination: PathBuf,
    /// Token key → replacement value
    pub values: BTreeMap<String, String>,
    /// Allow writing into a non-empty destination
    pub overwrite: bool,
}

impl GenerationConfig {
    /// Start a configuration with no substitutions
    pub fn new(template_id: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            template_id: template_id.into(),
            destination: destination.into(),
            values: BTreeMap::new(),
            overwrite: false,
        }
    }

    /// Add a token value
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set the overwrite flag
    #[must_use]
    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// What a generation run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    /// Destination directory
    pub destination: PathBuf,
    /// Files written, relative to the destination, in write order
    pub files_written: Vec<PathBuf>,
    /// Supplied keys that matched no token (or were blank), sorted
    pub ignored_keys: Vec<String>,
}

/// Copies templates into new store directories
pub struct Generator<'a> {
    registry: &'a TemplateRegistry,
    tokens: TokenCatalog,
    handlebars: Handlebars<'static>,
}

impl<'a> Generator<'a> {
    /// Create a generator using the built-in token catalog
    #[must_use]
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self::with_tokens(registry, TokenCatalog::builtin())
    }

    /// Create a generator with a custom token catalog
    #[must_use]
    pub fn with_tokens(registry: &'a TemplateRegistry, tokens: TokenCatalog) -> Self {
        let mut handlebars = Handlebars::new();

        // Disable HTML escaping since we're generating JSON
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("json", Box::new(json_helper));

        Self {
            registry,
            tokens,
            handlebars,
        }
    }

    /// Generate a customized copy of a template
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The template id is unknown ([`StorefrontError::NotFound`])
    /// - The destination is a file, lies inside the template, or is a
    ///   non-empty directory without `overwrite`
    ///   ([`StorefrontError::DestinationConflict`]); nothing is written
    /// - Reading or writing a file fails ([`StorefrontError::Filesystem`])
    /// - The manifest fails to render ([`StorefrontError::Render`])
    pub fn generate(&self, config: &GenerationConfig) -> Result<GenerationResult> {
        let template = self.registry.resolve(&config.template_id)?;
        let source_root = template.path.as_path();
        let destination = config.destination.as_path();

        check_destination(source_root, destination, config.overwrite)?;

        let resolution = self.tokens.resolve(&config.values);
        if !resolution.ignored.is_empty() {
            debug!(keys = ?resolution.ignored, "ignoring unrecognized or blank values");
        }

        let sources = collect_files(source_root)?;

        fs::create_dir_all(destination).map_err(|e| {
            StorefrontError::filesystem("failed to create directory", destination, e)
        })?;

        let mut files_written = Vec::with_capacity(sources.len() + 1);
        for relative in &sources {
            copy_file(
                &source_root.join(relative),
                &destination.join(relative),
                &resolution,
            )?;
            files_written.push(relative.clone());
        }

        let manifest = PathBuf::from(MANIFEST_FILE);
        if sources.contains(&manifest) {
            debug!("template ships its own {MANIFEST_FILE}; not rendering one");
        } else {
            self.write_manifest(destination, &config.template_id, &resolution)?;
            files_written.push(manifest);
        }

        info!(
            template = %config.template_id,
            destination = %destination.display(),
            files = files_written.len(),
            "template generated"
        );

        Ok(GenerationResult {
            destination: destination.to_path_buf(),
            files_written,
            ignored_keys: resolution.ignored,
        })
    }

    fn write_manifest(
        &self,
        destination: &Path,
        template_id: &str,
        resolution: &Resolution<'_>,
    ) -> Result<()> {
        let context = json!({
            "name": self.tokens.effective_value(resolution, STORE_NAME),
            "template": template_id,
            "domain": self.tokens.effective_value(resolution, STORE_DOMAIN),
            "primary_color": self.tokens.effective_value(resolution, PRIMARY_COLOR),
            "currency": self.tokens.effective_value(resolution, CURRENCY),
            "version": env!("CARGO_PKG_VERSION"),
        });

        let rendered = self
            .handlebars
            .render_template(CONFIG_JSON, &context)
            .map_err(|source| StorefrontError::Render {
                name: MANIFEST_FILE,
                source: Box::new(source),
            })?;

        let path = destination.join(MANIFEST_FILE);
        fs::write(&path, rendered)
            .map_err(|e| StorefrontError::filesystem("failed to write", &path, e))
    }
}

/// Refuse destinations that would clobber existing data or the template itself
fn check_destination(source_root: &Path, destination: &Path, overwrite: bool) -> Result<()> {
    if resolve_path(destination)?.starts_with(resolve_path(source_root)?) {
        return Err(StorefrontError::conflict(
            destination,
            "lies inside the source template",
        ));
    }

    if !destination.exists() {
        return Ok(());
    }
    if !destination.is_dir() {
        return Err(StorefrontError::conflict(
            destination,
            "exists and is not a directory",
        ));
    }

    let mut entries = fs::read_dir(destination)
        .map_err(|e| StorefrontError::filesystem("failed to list", destination, e))?;
    if entries.next().is_some() && !overwrite {
        return Err(StorefrontError::conflict(
            destination,
            "already exists and is not empty (pass --overwrite to replace its files)",
        ));
    }

    Ok(())
}

/// Physical location of `path`, which need not exist yet
///
/// The longest existing prefix is canonicalized (resolving `..` and
/// symlinks); the missing remainder cannot contain links, so it is
/// normalized lexically on top of it.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .map_err(|e| StorefrontError::filesystem("failed to resolve", path, e))?;

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            // `..` as the last component or the root itself
            _ => match existing.parent() {
                Some(parent) => {
                    missing.push(std::ffi::OsString::from(".."));
                    existing = parent;
                }
                None => break,
            },
        }
    }

    let mut resolved = fs::canonicalize(existing)
        .map_err(|e| StorefrontError::filesystem("failed to resolve", existing, e))?;
    for component in missing.iter().rev() {
        if component == ".." {
            resolved.pop();
        } else if component != "." {
            resolved.push(component);
        }
    }
    Ok(resolved)
}

/// Relative paths of every regular file under `root`, sorted by name
fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }
    Ok(files)
}

fn copy_file(from: &Path, to: &Path, resolution: &Resolution<'_>) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| StorefrontError::filesystem("failed to create directory", parent, e))?;
    }

    if is_text_file(from) {
        let bytes =
            fs::read(from).map_err(|e| StorefrontError::filesystem("failed to read", from, e))?;
        match String::from_utf8(bytes) {
            Ok(text) => {
                debug!(file = %from.display(), "substituting tokens");
                let rendered = tokens::substitute(&text, resolution);
                return fs::write(to, rendered)
                    .map_err(|e| StorefrontError::filesystem("failed to write", to, e));
            }
            Err(err) => {
                warn!(file = %from.display(), "not valid UTF-8; copying unchanged");
                return fs::write(to, err.into_bytes())
                    .map_err(|e| StorefrontError::filesystem("failed to write", to, e));
            }
        }
    }

    debug!(file = %from.display(), "copying binary file");
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| StorefrontError::filesystem("failed to copy", from, e))
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
