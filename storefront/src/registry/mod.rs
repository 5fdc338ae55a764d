//! Template discovery
//!
//! A template is any directory directly under the templates root that holds
//! an `index.html`. Infrastructure directories (shared assets, components,
//! tooling, tests) and hidden directories are skipped.
//!
//! The registry is built once per run and handed to the generator and the
//! validator by reference; it never changes after [`TemplateRegistry::load`].

use convert_case::{Case, Casing};
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::TemplateSettings;
use crate::error::{Result, StorefrontError};

/// Entry file every template directory must contain
pub const INDEX_FILE: &str = "index.html";

/// Descriptions for the templates shipped with the repository
const BUILTIN_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "minimal-store",
        "Clean minimal e-commerce store with Shopify Buy Button SDK",
    ),
    (
        "dropship-starter",
        "High-conversion dropshipping store with flash sales & countdown",
    ),
    (
        "landing-product",
        "Single product landing page with A/B testing",
    ),
];

/// Metadata for one on-disk template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    /// Directory name, used as the template id
    pub id: String,
    /// Template directory
    pub path: PathBuf,
    /// Human-friendly name (`minimal-store` → `Minimal Store`)
    pub display_name: String,
    /// One-line description
    pub description: String,
}

impl TemplateDescriptor {
    /// Path of the template's `index.html`
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.path.join(INDEX_FILE)
    }

    /// Number of regular files in the template tree
    #[must_use]
    pub fn file_count(&self) -> usize {
        WalkDir::new(&self.path)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .count()
    }
}

/// Read-only catalog of available templates
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    root: PathBuf,
    templates: Vec<TemplateDescriptor>,
}

impl TemplateRegistry {
    /// Scan the configured root for templates
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Filesystem`] if the root directory cannot
    /// be listed.
    pub fn load(settings: &TemplateSettings) -> Result<Self> {
        let root = settings.root.clone();
        let entries = fs::read_dir(&root)
            .map_err(|e| StorefrontError::filesystem("failed to list", &root, e))?;

        let mut templates = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StorefrontError::filesystem("failed to list", &root, e))?;
            let path = entry.path();
            let Some(id) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };

            if !path.is_dir() || id.starts_with('.') {
                continue;
            }
            if settings.excluded_dirs.iter().any(|excluded| excluded == &id) {
                debug!(dir = %id, "skipping infrastructure directory");
                continue;
            }
            if !path.join(INDEX_FILE).is_file() {
                continue;
            }

            templates.push(describe(id, path));
        }

        templates.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(root = %root.display(), count = templates.len(), "template registry loaded");

        Ok(Self { root, templates })
    }

    /// All templates, alphabetical by id
    #[must_use]
    pub fn list_templates(&self) -> &[TemplateDescriptor] {
        &self.templates
    }

    /// Look up a template by exact (case-sensitive) id
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::NotFound`] when no template has that id.
    pub fn resolve(&self, template_id: &str) -> Result<&TemplateDescriptor> {
        self.templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| StorefrontError::NotFound {
                id: template_id.to_string(),
                available: self.ids(),
            })
    }

    /// Template ids, alphabetical
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.id.clone()).collect()
    }

    /// Directory the registry was loaded from
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn describe(id: String, path: PathBuf) -> TemplateDescriptor {
    let description = BUILTIN_DESCRIPTIONS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, desc)| (*desc).to_string())
        .or_else(|| index_description(&path.join(INDEX_FILE)))
        .unwrap_or_default();

    TemplateDescriptor {
        display_name: id.to_case(Case::Title),
        id,
        path,
        description,
    }
}

/// `<meta name="description">` of an index page, if readable
fn index_description(index: &Path) -> Option<String> {
    let source = fs::read_to_string(index).ok()?;
    let html = Html::parse_document(&source);
    html.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            el.value().name() == "meta"
                && el
                    .value()
                    .attr("name")
                    .is_some_and(|n| n.eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}
