//! Integration tests for store generation

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use storefront::config::{TemplateSettings, ValidationSettings};
use storefront::{GenerationConfig, Generator, Severity, TemplateRegistry, Validator};
use tempfile::TempDir;
use walkdir::WalkDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn registry_at(root: &Path) -> TemplateRegistry {
    TemplateRegistry::load(&TemplateSettings {
        root: root.to_path_buf(),
        ..TemplateSettings::default()
    })
    .unwrap()
}

/// Copy the fixture templates somewhere the test may modify
fn scratch_templates() -> TempDir {
    let dir = TempDir::new().unwrap();
    for entry in WalkDir::new(fixtures()) {
        let entry = entry.unwrap();
        let relative = entry.path().strip_prefix(fixtures()).unwrap();
        let target = dir.path().join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    dir
}

/// Relative path → contents for every file under `root`
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().strip_prefix(root).unwrap().to_path_buf(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_generate_substitutes_store_details() {
    let registry = registry_at(&fixtures());
    let out = TempDir::new().unwrap();
    let destination = out.path().join("acme");

    let result = Generator::new(&registry)
        .generate(
            &GenerationConfig::new("minimal-store", &destination)
                .with_value("store_name", "Acme Goods")
                .with_value("currency", "EUR")
                .with_value("primary_color", "#ff6600"),
        )
        .unwrap();

    let index = fs::read_to_string(destination.join("index.html")).unwrap();
    assert!(index.contains("<title>Acme Goods | Everyday Essentials</title>"));
    assert!(index.contains("About Acme Goods"));
    assert!(index.contains("https://acmegoods.com/"));
    assert!(index.contains("data-currency=\"EUR\""));
    assert!(!index.contains("Your Store"));
    assert!(!index.contains("BRAND"));

    let css = fs::read_to_string(destination.join("css/site.css")).unwrap();
    assert!(css.contains("--primary: #ff6600;"));

    let js = fs::read_to_string(destination.join("js/cart.js")).unwrap();
    assert!(js.contains("name: 'Acme Goods', currency: 'EUR'"));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(destination.join("config.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["name"], "Acme Goods");
    assert_eq!(manifest["template"], "minimal-store");
    assert_eq!(manifest["domain"], "acmegoods.com");
    assert_eq!(manifest["primaryColor"], "#ff6600");
    assert_eq!(manifest["currency"], "EUR");

    assert_eq!(result.files_written.len(), 4);
    assert_eq!(result.files_written.last(), Some(&PathBuf::from("config.json")));
    assert!(result.ignored_keys.is_empty());
}

#[test]
fn test_without_values_template_is_copied_unchanged() {
    let registry = registry_at(&fixtures());
    let out = TempDir::new().unwrap();

    Generator::new(&registry)
        .generate(&GenerationConfig::new("landing-product", out.path()))
        .unwrap();

    assert_eq!(
        fs::read(out.path().join("index.html")).unwrap(),
        fs::read(fixtures().join("landing-product/index.html")).unwrap()
    );
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("config.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["name"], "Your Store");
    assert_eq!(manifest["currency"], "USD");
}

#[test]
fn test_non_empty_destination_is_refused_and_untouched() {
    let registry = registry_at(&fixtures());
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("notes.txt"), "keep me").unwrap();
    let before = snapshot(out.path());

    let err = Generator::new(&registry)
        .generate(&GenerationConfig::new("minimal-store", out.path()).with_value("store_name", "Acme"))
        .unwrap_err();

    assert_eq!(err.kind(), "DestinationConflictError");
    assert_eq!(snapshot(out.path()), before);
}

#[test]
fn test_destination_that_is_a_file_is_refused() {
    let registry = registry_at(&fixtures());
    let out = TempDir::new().unwrap();
    let file = out.path().join("store");
    fs::write(&file, "").unwrap();

    let err = Generator::new(&registry)
        .generate(&GenerationConfig::new("minimal-store", &file))
        .unwrap_err();
    assert_eq!(err.kind(), "DestinationConflictError");
}

#[test]
fn test_destination_inside_template_is_refused() {
    let templates = scratch_templates();
    let registry = registry_at(templates.path());
    let inside = templates.path().join("minimal-store/build");

    let err = Generator::new(&registry)
        .generate(&GenerationConfig::new("minimal-store", &inside))
        .unwrap_err();
    assert_eq!(err.kind(), "DestinationConflictError");
    assert!(!inside.exists());
}

#[test]
fn test_destination_reaching_template_through_parent_dirs_is_refused() {
    let templates = scratch_templates();
    let registry = registry_at(templates.path());
    let before = snapshot(templates.path());

    for destination in [
        templates.path().join("landing-product/../minimal-store/build"),
        templates.path().join("missing/../minimal-store/build"),
        templates.path().join("minimal-store/css/.."),
    ] {
        let err = Generator::new(&registry)
            .generate(&GenerationConfig::new("minimal-store", &destination).with_overwrite(true))
            .unwrap_err();
        assert_eq!(err.kind(), "DestinationConflictError", "{}", destination.display());
    }
    assert_eq!(snapshot(templates.path()), before);
}

#[cfg(unix)]
#[test]
fn test_destination_symlinked_into_template_is_refused() {
    let templates = scratch_templates();
    let registry = registry_at(templates.path());
    let out = TempDir::new().unwrap();
    let link = out.path().join("store");
    std::os::unix::fs::symlink(templates.path().join("minimal-store/css"), &link).unwrap();
    let before = snapshot(templates.path());

    for destination in [link.clone(), link.join("build")] {
        let err = Generator::new(&registry)
            .generate(&GenerationConfig::new("minimal-store", &destination).with_overwrite(true))
            .unwrap_err();
        assert_eq!(err.kind(), "DestinationConflictError");
    }
    assert_eq!(snapshot(templates.path()), before);
}

#[test]
fn test_overwrite_is_idempotent() {
    let registry = registry_at(&fixtures());
    let out = TempDir::new().unwrap();
    let config = GenerationConfig::new("dropship-starter", out.path())
        .with_value("store_name", "Gadget Hub")
        .with_value("currency", "GBP")
        .with_overwrite(true);
    let generator = Generator::new(&registry);

    generator.generate(&config).unwrap();
    let first = snapshot(out.path());
    generator.generate(&config).unwrap();
    let second = snapshot(out.path());

    assert_eq!(first, second);
}

#[test]
fn test_binary_files_are_copied_byte_for_byte() {
    let templates = scratch_templates();
    let image: Vec<u8> = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]
        .into_iter()
        .chain(b"Your Store".iter().copied())
        .chain([0x00, 0xff, 0xfe])
        .collect();
    fs::create_dir_all(templates.path().join("minimal-store/img")).unwrap();
    fs::write(templates.path().join("minimal-store/img/hero.png"), &image).unwrap();

    let registry = registry_at(templates.path());
    let out = TempDir::new().unwrap();
    Generator::new(&registry)
        .generate(&GenerationConfig::new("minimal-store", out.path()).with_value("store_name", "Acme"))
        .unwrap();

    assert_eq!(fs::read(out.path().join("img/hero.png")).unwrap(), image);
}

#[test]
fn test_template_manifest_is_not_replaced() {
    let templates = scratch_templates();
    let shipped = "{\"custom\": true}\n";
    fs::write(templates.path().join("landing-product/config.json"), shipped).unwrap();

    let registry = registry_at(templates.path());
    let out = TempDir::new().unwrap();
    let result = Generator::new(&registry)
        .generate(&GenerationConfig::new("landing-product", out.path()))
        .unwrap();

    assert_eq!(fs::read_to_string(out.path().join("config.json")).unwrap(), shipped);
    assert_eq!(
        result
            .files_written
            .iter()
            .filter(|p| p.as_path() == Path::new("config.json"))
            .count(),
        1
    );
}

#[test]
fn test_unknown_and_blank_values_are_ignored() {
    let registry = registry_at(&fixtures());
    let out = TempDir::new().unwrap();

    let result = Generator::new(&registry)
        .generate(
            &GenerationConfig::new("landing-product", out.path())
                .with_value("tagline", "Drink more water")
                .with_value("store_name", "   ")
                .with_value("currency", "CAD"),
        )
        .unwrap();

    assert_eq!(result.ignored_keys, vec!["store_name", "tagline"]);
    let index = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(index.contains("Your Store"));
    assert!(index.contains("data-currency=\"CAD\""));
}

#[test]
fn test_unknown_template() {
    let registry = registry_at(&fixtures());
    let out = TempDir::new().unwrap();
    let err = Generator::new(&registry)
        .generate(&GenerationConfig::new("luxury-boutique", out.path().join("x")))
        .unwrap_err();
    assert_eq!(err.kind(), "NotFoundError");
    assert!(!out.path().join("x").exists());
}

#[test]
fn test_generated_store_has_no_more_errors_than_its_template() {
    let registry = registry_at(&fixtures());
    let validator = Validator::new(&registry, &ValidationSettings::default());
    let generator = Generator::new(&registry);
    let errors = |report: &storefront::ValidationReport| {
        report
            .findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    };

    for id in registry.ids() {
        let out = TempDir::new().unwrap();
        generator
            .generate(
                &GenerationConfig::new(&id, out.path())
                    .with_value("store_name", "Northwind Outfitters")
                    .with_value("currency", "EUR"),
            )
            .unwrap();

        let source = validator.validate(&id, None).unwrap();
        let generated = validator.validate_dir(&id, out.path(), None).unwrap();
        assert!(
            errors(&generated) <= errors(&source),
            "{id}: generated store has {} errors, template has {}",
            errors(&generated),
            errors(&source)
        );
    }
}
