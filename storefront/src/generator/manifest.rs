//! Generation manifest template

/// File name of the manifest written next to the generated `index.html`
pub const MANIFEST_FILE: &str = "config.json";

/// `config.json` template for generated stores
///
/// Rendered without HTML escaping; the `json` helper emits each value as a
/// JSON string literal.
pub const CONFIG_JSON: &str = r#"{
  "name": {{json name}},
  "template": {{json template}},
  "domain": {{json domain}},
  "primaryColor": {{json primary_color}},
  "currency": {{json currency}},
  "generator": "storefront {{version}}"
}
"#;
