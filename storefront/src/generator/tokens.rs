//! Recognized template tokens
//!
//! A token is a value baked into template source with a known default
//! (`Your Store`, `USD`, `#0ea5e9`, ...). Generation swaps every occurrence
//! of the default for the value the user supplied. A token without a
//! supplied value keeps its default; a supplied key that names no token is
//! ignored.

use convert_case::{Case, Casing};
use std::collections::BTreeMap;

/// Where a token's default appears in template source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPattern {
    /// Exact text anywhere in the file
    Literal(&'static str),
    /// Exact text bounded by non-word characters
    Word(&'static str),
    /// Token default wrapped in surrounding context; only the default is replaced
    Wrapped {
        /// Text immediately before the default
        prefix: &'static str,
        /// Text immediately after the default
        suffix: &'static str,
    },
}

/// A recognized placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Configuration key (`store_name`, `currency`, ...)
    pub key: &'static str,
    /// Value the templates ship with
    pub default: &'static str,
    /// Occurrences replaced during generation
    pub patterns: Vec<TokenPattern>,
}

impl Token {
    /// Replace every pattern occurrence in `source` with `value`
    #[must_use]
    pub fn apply(&self, source: &str, value: &str) -> String {
        replace_all(source, &self.replacements(value))
    }

    fn replacements(&self, value: &str) -> Vec<Replacement> {
        self.patterns
            .iter()
            .map(|pattern| match *pattern {
                TokenPattern::Literal(text) => Replacement {
                    needle: text.to_string(),
                    with: value.to_string(),
                    whole_word: false,
                },
                TokenPattern::Word(text) => Replacement {
                    needle: text.to_string(),
                    with: value.to_string(),
                    whole_word: true,
                },
                TokenPattern::Wrapped { prefix, suffix } => Replacement {
                    needle: format!("{prefix}{}{suffix}", self.default),
                    with: format!("{prefix}{value}{suffix}"),
                    whole_word: false,
                },
            })
            .collect()
    }
}

/// One concrete find/replace pair derived from a token pattern
#[derive(Debug)]
struct Replacement {
    needle: String,
    with: String,
    whole_word: bool,
}

/// Key of the store name token
pub const STORE_NAME: &str = "store_name";
/// Key of the store domain token
pub const STORE_DOMAIN: &str = "store_domain";
/// Key of the currency code token
pub const CURRENCY: &str = "currency";
/// Key of the brand color token
pub const PRIMARY_COLOR: &str = "primary_color";

/// Fixed, read-only set of recognized tokens
#[derive(Debug, Clone)]
pub struct TokenCatalog {
    tokens: Vec<Token>,
}

/// Outcome of matching user-supplied values against the catalog
#[derive(Debug, Default)]
pub struct Resolution<'a> {
    /// Tokens to substitute, in catalog order, with their values
    pub substitutions: Vec<(&'a Token, String)>,
    /// Supplied keys that were not used, sorted
    pub ignored: Vec<String>,
}

impl TokenCatalog {
    /// Tokens recognized in the shipped templates
    #[must_use]
    pub fn builtin() -> Self {
        let currency_contexts = [
            ("data-currency=\"", "\""),
            ("currency: '", "'"),
            ("currency: \"", "\""),
            ("currencyCode: '", "'"),
            ("currencyCode: \"", "\""),
            ("\"currency\": \"", "\""),
        ];

        Self {
            tokens: vec![
                Token {
                    key: STORE_DOMAIN,
                    default: "yourstore.com",
                    patterns: vec![TokenPattern::Literal("yourstore.com")],
                },
                Token {
                    key: STORE_NAME,
                    default: "Your Store",
                    patterns: vec![
                        TokenPattern::Literal("Your Store"),
                        TokenPattern::Literal("Your Brand"),
                        TokenPattern::Word("BRAND"),
                    ],
                },
                Token {
                    key: CURRENCY,
                    default: "USD",
                    patterns: currency_contexts
                        .into_iter()
                        .map(|(prefix, suffix)| TokenPattern::Wrapped { prefix, suffix })
                        .collect(),
                },
                Token {
                    key: PRIMARY_COLOR,
                    default: "#0ea5e9",
                    patterns: vec![
                        TokenPattern::Literal("#0ea5e9"),
                        TokenPattern::Literal("#0EA5E9"),
                    ],
                },
            ],
        }
    }

    /// All tokens in application order
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Look up a token by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.key == key)
    }

    /// Match supplied values against the catalog
    ///
    /// Blank values count as not supplied and are reported as ignored along
    /// with unknown keys. When a store name is supplied without a domain, the
    /// domain is derived from the name.
    #[must_use]
    pub fn resolve(&self, values: &BTreeMap<String, String>) -> Resolution<'_> {
        let mut ignored: Vec<String> = values
            .iter()
            .filter(|(key, value)| self.get(key).is_none() || value.trim().is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        ignored.sort();

        let supplied = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let substitutions = self
            .tokens
            .iter()
            .filter_map(|token| {
                let value = supplied(token.key).or_else(|| {
                    (token.key == STORE_DOMAIN)
                        .then(|| supplied(STORE_NAME).and_then(|name| derive_domain(&name)))
                        .flatten()
                })?;
                Some((token, value))
            })
            .collect();

        Resolution {
            substitutions,
            ignored,
        }
    }

    /// Effective value for a key: supplied value, else derived, else default
    #[must_use]
    pub fn effective_value(&self, resolution: &Resolution<'_>, key: &str) -> String {
        resolution
            .substitutions
            .iter()
            .find(|(token, _)| token.key == key)
            .map(|(_, value)| value.clone())
            .or_else(|| self.get(key).map(|t| t.default.to_string()))
            .unwrap_or_default()
    }
}

impl Default for TokenCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Apply all resolved substitutions to a text file body
///
/// A single left-to-right pass: replaced text is never scanned again, so a
/// value that happens to contain another token's default stays intact.
#[must_use]
pub fn substitute(source: &str, resolution: &Resolution<'_>) -> String {
    let replacements: Vec<Replacement> = resolution
        .substitutions
        .iter()
        .flat_map(|(token, value)| token.replacements(value))
        .collect();
    replace_all(source, &replacements)
}

/// `Acme Shop` → `acmeshop.com`
fn derive_domain(store_name: &str) -> Option<String> {
    let slug: String = store_name
        .to_case(Case::Flat)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();
    (!slug.is_empty()).then(|| format!("{slug}.com"))
}

fn replace_all(source: &str, replacements: &[Replacement]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;

    'scan: while pos < source.len() {
        let rest = &source[pos..];
        for r in replacements {
            if rest.starts_with(&r.needle)
                && (!r.whole_word || word_bounded(source, pos, r.needle.len()))
            {
                out.push_str(&r.with);
                pos += r.needle.len();
                continue 'scan;
            }
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        out.push(ch);
        pos += ch.len_utf8();
    }
    out
}

fn word_bounded(source: &str, start: usize, len: usize) -> bool {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    let before = source[..start].chars().next_back();
    let after = source[start + len..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
