//! Localized response messages.
//!
//! The catalog is loaded once at startup from one JSON file per locale and is
//! read-only afterwards. Lookups never fall back: a locale without a catalog,
//! or a key missing from the chosen locale, is an error.
//!
//! A locale file maps message keys to either a plain string or an object with
//! an `other` form:
//!
//! ```json
//! { "faq_added": "FAQ added successfully", "faq_deleted": { "other": "FAQ deleted" } }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::I18nConfig;
use crate::error::{Error, Result};

/// Request header carrying the caller's locale tag.
pub const LOCALE_HEADER: &str = "x-custom-lang";

/// Keys of the messages returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// A FAQ was created.
    FaqAdded,
    /// A FAQ was updated.
    FaqUpdated,
    /// A FAQ was deleted.
    FaqDeleted,
}

impl MessageKey {
    /// Every key the service uses.
    pub const ALL: [MessageKey; 3] = [Self::FaqAdded, Self::FaqUpdated, Self::FaqDeleted];

    /// The key as written in locale files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FaqAdded => "faq_added",
            Self::FaqUpdated => "faq_updated",
            Self::FaqDeleted => "faq_deleted",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Text(String),
    Forms { other: String },
}

impl From<Entry> for String {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Text(text) | Entry::Forms { other: text } => text,
        }
    }
}

#[derive(Debug, Clone)]
struct LocaleMessages {
    tag: String,
    messages: HashMap<String, String>,
}

/// Message key → localized string, per locale.
#[derive(Debug, Clone)]
pub struct Catalog {
    default_locale: String,
    /// Keyed by lowercased locale tag.
    locales: HashMap<String, LocaleMessages>,
}

impl Catalog {
    /// Create an empty catalog whose default locale is `default_locale`.
    #[must_use]
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            locales: HashMap::new(),
        }
    }

    /// Load `<dir>/<tag>.json` for every tag.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or if the default
    /// locale is not among the loaded ones.
    pub fn load(dir: &Path, tags: &[String], default_locale: &str) -> Result<Self> {
        let mut catalog = Self::new(default_locale);

        for tag in tags {
            let path = dir.join(format!("{tag}.json"));
            let raw = std::fs::read_to_string(&path).map_err(|source| Error::CatalogRead {
                path: path.clone(),
                source,
            })?;
            let entries: HashMap<String, Entry> =
                serde_json::from_str(&raw).map_err(|source| Error::CatalogParse {
                    path: path.clone(),
                    source,
                })?;

            for key in MessageKey::ALL {
                if !entries.contains_key(key.as_str()) {
                    warn!("Locale {} has no message for {}", tag, key);
                }
            }
            debug!("Loaded {} messages for {}", entries.len(), tag);
            catalog.insert(tag, entries.into_iter().map(|(k, v)| (k, String::from(v))));
        }

        if !catalog.supports(default_locale) {
            return Err(Error::unsupported_locale(default_locale));
        }
        Ok(catalog)
    }

    /// Load the catalog described by the configuration.
    ///
    /// # Errors
    ///
    /// See [`Catalog::load`].
    pub fn from_config(config: &I18nConfig) -> Result<Self> {
        Self::load(&config.locales_dir, &config.locales, &config.default_locale)
    }

    /// Add or replace the messages of one locale.
    pub fn insert<I, K, V>(&mut self, tag: &str, messages: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.locales.insert(
            tag.to_ascii_lowercase(),
            LocaleMessages {
                tag: tag.to_string(),
                messages: messages
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            },
        );
    }

    /// Builder form of [`Catalog::insert`].
    #[must_use]
    pub fn with_locale<I, K, V>(mut self, tag: &str, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.insert(tag, messages);
        self
    }

    /// The locale used when a request names none.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Loaded locale tags, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.locales.values().map(|l| l.tag.as_str()).collect();
        tags.sort_unstable();
        tags
    }

    /// Whether a catalog is loaded for `tag` (case-insensitive).
    #[must_use]
    pub fn supports(&self, tag: &str) -> bool {
        self.locales.contains_key(&tag.to_ascii_lowercase())
    }

    /// Look up `key` for the requested locale.
    ///
    /// An absent or blank locale selects the default locale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedLocale`] when no catalog is loaded for the
    /// locale and [`Error::MissingMessage`] when the catalog lacks the key.
    pub fn resolve(&self, locale: Option<&str>, key: MessageKey) -> Result<&str> {
        let requested = locale
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .unwrap_or(&self.default_locale);

        let locale = self
            .locales
            .get(&requested.to_ascii_lowercase())
            .ok_or_else(|| Error::unsupported_locale(requested))?;

        locale
            .messages
            .get(key.as_str())
            .map(String::as_str)
            .ok_or_else(|| Error::MissingMessage {
                locale: locale.tag.clone(),
                key: key.as_str(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_catalog() -> Catalog {
        Catalog::new("en-US")
            .with_locale(
                "en-US",
                [
                    ("faq_added", "FAQ added successfully"),
                    ("faq_updated", "FAQ updated successfully"),
                    ("faq_deleted", "FAQ deleted successfully"),
                ],
            )
            .with_locale("tr-TR", [("faq_added", "SSS başarıyla eklendi")])
    }

    fn temp_locales_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("faqdesk_locales_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_message_key_strings() {
        assert_eq!(MessageKey::FaqAdded.as_str(), "faq_added");
        assert_eq!(MessageKey::FaqUpdated.to_string(), "faq_updated");
        assert_eq!(MessageKey::FaqDeleted.as_str(), "faq_deleted");
    }

    #[test]
    fn test_resolve_default_locale() {
        let catalog = test_catalog();

        let none = catalog.resolve(None, MessageKey::FaqAdded).unwrap();
        let empty = catalog.resolve(Some(""), MessageKey::FaqAdded).unwrap();
        let explicit = catalog.resolve(Some("en-US"), MessageKey::FaqAdded).unwrap();

        assert_eq!(none, "FAQ added successfully");
        assert_eq!(none, empty);
        assert_eq!(none, explicit);
    }

    #[test]
    fn test_resolve_other_locale() {
        let catalog = test_catalog();
        assert_eq!(
            catalog.resolve(Some("tr-TR"), MessageKey::FaqAdded).unwrap(),
            "SSS başarıyla eklendi"
        );
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let catalog = test_catalog();
        assert_eq!(
            catalog.resolve(Some("TR-tr"), MessageKey::FaqAdded).unwrap(),
            "SSS başarıyla eklendi"
        );
    }

    #[test]
    fn test_unsupported_locale_is_an_error() {
        let catalog = test_catalog();
        let err = catalog
            .resolve(Some("fr-FR"), MessageKey::FaqAdded)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedLocale { ref locale } if locale == "fr-FR"));
    }

    #[test]
    fn test_missing_key_does_not_fall_back() {
        let catalog = test_catalog();
        let err = catalog
            .resolve(Some("tr-TR"), MessageKey::FaqDeleted)
            .unwrap_err();
        assert!(matches!(err, Error::MissingMessage { key: "faq_deleted", .. }));
    }

    #[test]
    fn test_locales_sorted() {
        assert_eq!(test_catalog().locales(), vec!["en-US", "tr-TR"]);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = temp_locales_dir();
        std::fs::write(
            dir.join("en-US.json"),
            r#"{"faq_added": "Added", "faq_updated": {"other": "Updated"}, "faq_deleted": "Deleted"}"#,
        )
        .unwrap();
        std::fs::write(dir.join("tr-TR.json"), r#"{"faq_added": "Eklendi"}"#).unwrap();

        let tags = vec!["en-US".to_string(), "tr-TR".to_string()];
        let catalog = Catalog::load(&dir, &tags, "en-US").unwrap();

        assert_eq!(catalog.resolve(None, MessageKey::FaqUpdated).unwrap(), "Updated");
        assert_eq!(
            catalog.resolve(Some("tr-TR"), MessageKey::FaqAdded).unwrap(),
            "Eklendi"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = temp_locales_dir();
        let err = Catalog::load(&dir, &["en-US".to_string()], "en-US").unwrap_err();
        assert!(matches!(err, Error::CatalogRead { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = temp_locales_dir();
        std::fs::write(dir.join("en-US.json"), "[1, 2, 3]").unwrap();

        let err = Catalog::load(&dir, &["en-US".to_string()], "en-US").unwrap_err();
        assert!(matches!(err, Error::CatalogParse { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_requires_default_locale() {
        let dir = temp_locales_dir();
        std::fs::write(dir.join("tr-TR.json"), r#"{"faq_added": "Eklendi"}"#).unwrap();

        let err = Catalog::load(&dir, &["tr-TR".to_string()], "en-US").unwrap_err();
        assert!(matches!(err, Error::UnsupportedLocale { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_shipped_locales_cover_every_key() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("locales");
        let config = I18nConfig {
            locales_dir: dir,
            ..I18nConfig::default()
        };
        let catalog = Catalog::from_config(&config).unwrap();

        for tag in ["en-US", "tr-TR"] {
            for key in MessageKey::ALL {
                assert!(catalog.resolve(Some(tag), key).is_ok(), "{tag} lacks {key}");
            }
        }
    }
}
