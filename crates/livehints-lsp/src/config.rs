use livehints_core::DEFAULT_LANGUAGES;
use serde::Deserialize;

/// Section name under which clients may nest the settings.
pub const SETTINGS_SECTION: &str = "livehints";

/// Root configuration for the livehints-lsp server.
///
/// This configuration can be provided by the LSP client via initialization options
/// or `workspace/didChangeConfiguration`. All fields use defaults if not specified.
///
/// # Examples
///
/// ```
/// use livehints_lsp::config::LiveHintsConfig;
///
/// let json = r#"{
///     "highlights": { "enabled": false },
///     "documents": { "languages": ["Java", "groovy"] }
/// }"#;
///
/// let config: LiveHintsConfig = serde_json::from_str(json).unwrap();
/// assert!(!config.highlights.enabled);
/// assert_eq!(config.documents.languages, vec!["java", "groovy"]);
/// ```
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct LiveHintsConfig {
    #[serde(default)]
    pub highlights: HighlightsConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

impl LiveHintsConfig {
    /// Parses settings sent by a client.
    ///
    /// Accepts the configuration object itself or one nested under
    /// [`SETTINGS_SECTION`].
    pub fn from_settings(settings: serde_json::Value) -> serde_json::Result<Self> {
        let settings = match settings {
            serde_json::Value::Object(mut map) if map.contains_key(SETTINGS_SECTION) => map
                .remove(SETTINGS_SECTION)
                .unwrap_or(serde_json::Value::Null),
            other => other,
        };

        if settings.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(settings)
    }
}

/// Controls whether computed live hints are published.
///
/// Clearing hints on close or shutdown is never suppressed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HighlightsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for HighlightsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Which documents get watched, by LSP language identifier.
///
/// # Defaults
///
/// - `languages`: `["java", "kotlin", "rust"]`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DocumentsConfig {
    /// Language identifiers, lowercased
    /// Maximum: 32 entries (extra entries dropped with a warning)
    #[serde(
        default = "default_languages",
        deserialize_with = "deserialize_languages"
    )]
    pub languages: Vec<String>,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|l| (*l).to_string()).collect()
}

/// Maximum number of watched language identifiers
const MAX_LANGUAGES: usize = 32;

fn validate_languages(languages: Vec<String>) -> Vec<String> {
    if languages.len() > MAX_LANGUAGES {
        tracing::warn!(
            "documents.languages has {} entries, keeping the first {}",
            languages.len(),
            MAX_LANGUAGES
        );
    }

    languages
        .into_iter()
        .take(MAX_LANGUAGES)
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

fn deserialize_languages<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let languages = Vec::<String>::deserialize(deserializer)?;
    Ok(validate_languages(languages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LiveHintsConfig::default();
        assert!(config.highlights.enabled);
        assert_eq!(config.documents.languages, vec!["java", "kotlin", "rust"]);
    }

    #[test]
    fn test_empty_config_deserialization() {
        let config: LiveHintsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LiveHintsConfig::default());
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json = r#"{ "highlights": { "enabled": false } }"#;

        let config: LiveHintsConfig = serde_json::from_str(json).unwrap();
        assert!(!config.highlights.enabled);
        // Other fields should use defaults
        assert_eq!(config.documents.languages.len(), 3);
    }

    #[test]
    fn test_languages_are_lowercased_and_trimmed() {
        let json = r#"{ "languages": ["Java", " KOTLIN ", ""] }"#;

        let config: DocumentsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.languages, vec!["java", "kotlin"]);
    }

    #[test]
    fn test_languages_truncated() {
        let languages: Vec<String> = (0..40).map(|i| format!("lang{i}")).collect();
        let json = serde_json::json!({ "languages": languages });

        let config: DocumentsConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.languages.len(), MAX_LANGUAGES);
        assert_eq!(config.languages[31], "lang31");
    }

    #[test]
    fn test_from_settings_nested_section() {
        let settings = serde_json::json!({
            "livehints": { "highlights": { "enabled": false } },
            "other": { "ignored": true }
        });

        let config = LiveHintsConfig::from_settings(settings).unwrap();
        assert!(!config.highlights.enabled);
    }

    #[test]
    fn test_from_settings_top_level() {
        let settings = serde_json::json!({ "documents": { "languages": ["groovy"] } });

        let config = LiveHintsConfig::from_settings(settings).unwrap();
        assert_eq!(config.documents.languages, vec!["groovy"]);
        assert!(config.highlights.enabled);
    }

    #[test]
    fn test_from_settings_null() {
        let config = LiveHintsConfig::from_settings(serde_json::Value::Null).unwrap();
        assert_eq!(config, LiveHintsConfig::default());

        let nested = serde_json::json!({ "livehints": null });
        let config = LiveHintsConfig::from_settings(nested).unwrap();
        assert_eq!(config, LiveHintsConfig::default());
    }

    #[test]
    fn test_from_settings_invalid() {
        let settings = serde_json::json!({ "highlights": { "enabled": "yes" } });
        assert!(LiveHintsConfig::from_settings(settings).is_err());
    }
}
