//! User settings for Pocketbook
//!
//! Manages the currency defaults, reconciliation matching policy and the
//! lifetimes of transient UI markers.

use serde::{Deserialize, Serialize};

use super::paths::PocketbookPaths;
use crate::error::PocketbookError;

/// How names read from outside (spreadsheets, the CLI) are matched against
/// existing wallets and categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NameMatchPolicy {
    /// Byte-for-byte equality (the default)
    #[default]
    Exact,
    /// Equality after trimming surrounding whitespace
    Trimmed,
    /// Equality after trimming and lowercasing
    CaseInsensitive,
}

impl NameMatchPolicy {
    /// Normalize a name into its lookup key under this policy
    pub fn normalize(&self, name: &str) -> String {
        match self {
            Self::Exact => name.to_string(),
            Self::Trimmed => name.trim().to_string(),
            Self::CaseInsensitive => name.trim().to_lowercase(),
        }
    }

    /// Parse a policy name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "trimmed" | "trim" => Some(Self::Trimmed),
            "case_insensitive" | "case-insensitive" | "insensitive" => Some(Self::CaseInsensitive),
            _ => None,
        }
    }
}

/// User settings for Pocketbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// ISO currency code stamped on new transactions and wallets
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Symbol used when printing amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Matching policy for wallet and category names
    #[serde(default)]
    pub name_match_policy: NameMatchPolicy,

    /// Wallet used when a transaction omits one; the first wallet if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_wallet: Option<String>,

    /// How long the "transaction added" toast stays visible
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,

    /// How long a new transaction stays highlighted
    #[serde(default = "default_marker_duration_ms")]
    pub marker_duration_ms: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "THB".to_string()
}

fn default_currency_symbol() -> String {
    "฿".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_toast_duration_ms() -> u64 {
    2500
}

fn default_marker_duration_ms() -> u64 {
    3000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency: default_currency(),
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
            name_match_policy: NameMatchPolicy::default(),
            default_wallet: None,
            toast_duration_ms: default_toast_duration_ms(),
            marker_duration_ms: default_marker_duration_ms(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &PocketbookPaths) -> Result<Self, PocketbookError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                PocketbookError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PocketbookError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PocketbookPaths) -> Result<(), PocketbookError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            PocketbookError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            PocketbookError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency, "THB");
        assert_eq!(settings.name_match_policy, NameMatchPolicy::Exact);
        assert_eq!(settings.toast_duration_ms, 2500);
        assert_eq!(settings.marker_duration_ms, 3000);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PocketbookPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.name_match_policy = NameMatchPolicy::CaseInsensitive;
        settings.default_wallet = Some("PromptPay".into());
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.name_match_policy, NameMatchPolicy::CaseInsensitive);
        assert_eq!(loaded.default_wallet.as_deref(), Some("PromptPay"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency": "USD"}"#).unwrap();
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.currency_symbol, "฿");
        assert_eq!(settings.name_match_policy, NameMatchPolicy::Exact);
    }

    #[test]
    fn test_policy_normalize() {
        assert_eq!(NameMatchPolicy::Exact.normalize(" Food "), " Food ");
        assert_eq!(NameMatchPolicy::Trimmed.normalize(" Food "), "Food");
        assert_eq!(NameMatchPolicy::CaseInsensitive.normalize(" Food "), "food");
        assert_eq!(
            NameMatchPolicy::parse("case-insensitive"),
            Some(NameMatchPolicy::CaseInsensitive)
        );
        assert_eq!(NameMatchPolicy::parse("fuzzy"), None);
    }
}
