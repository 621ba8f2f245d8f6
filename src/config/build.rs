//! `[build]` section configuration.
//!
//! Contains build settings: source/publish paths, analytics injection,
//! translation validation and API snapshot generation.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in mulu.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// source = "src"       # Source tree
/// publish = "docs"     # Publish tree
/// clean = true         # Clear publish tree before each build
///
/// [build.analytics]
/// id = "G-XXXXXXXXXX"
///
/// [build.i18n]
/// locales = ["zh-CN", "en-US"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Source tree directory.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Publish tree directory (served by the hosting platform).
    #[serde(default = "defaults::build::publish")]
    #[educe(Default = defaults::build::publish())]
    pub publish: PathBuf,

    /// Clear the publish tree before each build.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub clean: bool,

    /// Analytics snippet injection settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Bilingual field validation settings.
    #[serde(default)]
    pub i18n: I18nConfig,

    /// API snapshot generation settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// `[build.analytics]` section - tracking snippet injection.
///
/// Injection is a no-op when `id` is empty.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Enable snippet injection into published HTML files.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Measurement id (e.g. "G-XXXXXXXXXX").
    #[serde(default = "defaults::build::analytics::id")]
    #[educe(Default = defaults::build::analytics::id())]
    pub id: String,
}

/// `[build.i18n]` section - translation completeness validation.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    /// Enable bilingual field validation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Locales every bilingual field must cover.
    #[serde(default = "defaults::build::i18n::locales")]
    #[educe(Default = defaults::build::i18n::locales())]
    pub locales: Vec<String>,
}

/// `[build.api]` section - versioned JSON snapshot for machine consumption.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Enable api/v1 snapshot generation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.source, PathBuf::from("src"));
        assert_eq!(config.build.publish, PathBuf::from("docs"));
        assert!(config.build.clean);
        assert!(config.build.analytics.enable);
        assert!(config.build.analytics.id.is_empty());
        assert!(config.build.i18n.enable);
        assert_eq!(config.build.i18n.locales, vec!["zh-CN", "en-US"]);
        assert!(config.build.api.enable);
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            source = "content"
            publish = "public"
            clean = false

            [build.analytics]
            id = "G-4WV60W6FM6"

            [build.i18n]
            enable = false
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.source, PathBuf::from("content"));
        assert_eq!(config.build.publish, PathBuf::from("public"));
        assert!(!config.build.clean);
        assert_eq!(config.build.analytics.id, "G-4WV60W6FM6");
        assert!(!config.build.i18n.enable);
    }

    #[test]
    fn test_build_config_unknown_field_rejection() {
        let config = r#"
            [build]
            output = "public"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_i18n_custom_locales() {
        let config = r#"
            [build.i18n]
            locales = ["zh-CN", "en-US", "ja-JP"]
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();
        assert_eq!(config.build.i18n.locales.len(), 3);
    }
}
