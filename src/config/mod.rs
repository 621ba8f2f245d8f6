//! Site configuration management for `mulu.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                         |
//! |------------|-------------------------------------------------|
//! | `[base]`   | Site metadata (title, author, url, language)    |
//! | `[build]`  | Source/publish paths, analytics, i18n, API      |
//! | `[deploy]` | Git push, DNS records, Pages custom domain      |
//! | `[pull]`   | Publisher import source                         |
//! | `[extra]`  | User-defined custom fields                      |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Mulu"
//! description = "A bilingual project directory"
//!
//! [build]
//! source = "src"
//! publish = "docs"
//!
//! [build.analytics]
//! id = "G-XXXXXXXXXX"
//!
//! [extra]
//! beian = "京ICP备00000000号"
//! ```

mod base;
mod build;
pub mod defaults;
mod deploy;
mod error;
pub mod paths;
mod pull;

pub use paths::SitePaths;

use base::BaseConfig;
use build::BuildConfig;
use deploy::DeployConfig;
use error::ConfigError;
use pull::PullConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing mulu.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Deployment settings
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Publisher import settings
    #[serde(default)]
    pub pull: PullConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Canonical source/publish locations for this invocation
    pub fn site_paths(&self) -> SitePaths {
        SitePaths::new(&self.build.source, &self.build.publish)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        self.set_root(&root);
        self.update_path_with_root(&root);
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Normalize root to absolute path
        let root = Self::normalize_path(root);
        self.set_root(&root);

        // Normalize config path
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        // Normalize the two trees
        self.build.source = Self::normalize_path(&root.join(&self.build.source));
        self.build.publish = Self::normalize_path(&root.join(&self.build.publish));

        // Normalize the pull source (may not exist yet)
        if self.pull.source.is_relative() {
            self.pull.source = Self::normalize_path(&root.join(&self.pull.source));
        }

        // Normalize token paths (with tilde expansion)
        for token_path in [
            &mut self.deploy.git.token_path,
            &mut self.deploy.dns.token_path,
            &mut self.deploy.pages.token_path,
        ] {
            if let Some(path) = token_path.as_ref() {
                let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
                let path = PathBuf::from(expanded);
                *token_path = Some(if path.is_relative() {
                    Self::normalize_path(&root.join(path))
                } else {
                    Self::normalize_path(&path)
                });
            }
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        let cli = self.get_cli();

        match &cli.command {
            Commands::Build { .. } | Commands::Sync { .. } | Commands::Pull { .. } => {
                if !self.build.source.exists() {
                    bail!(ConfigError::Validation(format!(
                        "[build.source] not found: {}",
                        self.build.source.display()
                    )));
                }
            }
            _ => {}
        }

        match &cli.command {
            Commands::Commit { .. } | Commands::Sync { .. } | Commands::Pull { .. } => {
                Self::check_command_installed("git")?;
            }
            Commands::SetupDns => {
                if self.deploy.dns.domain.is_empty() {
                    bail!(ConfigError::Validation(
                        "[deploy.dns.domain] is required for setup-dns".into()
                    ));
                }
                if self.deploy.dns.pages_host.is_empty() {
                    bail!(ConfigError::Validation(
                        "[deploy.dns.pages_host] is required for setup-dns".into()
                    ));
                }
                Self::check_token_path("[deploy.dns.token_path]", &self.deploy.dns.token_path)?;
            }
            Commands::SetupPages => {
                let repo = &self.deploy.pages.repo;
                if repo.split('/').filter(|s| !s.is_empty()).count() != 2 {
                    bail!(ConfigError::Validation(
                        "[deploy.pages.repo] must be in owner/name form".into()
                    ));
                }
                Self::check_token_path("[deploy.pages.token_path]", &self.deploy.pages.token_path)?;
            }
            _ => {}
        }

        if let Some(url) = &self.base.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(cmd: &str) -> Result<()> {
        which::which(cmd).with_context(|| format!("`{cmd}` not found. Please install it first."))?;
        Ok(())
    }

    /// Check that a configured token file exists
    fn check_token_path(field: &str, path: &Option<PathBuf>) -> Result<()> {
        match path {
            None => bail!(ConfigError::Validation(format!("{field} is required"))),
            Some(path) if !path.is_file() => {
                bail!(ConfigError::Validation(format!("{field} not found")))
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let config_str = r#"
            [base]
            title = "Mulu"
            description = "A test directory"
            author = "Test Author"
        "#;
        let result = SiteConfig::from_str(config_str);

        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.base.title, "Mulu");
        assert_eq!(config.base.author, "Test Author");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let invalid_config = r#"
            [base
            title = "Mulu"
        "#;
        let result = SiteConfig::from_str(invalid_config);

        assert!(result.is_err());
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_site_paths() {
        let mut config = SiteConfig::default();
        config.build.source = PathBuf::from("/site/src");
        config.build.publish = PathBuf::from("/site/docs");

        let paths = config.site_paths();
        assert_eq!(paths.source, PathBuf::from("/site/src"));
        assert_eq!(paths.publish, PathBuf::from("/site/docs"));
    }

    #[test]
    fn test_extra_fields() {
        let config = r#"
            [base]
            title = "Test"
            description = "Test directory"

            [extra]
            custom_field = "custom_value"
            number_field = 42
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(
            config.extra.get("custom_field").and_then(|v| v.as_str()),
            Some("custom_value")
        );
        assert_eq!(
            config.extra.get("number_field").and_then(|v| v.as_integer()),
            Some(42)
        );
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.base.title, "");
        assert!(config.build.clean);
        assert_eq!(config.build.source, PathBuf::from("src"));
        assert_eq!(config.build.publish, PathBuf::from("docs"));
        assert_eq!(config.deploy.git.branch, "main");
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [base]
            title = "Test"

            [unknown_section]
            field = "value"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_full_config_all_sections() {
        let config = r#"
            [base]
            title = "Mulu"
            description = "A bilingual project directory"
            author = "Alice"
            url = "https://example.com"
            language = "zh-CN"

            [build]
            source = "src"
            publish = "docs"
            clean = true

            [build.analytics]
            id = "G-4WV60W6FM6"

            [build.i18n]
            locales = ["zh-CN", "en-US"]

            [deploy.git]
            url = "https://github.com/alice/site"
            branch = "main"

            [deploy.dns]
            domain = "example.com"
            pages_host = "alice.github.io"

            [deploy.pages]
            repo = "alice/site"

            [pull]
            source = "../publisher/out"

            [extra]
            analytics_note = "site-wide"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.base.title, "Mulu");
        assert_eq!(config.build.analytics.id, "G-4WV60W6FM6");
        assert_eq!(config.deploy.dns.domain, "example.com");
        assert_eq!(config.deploy.pages.repo, "alice/site");
        assert!(config.extra.contains_key("analytics_note"));
    }
}
