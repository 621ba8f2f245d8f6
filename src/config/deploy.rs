//! `[deploy]` section configuration.
//!
//! Contains git push settings and the DNS / Pages REST automation targets.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[deploy]` section in mulu.toml - deployment configuration.
///
/// # Example
/// ```toml
/// [deploy.git]
/// url = "https://github.com/user/site"
/// branch = "main"
/// token_path = "~/.github-token"
///
/// [deploy.dns]
/// domain = "example.com"
/// pages_host = "user.github.io"
/// token_path = "~/.cloudflare-token"
///
/// [deploy.pages]
/// repo = "user/site"
/// token_path = "~/.github-token"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Git push settings for the sync/commit commands.
    #[serde(default)]
    pub git: GitDeployConfig,

    /// DNS record automation settings.
    #[serde(default)]
    pub dns: DnsConfig,

    /// Pages custom-domain automation settings.
    #[serde(default)]
    pub pages: PagesConfig,
}

/// `[deploy.git]` section - repository remote configuration.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct GitDeployConfig {
    /// Remote name to push to.
    #[serde(default = "defaults::deploy::git::remote")]
    #[educe(Default = defaults::deploy::git::remote())]
    pub remote: String,

    /// Repository URL (HTTPS format). When set, the origin remote is
    /// reconfigured with an authenticated URL before pushing.
    #[serde(default = "defaults::deploy::git::url")]
    #[educe(Default = defaults::deploy::git::url())]
    pub url: String,

    /// Target branch for pushes.
    #[serde(default = "defaults::deploy::git::branch")]
    #[educe(Default = defaults::deploy::git::branch())]
    pub branch: String,

    /// Path to file containing a personal access token.
    ///
    /// # Security
    /// - Store outside repository (e.g., `~/.github-token`)
    /// - Never commit tokens to version control!
    #[serde(default = "defaults::deploy::git::token_path")]
    #[educe(Default = defaults::deploy::git::token_path())]
    pub token_path: Option<PathBuf>,
}

/// `[deploy.dns]` section - DNS records pointing at the Pages host.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct DnsConfig {
    /// Apex domain to manage (e.g. "example.com").
    #[serde(default = "defaults::deploy::dns::domain")]
    #[educe(Default = defaults::deploy::dns::domain())]
    pub domain: String,

    /// Pages host the CNAME records point at (e.g. "user.github.io").
    #[serde(default = "defaults::deploy::dns::pages_host")]
    #[educe(Default = defaults::deploy::dns::pages_host())]
    pub pages_host: String,

    /// Path to file containing the DNS provider API token.
    #[serde(default = "defaults::deploy::dns::token_path")]
    #[educe(Default = defaults::deploy::dns::token_path())]
    pub token_path: Option<PathBuf>,
}

/// `[deploy.pages]` section - Pages custom domain configuration.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// Repository in "owner/name" form.
    #[serde(default = "defaults::deploy::pages::repo")]
    #[educe(Default = defaults::deploy::pages::repo())]
    pub repo: String,

    /// Path to file containing the hosting platform API token.
    #[serde(default = "defaults::deploy::pages::token_path")]
    #[educe(Default = defaults::deploy::pages::token_path())]
    pub token_path: Option<PathBuf>,
}
