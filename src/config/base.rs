//! `[base]` section configuration.
//!
//! Site metadata: title, description, author, canonical URL, primary language.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in mulu.toml - basic site information.
///
/// # Example
/// ```toml
/// [base]
/// title = "Mulu"
/// description = "A bilingual project directory"
/// url = "https://example.com"
/// language = "zh-CN"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title
    pub title: String,

    /// Site description
    pub description: String,

    /// Site author
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Canonical site URL
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// Primary language code
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,
}
