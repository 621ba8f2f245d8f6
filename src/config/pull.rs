//! `[pull]` section configuration.
//!
//! Where the pull command imports externally-produced data from.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[pull]` section in mulu.toml - publisher import configuration.
///
/// # Example
/// ```toml
/// [pull]
/// source = "../publisher/out"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PullConfig {
    /// Publisher output directory (relative to project root).
    #[serde(default = "defaults::pull::source")]
    #[educe(Default = defaults::pull::source())]
    pub source: PathBuf,
}
