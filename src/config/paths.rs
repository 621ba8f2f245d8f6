//! Centralized path resolution for the source and publish trees.
//!
//! This module is the single source of truth for every well-known file the
//! toolkit touches, so no other module hard-codes data-file locations.
//!
//! # Architecture
//!
//! ```text
//! SiteConfig
//!     │
//!     └── paths() → SitePaths
//!                       │
//!                       ├── navigation()     → <source>/data/navigation.json
//!                       ├── pulse_items()    → <source>/pulse/data/items.json
//!                       ├── published(rel)   → <publish>/<rel>
//!                       └── api_root()       → <publish>/api/v1
//! ```

use std::path::{Path, PathBuf};

/// Publish-relative location of the navigation/projects document.
pub const NAVIGATION: &str = "data/navigation.json";
/// Publish-relative location of the curated featured document (optional).
pub const FEATURED: &str = "data/featured.json";
/// Publish-relative location of the skills index.
pub const SKILLS_INDEX: &str = "skills/data/index.json";
/// Publish-relative location of the blog post index.
pub const BLOG_INDEX: &str = "blog/posts/index.json";
/// Publish-relative location of the guide index.
pub const GUIDE_INDEX: &str = "guide/data/index.json";
/// Publish-relative location of the pulse items document.
pub const PULSE_ITEMS: &str = "pulse/data/items.json";
/// Publish-relative location of the pulse stats document.
pub const PULSE_STATS: &str = "pulse/data/pulse_stats.json";
/// Source-relative location of the edited-items registry (never published).
pub const EDITED_REGISTRY: &str = "pulse/data/edited_items.json";

/// Canonical locations for the source tree, the publish tree and the
/// well-known data files. Pure configuration, no logic.
#[derive(Debug, Clone)]
pub struct SitePaths {
    /// Source tree root
    pub source: PathBuf,
    /// Publish tree root
    pub publish: PathBuf,
}

impl SitePaths {
    pub fn new<S: Into<PathBuf>, P: Into<PathBuf>>(source: S, publish: P) -> Self {
        Self {
            source: source.into(),
            publish: publish.into(),
        }
    }

    /// Resolve a relative path inside the source tree.
    #[inline]
    pub fn source_file<R: AsRef<Path>>(&self, rel: R) -> PathBuf {
        self.source.join(rel)
    }

    /// Resolve a relative path inside the publish tree.
    #[inline]
    pub fn published<R: AsRef<Path>>(&self, rel: R) -> PathBuf {
        self.publish.join(rel)
    }

    pub fn navigation(&self) -> PathBuf {
        self.source_file(NAVIGATION)
    }

    pub fn featured(&self) -> PathBuf {
        self.source_file(FEATURED)
    }

    pub fn skills_index(&self) -> PathBuf {
        self.source_file(SKILLS_INDEX)
    }

    /// Directory holding the skills index and its Markdown documents.
    pub fn skills_dir(&self) -> PathBuf {
        self.source_file("skills/data")
    }

    pub fn blog_index(&self) -> PathBuf {
        self.source_file(BLOG_INDEX)
    }

    /// Directory holding the blog index and per-post Markdown files.
    pub fn blog_dir(&self) -> PathBuf {
        self.source_file("blog/posts")
    }

    pub fn guide_index(&self) -> PathBuf {
        self.source_file(GUIDE_INDEX)
    }

    /// Directory holding the guide index and per-guide Markdown files.
    pub fn guide_dir(&self) -> PathBuf {
        self.source_file("guide/data")
    }

    pub fn pulse_items(&self) -> PathBuf {
        self.source_file(PULSE_ITEMS)
    }

    pub fn pulse_stats(&self) -> PathBuf {
        self.source_file(PULSE_STATS)
    }

    /// Registry of edited/deleted pulse items (excluded from pull).
    pub fn edited_registry(&self) -> PathBuf {
        self.source_file(EDITED_REGISTRY)
    }

    /// Backup directory for items.json write operations.
    pub fn backups_dir(&self) -> PathBuf {
        self.source_file("pulse/data/.backups")
    }

    /// Methodology/template directory, copied verbatim into the API layer
    /// when present.
    pub fn craft_dir(&self) -> PathBuf {
        self.source_file("craft")
    }

    /// Root of the versioned machine-consumption snapshot.
    pub fn api_root(&self) -> PathBuf {
        self.published("api/v1")
    }

    /// Zero-byte marker telling the hosting platform to skip
    /// static-site-generator preprocessing.
    pub fn marker_file(&self) -> PathBuf {
        self.published(".nojekyll")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_side_files() {
        let paths = SitePaths::new("/site/src", "/site/docs");

        assert_eq!(
            paths.navigation(),
            PathBuf::from("/site/src/data/navigation.json")
        );
        assert_eq!(
            paths.pulse_items(),
            PathBuf::from("/site/src/pulse/data/items.json")
        );
        assert_eq!(
            paths.edited_registry(),
            PathBuf::from("/site/src/pulse/data/edited_items.json")
        );
        assert_eq!(paths.craft_dir(), PathBuf::from("/site/src/craft"));
    }

    #[test]
    fn test_publish_side_files() {
        let paths = SitePaths::new("/site/src", "/site/docs");

        assert_eq!(paths.api_root(), PathBuf::from("/site/docs/api/v1"));
        assert_eq!(paths.marker_file(), PathBuf::from("/site/docs/.nojekyll"));
        assert_eq!(
            paths.published(PULSE_ITEMS),
            PathBuf::from("/site/docs/pulse/data/items.json")
        );
    }

    #[test]
    fn test_dir_accessors() {
        let paths = SitePaths::new("/s", "/p");
        assert_eq!(paths.skills_dir(), PathBuf::from("/s/skills/data"));
        assert_eq!(paths.blog_dir(), PathBuf::from("/s/blog/posts"));
        assert_eq!(paths.guide_dir(), PathBuf::from("/s/guide/data"));
    }
}
