//! Unified read layer for the published datasets.
//!
//! Every function reads from the publish tree and returns plain values;
//! a missing or unparseable file yields an empty collection, never an error.

use crate::{
    config::{SitePaths, paths},
    data::types::{BlogPost, GuideEntry, ProjectEntry, PulseItem, SiteStats, Skill},
    utils::json,
};
use chrono::{Days, Local, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use super::types::Bilingual;

// ============================================================================
// Filters
// ============================================================================

/// Pulse listing filters.
#[derive(Debug, Clone, Default)]
pub struct PulseFilter {
    /// Only items from the last N days.
    pub days: Option<i64>,
    /// Minimum score threshold.
    pub min_score: Option<f64>,
    /// Author handle (case-insensitive, leading `@` ignored).
    pub author: Option<String>,
    /// Max items to return.
    pub limit: Option<usize>,
}

/// Project listing filters.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
}

// ============================================================================
// Navigation document shape
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct NavigationDoc {
    #[serde(default)]
    featured: Vec<NavItem>,
    #[serde(default)]
    categories: Vec<NavCategory>,
}

#[derive(Debug, Deserialize)]
struct NavCategory {
    #[serde(default)]
    id: String,
    #[serde(default)]
    items: Vec<NavItem>,
}

#[derive(Debug, Deserialize)]
struct NavItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: Option<Bilingual>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    tags: Vec<String>,
}

// ============================================================================
// Public API
// ============================================================================

/// Read pulse items with optional filters.
pub fn read_pulse(paths: &SitePaths, filter: &PulseFilter) -> Vec<PulseItem> {
    let items = json::read_typed(&paths.published(paths::PULSE_ITEMS)).unwrap_or_default();
    filter_pulse(items, filter, Local::now().date_naive())
}

/// Apply pulse filters against a fixed "today" (separated for testing).
pub(crate) fn filter_pulse(
    mut items: Vec<PulseItem>,
    filter: &PulseFilter,
    today: NaiveDate,
) -> Vec<PulseItem> {
    if let Some(days) = filter.days {
        let cutoff = today
            .checked_sub_days(Days::new(days.max(0) as u64))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string();
        items.retain(|it| it.date.as_str() >= cutoff.as_str());
    }

    if let Some(min) = filter.min_score {
        items.retain(|it| it.score >= min);
    }

    if let Some(author) = &filter.author {
        let needle = author.trim_start_matches('@').to_lowercase();
        items.retain(|it| {
            it.author
                .trim_start_matches('@')
                .to_lowercase()
                .contains(&needle)
        });
    }

    if let Some(limit) = filter.limit {
        items.truncate(limit);
    }

    items
}

/// Read the project directory flattened out of the navigation document:
/// featured entries first, then every category item.
pub fn read_projects(paths: &SitePaths, filter: &ProjectFilter) -> Vec<ProjectEntry> {
    let nav: NavigationDoc = json::read_typed(&paths.published(paths::NAVIGATION)).unwrap_or_default();

    let mut results = Vec::new();
    for item in nav.featured {
        results.push(ProjectEntry {
            name: item.name,
            desc: item.desc,
            url: item.url,
            category: "featured".into(),
            tags: item.tags,
        });
    }
    for cat in nav.categories {
        for item in cat.items {
            results.push(ProjectEntry {
                name: item.name,
                desc: item.desc,
                url: item.url,
                category: cat.id.clone(),
                tags: item.tags,
            });
        }
    }

    if let Some(category) = &filter.category {
        let needle = category.to_lowercase();
        results.retain(|r| r.category.to_lowercase() == needle);
    }
    if let Some(tag) = &filter.tag {
        let needle = tag.to_lowercase();
        results.retain(|r| r.tags.iter().any(|t| t.to_lowercase() == needle));
    }

    results
}

/// Read the skills index with an optional category filter.
pub fn read_skills(paths: &SitePaths, category: Option<&str>) -> Vec<Skill> {
    let mut items: Vec<Skill> =
        json::read_typed(&paths.published(paths::SKILLS_INDEX)).unwrap_or_default();

    if let Some(category) = category {
        let needle = category.to_lowercase();
        items.retain(|it| it.category.to_lowercase() == needle);
    }

    items
}

/// Read blog post summaries, newest first.
pub fn read_blog(paths: &SitePaths, tag: Option<&str>, latest: Option<usize>) -> Vec<BlogPost> {
    let mut items: Vec<BlogPost> =
        json::read_typed(&paths.published(paths::BLOG_INDEX)).unwrap_or_default();

    items.sort_by(|a, b| b.date.cmp(&a.date));

    if let Some(tag) = tag {
        let needle = tag.to_lowercase();
        items.retain(|it| it.tags.iter().any(|t| t.to_lowercase() == needle));
    }

    if let Some(latest) = latest {
        items.truncate(latest);
    }

    items
}

/// Read the guide index sorted by order.
pub fn read_guide(paths: &SitePaths) -> Vec<GuideEntry> {
    let mut items: Vec<GuideEntry> =
        json::read_typed(&paths.published(paths::GUIDE_INDEX)).unwrap_or_default();
    items.sort_by_key(|it| it.order);
    items
}

/// Aggregate stats across all data sources.
pub fn site_stats(paths: &SitePaths) -> SiteStats {
    let pulse: Vec<PulseItem> =
        json::read_typed(&paths.published(paths::PULSE_ITEMS)).unwrap_or_default();
    let skills: Vec<Skill> =
        json::read_typed(&paths.published(paths::SKILLS_INDEX)).unwrap_or_default();
    let blog: Vec<BlogPost> =
        json::read_typed(&paths.published(paths::BLOG_INDEX)).unwrap_or_default();
    let guide: Vec<GuideEntry> =
        json::read_typed(&paths.published(paths::GUIDE_INDEX)).unwrap_or_default();
    let nav: Option<Value> = json::read_json(&paths.published(paths::NAVIGATION));

    let projects_count = nav.as_ref().map_or(0, |nav| {
        let featured = nav
            .get("featured")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let categorized = nav
            .get("categories")
            .and_then(Value::as_array)
            .map_or(0, |cats| {
                cats.iter()
                    .filter_map(|c| c.get("items").and_then(Value::as_array))
                    .map(Vec::len)
                    .sum()
            });
        featured + categorized
    });

    SiteStats {
        pulse_count: pulse.len(),
        skills_count: skills.len(),
        blog_count: blog.len(),
        guide_count: guide.len(),
        projects_count,
        // items.json is kept sorted newest-first
        pulse_latest_date: pulse.first().map(|it| it.date.clone()),
        blog_latest_date: blog.iter().map(|it| it.date.clone()).max(),
    }
}
