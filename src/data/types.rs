//! Shared data types for the published datasets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A content field carrying either a language-neutral string (e.g. a proper
/// name) or parallel translations keyed by locale code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bilingual {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl Bilingual {
    /// Text for one locale; a plain value answers every locale.
    pub fn get(&self, locale: &str) -> Option<&str> {
        match self {
            Self::Plain(s) => Some(s),
            Self::Localized(map) => map.get(locale).map(String::as_str),
        }
    }

    /// All text carried by the field, for keyword matching.
    pub fn full_text(&self) -> String {
        match self {
            Self::Plain(s) => s.clone(),
            Self::Localized(map) => map.values().cloned().collect::<Vec<_>>().join(" "),
        }
    }
}

/// A curated social-engagement highlight record.
///
/// Unknown fields round-trip through `extra` so edits never drop data the
/// publisher added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseItem {
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_url: String,
    #[serde(default)]
    pub post_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Bilingual>,
    /// Editor's bilingual commentary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Bilingual>,
    #[serde(default)]
    pub relevance: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub engagement: Map<String, Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A blog post summary from the blog index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogPost {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Bilingual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Bilingual>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the skills index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<Bilingual>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the guide index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideEntry {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Bilingual>,
    #[serde(default)]
    pub order: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A project flattened out of the navigation document.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<Bilingual>,
    pub url: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Unified search result across all data sources.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub kind: &'static str,
    pub id: String,
    pub title: Value,
    pub summary: Value,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Aggregate counts across all data sources.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteStats {
    pub pulse_count: usize,
    pub skills_count: usize,
    pub blog_count: usize,
    pub guide_count: usize,
    pub projects_count: usize,
    pub pulse_latest_date: Option<String>,
    pub blog_latest_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bilingual_plain_roundtrip() {
        let b: Bilingual = serde_json::from_value(json!("OpenTool")).unwrap();
        assert_eq!(b, Bilingual::Plain("OpenTool".into()));
        assert_eq!(b.get("zh-CN"), Some("OpenTool"));
        assert_eq!(b.get("en-US"), Some("OpenTool"));
    }

    #[test]
    fn test_bilingual_localized_roundtrip() {
        let b: Bilingual =
            serde_json::from_value(json!({"zh-CN": "描述", "en-US": "desc"})).unwrap();
        assert_eq!(b.get("zh-CN"), Some("描述"));
        assert_eq!(b.get("en-US"), Some("desc"));
        assert_eq!(b.get("ja-JP"), None);
    }

    #[test]
    fn test_bilingual_full_text() {
        let b: Bilingual =
            serde_json::from_value(json!({"zh-CN": "描述", "en-US": "desc"})).unwrap();
        let text = b.full_text();
        assert!(text.contains("描述"));
        assert!(text.contains("desc"));
    }

    #[test]
    fn test_pulse_item_preserves_unknown_fields() {
        let raw = json!({
            "id": "1",
            "date": "2024-01-01",
            "score": 0.8,
            "synced_at": "2024-01-01T00:00:00Z",
            "draft_comment": "internal"
        });
        let item: PulseItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.id, "1");
        assert_eq!(item.score, 0.8);
        assert!(item.extra.contains_key("synced_at"));
        assert!(item.extra.contains_key("draft_comment"));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back.get("synced_at"), raw.get("synced_at"));
    }

    #[test]
    fn test_guide_entry_defaults() {
        let entry: GuideEntry = serde_json::from_value(json!({"slug": "start"})).unwrap();
        assert_eq!(entry.slug, "start");
        assert_eq!(entry.order, 0);
        assert!(entry.title.is_none());
    }
}
