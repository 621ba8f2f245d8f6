//! Featured content curation.
//!
//! Reads candidates from the source data files (navigation, skills, guide,
//! blog) and writes curated selections to `data/featured.json`.

use crate::{config::SitePaths, utils::json};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Valid featured sections.
pub const SECTIONS: &[&str] = &["projects", "guide", "blog"];

/// The curated selections document.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FeaturedDoc {
    #[serde(default)]
    pub projects: Vec<Value>,
    #[serde(default)]
    pub guide: Vec<Value>,
    #[serde(default)]
    pub blog: Vec<Value>,
}

/// A flattened project candidate with its lookup key.
struct Candidate {
    key: String,
    data: Value,
}

/// Current featured selections.
pub fn list_featured(paths: &SitePaths) -> FeaturedDoc {
    json::read_typed(&paths.featured()).unwrap_or_default()
}

/// Set the featured items of one section.
///
/// Projects match case-insensitively by name, falling back to a partial
/// match; guide and blog entries match by slug. Unknown ids are dropped.
pub fn set_featured(paths: &SitePaths, section: &str, ids: &[String]) -> Result<FeaturedDoc> {
    let mut doc = list_featured(paths);

    match section {
        "projects" => {
            let candidates = collect_projects(paths);
            let mut matched = Vec::new();
            for id in ids {
                let needle = id.trim().to_lowercase();
                let found = candidates
                    .iter()
                    .find(|c| c.key == needle)
                    .or_else(|| candidates.iter().find(|c| c.key.contains(&needle)));
                if let Some(found) = found {
                    matched.push(found.data.clone());
                }
            }
            doc.projects = matched;
        }
        "guide" => {
            let entries: Vec<Value> = json::read_typed(&paths.guide_index()).unwrap_or_default();
            doc.guide = match_by_slug(&entries, ids, "guide");
        }
        "blog" => {
            let entries: Vec<Value> = json::read_typed(&paths.blog_index()).unwrap_or_default();
            doc.blog = match_by_slug(&entries, ids, "blog");
        }
        _ => bail!("Unknown section: {section}. Use: projects, guide, blog"),
    }

    json::write_json_pretty(&paths.featured(), &doc)?;
    Ok(doc)
}

/// Clear all featured items in one section.
pub fn clear_featured(paths: &SitePaths, section: &str) -> Result<FeaturedDoc> {
    if !SECTIONS.contains(&section) {
        bail!("Unknown section: {section}. Use: projects, guide, blog");
    }

    let mut doc = list_featured(paths);
    match section {
        "projects" => doc.projects.clear(),
        "guide" => doc.guide.clear(),
        _ => doc.blog.clear(),
    }

    json::write_json_pretty(&paths.featured(), &doc)?;
    Ok(doc)
}

/// Flatten all available projects out of navigation and skills.
fn collect_projects(paths: &SitePaths) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    if let Some(nav) = json::read_json(&paths.navigation()) {
        for item in nav.get("featured").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default() {
            if let Some(name) = item.get("name").and_then(Value::as_str) {
                candidates.push(Candidate {
                    key: name.to_lowercase(),
                    data: json!({
                        "name": name,
                        "url": item.get("url").cloned().unwrap_or(Value::Null),
                        "desc": item.get("desc").cloned().unwrap_or(Value::Null),
                        "tags": item.get("tags").cloned().unwrap_or_else(|| json!([])),
                        "note": item.get("note").cloned().unwrap_or(Value::Null),
                        "icon": item.get("icon").cloned().unwrap_or(Value::Null),
                        "source": "navigation.featured",
                    }),
                });
            }
        }

        for cat in nav.get("categories").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default() {
            let cat_id = cat.get("id").and_then(Value::as_str).unwrap_or("");
            for item in cat.get("items").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default() {
                if let Some(name) = item.get("name").and_then(Value::as_str) {
                    let mut tags = vec![json!(cat_id)];
                    if let Some(extra) = item.get("tags").and_then(Value::as_array) {
                        tags.extend(extra.iter().cloned());
                    }
                    candidates.push(Candidate {
                        key: name.to_lowercase(),
                        data: json!({
                            "name": name,
                            "url": item.get("url").cloned().unwrap_or(Value::Null),
                            "desc": item.get("desc").cloned().unwrap_or(Value::Null),
                            "tags": tags,
                            "note": Value::Null,
                            "icon": Value::Null,
                            "source": format!("navigation.{cat_id}"),
                        }),
                    });
                }
            }
        }
    }

    let skills: Vec<Value> = json::read_typed(&paths.skills_index()).unwrap_or_default();
    for item in &skills {
        if let Some(name) = item.get("name").and_then(Value::as_str) {
            let mut tags = vec![json!("skills")];
            if let Some(extra) = item.get("tags").and_then(Value::as_array) {
                tags.extend(extra.iter().cloned());
            }
            candidates.push(Candidate {
                key: name.to_lowercase(),
                data: json!({
                    "name": name,
                    "url": item.get("github").cloned().unwrap_or(json!("#")),
                    "desc": item.get("desc").cloned().unwrap_or(Value::Null),
                    "tags": tags,
                    "note": Value::Null,
                    "icon": Value::Null,
                    "source": "skills",
                }),
            });
        }
    }

    candidates
}

/// Match index entries by slug, tagging each with its source.
fn match_by_slug(entries: &[Value], ids: &[String], source: &str) -> Vec<Value> {
    let mut matched = Vec::new();
    for id in ids {
        let slug = id.trim();
        if let Some(found) = entries
            .iter()
            .find(|e| e.get("slug").and_then(Value::as_str) == Some(slug))
        {
            let mut entry = found.clone();
            if let Some(obj) = entry.as_object_mut() {
                obj.insert("source".into(), json!(source));
            }
            matched.push(entry);
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture_paths(dir: &TempDir) -> SitePaths {
        SitePaths::new(dir.path().join("src"), dir.path().join("docs"))
    }

    fn write_json_file(path: &std::path::Path, value: &Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn seed_sources(paths: &SitePaths) {
        write_json_file(
            &paths.navigation(),
            &json!({
                "featured": [
                    {"name": "OpenTool", "url": "https://opentool.dev", "tags": ["official"]}
                ],
                "categories": [
                    {"id": "messaging", "items": [{"name": "ChatBridge", "url": "https://cb"}]}
                ]
            }),
        );
        write_json_file(
            &paths.skills_index(),
            &json!([{"name": "Translator", "github": "https://gh/t", "tags": ["lang"]}]),
        );
        write_json_file(
            &paths.guide_index(),
            &json!([{"slug": "getting-started", "order": 1}]),
        );
        write_json_file(
            &paths.blog_index(),
            &json!([{"slug": "welcome", "date": "2024-01-01"}]),
        );
    }

    #[test]
    fn test_list_featured_defaults_empty() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        let doc = list_featured(&paths);
        assert!(doc.projects.is_empty());
        assert!(doc.guide.is_empty());
        assert!(doc.blog.is_empty());
    }

    #[test]
    fn test_set_projects_exact_and_partial_match() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_sources(&paths);

        let doc = set_featured(
            &paths,
            "projects",
            &["opentool".into(), "chat".into(), "Translator".into()],
        )
        .unwrap();

        assert_eq!(doc.projects.len(), 3);
        assert_eq!(doc.projects[0].get("name"), Some(&json!("OpenTool")));
        assert_eq!(doc.projects[0].get("source"), Some(&json!("navigation.featured")));
        // Partial match on "chat"
        assert_eq!(doc.projects[1].get("name"), Some(&json!("ChatBridge")));
        assert_eq!(doc.projects[2].get("source"), Some(&json!("skills")));

        // Written to disk
        assert!(paths.featured().is_file());
    }

    #[test]
    fn test_set_guide_by_slug() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_sources(&paths);

        let doc = set_featured(&paths, "guide", &["getting-started".into()]).unwrap();
        assert_eq!(doc.guide.len(), 1);
        assert_eq!(doc.guide[0].get("source"), Some(&json!("guide")));
    }

    #[test]
    fn test_set_unknown_ids_are_dropped() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_sources(&paths);

        let doc = set_featured(&paths, "blog", &["nope".into(), "welcome".into()]).unwrap();
        assert_eq!(doc.blog.len(), 1);
        assert_eq!(doc.blog[0].get("slug"), Some(&json!("welcome")));
    }

    #[test]
    fn test_clear_section() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_sources(&paths);

        set_featured(&paths, "blog", &["welcome".into()]).unwrap();
        let doc = clear_featured(&paths, "blog").unwrap();
        assert!(doc.blog.is_empty());
    }

    #[test]
    fn test_unknown_section_is_an_error() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);

        assert!(set_featured(&paths, "nope", &["x".into()]).is_err());
        assert!(clear_featured(&paths, "nope").is_err());
    }

    #[test]
    fn test_set_preserves_other_sections() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_sources(&paths);

        set_featured(&paths, "blog", &["welcome".into()]).unwrap();
        let doc = set_featured(&paths, "guide", &["getting-started".into()]).unwrap();

        assert_eq!(doc.blog.len(), 1);
        assert_eq!(doc.guide.len(), 1);
    }
}
