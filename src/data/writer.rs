//! Write layer for pulse item editing.
//!
//! Handles backup, patch validation and writes to items.json, plus the
//! edited-items registry that keeps deleted/edited ids out of future pulls.
//! Writes target the source tree; the next build publishes them.

use crate::utils::json;
use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::{cmp::Ordering, collections::BTreeMap, fs, path::Path};

use crate::config::SitePaths;

/// Backups kept for items.json; oldest are pruned.
const MAX_BACKUPS: usize = 20;

/// Closed set of allowed comment types.
pub const VALID_COMMENT_TYPES: &[&str] = &[
    "add_insight",
    "agree_and_extend",
    "ask_question",
    "share_experience",
    "recommend_resource",
];

/// Bilingual fields that merge per-locale instead of overwriting whole.
const BILINGUAL_FIELDS: &[&str] = &["title", "summary", "note"];

// ============================================================================
// Patch types
// ============================================================================

/// A partial bilingual update: only the locales present overwrite.
#[derive(Debug, Clone, Default)]
pub struct LocalePatch {
    pub en: Option<String>,
    pub zh: Option<String>,
}

impl LocalePatch {
    pub fn from_flags(en: Option<String>, zh: Option<String>) -> Option<Self> {
        if en.is_none() && zh.is_none() {
            None
        } else {
            Some(Self { en, zh })
        }
    }
}

/// Validated field updates for a single pulse item. The `id` field is
/// immutable by construction: there is no way to patch it.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub score: Option<f64>,
    pub comment_type: Option<String>,
    pub relevance: Option<String>,
    pub suggested_angle: Option<String>,
    pub title: Option<LocalePatch>,
    pub summary: Option<LocalePatch>,
    pub note: Option<LocalePatch>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.score.is_none()
            && self.comment_type.is_none()
            && self.relevance.is_none()
            && self.suggested_angle.is_none()
            && self.title.is_none()
            && self.summary.is_none()
            && self.note.is_none()
    }

    /// Reject out-of-range or unknown values before anything is written.
    fn validate(&self) -> Result<()> {
        if let Some(score) = self.score
            && !(0.0..=1.0).contains(&score)
        {
            bail!("Invalid score \"{score}\": must be a number between 0 and 1.");
        }

        if let Some(comment_type) = &self.comment_type
            && !VALID_COMMENT_TYPES.contains(&comment_type.as_str())
        {
            bail!(
                "Invalid comment_type \"{comment_type}\". Must be one of: {}",
                VALID_COMMENT_TYPES.join(", ")
            );
        }

        Ok(())
    }

    /// Names of the fields this patch modifies, for the registry.
    fn field_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.score.is_some() {
            names.push("score".into());
        }
        if self.comment_type.is_some() {
            names.push("comment_type".into());
        }
        if self.relevance.is_some() {
            names.push("relevance".into());
        }
        if self.suggested_angle.is_some() {
            names.push("suggested_angle".into());
        }
        if self.title.is_some() {
            names.push("title".into());
        }
        if self.summary.is_some() {
            names.push("summary".into());
        }
        if self.note.is_some() {
            names.push("note".into());
        }
        names
    }
}

// ============================================================================
// Edited-items registry
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct Registry {
    #[serde(default)]
    items: BTreeMap<String, Value>,
}

fn read_registry(paths: &SitePaths) -> Registry {
    json::read_typed(&paths.edited_registry()).unwrap_or_default()
}

fn write_registry(paths: &SitePaths, registry: &Registry) -> Result<()> {
    json::write_json_pretty(&paths.edited_registry(), registry)
}

/// All ids that must stay out of pull imports.
pub fn excluded_ids(paths: &SitePaths) -> Vec<String> {
    read_registry(paths)
        .items
        .iter()
        .filter(|(_, entry)| {
            matches!(
                entry.get("status").and_then(Value::as_str),
                Some("deleted") | Some("edited")
            )
        })
        .map(|(id, _)| id.clone())
        .collect()
}

/// Record a deletion, storing the full item data for later restoration.
fn register_deleted(paths: &SitePaths, id: &str, item: &Value, reason: &str) -> Result<()> {
    let mut registry = read_registry(paths);
    registry.items.insert(
        id.to_string(),
        json!({
            "status": "deleted",
            "deleted_at": Utc::now().to_rfc3339(),
            "reason": reason,
            "post_url": item.get("post_url").cloned().unwrap_or(Value::Null),
            "author": item.get("author").cloned().unwrap_or(Value::Null),
            "data": item,
        }),
    );
    write_registry(paths, &registry)
}

/// Record an edit, unioning the modified field names across edits.
fn register_edited(paths: &SitePaths, id: &str, item: &Value, fields: Vec<String>) -> Result<()> {
    let mut registry = read_registry(paths);

    let mut all_fields = fields;
    if let Some(existing) = registry.items.get(id)
        && existing.get("status").and_then(Value::as_str) == Some("edited")
        && let Some(previous) = existing.get("fields").and_then(Value::as_array)
    {
        for field in previous {
            if let Some(field) = field.as_str()
                && !all_fields.iter().any(|f| f == field)
            {
                all_fields.push(field.to_string());
            }
        }
    }

    registry.items.insert(
        id.to_string(),
        json!({
            "status": "edited",
            "modified_at": Utc::now().to_rfc3339(),
            "fields": all_fields,
            "post_url": item.get("post_url").cloned().unwrap_or(Value::Null),
            "author": item.get("author").cloned().unwrap_or(Value::Null),
        }),
    );
    write_registry(paths, &registry)
}

// ============================================================================
// Backups
// ============================================================================

/// Timestamped backup of items.json, pruned to `MAX_BACKUPS`.
fn backup_items(paths: &SitePaths) -> Result<()> {
    let items = paths.pulse_items();
    if !items.exists() {
        return Ok(());
    }

    let backups = paths.backups_dir();
    fs::create_dir_all(&backups)
        .with_context(|| format!("Failed to create {}", backups.display()))?;

    let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
    fs::copy(&items, backups.join(format!("items-{stamp}.json")))
        .context("Failed to back up items.json")?;

    prune_backups(&backups)
}

fn prune_backups(backups: &Path) -> Result<()> {
    let mut names: Vec<String> = fs::read_dir(backups)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("items-") && name.ends_with(".json"))
        .collect();
    names.sort();

    while names.len() > MAX_BACKUPS {
        let oldest = names.remove(0);
        fs::remove_file(backups.join(oldest))?;
    }

    Ok(())
}

/// Back up then rewrite items.json.
fn write_items(paths: &SitePaths, items: &[Value]) -> Result<()> {
    backup_items(paths)?;
    json::write_json_pretty(&paths.pulse_items(), &items)
}

// ============================================================================
// Item operations
// ============================================================================

fn read_items(paths: &SitePaths) -> Result<Vec<Value>> {
    let path = paths.pulse_items();
    match json::read_json(&path) {
        Some(Value::Array(items)) => Ok(items),
        _ => bail!("Could not read {}", path.display()),
    }
}

fn find_index(items: &[Value], id: &str) -> Result<usize> {
    items
        .iter()
        .position(|it| it.get("id").and_then(Value::as_str) == Some(id))
        .ok_or_else(|| anyhow!("Item not found: \"{id}\""))
}

/// Merge a bilingual field: only the locale keys present in the patch
/// overwrite, preserving the other language.
fn merge_bilingual(existing: Option<&Value>, patch: &LocalePatch) -> Value {
    let mut base = match existing {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    if let Some(en) = &patch.en {
        base.insert("en-US".into(), Value::String(en.clone()));
    }
    if let Some(zh) = &patch.zh {
        base.insert("zh-CN".into(), Value::String(zh.clone()));
    }
    Value::Object(base)
}

/// Update a single pulse item by id, then mark it edited in the registry.
/// Returns the updated item.
pub fn update_item(paths: &SitePaths, id: &str, patch: &ItemPatch) -> Result<Value> {
    if patch.is_empty() {
        bail!("No fields to update.");
    }
    patch.validate()?;

    let mut items = read_items(paths)?;
    let idx = find_index(&items, id)?;

    {
        let obj = items[idx]
            .as_object_mut()
            .ok_or_else(|| anyhow!("Item \"{id}\" is not an object"))?;

        if let Some(score) = patch.score {
            obj.insert("score".into(), json!(score));
        }
        if let Some(comment_type) = &patch.comment_type {
            obj.insert("comment_type".into(), json!(comment_type));
        }
        if let Some(relevance) = &patch.relevance {
            obj.insert("relevance".into(), json!(relevance));
        }
        if let Some(angle) = &patch.suggested_angle {
            obj.insert("suggested_angle".into(), json!(angle));
        }
        for (key, locale_patch) in BILINGUAL_FIELDS.iter().zip([
            patch.title.as_ref(),
            patch.summary.as_ref(),
            patch.note.as_ref(),
        ]) {
            if let Some(locale_patch) = locale_patch {
                let merged = merge_bilingual(obj.get(*key), locale_patch);
                obj.insert((*key).into(), merged);
            }
        }
    }

    let updated = items[idx].clone();
    write_items(paths, &items)?;
    register_edited(paths, id, &updated, patch.field_names())?;

    Ok(updated)
}

/// Delete a single pulse item by id. The item is removed from items.json
/// and registered as deleted so a pull never restores it.
pub fn delete_item(paths: &SitePaths, id: &str, reason: &str) -> Result<Value> {
    let mut items = read_items(paths)?;
    let idx = find_index(&items, id)?;
    let removed = items.remove(idx);

    write_items(paths, &items)?;
    register_deleted(paths, id, &removed, reason)?;

    let mut result = removed;
    if let Some(obj) = result.as_object_mut() {
        obj.insert("status".into(), json!("deleted"));
        obj.insert("deleted_at".into(), json!(Utc::now().to_rfc3339()));
    }
    Ok(result)
}

/// Restore an item: put stored data back into items.json (deleted items)
/// and drop the registry entry. Returns false when the id is unknown.
pub fn restore_item(paths: &SitePaths, id: &str) -> Result<bool> {
    let mut registry = read_registry(paths);
    let Some(entry) = registry.items.remove(id) else {
        return Ok(false);
    };

    if let Some(data) = entry.get("data").filter(|d| !d.is_null()) {
        let mut items = read_items(paths).unwrap_or_default();
        items.push(data.clone());
        sort_items(&mut items);
        write_items(paths, &items)?;
    }

    write_registry(paths, &registry)?;
    Ok(true)
}

/// Newest first, score breaking date ties.
fn sort_items(items: &mut [Value]) {
    items.sort_by(|a, b| {
        let date_a = a.get("date").and_then(Value::as_str).unwrap_or("");
        let date_b = b.get("date").and_then(Value::as_str).unwrap_or("");
        date_b.cmp(date_a).then_with(|| {
            let score_a = a.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            let score_b = b.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            score_b.partial_cmp(&score_a).unwrap_or(Ordering::Equal)
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture_paths(dir: &TempDir) -> SitePaths {
        SitePaths::new(dir.path().join("src"), dir.path().join("docs"))
    }

    fn seed_items(paths: &SitePaths, items: Value) {
        let path = paths.pulse_items();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string_pretty(&items).unwrap()).unwrap();
    }

    fn two_items() -> Value {
        json!([
            {
                "id": "1",
                "date": "2024-01-10",
                "author": "@a",
                "post_url": "https://x/1",
                "score": 0.8,
                "note": {"en-US": "take", "zh-CN": "点评"}
            },
            {"id": "2", "date": "2024-01-09", "author": "@b", "score": 0.7}
        ])
    }

    // ------------------------------------------------------------------------
    // Patch validation + merging
    // ------------------------------------------------------------------------

    #[test]
    fn test_patch_validate_score_range() {
        let patch = ItemPatch {
            score: Some(1.5),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ItemPatch {
            score: Some(0.0),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_patch_validate_comment_type() {
        let patch = ItemPatch {
            comment_type: Some("nonsense".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ItemPatch {
            comment_type: Some("add_insight".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_merge_bilingual_preserves_other_locale() {
        let existing = json!({"en-US": "old", "zh-CN": "旧"});
        let merged = merge_bilingual(
            Some(&existing),
            &LocalePatch {
                en: None,
                zh: Some("新".into()),
            },
        );
        assert_eq!(merged, json!({"en-US": "old", "zh-CN": "新"}));
    }

    #[test]
    fn test_merge_bilingual_from_nothing() {
        let merged = merge_bilingual(
            None,
            &LocalePatch {
                en: Some("new".into()),
                zh: None,
            },
        );
        assert_eq!(merged, json!({"en-US": "new"}));
    }

    #[test]
    fn test_locale_patch_from_flags() {
        assert!(LocalePatch::from_flags(None, None).is_none());
        assert!(LocalePatch::from_flags(Some("x".into()), None).is_some());
    }

    // ------------------------------------------------------------------------
    // update / delete / restore
    // ------------------------------------------------------------------------

    #[test]
    fn test_update_item_merges_and_registers() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_items(&paths, two_items());

        let patch = ItemPatch {
            score: Some(0.95),
            note: Some(LocalePatch {
                en: None,
                zh: Some("新点评".into()),
            }),
            ..Default::default()
        };
        let updated = update_item(&paths, "1", &patch).unwrap();

        assert_eq!(updated.get("score"), Some(&json!(0.95)));
        // Bilingual merge preserved the other locale
        assert_eq!(
            updated.get("note"),
            Some(&json!({"en-US": "take", "zh-CN": "新点评"}))
        );

        // Registered as edited with the modified fields
        let excluded = excluded_ids(&paths);
        assert_eq!(excluded, vec!["1".to_string()]);
        let registry = read_registry(&paths);
        let entry = registry.items.get("1").unwrap();
        assert_eq!(entry.get("status"), Some(&json!("edited")));
        let fields = entry.get("fields").unwrap().as_array().unwrap();
        assert!(fields.contains(&json!("score")));
        assert!(fields.contains(&json!("note")));

        // A backup was taken
        assert!(fs::read_dir(paths.backups_dir()).unwrap().count() >= 1);
    }

    #[test]
    fn test_update_unknown_item_fails() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_items(&paths, two_items());

        let patch = ItemPatch {
            score: Some(0.5),
            ..Default::default()
        };
        assert!(update_item(&paths, "missing", &patch).is_err());
    }

    #[test]
    fn test_update_empty_patch_fails() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_items(&paths, two_items());

        assert!(update_item(&paths, "1", &ItemPatch::default()).is_err());
    }

    #[test]
    fn test_successive_edits_union_fields() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_items(&paths, two_items());

        update_item(
            &paths,
            "1",
            &ItemPatch {
                score: Some(0.9),
                ..Default::default()
            },
        )
        .unwrap();
        update_item(
            &paths,
            "1",
            &ItemPatch {
                relevance: Some("still relevant".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let registry = read_registry(&paths);
        let fields = registry.items["1"].get("fields").unwrap().as_array().unwrap();
        assert!(fields.contains(&json!("score")));
        assert!(fields.contains(&json!("relevance")));
    }

    #[test]
    fn test_delete_then_restore_roundtrip() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_items(&paths, two_items());

        let removed = delete_item(&paths, "1", "off topic").unwrap();
        assert_eq!(removed.get("status"), Some(&json!("deleted")));

        // Physically gone and excluded from pulls
        let items = read_items(&paths).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(excluded_ids(&paths), vec!["1".to_string()]);

        // Restore puts the stored data back, newest first
        assert!(restore_item(&paths, "1").unwrap());
        let items = read_items(&paths).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("id"), Some(&json!("1")));
        assert!(excluded_ids(&paths).is_empty());
    }

    #[test]
    fn test_restore_unknown_id_returns_false() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        seed_items(&paths, two_items());

        assert!(!restore_item(&paths, "missing").unwrap());
    }

    #[test]
    fn test_sort_items_date_then_score() {
        let mut items = vec![
            json!({"id": "low", "date": "2024-01-10", "score": 0.5}),
            json!({"id": "old", "date": "2024-01-01", "score": 0.9}),
            json!({"id": "high", "date": "2024-01-10", "score": 0.9}),
        ];
        sort_items(&mut items);
        let ids: Vec<&str> = items
            .iter()
            .map(|it| it.get("id").unwrap().as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["high", "low", "old"]);
    }

    #[test]
    fn test_backup_pruning() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join(".backups");
        fs::create_dir_all(&backups).unwrap();
        for i in 0..25 {
            fs::write(backups.join(format!("items-2024-01-01T00-00-{i:02}-000Z.json")), "[]")
                .unwrap();
        }

        prune_backups(&backups).unwrap();

        let remaining = fs::read_dir(&backups).unwrap().count();
        assert_eq!(remaining, MAX_BACKUPS);
        // Oldest were removed
        assert!(!backups.join("items-2024-01-01T00-00-00-000Z.json").exists());
    }
}
