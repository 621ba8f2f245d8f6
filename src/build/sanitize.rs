//! Pulse artifact sanitization.
//!
//! Strips internal-only fields from the published pulse JSON artifacts
//! before the tree goes live. The artifacts are a byproduct of the build,
//! not a precondition: a missing, malformed or unwritable file is skipped
//! with a log line, never an error.

use crate::{config::paths, log, utils::json};
use serde_json::Value;
use std::path::Path;

/// Fields present in source data but never published.
pub const INTERNAL_FIELDS: &[&str] = &["draft_comment"];

/// Publish-relative artifacts to sanitize.
const ARTIFACTS: &[&str] = &[paths::PULSE_ITEMS, paths::PULSE_STATS];

/// Remove every internal-only key from an object value.
pub fn strip_internal_fields(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        for key in INTERNAL_FIELDS {
            obj.remove(*key);
        }
    }
}

/// Sanitize the known pulse artifacts under the publish tree.
///
/// An array root has every element stripped; an object root exposing a
/// `this_week.top_items` array has that array stripped. Returns the number
/// of files rewritten.
pub fn sanitize_pulse(publish: &Path) -> usize {
    let mut rewritten = 0;

    for rel in ARTIFACTS {
        let path = publish.join(rel);
        let Some(mut doc) = json::read_json(&path) else {
            continue;
        };

        match &mut doc {
            Value::Array(items) => {
                for item in items {
                    strip_internal_fields(item);
                }
            }
            Value::Object(_) => {
                let Some(items) = doc
                    .pointer_mut("/this_week/top_items")
                    .and_then(Value::as_array_mut)
                else {
                    continue;
                };
                for item in items {
                    strip_internal_fields(item);
                }
            }
            _ => continue,
        }

        match json::write_json_pretty(&path, &doc) {
            Ok(()) => rewritten += 1,
            Err(err) => log!("sanitize"; "skipped {rel}: {err:#}"),
        }
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_json(path: &Path, value: &Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_strip_internal_fields() {
        let mut item = json!({"id": "1", "draft_comment": "internal", "score": 0.9});
        strip_internal_fields(&mut item);
        assert_eq!(item, json!({"id": "1", "score": 0.9}));
    }

    #[test]
    fn test_array_root_is_stripped() {
        let dir = TempDir::new().unwrap();
        let items = dir.path().join(paths::PULSE_ITEMS);
        write_json(
            &items,
            &json!([
                {"id": "1", "draft_comment": "x"},
                {"id": "2"},
            ]),
        );

        assert_eq!(sanitize_pulse(dir.path()), 1);

        let doc: Value = serde_json::from_str(&fs::read_to_string(&items).unwrap()).unwrap();
        assert_eq!(doc, json!([{"id": "1"}, {"id": "2"}]));
    }

    #[test]
    fn test_stats_top_items_are_stripped() {
        let dir = TempDir::new().unwrap();
        let stats = dir.path().join(paths::PULSE_STATS);
        write_json(
            &stats,
            &json!({
                "total": 2,
                "this_week": {
                    "count": 2,
                    "top_items": [{"id": "1", "draft_comment": "x"}]
                }
            }),
        );

        assert_eq!(sanitize_pulse(dir.path()), 1);

        let doc: Value = serde_json::from_str(&fs::read_to_string(&stats).unwrap()).unwrap();
        assert_eq!(doc.pointer("/this_week/top_items/0"), Some(&json!({"id": "1"})));
        // Rest of the object is untouched
        assert_eq!(doc.get("total"), Some(&json!(2)));
    }

    #[test]
    fn test_missing_artifacts_are_skipped() {
        let dir = TempDir::new().unwrap();
        assert_eq!(sanitize_pulse(dir.path()), 0);
    }

    #[test]
    fn test_object_without_top_items_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let stats = dir.path().join(paths::PULSE_STATS);
        write_json(&stats, &json!({"total": 5}));
        let before = fs::read_to_string(&stats).unwrap();

        assert_eq!(sanitize_pulse(dir.path()), 0);
        assert_eq!(fs::read_to_string(&stats).unwrap(), before);
    }

    #[test]
    fn test_sanitizer_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let items = dir.path().join(paths::PULSE_ITEMS);
        write_json(&items, &json!([{"id": "1", "draft_comment": "x"}]));

        sanitize_pulse(dir.path());
        let first = fs::read_to_string(&items).unwrap();

        sanitize_pulse(dir.path());
        let second = fs::read_to_string(&items).unwrap();

        assert_eq!(first, second);
    }
}
