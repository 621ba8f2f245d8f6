//! Shared JSON file helpers.
//!
//! Read helpers return `None` for missing or unparseable files; the caller
//! decides whether that is a warning, a skip, or a hard error. Writes always
//! pretty-print with a trailing newline so the data files diff cleanly.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fs, path::Path};

/// Read and parse a JSON file into a generic value.
pub fn read_json(path: &Path) -> Option<Value> {
    read_typed(path)
}

/// Read and parse a JSON file into a typed value.
pub fn read_typed<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

/// Write a value as pretty-printed JSON with a trailing newline.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_read_json_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_json(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn test_read_json_unparseable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_json(&path).is_none());
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let value = json!({"a": 1, "b": ["x", "y"]});

        write_json_pretty(&path, &value).unwrap();
        assert_eq!(read_json(&path), Some(value));

        // Trailing newline for clean diffs
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
    }
}
