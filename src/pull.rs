//! Publisher data import.
//!
//! Pulls externally-produced pulse items and weekly digest posts into the
//! source tree. Items whose ids are registered as edited or deleted are
//! never re-imported, so local curation survives upstream regeneration.

use crate::{
    config::SitePaths,
    data::writer,
    log,
    utils::json,
};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::HashSet,
    fs,
    path::Path,
};

use crate::cli::PullKind;

/// Result of one pull invocation.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<PulsePull>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly: Option<WeeklyPull>,
}

impl PullReport {
    /// Whether anything new landed in the source tree.
    pub fn has_changes(&self) -> bool {
        self.pulse.as_ref().is_some_and(|p| p.items > 0)
            || self.weekly.as_ref().is_some_and(|w| w.files > 0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulsePull {
    /// Items written (after exclusions).
    pub items: usize,
    /// Items dropped because their ids are registered as edited/deleted.
    pub excluded: usize,
    /// Whether the stats document was copied along.
    pub stats: bool,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPull {
    /// New markdown files copied.
    pub files: usize,
    /// Whether the weekly index was merged into the blog index.
    pub index_merged: bool,
    pub dry_run: bool,
}

/// Pull data from the publisher output directory into the source tree.
pub fn pull(paths: &SitePaths, source_dir: &Path, kind: PullKind, dry_run: bool) -> Result<PullReport> {
    if !source_dir.is_dir() {
        bail!("Source directory not found: {}", source_dir.display());
    }

    log!("pull"; "importing from {}", source_dir.display());

    let mut report = PullReport::default();

    if matches!(kind, PullKind::Pulse | PullKind::All) {
        report.pulse = Some(pull_pulse(paths, source_dir, dry_run)?);
    }
    if matches!(kind, PullKind::Weekly | PullKind::All) {
        report.weekly = Some(pull_weekly(paths, source_dir, dry_run)?);
    }

    Ok(report)
}

/// Import pulse items, dropping locally edited/deleted ids.
fn pull_pulse(paths: &SitePaths, source_dir: &Path, dry_run: bool) -> Result<PulsePull> {
    let src_items = source_dir.join("items.json");
    let src_stats = source_dir.join("pulse_stats.json");

    if !src_items.is_file() {
        bail!("Source items.json not found: {}", src_items.display());
    }
    let Some(Value::Array(items)) = json::read_json(&src_items) else {
        bail!("Invalid items.json: expected an array");
    };

    let excluded: HashSet<String> = writer::excluded_ids(paths).into_iter().collect();
    let kept: Vec<&Value> = items
        .iter()
        .filter(|it| {
            it.get("id")
                .and_then(Value::as_str)
                .is_none_or(|id| !excluded.contains(id))
        })
        .collect();
    let excluded_count = items.len() - kept.len();

    log!("pull"; "pulse: {} total, {} excluded, {} kept", items.len(), excluded_count, kept.len());

    if dry_run {
        log!("pull"; "pulse: dry run, skipping write");
        return Ok(PulsePull {
            items: kept.len(),
            excluded: excluded_count,
            stats: false,
            dry_run: true,
        });
    }

    let dst_items = paths.pulse_items();
    if let Some(parent) = dst_items.parent() {
        fs::create_dir_all(parent)?;
    }
    json::write_json_pretty(&dst_items, &kept)?;

    let mut stats_copied = false;
    if src_stats.is_file() {
        fs::copy(&src_stats, paths.pulse_stats()).context("Failed to copy pulse_stats.json")?;
        stats_copied = true;
        log!("pull"; "pulse: copied stats");
    }

    Ok(PulsePull {
        items: kept.len(),
        excluded: excluded_count,
        stats: stats_copied,
        dry_run: false,
    })
}

/// Import new weekly digest posts and merge the weekly index into the blog
/// index. Missing weekly data is a skip, not an error.
fn pull_weekly(paths: &SitePaths, source_dir: &Path, dry_run: bool) -> Result<WeeklyPull> {
    let weekly_dir = source_dir.join("weekly");
    let none = WeeklyPull {
        files: 0,
        index_merged: false,
        dry_run,
    };

    if !weekly_dir.is_dir() {
        log!("pull"; "weekly: no weekly directory in source, skipping");
        return Ok(none);
    }

    let md_files: Vec<String> = fs::read_dir(&weekly_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("weekly-") && name.ends_with(".md"))
        .collect();

    if md_files.is_empty() {
        log!("pull"; "weekly: no weekly markdown files, skipping");
        return Ok(none);
    }

    let blog_dir = paths.blog_dir();
    let existing: HashSet<String> = if blog_dir.is_dir() {
        fs::read_dir(&blog_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    } else {
        HashSet::new()
    };

    let new_files: Vec<&String> = md_files.iter().filter(|f| !existing.contains(*f)).collect();
    if new_files.is_empty() {
        log!("pull"; "weekly: all files already present, skipping");
        return Ok(none);
    }

    log!("pull"; "weekly: {} new file(s)", new_files.len());

    if dry_run {
        log!("pull"; "weekly: dry run, skipping write");
        return Ok(WeeklyPull {
            files: new_files.len(),
            index_merged: false,
            dry_run: true,
        });
    }

    fs::create_dir_all(&blog_dir)?;
    for name in &new_files {
        fs::copy(weekly_dir.join(name), blog_dir.join(name))
            .with_context(|| format!("Failed to copy {name}"))?;
        log!("pull"; "weekly: copied {name}");
    }

    let index_merged = merge_weekly_index(&weekly_dir.join("index.json"), &paths.blog_index());

    Ok(WeeklyPull {
        files: new_files.len(),
        index_merged,
        dry_run: false,
    })
}

/// Merge the weekly index into the blog index; weekly entries win on slug
/// collisions. A failed merge is a warning, not an error.
fn merge_weekly_index(weekly_index: &Path, blog_index: &Path) -> bool {
    if !weekly_index.is_file() || !blog_index.is_file() {
        return false;
    }

    let weekly: Vec<Value> = json::read_typed(weekly_index).unwrap_or_default();
    let blog: Vec<Value> = json::read_typed(blog_index).unwrap_or_default();
    if weekly.is_empty() {
        return false;
    }

    let new_slugs: HashSet<&str> = weekly
        .iter()
        .filter_map(|e| e.get("slug").and_then(Value::as_str))
        .collect();

    let mut merged = weekly.clone();
    merged.extend(
        blog.into_iter().filter(|e| {
            e.get("slug")
                .and_then(Value::as_str)
                .is_none_or(|slug| !new_slugs.contains(slug))
        }),
    );

    match json::write_json_pretty(blog_index, &merged) {
        Ok(()) => {
            log!("pull"; "weekly: merged blog index");
            true
        }
        Err(err) => {
            log!("pull"; "weekly: failed to merge blog index: {err:#}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixture_paths(dir: &TempDir) -> SitePaths {
        SitePaths::new(dir.path().join("site/src"), dir.path().join("site/docs"))
    }

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_json_file(path: &Path, value: &Value) {
        write_file(path, &serde_json::to_string_pretty(value).unwrap());
    }

    fn seed_publisher(dir: &TempDir) -> std::path::PathBuf {
        let out = dir.path().join("publisher");
        write_json_file(
            &out.join("items.json"),
            &json!([
                {"id": "1", "date": "2024-01-10"},
                {"id": "2", "date": "2024-01-09"},
            ]),
        );
        write_json_file(&out.join("pulse_stats.json"), &json!({"total": 2}));
        out
    }

    #[test]
    fn test_pull_pulse_writes_items_and_stats() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        let out = seed_publisher(&dir);

        let report = pull(&paths, &out, PullKind::Pulse, false).unwrap();
        let pulse = report.pulse.unwrap();

        assert_eq!(pulse.items, 2);
        assert_eq!(pulse.excluded, 0);
        assert!(pulse.stats);
        assert!(paths.pulse_items().is_file());
        assert!(paths.pulse_stats().is_file());
        assert!(report.weekly.is_none());
    }

    #[test]
    fn test_pull_respects_excluded_ids() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        let out = seed_publisher(&dir);

        // Register item 1 as deleted
        write_json_file(
            &paths.edited_registry(),
            &json!({"items": {"1": {"status": "deleted"}}}),
        );

        let report = pull(&paths, &out, PullKind::Pulse, false).unwrap();
        let pulse = report.pulse.unwrap();

        assert_eq!(pulse.items, 1);
        assert_eq!(pulse.excluded, 1);

        let items: Vec<Value> = json::read_typed(&paths.pulse_items()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("id"), Some(&json!("2")));
    }

    #[test]
    fn test_pull_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        let out = seed_publisher(&dir);

        let report = pull(&paths, &out, PullKind::All, true).unwrap();

        assert!(report.pulse.unwrap().dry_run);
        assert!(!paths.pulse_items().exists());
    }

    #[test]
    fn test_pull_missing_source_dir_fails() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);

        assert!(pull(&paths, &dir.path().join("nope"), PullKind::All, false).is_err());
    }

    #[test]
    fn test_pull_weekly_copies_only_new_files() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        let out = seed_publisher(&dir);

        write_file(&out.join("weekly/weekly-2024-01.md"), "# week 1");
        write_file(&out.join("weekly/weekly-2024-02.md"), "# week 2");
        write_json_file(
            &out.join("weekly/index.json"),
            &json!([{"slug": "weekly-2024-02", "date": "2024-01-14"}]),
        );

        // One file already present locally, plus an existing blog index
        write_file(&paths.blog_dir().join("weekly-2024-01.md"), "# old copy");
        write_json_file(
            &paths.blog_index(),
            &json!([{"slug": "welcome", "date": "2024-01-01"}]),
        );

        let report = pull(&paths, &out, PullKind::Weekly, false).unwrap();
        let weekly = report.weekly.unwrap();

        assert_eq!(weekly.files, 1);
        assert!(weekly.index_merged);
        assert!(paths.blog_dir().join("weekly-2024-02.md").is_file());

        // Weekly entries first, existing entries preserved
        let index: Vec<Value> = json::read_typed(&paths.blog_index()).unwrap();
        assert_eq!(index[0].get("slug"), Some(&json!("weekly-2024-02")));
        assert_eq!(index[1].get("slug"), Some(&json!("welcome")));
    }

    #[test]
    fn test_pull_weekly_missing_dir_is_a_skip() {
        let dir = TempDir::new().unwrap();
        let paths = fixture_paths(&dir);
        let out = seed_publisher(&dir);

        let report = pull(&paths, &out, PullKind::Weekly, false).unwrap();
        let weekly = report.weekly.unwrap();
        assert_eq!(weekly.files, 0);
        assert!(!weekly.index_merged);
    }

    #[test]
    fn test_merge_weekly_index_slug_collision() {
        let dir = TempDir::new().unwrap();
        let weekly_index = dir.path().join("weekly-index.json");
        let blog_index = dir.path().join("blog-index.json");

        write_json_file(
            &weekly_index,
            &json!([{"slug": "dup", "title": "new version"}]),
        );
        write_json_file(
            &blog_index,
            &json!([{"slug": "dup", "title": "old version"}, {"slug": "other"}]),
        );

        assert!(merge_weekly_index(&weekly_index, &blog_index));

        let merged: Vec<Value> = json::read_typed(&blog_index).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].get("title"), Some(&json!("new version")));
    }

    #[test]
    fn test_report_has_changes() {
        let report = PullReport {
            pulse: Some(PulsePull {
                items: 0,
                excluded: 3,
                stats: false,
                dry_run: false,
            }),
            weekly: None,
        };
        assert!(!report.has_changes());

        let report = PullReport {
            pulse: None,
            weekly: Some(WeeklyPull {
                files: 2,
                index_merged: true,
                dry_run: false,
            }),
        };
        assert!(report.has_changes());
    }
}
