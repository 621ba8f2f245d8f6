//! API layer generation.
//!
//! Assembles the versioned `api/v1/` snapshot under the publish tree from a
//! curated subset of source files, for machine consumption by automated
//! agents. Every sub-step that depends on an optional source file degrades
//! to skip-and-continue: partial API output beats a failed build.

use crate::{
    build::sanitize::strip_internal_fields,
    config::SitePaths,
    utils::json,
};
use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use serde_json::Value;
use std::{fs, path::Path};
use walkdir::WalkDir;

/// Generate the api/v1 snapshot. Returns the number of files written
/// (directories not counted).
pub fn generate_api(paths: &SitePaths, today: NaiveDate) -> Result<usize> {
    let api_root = paths.api_root();
    fs::create_dir_all(&api_root)
        .with_context(|| format!("Failed to create {}", api_root.display()))?;

    let mut files = 0;

    // projects.json — full navigation document, plus its stats sub-object
    if let Some(nav) = json::read_json(&paths.navigation()) {
        json::write_json_pretty(&api_root.join("projects.json"), &nav)?;
        files += 1;

        if let Some(stats) = nav.get("stats") {
            json::write_json_pretty(&api_root.join("stats.json"), stats)?;
            files += 1;
        }
    }

    // featured.json — curated selections, only if present
    if let Some(featured) = json::read_json(&paths.featured()) {
        json::write_json_pretty(&api_root.join("featured.json"), &featured)?;
        files += 1;
    }

    // skills index + accompanying markdown documents
    if let Some(skills) = json::read_json(&paths.skills_index()) {
        json::write_json_pretty(&api_root.join("skills.json"), &skills)?;
        files += 1;
        files += copy_md_files(&paths.skills_dir(), &api_root.join("skills"))?;
    }

    // blog index + post markdown
    if let Some(index) = json::read_json(&paths.blog_index()) {
        let blog_dir = api_root.join("blog");
        fs::create_dir_all(&blog_dir)?;
        json::write_json_pretty(&blog_dir.join("index.json"), &index)?;
        files += 1;
        files += copy_md_files(&paths.blog_dir(), &blog_dir)?;
    }

    // guide index + guide markdown
    if let Some(index) = json::read_json(&paths.guide_index()) {
        let guide_dir = api_root.join("guide");
        fs::create_dir_all(&guide_dir)?;
        json::write_json_pretty(&guide_dir.join("index.json"), &index)?;
        files += 1;
        files += copy_md_files(&paths.guide_dir(), &guide_dir)?;
    }

    // pulse: latest stats snapshot + derived last-7-days slice
    let pulse_dir = api_root.join("pulse");
    fs::create_dir_all(&pulse_dir)?;

    if let Some(mut stats) = json::read_json(&paths.pulse_stats()) {
        if let Some(items) = stats
            .pointer_mut("/this_week/top_items")
            .and_then(Value::as_array_mut)
        {
            for item in items {
                strip_internal_fields(item);
            }
        }
        json::write_json_pretty(&pulse_dir.join("latest.json"), &stats)?;
        files += 1;
    }

    if let Some(Value::Array(items)) = json::read_json(&paths.pulse_items()) {
        let week = week_slice(&items, today);
        json::write_json_pretty(&pulse_dir.join("week.json"), &week)?;
        files += 1;
    }

    // craft methodology/templates — verbatim recursive copy when present
    if paths.craft_dir().is_dir() {
        files += copy_dir_recursive(&paths.craft_dir(), &api_root.join("craft"))?;
    }

    Ok(files)
}

/// Items whose date falls within the last 7 days (inclusive), internal
/// fields stripped. Dates are compared as `YYYY-MM-DD` strings.
pub fn week_slice(items: &[Value], today: NaiveDate) -> Vec<Value> {
    let cutoff = today
        .checked_sub_days(Days::new(6))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string();

    items
        .iter()
        .filter(|item| {
            item.get("date")
                .and_then(Value::as_str)
                .is_some_and(|date| date >= cutoff.as_str())
        })
        .map(|item| {
            let mut item = item.clone();
            strip_internal_fields(&mut item);
            item
        })
        .collect()
}

/// Copy the `.md` files of one directory (non-recursive). Missing source
/// directories yield zero copies.
fn copy_md_files(src_dir: &Path, dst_dir: &Path) -> Result<usize> {
    if !src_dir.is_dir() {
        return Ok(0);
    }
    fs::create_dir_all(dst_dir)?;

    let mut count = 0;
    for entry in fs::read_dir(src_dir).context("Failed to read markdown directory")? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            fs::copy(&path, dst_dir.join(entry.file_name()))
                .with_context(|| format!("Failed to copy {}", path.display()))?;
            count += 1;
        }
    }
    Ok(count)
}

/// Recursive verbatim copy, counting files.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.context("Failed to read craft directory")?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
            count += 1;
        }
    }
    Ok(count)
}
