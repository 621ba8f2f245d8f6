//! Analytics snippet injection.
//!
//! Walks the publish tree and inserts the tracking snippet before the
//! closing `</head>` of every published HTML file. Files already carrying
//! the marker are skipped, so repeated builds never double-inject.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use walkdir::WalkDir;

/// Substring that identifies an already-injected file.
pub const MARKER: &str = "googletagmanager.com";

/// The tracking snippet for a measurement id.
fn snippet(id: &str) -> String {
    format!(
        "<!-- analytics (gtag.js) -->\n\
         <script async src=\"https://www.googletagmanager.com/gtag/js?id={id}\"></script>\n\
         <script>\n\
         \x20 window.dataLayer = window.dataLayer || [];\n\
         \x20 function gtag(){{dataLayer.push(arguments);}}\n\
         \x20 gtag('js', new Date());\n\
         \x20 gtag('config', '{id}');\n\
         </script>"
    )
}

/// Inject the snippet into every HTML file under `publish` that does not
/// already carry it. Files without a `</head>` tag are left untouched.
/// Returns the number of files rewritten.
pub fn inject_analytics(publish: &Path, id: &str) -> Result<usize> {
    if id.is_empty() {
        return Ok(0);
    }

    let snippet = snippet(id);
    let mut injected = 0;

    for entry in WalkDir::new(publish) {
        let entry = entry.context("Failed to read publish directory")?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_none_or(|ext| ext != "html") {
            continue;
        }

        let html = fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;

        if html.contains(MARKER) || !html.contains("</head>") {
            continue;
        }

        let html = html.replacen("</head>", &format!("{snippet}\n</head>"), 1);
        fs::write(entry.path(), html)
            .with_context(|| format!("Failed to write {}", entry.path().display()))?;
        injected += 1;
    }

    Ok(injected)
}
