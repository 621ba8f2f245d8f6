//! Site building orchestration.
//!
//! Runs the build steps in a fixed order, each gated by its own skip
//! condition, and returns a structured result summary.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── copy::clean_dir()        clear publish tree   (clean && !dry_run)
//!     ├── copy::copy_tree()        source → publish     (!dry_run)
//!     ├── marker file              .nojekyll            (!dry_run)
//!     ├── inject::inject_analytics()                    (!skip && !dry_run)
//!     ├── i18n::validate_tree()    read-only, runs even on dry runs
//!     ├── sanitize::sanitize_pulse()                    (!dry_run)
//!     └── api::generate_api()      api/v1 snapshot      (!dry_run)
//! ```
//!
//! Translation gaps are collected as warnings and never fail the build.
//! Only a filesystem failure in the clean/copy steps (beyond the tolerated
//! busy-retry) aborts the orchestration.

pub mod api;
pub mod copy;
pub mod i18n;
pub mod inject;
pub mod sanitize;

use crate::{
    cli::BuildArgs,
    config::SiteConfig,
    log,
};
use anyhow::{Context, Result};
use chrono::Local;
use i18n::I18nWarning;
use serde::Serialize;
use std::{fs, time::Instant};

/// Per-invocation build switches.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Clear the publish directory before copying.
    pub clean: bool,
    /// Skip analytics snippet injection.
    pub skip_analytics: bool,
    /// Skip bilingual field validation.
    pub skip_i18n: bool,
    /// Suppress all filesystem mutation.
    pub dry_run: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            clean: true,
            skip_analytics: false,
            skip_i18n: false,
            dry_run: false,
        }
    }
}

impl BuildOptions {
    /// Combine the config-level switches with the CLI flags.
    pub fn from_cli(config: &SiteConfig, args: &BuildArgs) -> Self {
        Self {
            clean: config.build.clean && !args.no_clean,
            skip_analytics: args.skip_analytics,
            skip_i18n: args.skip_i18n,
            dry_run: args.dry_run,
        }
    }
}

/// Summary of one build invocation, immutable after return.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub files_copied: usize,
    pub analytics_injected: usize,
    pub i18n_warnings: Vec<I18nWarning>,
    pub api_files: usize,
    /// Elapsed wall-clock time in milliseconds.
    pub elapsed: u128,
    pub dry_run: bool,
}

/// Run the full build pipeline.
pub fn build_site(config: &SiteConfig, opts: &BuildOptions) -> Result<BuildReport> {
    let start = Instant::now();
    let paths = config.site_paths();
    let source = &paths.source;
    let publish = &paths.publish;

    if opts.dry_run {
        log!("build"; "dry run, no files will be written");
    }

    // Step 1: clean
    if opts.clean && !opts.dry_run {
        log!("build"; "clearing {}", publish.display());
        copy::clean_dir(publish)?;
    } else if opts.dry_run {
        log!("build"; "clearing skipped (dry run)");
    } else {
        log!("build"; "clearing skipped (--no-clean)");
    }

    // Step 2: copy. In a dry run the count is taken against the source
    // tree, which approximates but does not guarantee the post-build count.
    let files_copied = if opts.dry_run {
        copy::count_files(source)?
    } else {
        copy::copy_tree(source, publish)?;
        copy::count_files(publish)?
    };
    log!("build"; "copied source tree ({files_copied} files)");

    // Step 3: marker file telling the hosting platform to serve as-is
    if !opts.dry_run {
        fs::write(paths.marker_file(), "").context("Failed to write marker file")?;
    }

    // Step 4: analytics injection
    let analytics = &config.build.analytics;
    let analytics_injected = if analytics.enable && !opts.skip_analytics && !opts.dry_run {
        let injected = inject::inject_analytics(publish, &analytics.id)?;
        log!("build"; "analytics injected into {injected} HTML file(s)");
        injected
    } else {
        log!("build"; "analytics injection skipped");
        0
    };

    // Step 5: i18n validation. Read-only, so it runs for real on dry runs.
    let i18n_cfg = &config.build.i18n;
    let i18n_warnings = if i18n_cfg.enable && !opts.skip_i18n {
        let warnings = i18n::validate_tree(source, &i18n_cfg.locales);
        for w in &warnings {
            log!("i18n"; "missing \"{}\" in {} -> {}", w.locale, w.file, w.field);
        }
        warnings
    } else {
        log!("build"; "i18n validation skipped");
        Vec::new()
    };

    // Step 6: strip internal fields from published pulse artifacts
    if !opts.dry_run {
        let sanitized = sanitize::sanitize_pulse(publish);
        log!("build"; "sanitized {sanitized} pulse artifact(s)");
    }

    // Step 7: api/v1 snapshot
    let api_files = if config.build.api.enable && !opts.dry_run {
        let files = api::generate_api(&paths, Local::now().date_naive())?;
        log!("build"; "generated {files} api file(s)");
        files
    } else {
        0
    };

    let elapsed = start.elapsed().as_millis();
    if i18n_warnings.is_empty() {
        log!("build"; "done in {elapsed}ms");
    } else {
        log!("build"; "done in {elapsed}ms with {} translation warning(s)", i18n_warnings.len());
    }

    Ok(BuildReport {
        files_copied,
        analytics_injected,
        i18n_warnings,
        api_files,
        elapsed,
        dry_run: opts.dry_run,
    })
}
