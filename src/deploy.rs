//! Commit, sync and pull-sync workflows.
//!
//! Composes the build pipeline with git staging, auto-generated commit
//! messages and pushes. Each workflow returns one JSON value the CLI
//! prints to stdout.

use crate::{
    build::{BuildOptions, build_site},
    cli::PullKind,
    config::SiteConfig,
    log,
    pull::pull,
    utils::git,
};
use anyhow::Result;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Switches shared by the sync and pull commands.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub no_build: bool,
    pub no_push: bool,
    pub message: Option<String>,
    pub dry_run: bool,
}

/// Stage and commit changes with an auto-generated message.
///
/// With `scope`, only the source and publish subtrees of that area are
/// staged; otherwise everything is.
pub fn commit_changes(
    config: &SiteConfig,
    message: Option<String>,
    scope: Option<String>,
) -> Result<Value> {
    let root = config.get_root();
    let status = git::status(root)?;
    if status.clean {
        log!("commit"; "nothing to commit, working tree clean");
        return Ok(json!({"committed": false, "reason": "clean"}));
    }

    let (source, publish) = tree_names(config);

    if let Some(scope) = &scope {
        let scope_dirs = vec![
            format!("{source}/{scope}/"),
            format!("{publish}/{scope}/"),
        ];
        log!("commit"; "staging scope: {}", scope_dirs.join(", "));
        git::add(root, &scope_dirs)?;
    } else {
        log!("commit"; "staging all changes");
        git::add_all(root)?;
    }

    let files = git::staged_files(root)?;
    if files.is_empty() {
        log!("commit"; "nothing staged to commit after add");
        return Ok(json!({"committed": false, "reason": "nothing_staged"}));
    }

    let message =
        message.unwrap_or_else(|| git::generate_commit_message(&files, &source, &publish));
    log!("commit"; "committing: {message}");
    let hash = git::commit(root, &message)?;

    Ok(json!({
        "committed": true,
        "hash": hash,
        "message": message,
        "files": files,
        "branch": status.branch,
    }))
}

/// Build, commit and push in one step.
pub fn sync_site(config: &SiteConfig, opts: &SyncOptions) -> Result<Value> {
    let root = config.get_root();
    let status = git::status(root)?;
    log!("sync"; "branch {}", status.branch);

    let mut result = json!({"build": null, "commit": null, "push": null});

    if opts.no_build {
        log!("sync"; "build skipped (--no-build)");
    } else {
        let report = build_site(
            config,
            &BuildOptions {
                dry_run: opts.dry_run,
                ..Default::default()
            },
        )?;
        result["build"] = serde_json::to_value(report)?;
    }

    if opts.dry_run {
        log!("sync"; "dry run, skipping commit and push");
        result["dryRun"] = json!(true);
        return Ok(result);
    }

    commit_and_push(config, opts, &status.branch, &mut result)?;
    Ok(result)
}

/// Pull publisher data, then build, commit and push if anything changed.
pub fn pull_and_sync(
    config: &SiteConfig,
    source_override: Option<PathBuf>,
    kind: PullKind,
    opts: &SyncOptions,
) -> Result<Value> {
    let paths = config.site_paths();
    let source_dir = source_override.unwrap_or_else(|| config.pull.source.clone());

    let pull_report = pull(&paths, &source_dir, kind, opts.dry_run)?;
    let mut result = serde_json::to_value(&pull_report)?;

    if opts.dry_run {
        result["dryRun"] = json!(true);
        return Ok(result);
    }

    result["build"] = Value::Null;
    result["commit"] = Value::Null;
    result["push"] = Value::Null;

    if !pull_report.has_changes() {
        log!("pull"; "no new data pulled");
        return Ok(result);
    }

    if opts.no_build {
        log!("pull"; "build skipped (--no-build)");
    } else {
        let report = build_site(config, &BuildOptions::default())?;
        result["build"] = serde_json::to_value(report)?;
    }

    let root = config.get_root();
    let status = git::status(root)?;
    commit_and_push(config, opts, &status.branch, &mut result)?;
    Ok(result)
}

/// Shared tail of the sync workflows: stage everything, commit with an
/// auto-generated message, push unless suppressed.
fn commit_and_push(
    config: &SiteConfig,
    opts: &SyncOptions,
    branch: &str,
    result: &mut Value,
) -> Result<()> {
    let root = config.get_root();

    git::add_all(root)?;
    let files = git::staged_files(root)?;
    if files.is_empty() {
        log!("sync"; "nothing to commit, all clean");
        result["commit"] = json!({"committed": false, "reason": "clean"});
        return Ok(());
    }

    let (source, publish) = tree_names(config);
    let message = opts
        .message
        .clone()
        .unwrap_or_else(|| git::generate_commit_message(&files, &source, &publish));
    log!("sync"; "committing: {message}");
    let hash = git::commit(root, &message)?;
    result["commit"] = json!({
        "committed": true,
        "hash": hash,
        "message": message,
        "files": files,
    });

    if opts.no_push {
        log!("sync"; "push skipped (--no-push)");
        return Ok(());
    }

    let remote = &config.deploy.git.remote;
    if !config.deploy.git.url.is_empty() {
        let url = git::authenticated_url(
            &config.deploy.git.url,
            config.deploy.git.token_path.as_deref(),
        )?;
        git::configure_remote(root, remote, &url)?;
    }

    log!("sync"; "pushing to {remote}/{branch}");
    git::push(root, remote, branch)?;
    result["push"] = json!({"remote": remote, "branch": branch});

    Ok(())
}

/// Root-relative names of the two trees, for staging scopes and commit
/// message areas.
fn tree_names(config: &SiteConfig) -> (String, String) {
    let name = |path: &Path| {
        path.strip_prefix(config.get_root())
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    };
    (name(&config.build.source), name(&config.build.publish))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tree_names_relative_to_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/site"));
        config.build.source = PathBuf::from("/site/src");
        config.build.publish = PathBuf::from("/site/docs");

        assert_eq!(tree_names(&config), ("src".into(), "docs".into()));
    }

    #[test]
    fn test_tree_names_outside_root_fall_back_to_full_path() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/site"));
        config.build.source = PathBuf::from("/elsewhere/src");
        config.build.publish = PathBuf::from("/site/docs");

        let (source, publish) = tree_names(&config);
        assert_eq!(source, "/elsewhere/src");
        assert_eq!(publish, "docs");
    }

    #[test]
    fn test_sync_options_default() {
        let opts = SyncOptions::default();
        assert!(!opts.no_build);
        assert!(!opts.no_push);
        assert!(!opts.dry_run);
        assert!(opts.message.is_none());
    }
}
