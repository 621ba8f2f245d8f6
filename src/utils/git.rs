//! Git operations for the commit, sync and pull commands.
//!
//! Everything shells out to `git`, capturing output and turning non-zero
//! exits into descriptive errors. Pushes authenticate with a token read
//! from a file, spliced into the remote URL.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::{
    collections::BTreeSet,
    fs,
    path::Path,
    process::Command,
};

/// Working-tree status snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct GitStatus {
    pub branch: String,
    pub clean: bool,
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

/// Run one git command under `root`, returning trimmed stdout.
fn git(root: &Path, args: &[&str]) -> Result<String> {
    let name = args.first().copied().unwrap_or("git");
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("Failed to execute `git {name}`"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {name} failed: {}", stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Current branch plus staged/unstaged/untracked file lists.
pub fn status(root: &Path) -> Result<GitStatus> {
    let branch = git(root, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    let porcelain = git(root, &["status", "--porcelain"])?;
    let (staged, unstaged, untracked) = parse_porcelain(&porcelain);

    Ok(GitStatus {
        branch,
        clean: porcelain.is_empty(),
        staged,
        unstaged,
        untracked,
    })
}

/// Parse porcelain v1 lines: `XY PATH` (X = index, Y = worktree).
fn parse_porcelain(porcelain: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut staged = Vec::new();
    let mut unstaged = Vec::new();
    let mut untracked = Vec::new();

    for line in porcelain.lines() {
        let mut chars = line.chars();
        let (Some(x), Some(y), Some(' ')) = (chars.next(), chars.next(), chars.next()) else {
            continue;
        };
        let file = chars.as_str().to_string();

        if x == '?' && y == '?' {
            untracked.push(file);
        } else {
            if x != ' ' && x != '?' {
                staged.push(file.clone());
            }
            if y != ' ' && y != '?' {
                unstaged.push(file);
            }
        }
    }

    (staged, unstaged, untracked)
}

/// Stage the given paths.
pub fn add(root: &Path, paths: &[String]) -> Result<()> {
    if paths.is_empty() {
        bail!("add: no paths provided");
    }
    let mut args = vec!["add"];
    args.extend(paths.iter().map(String::as_str));
    git(root, &args)?;
    Ok(())
}

/// Stage all changes (tracked + untracked).
pub fn add_all(root: &Path) -> Result<()> {
    git(root, &["add", "-A"])?;
    Ok(())
}

/// Create a commit; returns the short hash.
pub fn commit(root: &Path, message: &str) -> Result<String> {
    if message.trim().is_empty() {
        bail!("Commit message cannot be empty");
    }
    git(root, &["commit", "-m", message])?;
    git(root, &["rev-parse", "--short", "HEAD"])
}

/// File paths of the staged changes.
pub fn staged_files(root: &Path) -> Result<Vec<String>> {
    let names = git(root, &["diff", "--cached", "--name-only"])?;
    Ok(names.lines().map(str::to_string).collect())
}

/// Push the branch to the named remote.
pub fn push(root: &Path, remote: &str, branch: &str) -> Result<()> {
    git(root, &["push", "--set-upstream", remote, branch])?;
    Ok(())
}

/// Point the remote at the given URL, adding it if missing.
pub fn configure_remote(root: &Path, remote: &str, url: &str) -> Result<()> {
    let action = if git(root, &["remote", "get-url", remote]).is_ok() {
        "set-url"
    } else {
        "add"
    };
    git(root, &["remote", action, remote, url])?;
    Ok(())
}

/// Build an authenticated HTTPS URL with an optional token file.
pub fn authenticated_url(url: &str, token_path: Option<&Path>) -> Result<String> {
    let base_url = url
        .strip_prefix("https://")
        .context("Remote URL must start with https://")?;

    let token = token_path
        .and_then(|p| fs::read_to_string(p).ok())
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());

    match token {
        Some(token) => Ok(format!("https://{token}@{base_url}")),
        None => Ok(format!("https://{base_url}")),
    }
}

/// Generate a conventional-style commit message from changed file paths.
///
/// Areas are derived from the first path component inside the source or
/// publish tree; publish-only changes read as build output updates.
pub fn generate_commit_message(files: &[String], source: &str, publish: &str) -> String {
    if files.is_empty() {
        return "chore: update files".into();
    }

    const AREAS: &[&str] = &["pulse", "blog", "skills", "guide", "shared", "data"];

    let mut areas = BTreeSet::new();
    let mut has_source = false;
    let mut has_publish = false;

    for file in files {
        if file.starts_with(&format!("{source}/")) {
            has_source = true;
        }
        if file.starts_with(&format!("{publish}/")) {
            has_publish = true;
        }
        for area in AREAS {
            if file.starts_with(&format!("{source}/{area}/"))
                || file.starts_with(&format!("{publish}/{area}/"))
            {
                areas.insert(*area);
            }
        }
    }

    // Publish-only change with no recognizable area: a rebuild
    if has_publish && !has_source && areas.is_empty() {
        return "build: update site output".into();
    }

    let areas: Vec<&str> = areas.into_iter().collect();
    match areas.as_slice() {
        [] => format!("chore: update {} file(s)", files.len()),
        [area] => {
            if has_publish && has_source {
                format!("{area}: update and rebuild")
            } else if has_publish {
                format!("build: update {area} output")
            } else {
                format!("{area}: update")
            }
        }
        _ => {
            let joined = areas.join(", ");
            if has_publish && has_source {
                format!("update {joined} and rebuild site")
            } else if has_publish {
                format!("build: update {joined} output")
            } else {
                format!("update {joined}")
            }
        }
    }
}
