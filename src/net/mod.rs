//! Blocking REST clients for infrastructure automation.
//!
//! Both clients are synchronous and perform one call at a time. Credentials
//! come from token files configured in `[deploy.dns]` / `[deploy.pages]`
//! and never appear on the command line.

pub mod cloudflare;
pub mod github;

use anyhow::{Context, Result, bail};
use std::{fs, path::PathBuf};

/// Read and trim an API token from the configured file path.
fn read_token(path: &Option<PathBuf>) -> Result<String> {
    let path = path.as_ref().context("Token path not configured")?;
    let token = fs::read_to_string(path)
        .with_context(|| format!("Failed to read token from {}", path.display()))?;
    let token = token.trim().to_owned();
    if token.is_empty() {
        bail!("Token file {} is empty", path.display());
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_token_trims_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "  secret-token\n").unwrap();

        let token = read_token(&Some(path)).unwrap();
        assert_eq!(token, "secret-token");
    }

    #[test]
    fn test_read_token_missing_path() {
        assert!(read_token(&None).is_err());
    }

    #[test]
    fn test_read_token_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "\n").unwrap();

        assert!(read_token(&Some(path)).is_err());
    }
}
