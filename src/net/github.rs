//! Pages custom-domain automation against the GitHub REST API.
//!
//! Sets the custom domain on the repository's Pages configuration, polls
//! domain verification on a fixed interval with a bounded attempt count,
//! and enforces HTTPS once the certificate is approved. A verification
//! timeout is non-fatal: the command can simply be run again later.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use reqwest::{Method, StatusCode, blocking::Client};
use serde_json::{Value, json};
use std::{thread, time::Duration};

const API_BASE: &str = "https://api.github.com";

/// Verification polls before giving up.
const VERIFY_ATTEMPTS: u32 = 24;
/// Fixed poll interval.
const VERIFY_INTERVAL: Duration = Duration::from_secs(5);

struct PagesClient {
    http: Client,
    token: String,
}

impl PagesClient {
    fn new(token: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("mulu/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, token })
    }

    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<(StatusCode, Value)> {
        let mut request = self
            .http
            .request(method, format!("{API_BASE}{path}"))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .with_context(|| format!("Pages API request failed: {path}"))?;
        let status = response.status();
        let text = response.text().context("Pages API returned no body")?;
        let data = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok((status, data))
    }

    /// Current Pages configuration, or `None` when Pages is not enabled.
    fn get_pages(&self, repo: &str) -> Result<Option<Value>> {
        let (status, data) = self.request(Method::GET, &format!("/repos/{repo}/pages"), None)?;
        match status {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(data)),
            status => {
                let message = data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("request failed");
                bail!("Pages API error: {message} ({status})");
            }
        }
    }

    fn update_pages(&self, repo: &str, body: &Value) -> Result<()> {
        let (status, data) =
            self.request(Method::PUT, &format!("/repos/{repo}/pages"), Some(body))?;
        if !status.is_success() {
            let message = data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            bail!("Pages API error: {message} ({status})");
        }
        Ok(())
    }
}

/// Configure the Pages custom domain and enforce HTTPS once verified.
pub fn setup_pages(config: &SiteConfig) -> Result<()> {
    let pages = &config.deploy.pages;
    let domain = &config.deploy.dns.domain;
    if domain.is_empty() {
        bail!("[deploy.dns.domain] is required for setup-pages");
    }

    let token = super::read_token(&pages.token_path)?;
    let client = PagesClient::new(token)?;
    let repo = &pages.repo;

    let Some(current) = client.get_pages(repo)? else {
        bail!("Pages not enabled for {repo}. Enable it in the repository settings first.");
    };
    let source = current
        .get("source")
        .cloned()
        .unwrap_or_else(|| json!({"branch": "main", "path": "/docs"}));

    log!("pages"; "setting custom domain: {domain}");
    client.update_pages(repo, &json!({"cname": domain, "source": source.clone()}))?;
    log!("pages"; "custom domain set, waiting for DNS verification");

    let mut verified = false;
    for attempt in 1..=VERIFY_ATTEMPTS {
        thread::sleep(VERIFY_INTERVAL);

        let Some(state) = client.get_pages(repo)? else {
            continue;
        };
        let domain_state = state
            .get("protected_domain_state")
            .and_then(Value::as_str)
            .unwrap_or("");
        let cert_state = state
            .pointer("/https_certificate/state")
            .and_then(Value::as_str)
            .unwrap_or("");

        log!("pages"; "[{attempt}/{VERIFY_ATTEMPTS}] domain: {domain_state}, cert: {cert_state}");

        if cert_state == "approved" {
            verified = true;
            break;
        }
    }

    if !verified {
        log!("pages"; "DNS verification timed out; run this command again later to enable HTTPS");
        return Ok(());
    }

    log!("pages"; "domain verified, enforcing HTTPS");
    client.update_pages(
        repo,
        &json!({"cname": domain, "source": source, "https_enforced": true}),
    )?;
    log!("pages"; "HTTPS enforced");
    Ok(())
}
