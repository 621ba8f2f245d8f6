//! DNS record automation against the Cloudflare v4 API.
//!
//! Resolves the zone for the configured domain (creating it on the first
//! account if absent) and upserts the apex and `www` CNAME records pointing
//! at the Pages host.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use reqwest::{Method, blocking::Client};
use serde_json::{Value, json};

const API_BASE: &str = "https://api.cloudflare.com/client/v4";

struct DnsClient {
    http: Client,
    token: String,
}

impl DnsClient {
    fn new(token: String) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, token })
    }

    /// One API call. Both transport failures and `success: false` envelope
    /// responses surface as errors carrying the provider's message.
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let mut request = self
            .http
            .request(method, format!("{API_BASE}{path}"))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .with_context(|| format!("DNS API request failed: {path}"))?;
        let status = response.status();
        let data: Value = response.json().context("DNS API returned invalid JSON")?;

        let success = data.get("success").and_then(Value::as_bool).unwrap_or(false);
        if !status.is_success() || !success {
            let message = data
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            bail!("DNS API error: {message} ({status})");
        }

        Ok(data)
    }

    fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None)
    }

    /// Zone id for the domain, if the zone already exists.
    fn zone_id(&self, domain: &str) -> Result<Option<String>> {
        let data = self.get(&format!("/zones?name={domain}"))?;
        Ok(data
            .pointer("/result/0/id")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// First account visible to the token.
    fn account_id(&self) -> Result<String> {
        let data = self.get("/accounts")?;
        data.pointer("/result/0/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("No account found for this token")
    }

    fn create_zone(&self, domain: &str, account_id: &str) -> Result<String> {
        let data = self.request(
            Method::POST,
            "/zones",
            Some(&json!({
                "name": domain,
                "account": {"id": account_id},
                "jump_start": true,
                "type": "full",
            })),
        )?;

        let zone_id = data
            .pointer("/result/id")
            .and_then(Value::as_str)
            .context("Zone creation returned no id")?
            .to_string();

        if let Some(servers) = data.pointer("/result/name_servers").and_then(Value::as_array) {
            let servers: Vec<&str> = servers.iter().filter_map(Value::as_str).collect();
            log!("dns"; "zone created, update NS records at your registrar to: {}", servers.join(", "));
        }

        Ok(zone_id)
    }

    fn records(&self, zone_id: &str) -> Result<Vec<Value>> {
        let data = self.get(&format!("/zones/{zone_id}/dns_records"))?;
        Ok(data
            .get("result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Create or update one record, matching on full name + type.
    fn upsert_record(
        &self,
        zone_id: &str,
        domain: &str,
        name: &str,
        record_type: &str,
        content: &str,
    ) -> Result<()> {
        let full_name = if name == "@" {
            domain.to_string()
        } else {
            format!("{name}.{domain}")
        };

        let existing = self.records(zone_id)?.into_iter().find(|r| {
            r.get("name").and_then(Value::as_str) == Some(full_name.as_str())
                && r.get("type").and_then(Value::as_str) == Some(record_type)
        });

        let body = json!({
            "type": record_type,
            "content": content,
            "proxied": false,
            "ttl": 1,
            "name": full_name,
        });

        match existing.as_ref().and_then(|r| r.get("id")).and_then(Value::as_str) {
            Some(record_id) => {
                self.request(
                    Method::PATCH,
                    &format!("/zones/{zone_id}/dns_records/{record_id}"),
                    Some(&body),
                )?;
                log!("dns"; "updated: {full_name} {record_type} -> {content}");
            }
            None => {
                self.request(
                    Method::POST,
                    &format!("/zones/{zone_id}/dns_records"),
                    Some(&body),
                )?;
                log!("dns"; "added: {full_name} {record_type} -> {content}");
            }
        }

        Ok(())
    }
}

/// Point the apex and `www` records of the configured domain at the Pages
/// host.
pub fn setup_dns(config: &SiteConfig) -> Result<()> {
    let dns = &config.deploy.dns;
    let token = super::read_token(&dns.token_path)?;
    let client = DnsClient::new(token)?;

    log!("dns"; "configuring records for {}", dns.domain);

    let zone_id = match client.zone_id(&dns.domain)? {
        Some(id) => {
            log!("dns"; "zone found: {}", dns.domain);
            id
        }
        None => {
            log!("dns"; "zone not found, creating");
            let account_id = client.account_id()?;
            client.create_zone(&dns.domain, &account_id)?
        }
    };

    for name in ["@", "www"] {
        client.upsert_record(&zone_id, &dns.domain, name, "CNAME", &dns.pages_host)?;
    }

    log!("dns"; "done, propagation may take a few minutes");
    log!("dns"; "make sure the Pages custom domain is set to {}", dns.domain);
    Ok(())
}
