use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Bearer token obtained with `capsync login`
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub server: String,
    pub tenant: String,
    pub client_id: String,
    pub access_token: String,
}

fn creds_path(profile: &str) -> Result<PathBuf> {
    Ok(crate::config::config_dir()?.join(format!("credentials.{profile}.json")))
}

pub fn load_credentials(profile: &str) -> Result<Option<StoredCredentials>> {
    let path = creds_path(profile)?;
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let creds: StoredCredentials = serde_json::from_str(&content)?;
    Ok(Some(creds))
}

pub fn save_credentials(profile: &str, creds: &StoredCredentials) -> Result<()> {
    let path = creds_path(profile)?;
    let content = serde_json::to_string_pretty(creds)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn remove_credentials(profile: &str) -> Result<bool> {
    let path = creds_path(profile)?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// `--token` / CAPSYNC_TOKEN first, then the profile's stored token.
pub fn resolve_token(cli_token: &Option<String>, profile: &str) -> Result<Option<String>> {
    if let Some(t) = cli_token {
        return Ok(Some(t.clone()));
    }
    Ok(load_credentials(profile)?.map(|c| c.access_token))
}

/// Short form of a token for display.
pub fn token_preview(token: &str) -> String {
    if token.len() > 20 && token.is_ascii() {
        format!("{}...{}", &token[..8], &token[token.len() - 8..])
    } else {
        "(short token)".to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

pub async fn client_credentials(
    authority: &str,
    tenant: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<TokenResponse> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!(
            "{}/{}/oauth2/v2.0/token",
            authority.trim_end_matches('/'),
            urlencoding(tenant)
        ))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(format!(
            "grant_type=client_credentials&client_id={}&client_secret={}&scope={}",
            urlencoding(client_id),
            urlencoding(client_secret),
            urlencoding(GRAPH_SCOPE),
        ))
        .send()
        .await
        .context("Failed to connect to token endpoint")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Login failed (HTTP {status}): {body}");
    }

    resp.json().await.context("Failed to parse token response")
}

fn urlencoding(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
