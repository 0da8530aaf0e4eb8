use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Graph endpoint used when neither flag, env, profile nor credentials name one.
pub const DEFAULT_SERVER: &str = "https://graph.microsoft.com/v1.0";
/// Template directory used when neither flag nor profile name one.
pub const DEFAULT_TEMPLATE_DIR: &str = "policies";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub template_dir: Option<String>,
    pub format: Option<String>,
    /// Placeholder values seeded into every run, keyed by token name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub placeholders: BTreeMap<String, String>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".capsync");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    let cfg: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(cfg)
}

fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let all = load_all_from(&config_path()?)?;
    Ok(all.get(profile).cloned().unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

impl ProfileConfig {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server" => self.server = Some(value.to_string()),
            "template_dir" => self.template_dir = Some(value.to_string()),
            "format" => {
                if crate::cli::OutputFormat::parse_config(value).is_none() {
                    anyhow::bail!("Unknown format: {value}. Valid formats: json, yaml, table");
                }
                self.format = Some(value.to_string());
            }
            other => match other.strip_prefix("placeholder.") {
                Some(name) if !name.is_empty() => {
                    self.placeholders.insert(name.to_string(), value.to_string());
                }
                _ => anyhow::bail!(
                    "Unknown config key: {other}. Valid keys: server, template_dir, format, placeholder.<NAME>"
                ),
            },
        }
        Ok(())
    }
}

pub fn resolve_server(cli_server: &Option<String>, profile: &str) -> Result<String> {
    // 1. --server flag / CAPSYNC_URL env
    if let Some(s) = cli_server {
        return Ok(s.clone());
    }
    // 2. config.toml profile
    let cfg = load_profile(profile)?;
    if let Some(s) = cfg.server {
        return Ok(s);
    }
    // 3. Stored credentials for this profile
    if let Ok(Some(creds)) = crate::auth::load_credentials(profile) {
        return Ok(creds.server.clone());
    }
    Ok(DEFAULT_SERVER.to_string())
}

pub fn resolve_template_dir(cli_dir: &Option<String>, cfg: &ProfileConfig) -> PathBuf {
    cli_dir
        .as_deref()
        .or(cfg.template_dir.as_deref())
        .unwrap_or(DEFAULT_TEMPLATE_DIR)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = ProfileConfig::default();
        cfg.set("server", "https://graph.microsoft.us/v1.0").unwrap();
        cfg.set("placeholder.BREAKGLASS_GROUP", "7c1d-4e").unwrap();
        save_profile_to(&path, "gov", &cfg).unwrap();
        save_profile_to(&path, "default", &ProfileConfig::default()).unwrap();

        let all = load_all_from(&path).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["gov"], cfg);
        assert_eq!(
            all["gov"].placeholders.get("BREAKGLASS_GROUP").map(String::as_str),
            Some("7c1d-4e")
        );
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_all_from(&dir.path().join("none.toml")).unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_keys_and_formats() {
        let mut cfg = ProfileConfig::default();
        assert!(cfg.set("colour", "blue").is_err());
        assert!(cfg.set("placeholder.", "x").is_err());
        assert!(cfg.set("format", "xml").is_err());
        cfg.set("format", "yaml").unwrap();
        assert_eq!(cfg.format.as_deref(), Some("yaml"));
    }

    #[test]
    fn template_dir_precedence() {
        let cfg = ProfileConfig {
            template_dir: Some("from-profile".into()),
            ..ProfileConfig::default()
        };
        assert_eq!(
            resolve_template_dir(&Some("from-flag".into()), &cfg),
            PathBuf::from("from-flag")
        );
        assert_eq!(resolve_template_dir(&None, &cfg), PathBuf::from("from-profile"));
        assert_eq!(
            resolve_template_dir(&None, &ProfileConfig::default()),
            PathBuf::from(DEFAULT_TEMPLATE_DIR)
        );
    }
}
