use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub format: Option<String>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".learnhub");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Location of the persisted session record for `profile`.
pub fn session_path(profile: &str) -> Result<PathBuf> {
    Ok(config_dir()?.join(format!("session.{profile}.json")))
}

pub fn load_all() -> Result<ConfigFile> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(&path)?;
    parse(&content)
}

fn parse(content: &str) -> Result<ConfigFile> {
    toml::from_str(content).context("Invalid config.toml")
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all()?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all()?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(config_path()?, content)?;
    Ok(())
}

/// Picks the backend URL: `--server` / `LEARNHUB_URL`, then the profile's
/// `server`, then the gateway config's `base_url`.
pub fn resolve_server(cli_server: &Option<String>, profile: &ProfileConfig, fallback: &str) -> String {
    cli_server
        .clone()
        .or_else(|| profile.server.clone())
        .unwrap_or_else(|| fallback.to_string())
}
