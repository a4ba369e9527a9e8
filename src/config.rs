use crate::engine::discovery::CampaignSource;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub platform: PlatformConfig,
    pub campaign: CampaignConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformConfig {
    pub api_base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CampaignConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub sources: Vec<CampaignSource>,
}

/// Session sizing presets. Safe trades speed for a lower abuse-detection
/// profile; aggressive is the bot's ceiling.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Safe,
    #[default]
    Moderate,
    Aggressive,
}

impl Mode {
    pub fn session_size(self) -> usize {
        match self {
            Mode::Safe => 30,
            Mode::Moderate => 50,
            Mode::Aggressive => 100,
        }
    }

    /// Inclusive delay range between successful follows, seconds.
    pub fn delay_range(self) -> (u64, u64) {
        match self {
            Mode::Safe => (60, 120),
            Mode::Moderate => (40, 80),
            Mode::Aggressive => (30, 60),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_grace_days")]
    pub grace_days: i64,
    #[serde(default = "default_max_unfollows")]
    pub max_unfollows: u32,
}

fn default_grace_days() -> i64 {
    3
}
fn default_max_unfollows() -> u32 {
    50
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            grace_days: 3,
            max_unfollows: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PacingConfig {
    /// Blocking cooldown after a provider "please wait" signal, seconds.
    #[serde(default = "default_rate_limit_cooldown")]
    pub rate_limit_cooldown_s: u64,
}

fn default_rate_limit_cooldown() -> u64 {
    300
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            rate_limit_cooldown_s: 300,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_followed_path")]
    pub followed_users: String,
    #[serde(default = "default_whitelist_path")]
    pub whitelist: String,
}

fn default_followed_path() -> String {
    "followed_users.json".to_string()
}
fn default_whitelist_path() -> String {
    "whitelist.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            followed_users: default_followed_path(),
            whitelist: default_whitelist_path(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// Credentials come from environment variables, or prompted at startup.
    /// Prompted values are saved to .env for future runs.
    pub fn platform_username() -> Result<String> {
        match std::env::var("INSTA_USERNAME") {
            Ok(name) if !name.is_empty() => Ok(sanitize_value(&name)),
            _ => {
                let name = prompt("Instagram username")?;
                save_env_var("INSTA_USERNAME", &name);
                Ok(name)
            }
        }
    }

    pub fn platform_password() -> Result<String> {
        match std::env::var("INSTA_PASSWORD") {
            Ok(pass) if !pass.is_empty() => Ok(sanitize_value(&pass)),
            _ => {
                let pass = prompt("Instagram password")?;
                save_env_var("INSTA_PASSWORD", &pass);
                Ok(pass)
            }
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let value = input.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label);
    }
    Ok(value)
}

/// Strip carriage returns, BOM, and other invisible chars from a value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

/// Append a KEY=VALUE line to .env and set it in the current process.
fn save_env_var(key: &str, value: &str) {
    std::env::set_var(key, value);
    let path = Path::new(ENV_FILE);
    let mut contents = std::fs::read_to_string(path).unwrap_or_default();
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&format!("{}={}\n", key, value));
    let _ = std::fs::write(path, contents);
}
