use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use closer_seed::{BootstrapOptions, SnapshotSource, DEFAULT_SEED_COUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{closer_home, ensure_closer_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bootstrap: BootstrapSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSection {
    /// File path, http(s) URL, or "none".
    pub source: String,
    pub seed_count: usize,
    /// Fixed seed for generated data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySection {
    /// IANA timezone for printed timestamps.
    pub timezone: String,
    /// Rows shown by `closer report` and `list` in a session.
    pub limit: usize,
}

impl Default for BootstrapSection {
    fn default() -> Self {
        Self {
            source: "tasks.json".to_string(),
            seed_count: DEFAULT_SEED_COUNT,
            rng_seed: None,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            limit: 10,
        }
    }
}

impl Config {
    /// Bootstrap options, with `source` overriding the configured snapshot.
    pub fn bootstrap_options(&self, source: Option<&str>) -> BootstrapOptions {
        BootstrapOptions {
            source: SnapshotSource::parse(source.unwrap_or(&self.bootstrap.source)),
            seed_count: self.bootstrap.seed_count,
            rng_seed: self.bootstrap.rng_seed,
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.display
            .timezone
            .parse()
            .map_err(|_| anyhow!("invalid timezone in config: {}", self.display.timezone))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(closer_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    ensure_closer_home()?;
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default())?;
    println!("Wrote {}", written.display());
    Ok(())
}
