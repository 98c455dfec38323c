use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$CLOSER_HOME`, or `~/.closer`.
pub fn closer_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CLOSER_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".closer"))
}

pub fn ensure_closer_home() -> Result<PathBuf> {
    let dir = closer_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
