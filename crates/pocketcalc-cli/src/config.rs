//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config <path>` on the command line
//! 2. `$POCKETCALC_CONFIG` environment variable
//! 3. `~/.config/pocketcalc/config.toml`
//! 4. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use pocketcalc_core::{EngineOptions, EqualsPolicy};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub repl: ReplConfig,
    pub tui: TuiConfig,
}

/// Calculator behaviour.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `clear` or `repeat`: what a second `=` does.
    pub equals: EqualsPolicy,
}

/// Line-mode settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    pub prompt: String,
    /// Print the display after every key instead of once per line.
    pub trace: bool,
}

/// Full-screen keypad settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Show the memory register next to the display.
    pub show_memory: bool,
}

// --- Defaults ---

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".into(),
            trace: false,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { show_memory: true }
    }
}

impl Config {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            equals: self.engine.equals,
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
///
/// A path given explicitly must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(p) = explicit {
        return read_config(p);
    }

    if let Some(p) = config_path(None) {
        if p.exists() {
            return read_config(&p);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Resolve the config file path.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    if let Ok(p) = std::env::var("POCKETCALC_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("pocketcalc")
            .join("config.toml")
    })
}

/// Show the active config path (for `pocketcalc config`).
pub fn show_config_path(explicit: Option<&Path>) -> String {
    match config_path(explicit) {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
