// src/config.rs
//! Engine configuration: optional TOML file + env overrides.
//!
//! Resolution order:
//! 1) TOML at `$RITMO_CONFIG_PATH` (must exist when set) or `config/ritmo.toml` (optional)
//! 2) `RITMO_HISTORY_PATH`, `RITMO_TEMPLATES_PATH`, `RITMO_METRICS` override the file
//!
//! TOML shape:
//! ```toml
//! [history]
//! path = "data/historico_ritmo.jsonl"   # or "memory"
//!
//! [templates]
//! path = "config/templates.json"
//!
//! [metrics]
//! enabled = true
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/ritmo.toml";
pub const DEFAULT_HISTORY_PATH: &str = "data/historico_ritmo.jsonl";

pub const ENV_CONFIG_PATH: &str = "RITMO_CONFIG_PATH";
pub const ENV_HISTORY_PATH: &str = "RITMO_HISTORY_PATH";
pub const ENV_TEMPLATES_PATH: &str = "RITMO_TEMPLATES_PATH";
pub const ENV_METRICS: &str = "RITMO_METRICS";

/// History path value that selects the in-process store.
pub const MEMORY_HISTORY: &str = "memory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryBackend {
    Jsonl(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub history: HistoryBackend,
    /// Optional JSON override for mission/insight texts.
    pub templates_path: Option<PathBuf>,
    pub metrics_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history: HistoryBackend::Jsonl(PathBuf::from(DEFAULT_HISTORY_PATH)),
            templates_path: None,
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    history: HistorySection,
    #[serde(default)]
    templates: TemplatesSection,
    #[serde(default)]
    metrics: MetricsSection,
}

#[derive(Debug, Default, Deserialize)]
struct HistorySection {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TemplatesSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct MetricsSection {
    enabled: Option<bool>,
}

impl EngineConfig {
    /// Load file (if any) and apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::from_toml_file(&pb)?
            }
            Err(_) => {
                let pb = PathBuf::from(DEFAULT_CONFIG_PATH);
                if pb.exists() {
                    Self::from_toml_file(&pb)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing engine config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(s)?;
        let mut cfg = Self::default();
        if let Some(p) = file.history.path {
            cfg.history = parse_history_backend(&p);
        }
        cfg.templates_path = file.templates.path;
        if let Some(on) = file.metrics.enabled {
            cfg.metrics_enabled = on;
        }
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(p) = std::env::var(ENV_HISTORY_PATH) {
            if !p.trim().is_empty() {
                self.history = parse_history_backend(&p);
            }
        }
        if let Ok(p) = std::env::var(ENV_TEMPLATES_PATH) {
            if !p.trim().is_empty() {
                self.templates_path = Some(PathBuf::from(p.trim()));
            }
        }
        if let Some(on) = parse_flag(std::env::var(ENV_METRICS).ok()) {
            self.metrics_enabled = on;
        }
    }
}

fn parse_history_backend(raw: &str) -> HistoryBackend {
    let t = raw.trim();
    if t.eq_ignore_ascii_case(MEMORY_HISTORY) {
        HistoryBackend::Memory
    } else {
        HistoryBackend::Jsonl(PathBuf::from(t))
    }
}

// "1"/"true"/"on" and "0"/"false"/"off"; anything else is ignored
fn parse_flag(raw: Option<String>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
