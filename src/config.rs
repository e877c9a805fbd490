use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub clean: CleanConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Default tag filtering for runners built from this config.
#[derive(Debug, Default, Deserialize)]
pub struct FilterConfig {
    /// Tag applied when the runner gets no explicit one.
    /// Example: "unit"
    pub tag: Option<String>,
}

/// Settings for the cache-clean collaborator.
#[derive(Debug, Default, Deserialize)]
pub struct CleanConfig {
    /// Command line to run before a marked group; the target is appended.
    /// Example: "cargo clean --manifest-path"
    pub command: Option<String>,
    /// Path handed to the clean command.
    /// Example: "crates/parser/Cargo.toml"
    pub target: Option<PathBuf>,
}

/// Console rendering overrides.
#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    /// Column budget for failure messages before the `...` marker.
    #[serde(default = "default_width")]
    pub width: usize,
    /// Set to false to disable ANSI styling.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_width() -> usize {
    50
}

fn default_color() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            color: default_color(),
        }
    }
}

impl Config {
    /// Load `trial.toml` from `dir`, falling back to defaults if absent or invalid.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join("trial.toml");
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        toml::from_str(&content).unwrap_or_default()
    }
}
