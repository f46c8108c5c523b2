//! Generator configuration. Loaded from skyline.ron at startup.

use anyhow::Context;
use procgen::{BuildRectSpec, PackConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent generator settings. Loaded from `skyline.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkylineConfig {
    /// Base seed; every generator instance derives its own seed from this.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Occupation grid width in cells.
    #[serde(default = "default_grid_size")]
    pub grid_width: usize,
    /// Occupation grid depth in cells.
    #[serde(default = "default_grid_size")]
    pub grid_depth: usize,
    /// Tower field rows.
    #[serde(default = "default_placer_count")]
    pub placer_rows: u32,
    /// Tower field columns.
    #[serde(default = "default_placer_count")]
    pub placer_cols: u32,
    /// World units between neighboring towers.
    #[serde(default = "default_placer_spacing")]
    pub placer_spacing: i32,
    /// Directory the OBJ files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// RON list of `BuildRectSpec` for the authored tower. Built-in list when unset.
    #[serde(default)]
    pub tower_spec_path: Option<PathBuf>,
}

fn default_seed() -> u64 {
    1
}
fn default_grid_size() -> usize {
    25
}
fn default_placer_count() -> u32 {
    5
}
fn default_placer_spacing() -> i32 {
    10
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

impl Default for SkylineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            grid_width: default_grid_size(),
            grid_depth: default_grid_size(),
            placer_rows: default_placer_count(),
            placer_cols: default_placer_count(),
            placer_spacing: default_placer_spacing(),
            output_dir: default_output_dir(),
            tower_spec_path: None,
        }
    }
}

impl SkylineConfig {
    /// Load config from `skyline.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn pack_config(&self) -> PackConfig {
        PackConfig {
            width: self.grid_width,
            depth: self.grid_depth,
            ..Default::default()
        }
    }

    /// Authored tower specs from `tower_spec_path`, or the built-in list.
    pub fn tower_specs(&self) -> anyhow::Result<Vec<BuildRectSpec>> {
        let Some(path) = &self.tower_spec_path else {
            return Ok(default_tower_specs());
        };
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading tower spec {:?}", path))?;
        ron::from_str(&data).with_context(|| format!("parsing tower spec {:?}", path))
    }
}

/// A stepped tower: wide base, two setbacks, a thin spire.
pub fn default_tower_specs() -> Vec<BuildRectSpec> {
    vec![
        BuildRectSpec::new(3.0, 4.0, 4.0),
        BuildRectSpec::new(0.0, 3.0, 3.0),
        BuildRectSpec::new(2.5, 3.0, 3.0),
        BuildRectSpec::new(0.0, 2.0, 2.0),
        BuildRectSpec::new(2.0, 2.0, 2.0),
        BuildRectSpec::new(1.5, 0.5, 0.5),
    ]
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("skyline.ron")
}
