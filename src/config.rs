//! Optional JSON configuration for the binaries.
//!
//! Everything has a default; a missing config file means "use defaults",
//! a malformed one is an error with path context.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rig: RigConfig,
    pub build: BuildConfig,
}

/// Names of the scene objects a rendering session drives.
///
/// The figure and its skeleton are linked rotation targets; the pose is
/// applied to the skeleton once, before the first frame.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub figure: String,
    pub skeleton: String,
    pub pose: String,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            figure: "mannequin".to_string(),
            skeleton: "mannequin_skeleton".to_string(),
            pose: "seated".to_string(),
        }
    }
}

/// Paths and flags for the external pipeline build (see `buildtool`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub components_dir: PathBuf,
    pub vendor_dir: PathBuf,
    pub install_root: PathBuf,
    pub cflags: Option<String>,
    pub cxxflags: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("pipeline"),
            build_dir: PathBuf::from("build/pipeline"),
            components_dir: PathBuf::from("components"),
            vendor_dir: PathBuf::from("vendor"),
            install_root: PathBuf::from("dist"),
            cflags: None,
            cxxflags: None,
        }
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: Config = serde_json::from_str(&text)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}
