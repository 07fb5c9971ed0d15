//! Engine configuration: built-in defaults, then an optional TOML file, then
//! `MOODTRACK_*` environment variables, each layer overriding the last.
//!
//! ```toml
//! sample_rate = 48000
//! block_size = 256
//! fade_out_seconds = 6.0
//! catalog_path = "assets/catalog.toml"
//! sample_root = "assets/samples"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::MAX_BLOCK_SIZE;

pub const ENV_CONFIG_PATH: &str = "MOODTRACK_CONFIG";
const ENV_SAMPLE_RATE: &str = "MOODTRACK_SAMPLE_RATE";
const ENV_BLOCK_SIZE: &str = "MOODTRACK_BLOCK_SIZE";
const ENV_FADE_OUT: &str = "MOODTRACK_FADE_OUT";
const ENV_CATALOG: &str = "MOODTRACK_CATALOG";
const ENV_SAMPLE_ROOT: &str = "MOODTRACK_SAMPLE_ROOT";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: u32,
    /// Frames rendered between trigger checks. Clamped to `MAX_BLOCK_SIZE`.
    pub block_size: usize,
    pub fade_out_seconds: f64,
    pub catalog_path: Option<PathBuf>,
    /// Directory sample-group file paths are resolved against. Without one,
    /// sample groups are synthesized.
    pub sample_root: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            block_size: 512,
            fade_out_seconds: 4.0,
            catalog_path: None,
            sample_root: None,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct PartialConfig {
    sample_rate: Option<u32>,
    block_size: Option<usize>,
    fade_out_seconds: Option<f64>,
    catalog_path: Option<PathBuf>,
    sample_root: Option<PathBuf>,
}

impl EngineConfig {
    /// Defaults, overlaid by `path` (or `$MOODTRACK_CONFIG`) when given, then
    /// by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(ENV_CONFIG_PATH).filter(|v| !v.is_empty()).map(PathBuf::from));
        if let Some(path) = path {
            let contents = fs::read_to_string(&path)
                .map_err(|err| Error::Config(format!("failed to read {}: {err}", path.display())))?;
            config.apply_toml(&contents)?;
        }

        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply_toml(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_toml(&mut self, contents: &str) -> Result<()> {
        let partial: PartialConfig =
            toml::from_str(contents).map_err(|err| Error::Config(err.to_string()))?;
        self.apply_partial(partial);
        Ok(())
    }

    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(rate) = partial.sample_rate {
            self.sample_rate = rate;
        }
        if let Some(size) = partial.block_size {
            self.block_size = size;
        }
        if let Some(seconds) = partial.fade_out_seconds {
            self.fade_out_seconds = seconds;
        }
        if let Some(path) = partial.catalog_path {
            self.catalog_path = Some(path);
        }
        if let Some(root) = partial.sample_root {
            self.sample_root = Some(root);
        }
    }

    /// Apply overrides from `lookup`, normally the process environment.
    /// Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_SAMPLE_RATE) {
            self.sample_rate = parse_env(ENV_SAMPLE_RATE, &value)?;
        }
        if let Some(value) = get(ENV_BLOCK_SIZE) {
            self.block_size = parse_env(ENV_BLOCK_SIZE, &value)?;
        }
        if let Some(value) = get(ENV_FADE_OUT) {
            self.fade_out_seconds = parse_env(ENV_FADE_OUT, &value)?;
        }
        if let Some(value) = get(ENV_CATALOG) {
            self.catalog_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_SAMPLE_ROOT) {
            self.sample_root = Some(PathBuf::from(value));
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Err(Error::Config(format!(
                "sample_rate {} is outside 8000..=192000",
                self.sample_rate
            )));
        }
        if !self.fade_out_seconds.is_finite() || self.fade_out_seconds < 0.0 {
            return Err(Error::Config(format!(
                "fade_out_seconds {} must be a non-negative number",
                self.fade_out_seconds
            )));
        }
        self.block_size = self.block_size.clamp(1, MAX_BLOCK_SIZE);
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key}={value} could not be parsed")))
}
