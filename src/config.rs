use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::batch::BatchOptions;
use crate::pipeline::decode::{DecodeOptions, ResizeFilter};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads for folder decoding, 0 for the rayon default.
    pub thread_count: usize,
    pub resize_filter: ResizeFilter,
    pub recursive: bool,
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread_count: 0,
            resize_filter: ResizeFilter::default(),
            recursive: false,
            pretty: false,
        }
    }
}

impl Config {
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = self.to_toml_string()?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// `<config dir>/curconvert/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("curconvert").join("config.toml"))
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// yields the defaults; a malformed one is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    log::debug!("No config directory on this platform, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load_from_file(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new().with_resize_filter(self.resize_filter)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new()
            .with_decode_options(self.decode_options())
            .with_recursive(self.recursive)
            .with_thread_count(self.thread_count)
    }
}
