use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub interpolation: InterpolationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON lines, one frame of detector output per line
    pub detections: PathBuf,
    pub sparse: PathBuf,
    pub dense: PathBuf,
    pub labels: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            detections: PathBuf::from("detections.jsonl"),
            sparse: PathBuf::from("results.csv"),
            dense: PathBuf::from("results_interpolated.csv"),
            labels: PathBuf::from("labels.json"),
        }
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "platetrack=info".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;

        Ok(config)
    }
}
