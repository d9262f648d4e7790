use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use moodcam_core::detection::infrastructure::onnx_yolo_locator::DEFAULT_CONFIDENCE;
use moodcam_core::shared::constants::{APP_DIR_NAME, DEFAULT_REFRESH_FPS};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Terminal,
    Json,
    None,
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Terminal => write!(f, "terminal"),
            ChartKind::Json => write!(f, "json"),
            ChartKind::None => write!(f, "none"),
        }
    }
}

/// Persistent defaults for the CLI. Every field may be omitted from the
/// file; command-line flags override whatever is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: Option<String>,
    pub models_dir: Option<PathBuf>,
    pub allow_download: bool,
    pub confidence: f64,
    pub fps: f64,
    pub chart: ChartKind,
    pub chart_path: PathBuf,
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_every: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: None,
            models_dir: None,
            allow_download: true,
            confidence: DEFAULT_CONFIDENCE,
            fps: DEFAULT_REFRESH_FPS,
            chart: ChartKind::Terminal,
            chart_path: PathBuf::from("emotion_chart.json"),
            snapshot_dir: None,
            snapshot_every: 30,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Loads an explicit settings file, or the per-user file when `path` is
    /// `None`. A missing per-user file means defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::read(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    fn read(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
