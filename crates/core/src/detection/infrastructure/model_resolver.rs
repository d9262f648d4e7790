use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{
    APP_DIR_NAME, EXPRESSION_MODEL_NAME, EXPRESSION_MODEL_URL, FACE_MODEL_NAME, FACE_MODEL_URL,
};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download failed for {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model {name} not found locally and downloads are disabled")]
    Missing { name: String },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// A model weight file and where to fetch it from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelAsset {
    pub name: &'static str,
    pub url: &'static str,
}

pub const FACE_MODEL: ModelAsset = ModelAsset {
    name: FACE_MODEL_NAME,
    url: FACE_MODEL_URL,
};

pub const EXPRESSION_MODEL: ModelAsset = ModelAsset {
    name: EXPRESSION_MODEL_NAME,
    url: EXPRESSION_MODEL_URL,
};

/// Progress callback: `(asset_name, bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(&str, u64, u64) + Send>;

/// Finds model weights on disk, downloading them into the cache on a miss.
///
/// Resolution order:
/// 1. Explicit models directory (e.g. `./models` next to the binary)
/// 2. User cache directory
/// 3. Download from the asset URL into the cache (if allowed)
pub struct ModelResolver {
    models_dir: Option<PathBuf>,
    cache_dir: PathBuf,
    allow_download: bool,
    progress: Option<ProgressFn>,
}

impl ModelResolver {
    /// Resolver using the platform cache directory.
    pub fn new(models_dir: Option<PathBuf>) -> Result<Self, ModelResolveError> {
        Ok(Self::with_cache_dir(models_dir, model_cache_dir()?))
    }

    pub fn with_cache_dir(models_dir: Option<PathBuf>, cache_dir: PathBuf) -> Self {
        Self {
            models_dir,
            cache_dir,
            allow_download: true,
            progress: None,
        }
    }

    pub fn allow_download(mut self, allow: bool) -> Self {
        self.allow_download = allow;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn resolve(&self, asset: &ModelAsset) -> Result<PathBuf, ModelResolveError> {
        if let Some(dir) = &self.models_dir {
            let local = dir.join(asset.name);
            if local.exists() {
                log::debug!("Using model {} from {}", asset.name, dir.display());
                return Ok(local);
            }
        }

        let cached = self.cache_dir.join(asset.name);
        if cached.exists() {
            log::debug!("Using cached model {}", cached.display());
            return Ok(cached);
        }

        if !self.allow_download {
            return Err(ModelResolveError::Missing {
                name: asset.name.to_string(),
            });
        }

        log::info!("Downloading model {} from {}", asset.name, asset.url);
        fs::create_dir_all(&self.cache_dir).map_err(ModelResolveError::CacheDir)?;
        download(asset, &cached, self.progress.as_ref())?;
        Ok(cached)
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/MoodCam/models/`
/// - Linux: `$XDG_CACHE_HOME/MoodCam/models/` or `~/.cache/MoodCam/models/`
/// - Windows: `%LOCALAPPDATA%/MoodCam/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let root = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let root = dirs::cache_dir();

    root.map(|d| d.join(APP_DIR_NAME).join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(
    asset: &ModelAsset,
    dest: &Path,
    progress: Option<&ProgressFn>,
) -> Result<(), ModelResolveError> {
    let download_err = |source| ModelResolveError::Download {
        url: asset.url.to_string(),
        source,
    };

    let response = reqwest::blocking::get(asset.url).map_err(download_err)?;
    if !response.status().is_success() {
        return Err(ModelResolveError::HttpStatus {
            url: asset.url.to_string(),
            status: response.status().as_u16(),
        });
    }
    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(download_err)?;

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    let write_err = |source| ModelResolveError::Write {
        path: temp_path.clone(),
        source,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;

    let mut downloaded: u64 = 0;
    for chunk in bytes.chunks(1024 * 1024) {
        if let Err(e) = file.write_all(chunk) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(e));
        }
        downloaded += chunk.len() as u64;
        if let Some(cb) = progress {
            cb(asset.name, downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|source| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source,
    })
}
