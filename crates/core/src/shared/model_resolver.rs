use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};

const APP_DIR_NAME: &str = "FaceRec";

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
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(model_name, bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type DownloadProgressFn = Box<dyn Fn(&str, u64, u64) + Send>;

/// A model file known by name, with the URL it can be fetched from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub url: &'static str,
}

pub const FACE_DETECTION_MODEL: ModelSpec = ModelSpec {
    name: YOLO_MODEL_NAME,
    url: YOLO_MODEL_URL,
};

pub const FACE_EMBEDDING_MODEL: ModelSpec = ModelSpec {
    name: EMBEDDING_MODEL_NAME,
    url: EMBEDDING_MODEL_URL,
};

/// Locates model files, downloading them into the cache on first use.
///
/// Lookup order: cache directory, then the optional bundled directory, then
/// a download into the cache.
pub struct ModelResolver {
    cache_dir: PathBuf,
    bundled_dir: Option<PathBuf>,
    progress: Option<DownloadProgressFn>,
}

impl ModelResolver {
    /// Resolver backed by the platform cache directory.
    pub fn new() -> Result<Self, ModelResolveError> {
        Ok(Self::with_cache_dir(model_cache_dir()?))
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            bundled_dir: None,
            progress: None,
        }
    }

    pub fn bundled_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.bundled_dir = dir;
        self
    }

    pub fn on_progress(mut self, progress: DownloadProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn resolve(&self, spec: ModelSpec) -> Result<PathBuf, ModelResolveError> {
        let cached = self.cache_dir.join(spec.name);
        if cached.exists() {
            return Ok(cached);
        }

        if let Some(bundled) = self
            .bundled_dir
            .as_ref()
            .map(|dir| dir.join(spec.name))
            .filter(|p| p.exists())
        {
            return Ok(bundled);
        }

        fs::create_dir_all(&self.cache_dir).map_err(ModelResolveError::CacheDir)?;
        log::info!("Downloading {} from {}", spec.name, spec.url);
        download(spec, &cached, self.progress.as_ref())?;
        Ok(cached)
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/FaceRec/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceRec/models/` or `~/.cache/FaceRec/models/`
/// - Windows: `%LOCALAPPDATA%/FaceRec/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join(APP_DIR_NAME).join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

/// Streams `spec.url` into `<dest>.part` and renames it over `dest` once
/// complete, so an interrupted download never leaves a truncated model.
fn download(
    spec: ModelSpec,
    dest: &Path,
    progress: Option<&DownloadProgressFn>,
) -> Result<(), ModelResolveError> {
    let part = dest.with_extension("part");
    let result = stream_to(spec, &part, progress).and_then(|()| {
        fs::rename(&part, dest).map_err(|source| ModelResolveError::Write {
            path: dest.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

fn stream_to(
    spec: ModelSpec,
    part: &Path,
    progress: Option<&DownloadProgressFn>,
) -> Result<(), ModelResolveError> {
    let write_err = |source| ModelResolveError::Write {
        path: part.to_path_buf(),
        source,
    };

    let mut response = reqwest::blocking::get(spec.url)
        .and_then(|r| r.error_for_status())
        .map_err(|source| ModelResolveError::Download {
            url: spec.url.to_string(),
            source,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut file = fs::File::create(part).map_err(write_err)?;
    let mut buf = vec![0u8; 1024 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = response.read(&mut buf).map_err(write_err)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        downloaded += n as u64;
        if let Some(cb) = progress {
            cb(spec.name, downloaded, total);
        }
    }
    file.flush().map_err(write_err)
}
