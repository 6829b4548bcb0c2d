//! Model file cache shared by the text engines

use crate::error::RecognizeError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ensure `filename` exists in `cache_dir`, downloading it from `url` if needed
pub fn ensure_downloaded(
    cache_dir: &Path,
    url: &str,
    filename: &str,
) -> Result<PathBuf, RecognizeError> {
    std::fs::create_dir_all(cache_dir).map_err(|e| {
        RecognizeError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    let path = cache_dir.join(filename);

    if !path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &path)?;
        tracing::info!("Downloaded {} to {:?}", filename, path);
    } else {
        tracing::info!("Using cached model from {:?}", path);
    }

    Ok(path)
}

/// Download a file from URL to path using ureq
///
/// Writes to a sibling temp file first so an interrupted download never
/// leaves a truncated model in the cache.
fn download_file(url: &str, path: &Path) -> Result<(), RecognizeError> {
    let response = ureq::get(url).call().map_err(|e| {
        RecognizeError::InitializationError(format!("Failed to download {}: {}", url, e))
    })?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        RecognizeError::InitializationError(format!("Failed to read download response: {}", e))
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut partial = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        RecognizeError::InitializationError(format!("Failed to create model file: {}", e))
    })?;
    partial.write_all(&buffer).map_err(|e| {
        RecognizeError::InitializationError(format!("Failed to write model file: {}", e))
    })?;
    partial.persist(path).map_err(|e| {
        RecognizeError::InitializationError(format!("Failed to store model file: {}", e))
    })?;

    Ok(())
}
