//! Failure artifacts: images that produced no result, kept for diagnosis

use crate::error::RecognizeError;
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;

/// Writes failed images to `<base_dir>/<timestamp>/<timestamp>_code_failed_<suffix>.png`
#[derive(Debug, Clone)]
pub struct FailureLog {
    base_dir: PathBuf,
}

impl FailureLog {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Save an image under the current second's directory
    ///
    /// The random suffix is created atomically, so callers failing within
    /// the same second never overwrite each other.
    pub fn save(&self, image: &DynamicImage) -> Result<PathBuf, RecognizeError> {
        let stamp = timestamp();
        let dir = self.base_dir.join(&stamp);

        // create_dir_all succeeds if another caller created it first
        fs::create_dir_all(&dir).map_err(|e| {
            RecognizeError::ArtifactError(format!("Failed to create {:?}: {}", dir, e))
        })?;

        let file = tempfile::Builder::new()
            .prefix(&format!("{}_code_failed_", stamp))
            .suffix(".png")
            .rand_bytes(6)
            .tempfile_in(&dir)
            .map_err(|e| {
                RecognizeError::ArtifactError(format!("Failed to create artifact file: {}", e))
            })?;
        let (file, path) = file.keep().map_err(|e| {
            RecognizeError::ArtifactError(format!("Failed to keep artifact file: {}", e))
        })?;

        let mut writer = BufWriter::new(file);
        let written = image
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|e| e.to_string())
            .and_then(|_| writer.flush().map_err(|e| e.to_string()));

        if let Err(e) = written {
            let _ = fs::remove_file(&path);
            return Err(RecognizeError::ArtifactError(format!(
                "Failed to write {:?}: {}",
                path, e
            )));
        }

        Ok(path)
    }
}

/// Local time with seconds resolution, e.g. `20240617144647`
fn timestamp() -> String {
    // now_local is unavailable in some multi-threaded processes
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year][month][day][hour][minute][second]"
    ))
    .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
