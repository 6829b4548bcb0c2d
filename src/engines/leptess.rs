//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based text engine restricted to digits and Latin letters.
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) automatically on first use.

use crate::config::RecognizerConfig;
use crate::engine::{alphanumeric_only, TextEngine};
use crate::error::RecognizeError;
use image::DynamicImage;
use tesseract_static::tesseract::Tesseract;

use super::download::ensure_downloaded;

const LANGUAGE: &str = "eng";
const CHAR_WHITELIST: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Tesseract text engine
pub struct LeptessEngine {
    /// Path to tessdata directory
    tessdata_path: String,
}

impl LeptessEngine {
    /// Create a new Tesseract-based text engine
    pub fn new(config: &RecognizerConfig) -> Result<Self, RecognizeError> {
        let tessdata_dir = config.model_cache_dir().join("tessdata");
        ensure_downloaded(
            &tessdata_dir,
            &tessdata_url(LANGUAGE),
            &format!("{}.traineddata", LANGUAGE),
        )?;

        // Tesseract expects the directory, not the file
        let tessdata_path = tessdata_dir
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                RecognizeError::InitializationError("Invalid tessdata path".to_string())
            })?;

        // Validate that tessdata is usable before reporting ready
        Tesseract::new(Some(&tessdata_path), Some(LANGUAGE)).map_err(|e| {
            RecognizeError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;

        tracing::info!("Leptess engine initialized (tessdata: {})", tessdata_path);

        Ok(Self { tessdata_path })
    }
}

impl TextEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - better for noisy/messy images like phone photos"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, RecognizeError> {
        let rgb_img = image.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| RecognizeError::DecodeError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Processing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        // Tesseract handles are not Sync; one per call
        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(LANGUAGE)).map_err(|e| {
            RecognizeError::DecodeError(format!("Failed to create Tesseract: {}", e))
        })?;

        tess = tess
            .set_variable("tessedit_char_whitelist", CHAR_WHITELIST)
            .map_err(|e| RecognizeError::DecodeError(format!("Failed to set whitelist: {}", e)))?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            RecognizeError::DecodeError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| RecognizeError::DecodeError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| RecognizeError::DecodeError(format!("Failed to get text: {}", e)))?;

        Ok(text
            .lines()
            .map(alphanumeric_only)
            .filter(|line| !line.is_empty())
            .collect())
    }
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // Use tessdata_fast for smaller, faster downloads
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}
