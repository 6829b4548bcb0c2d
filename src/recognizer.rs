//! Decode dispatch: preprocessing, collaborator call and failure logging

use crate::artifact::FailureLog;
use crate::config::RecognizerConfig;
use crate::engine::{CodeDecoder, TextEngine};
use crate::engines::datamatrix::DataMatrixDecoder;
use crate::engines::qr::QrDecoder;
use crate::engines::{self, LazyTextEngine};
use crate::error::RecognizeError;
use crate::preprocessing::Pipeline;
use crate::symbol::{Rotation, SymbolType};
use image::DynamicImage;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Per-call options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognizeOptions {
    /// Counter-clockwise correction in degrees, CharacterString only
    pub rotation: u32,
    /// Crop to the most likely code region before decoding (DM/QR only)
    pub capture_roi: bool,
    /// Persist the image when nothing was recognized
    pub save_on_failure: bool,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            rotation: 0,
            capture_roi: true,
            save_on_failure: false,
        }
    }
}

impl RecognizeOptions {
    pub fn rotation(mut self, degrees: u32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn capture_roi(mut self, enabled: bool) -> Self {
        self.capture_roi = enabled;
        self
    }

    pub fn save_on_failure(mut self, enabled: bool) -> Self {
        self.save_on_failure = enabled;
        self
    }
}

/// Recognizes Data Matrix codes, QR codes and short alphanumeric strings
pub struct CodeRecognizer {
    config: RecognizerConfig,
    datamatrix: Arc<dyn CodeDecoder>,
    qr: Arc<dyn CodeDecoder>,
    text: LazyTextEngine,
    failure_log: FailureLog,
}

impl CodeRecognizer {
    /// Build with the default collaborators
    ///
    /// The text engine is not loaded until the first CharacterString call or
    /// an explicit [`CodeRecognizer::warm_up`].
    pub fn new(config: RecognizerConfig) -> Self {
        let engine_config = config.clone();
        let text = LazyTextEngine::new(move || engines::create_text_engine(&engine_config));
        Self {
            datamatrix: Arc::new(DataMatrixDecoder::new(config.datamatrix_timeout)),
            qr: Arc::new(QrDecoder::new()),
            text,
            failure_log: FailureLog::new(config.log_dir.clone()),
            config,
        }
    }

    /// Build with caller-supplied collaborators
    pub fn with_collaborators(
        config: RecognizerConfig,
        datamatrix: Arc<dyn CodeDecoder>,
        qr: Arc<dyn CodeDecoder>,
        text: Arc<dyn TextEngine>,
    ) -> Self {
        Self {
            datamatrix,
            qr,
            text: LazyTextEngine::ready(text),
            failure_log: FailureLog::new(config.log_dir.clone()),
            config,
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Construct the text engine now instead of on first use
    pub fn warm_up(&self) -> Result<(), RecognizeError> {
        let start = Instant::now();
        let engine = self.text.get()?;
        tracing::info!(
            "Text engine '{}' warmed up in {}ms",
            engine.name(),
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Recognize codes or text in `image`
    ///
    /// Returns the decoded strings in decoder order; an empty vector means
    /// nothing was found. Only caller contract violations (an invalid rotation
    /// on the CharacterString path) are returned as errors.
    pub fn recognize(
        &self,
        image: &DynamicImage,
        symbol: SymbolType,
        options: &RecognizeOptions,
    ) -> Result<Vec<String>, RecognizeError> {
        let start = Instant::now();

        let (result, processed) = match symbol {
            SymbolType::DataMatrix => {
                self.recognize_code(image, self.datamatrix.as_ref(), options.capture_roi)
            }
            SymbolType::Qr => self.recognize_code(image, self.qr.as_ref(), options.capture_roi),
            SymbolType::CharacterString => {
                let rotation = Rotation::try_from(options.rotation)?;
                self.recognize_text(image, rotation)
            }
        };

        tracing::info!(
            "{} recognition finished in {}ms with {} result(s)",
            symbol,
            start.elapsed().as_millis(),
            result.len()
        );

        if result.is_empty() && options.save_on_failure {
            match self.failure_log.save(&processed) {
                Ok(path) => tracing::info!("Saved failed image to {:?}", path),
                Err(e) => tracing::warn!("{}", e),
            }
        }

        Ok(result)
    }

    fn recognize_code(
        &self,
        image: &DynamicImage,
        decoder: &dyn CodeDecoder,
        capture_roi: bool,
    ) -> (Vec<String>, DynamicImage) {
        let mut pipeline = Pipeline::new(self.config.target_dimension);
        if capture_roi {
            pipeline = pipeline.with_roi(self.config.roi_merge_radius, self.config.quiet_zone);
        }

        let preprocessed = match pipeline.process(image) {
            Ok(preprocessed) => preprocessed,
            Err(e) => {
                tracing::debug!("Preprocessing found nothing to decode: {}", e);
                return (Vec::new(), image.clone());
            }
        };

        tracing::debug!(
            "Preprocessing took {}ms: {:?}",
            preprocessed.total_time_ms,
            preprocessed.steps
        );

        let binary = preprocessed.image;
        let result = call_collaborator(decoder.name(), || decoder.decode(&binary));
        (result, DynamicImage::ImageLuma8(binary))
    }

    fn recognize_text(
        &self,
        image: &DynamicImage,
        rotation: Rotation,
    ) -> (Vec<String>, DynamicImage) {
        let rotated = rotation.apply(image);

        let engine = match self.text.get() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!("Text engine unavailable: {}", e);
                return (Vec::new(), rotated);
            }
        };

        let result = call_collaborator(engine.name(), || engine.recognize(&rotated));
        (result, rotated)
    }
}

/// Run a decoder, folding its errors and panics into an empty result
fn call_collaborator<F>(name: &str, f: F) -> Vec<String>
where
    F: FnOnce() -> Result<Vec<String>, RecognizeError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::warn!("{} failed: {}", name, e);
            Vec::new()
        }
        Err(_) => {
            tracing::warn!("{} panicked", name);
            Vec::new()
        }
    }
}
