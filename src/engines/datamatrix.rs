//! Data Matrix decoder backed by rxing
//!
//! rxing has no cancellation hook, so each decode runs on a helper thread and
//! the caller stops waiting once the configured timeout elapses.

use crate::engine::CodeDecoder;
use crate::error::RecognizeError;
use image::GrayImage;
use rxing::{BarcodeFormat, DecodeHintType, DecodeHintValue, DecodingHintDictionary, Exceptions};
use std::collections::HashSet;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Bounded Data Matrix decode; a timed-out helper thread keeps running until rxing returns
pub struct DataMatrixDecoder {
    timeout: Duration,
}

impl DataMatrixDecoder {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CodeDecoder for DataMatrixDecoder {
    fn name(&self) -> &'static str {
        "rxing-datamatrix"
    }

    fn decode(&self, binary: &GrayImage) -> Result<Vec<String>, RecognizeError> {
        let (width, height) = binary.dimensions();
        let luma = binary.as_raw().clone();
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("datamatrix-decode".to_string())
            .spawn(move || {
                // Receiver is gone after a timeout; nothing left to report to
                let _ = tx.send(decode_luma(luma, width, height));
            })
            .map_err(|e| {
                RecognizeError::DecodeError(format!("Failed to spawn decode thread: {}", e))
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(RecognizeError::DecodeError(format!(
                "Data Matrix decode timed out after {}ms",
                self.timeout.as_millis()
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(RecognizeError::DecodeError(
                "Data Matrix decode thread terminated without a result".to_string(),
            )),
        }
    }
}

fn decode_luma(luma: Vec<u8>, width: u32, height: u32) -> Result<Vec<String>, RecognizeError> {
    // Skip the readers for every other format
    let mut hints = DecodingHintDictionary::new();
    hints.insert(
        DecodeHintType::POSSIBLE_FORMATS,
        DecodeHintValue::PossibleFormats(HashSet::from([BarcodeFormat::DATA_MATRIX])),
    );

    match rxing::helpers::detect_multiple_in_luma_with_hints(luma, width, height, &mut hints) {
        Ok(results) => Ok(results
            .iter()
            .filter(|r| *r.getBarcodeFormat() == BarcodeFormat::DATA_MATRIX)
            .map(|r| r.getText().to_string())
            .collect()),
        Err(Exceptions::NotFoundException(_)) => Ok(Vec::new()),
        Err(e) => Err(RecognizeError::DecodeError(format!(
            "Data Matrix decode failed: {}",
            e
        ))),
    }
}
