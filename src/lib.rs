//! Data Matrix, QR and short alphanumeric string recognition
//!
//! [`CodeRecognizer`] normalizes an image, optionally crops it to the most
//! likely code region, and hands it to the matching decoder:
//!
//! - Data Matrix: rxing, bounded by a timeout
//! - QR: rqrr
//! - character strings: an OCR engine (ocrs or Tesseract) limited to
//!   digits and Latin letters
//!
//! Misses are empty results. When requested, the image that produced no
//! result is written under a timestamped directory for diagnosis.

pub mod artifact;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod preprocessing;
pub mod recognizer;
pub mod symbol;

pub use artifact::FailureLog;
pub use config::RecognizerConfig;
pub use engine::{CodeDecoder, TextEngine};
pub use error::RecognizeError;
pub use preprocessing::{find_roi, Roi};
pub use recognizer::{CodeRecognizer, RecognizeOptions};
pub use symbol::{Rotation, SymbolType};
