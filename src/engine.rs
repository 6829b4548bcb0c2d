use crate::error::RecognizeError;
use image::{DynamicImage, GrayImage};

/// Trait that all matrix code decoders must implement
pub trait CodeDecoder: Send + Sync {
    /// Returns the decoder identifier (e.g., "rxing-datamatrix", "rqrr")
    fn name(&self) -> &'static str;

    /// Decode every code found in a binarized image, in the order the
    /// underlying library reports them. An empty vector means no code.
    fn decode(&self, binary: &GrayImage) -> Result<Vec<String>, RecognizeError>;
}

/// Trait that all text recognition engines must implement
pub trait TextEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize alphanumeric text fragments, one per detected line
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>, RecognizeError>;
}

/// Keep only characters an alphanumeric recognition model can produce
pub fn alphanumeric_only(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
