//! Image preprocessing for matrix code decoding
//!
//! Normalizes an input image into a binarized, optionally cropped, grid that
//! the Data Matrix and QR decoders consume.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, PreprocessingResult, StepTiming};
pub use steps::roi::{find_roi, Roi};
