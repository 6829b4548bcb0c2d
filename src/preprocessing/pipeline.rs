use crate::error::RecognizeError;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;
use super::steps::roi::Roi;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Binarized (and possibly cropped) image (not serialized)
    #[serde(skip)]
    pub image: GrayImage,
    /// Region selected by ROI capture, if it ran
    pub roi: Option<Roi>,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline for Data Matrix and QR images
///
/// Steps: grayscale, resize, threshold, then ROI capture and quiet-zone
/// padding when enabled.
pub struct Pipeline {
    target_dimension: u32,
    roi: Option<RoiCapture>,
}

#[derive(Debug, Clone, Copy)]
struct RoiCapture {
    merge_radius: u8,
    quiet_zone: u32,
}

impl Pipeline {
    pub fn new(target_dimension: u32) -> Self {
        Self {
            target_dimension,
            roi: None,
        }
    }

    /// Enable ROI capture; the crop is framed by `quiet_zone` white pixels
    pub fn with_roi(mut self, merge_radius: u8, quiet_zone: u32) -> Self {
        self.roi = Some(RoiCapture {
            merge_radius,
            quiet_zone,
        });
        self
    }

    /// Run all configured steps
    ///
    /// Fails with [`RecognizeError::NoRegionFound`] when ROI capture is enabled
    /// and the binarized image contains no ink.
    pub fn process(&self, image: &DynamicImage) -> Result<PreprocessingResult, RecognizeError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let gray = self.run_step("grayscale", &mut steps_timing, || {
            Ok(steps::grayscale::apply(image))
        })?;

        let target = self.target_dimension;
        let resized = self.run_step("resize", &mut steps_timing, || {
            Ok(steps::resize::apply(gray, target))
        })?;

        let mut binary = self.run_step("threshold", &mut steps_timing, || {
            Ok(steps::threshold::apply(&resized))
        })?;

        let mut roi = None;
        if let Some(capture) = self.roi {
            let (cropped, region) = self.run_step("roi", &mut steps_timing, || {
                steps::roi::apply(&binary, capture.merge_radius)
            })?;
            binary = self.run_step("quiet_zone", &mut steps_timing, || {
                Ok(steps::quiet_zone::apply(&cropped, capture.quiet_zone))
            })?;
            roi = Some(region);
        }

        Ok(PreprocessingResult {
            image: binary,
            roi,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        })
    }

    fn run_step<T, F>(
        &self,
        name: &str,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<T, RecognizeError>
    where
        F: FnOnce() -> Result<T, RecognizeError>,
    {
        let step_start = Instant::now();
        let result = step_fn()?;
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}
