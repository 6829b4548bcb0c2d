//! QR decoder backed by rqrr

use crate::engine::CodeDecoder;
use crate::error::RecognizeError;
use image::GrayImage;
use rqrr::PreparedImage;

#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl CodeDecoder for QrDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn decode(&self, binary: &GrayImage) -> Result<Vec<String>, RecognizeError> {
        let (width, height) = binary.dimensions();
        let mut prepared =
            PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                binary.get_pixel(x as u32, y as u32).0[0]
            });

        let grids = prepared.detect_grids();
        tracing::debug!("rqrr found {} candidate grids", grids.len());

        let mut payloads = Vec::with_capacity(grids.len());
        for (i, grid) in grids.iter().enumerate() {
            match grid.decode() {
                Ok((_, content)) => payloads.push(content),
                Err(e) => tracing::debug!("Grid {} failed to decode: {}", i, e),
            }
        }

        Ok(payloads)
    }
}
