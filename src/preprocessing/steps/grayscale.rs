use image::{DynamicImage, GrayImage};

/// Convert image to single-channel luma
/// Code decoders and the threshold step only work on intensity
pub fn apply(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    }
}
