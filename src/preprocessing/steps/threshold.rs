use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;

/// Binarize with a global Otsu threshold
/// Pixels above the level become white (255), the rest black (0)
pub fn apply(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    tracing::debug!("Otsu threshold level: {}", level);
    binarize(image, level)
}

fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y).0[0] > level {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
