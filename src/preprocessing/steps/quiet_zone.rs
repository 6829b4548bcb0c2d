use image::{imageops, GrayImage, Luma};

/// Frame a tight crop with a white margin
/// Matrix code finders need light space around the symbol
pub fn apply(image: &GrayImage, margin: u32) -> GrayImage {
    if margin == 0 {
        return image.clone();
    }

    let mut padded = GrayImage::from_pixel(
        image.width() + 2 * margin,
        image.height() + 2 * margin,
        Luma([255u8]),
    );
    imageops::replace(&mut padded, image, margin as i64, margin as i64);
    padded
}
