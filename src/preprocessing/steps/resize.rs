use image::{imageops, imageops::FilterType, GrayImage};

/// Rescale so the larger dimension becomes `target`
/// Both dimensions share one factor (max(width, height) / target) so the
/// aspect ratio is preserved. Small images are scaled up the same way.
pub fn apply(image: GrayImage, target: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, target);

    if (new_width, new_height) == (width, height) {
        return image;
    }

    imageops::resize(&image, new_width, new_height, FilterType::Triangle)
}

/// Dimensions after dividing both sides by max(width, height) / target
pub fn scaled_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    let max_dim = width.max(height);
    if max_dim == 0 || target == 0 {
        return (width, height);
    }

    let factor = max_dim as f64 / target as f64;
    let new_width = ((width as f64 / factor).round() as u32).max(1);
    let new_height = ((height as f64 / factor).round() as u32).max(1);
    (new_width, new_height)
}
