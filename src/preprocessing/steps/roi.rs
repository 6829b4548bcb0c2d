use crate::error::RecognizeError;
use image::{imageops, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;
use serde::Serialize;

/// Axis-aligned region of interest, in pixels of the binary image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crop a binary image to the region most likely to hold the code
///
/// Dark pixels are treated as ink. Ink within `merge_radius` of each other is
/// joined first so that the separate modules of a code form one region.
pub fn apply(binary: &GrayImage, merge_radius: u8) -> Result<(GrayImage, Roi), RecognizeError> {
    let roi = find_roi_merged(binary, merge_radius)?;
    Ok((crop(binary, roi), roi))
}

/// Bounding box of the largest-area external contour of the ink regions
pub fn find_roi(binary: &GrayImage) -> Result<Roi, RecognizeError> {
    find_roi_merged(binary, 0)
}

fn find_roi_merged(binary: &GrayImage, merge_radius: u8) -> Result<Roi, RecognizeError> {
    let mut mask = ink_mask(binary);
    if merge_radius > 0 {
        mask = close(&mask, Norm::LInf, merge_radius);
    }

    let contours = find_contours::<u32>(&mask);
    let largest = largest_external(&contours).ok_or(RecognizeError::NoRegionFound)?;
    let roi = bounding_box(largest);

    tracing::debug!(
        "ROI at ({}, {}) size {}x{} from {} contours",
        roi.x,
        roi.y,
        roi.width,
        roi.height,
        contours.len()
    );

    Ok(roi)
}

pub fn crop(binary: &GrayImage, roi: Roi) -> GrayImage {
    imageops::crop_imm(binary, roi.x, roi.y, roi.width, roi.height).to_image()
}

/// Foreground mask where black (ink) pixels become 255
fn ink_mask(binary: &GrayImage) -> GrayImage {
    GrayImage::from_fn(binary.width(), binary.height(), |x, y| {
        if binary.get_pixel(x, y).0[0] == 0 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Outer borders that are not nested inside another region.
/// The first contour wins on equal area.
fn largest_external(contours: &[Contour<u32>]) -> Option<&Contour<u32>> {
    let mut best: Option<(&Contour<u32>, f64)> = None;

    for contour in contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
    {
        let area = contour_area(contour);
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((contour, area)),
        }
    }

    best.map(|(contour, _)| contour)
}

/// Enclosed area of the contour polygon (shoelace formula)
fn contour_area(contour: &Contour<u32>) -> f64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0f64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    twice_area.abs() / 2.0
}

fn bounding_box(contour: &Contour<u32>) -> Roi {
    let min_x = contour.points.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = contour.points.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = contour.points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = contour.points.iter().map(|p| p.y).max().unwrap_or(0);

    Roi {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    }
}
