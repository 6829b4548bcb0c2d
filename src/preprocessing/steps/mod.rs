//! Individual preprocessing steps

pub mod grayscale;
pub mod quiet_zone;
pub mod resize;
pub mod roi;
pub mod threshold;
