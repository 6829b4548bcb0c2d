//! Symbol type and rotation tags accepted by the recognizer

use crate::error::RecognizeError;
use image::DynamicImage;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Kind of content to recognize; selects the decoder and preprocessing path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolType {
    #[serde(rename = "DM")]
    DataMatrix,
    #[serde(rename = "QR")]
    Qr,
    #[serde(rename = "CHAR")]
    CharacterString,
}

impl SymbolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataMatrix => "DM",
            Self::Qr => "QR",
            Self::CharacterString => "CHAR",
        }
    }

    /// Whether this type goes through the binarize + ROI path
    pub fn is_matrix_code(&self) -> bool {
        match self {
            Self::DataMatrix | Self::Qr => true,
            Self::CharacterString => false,
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolType {
    type Err = RecognizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dm" | "datamatrix" | "data-matrix" => Ok(Self::DataMatrix),
            "qr" => Ok(Self::Qr),
            "char" | "text" | "characters" => Ok(Self::CharacterString),
            other => Err(RecognizeError::InvalidArgument(format!(
                "unknown symbol type '{}' (expected DM, QR or CHAR)",
                other
            ))),
        }
    }
}

/// Counter-clockwise angle needed to bring characters upright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Apply the correction to an image
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        match self {
            Self::Deg0 => image.clone(),
            Self::Deg90 => image.rotate270(),
            Self::Deg180 => image.rotate180(),
            Self::Deg270 => image.rotate90(),
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = RecognizeError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(RecognizeError::InvalidArgument(format!(
                "rotation must be 0/90/180/270, got {}",
                other
            ))),
        }
    }
}
