//! Color space helpers shared by the aggregator and the classifiers.
//!
//! Representative colors travel through the crate as `Srgb<f32>` with channels
//! in `[0, 1]`. Perceptual coordinates are scaled so that lightness spans
//! `[0, 1]` instead of `[0, 100]`, which keeps distance thresholds in the
//! `0.0x` range used by the reference tables.

use palette::color_difference::EuclideanDistance;
use palette::{FromColor, Hsv, IntoColor, Lab, LinSrgb, Luv, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Divisor applied to perceptual distances so lightness is unit-scaled.
const PERCEPTUAL_SCALE: f32 = 100.0;

/// Perceptual space used by the distance classifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerceptualSpace {
    #[default]
    Luv,
    Lab,
}

/// A color expressed in one of the supported perceptual spaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PerceptualColor {
    Luv(Luv),
    Lab(Lab),
}

impl PerceptualSpace {
    pub fn convert(self, color: Srgb<f32>) -> PerceptualColor {
        let linear: LinSrgb = color.into_linear();
        match self {
            PerceptualSpace::Luv => PerceptualColor::Luv(linear.into_color()),
            PerceptualSpace::Lab => PerceptualColor::Lab(linear.into_color()),
        }
    }

    /// Unit-scaled distance between two sRGB colors in this space.
    pub fn distance(self, a: Srgb<f32>, b: Srgb<f32>) -> f32 {
        self.convert(a).distance(self.convert(b))
    }
}

impl PerceptualColor {
    /// Euclidean distance with lightness scaled to `[0, 1]`.
    ///
    /// Operands in different spaces are compared in the space of `self`.
    pub fn distance(self, other: PerceptualColor) -> f32 {
        let raw = match (self, other) {
            (PerceptualColor::Luv(a), PerceptualColor::Luv(b)) => a.distance(b),
            (PerceptualColor::Lab(a), PerceptualColor::Lab(b)) => a.distance(b),
            (PerceptualColor::Luv(a), PerceptualColor::Lab(b)) => a.distance(Luv::from_color(b)),
            (PerceptualColor::Lab(a), PerceptualColor::Luv(b)) => a.distance(Lab::from_color(b)),
        };
        raw / PERCEPTUAL_SCALE
    }
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
pub fn to_hsv(color: Srgb<f32>) -> Hsv {
    Hsv::from_color(color)
}

/// `#RRGGBB`, uppercase.
pub fn to_hex(color: Srgb<f32>) -> String {
    let c: Srgb<u8> = color.into_format();
    format!("#{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
}

/// Parse `RRGGBB` or `#RRGGBB`.
pub fn parse_hex(s: &str) -> Result<Srgb<u8>, ColorError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ColorError::InvalidLength(s.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| ColorError::InvalidHex(s.to_string()))
    };
    Ok(Srgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
