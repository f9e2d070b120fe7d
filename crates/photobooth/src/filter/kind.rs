//! The closed set of filter presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matrix::ColorMatrix;

/// A named pixel transform selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    /// Leave the frame untouched.
    #[default]
    None,
    /// Average of R, G and B on every colour channel.
    Grayscale,
    /// Classic sepia tone matrix.
    Sepia,
    /// Negative of R, G and B.
    Invert,
    /// Red/green collapse that keeps blue as-is.
    HueRotate,
    /// Contrast stretch around mid-grey with factor 2.5.
    Contrast,
    /// Saturation boost away from luma grey.
    Saturate,
    /// 3×3 box blur over interior pixels.
    Blur,
    /// Warmer reds and greens, slightly transparent.
    Warm,
    /// Cooler tones with boosted blue.
    Cool,
    /// Sepia with reduced alpha.
    Vintage,
    /// Hard threshold to pure black or white.
    #[serde(rename = "blackwhite")]
    BlackWhite,
    /// Three-strip cross-mixed colour.
    Technicolor,
    /// Instant-film cross mix with reduced alpha.
    Polaroid,
    /// Punchy reds with lifted blues.
    Kodachrome,
    /// Brown cast with reduced alpha.
    Brownie,
    /// Overexposed low-fidelity look.
    Lofi,
    /// Strong red/orange push.
    Sunset,
    /// Blue-tinted monochrome.
    Night,
    /// Heavy channel cross mix.
    Rainbow,
}

/// Error returned when parsing an unknown filter name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter '{0}'")]
pub struct UnknownFilter(pub String);

impl FilterKind {
    /// Every filter, in the order the picker shows them.
    pub const ALL: [Self; 20] = [
        Self::None,
        Self::Grayscale,
        Self::Sepia,
        Self::Invert,
        Self::HueRotate,
        Self::Contrast,
        Self::Saturate,
        Self::Blur,
        Self::Warm,
        Self::Cool,
        Self::Vintage,
        Self::BlackWhite,
        Self::Technicolor,
        Self::Polaroid,
        Self::Kodachrome,
        Self::Brownie,
        Self::Lofi,
        Self::Sunset,
        Self::Night,
        Self::Rainbow,
    ];

    /// The wire name (`hue-rotate`, `blackwhite`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
            Self::HueRotate => "hue-rotate",
            Self::Contrast => "contrast",
            Self::Saturate => "saturate",
            Self::Blur => "blur",
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Vintage => "vintage",
            Self::BlackWhite => "blackwhite",
            Self::Technicolor => "technicolor",
            Self::Polaroid => "polaroid",
            Self::Kodachrome => "kodachrome",
            Self::Brownie => "brownie",
            Self::Lofi => "lofi",
            Self::Sunset => "sunset",
            Self::Night => "night",
            Self::Rainbow => "rainbow",
        }
    }

    /// Human-readable label for listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Normal",
            Self::Grayscale => "Grayscale",
            Self::Sepia => "Sepia",
            Self::Invert => "Invert",
            Self::HueRotate => "Hue Rotate",
            Self::Contrast => "Contrast",
            Self::Saturate => "Saturate",
            Self::Blur => "Blur",
            Self::Warm => "Warm",
            Self::Cool => "Cool",
            Self::Vintage => "Vintage",
            Self::BlackWhite => "Black & White",
            Self::Technicolor => "Technicolor",
            Self::Polaroid => "Polaroid",
            Self::Kodachrome => "Kodachrome",
            Self::Brownie => "Brownie",
            Self::Lofi => "Lo-Fi",
            Self::Sunset => "Sunset",
            Self::Night => "Night",
            Self::Rainbow => "Rainbow",
        }
    }

    /// Whether output depends on neighbouring pixels.
    #[must_use]
    pub const fn is_spatial(self) -> bool {
        matches!(self, Self::Blur)
    }

    /// The colour matrix for affine presets, `None` for the rest.
    #[must_use]
    pub fn color_matrix(self) -> Option<ColorMatrix> {
        let matrix = match self {
            Self::None | Self::Blur | Self::BlackWhite => return None,
            Self::Grayscale => ColorMatrix::grayscale(),
            Self::Sepia => ColorMatrix::sepia(),
            Self::Invert => ColorMatrix::invert(),
            Self::HueRotate => ColorMatrix::hue_rotate(),
            Self::Contrast => ColorMatrix::contrast(2.5),
            Self::Saturate => ColorMatrix::saturate(),
            Self::Warm => ColorMatrix::scale(1.2, 1.1, 1.0, 0.9),
            Self::Cool => ColorMatrix::scale(0.9, 0.9, 1.2, 1.0),
            Self::Vintage => ColorMatrix::sepia().with_alpha(0.8),
            Self::Technicolor => ColorMatrix::technicolor(),
            Self::Polaroid => ColorMatrix::polaroid(),
            Self::Kodachrome => ColorMatrix::kodachrome(),
            Self::Brownie => ColorMatrix::scale(0.9, 0.7, 0.6, 0.9),
            Self::Lofi => ColorMatrix::scale(1.3, 1.3, 1.1, 1.1),
            Self::Sunset => ColorMatrix::scale(1.8, 1.4, 0.6, 1.0),
            Self::Night => ColorMatrix::night(),
            Self::Rainbow => ColorMatrix::rainbow(),
        };
        Some(matrix)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}
