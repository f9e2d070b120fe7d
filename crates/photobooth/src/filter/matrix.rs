//! Affine colour matrices for the per-pixel presets.
//!
//! Rows produce R, G, B, A; columns weight the input R, G, B, A and the last
//! column is a constant offset in 0..=255 units.
//!
//! Presets defined on the channel average (`grayscale`, `night`) feed
//! `(r + g + b) / 3` into the colour columns instead of folding the gain into
//! each weight, so exact `.5` results stay exact and round like the rest.

use crate::buffer::PixelBuffer;

/// One output row: weights for R, G, B, A plus an offset.
pub type Row = [f64; 5];

const KEEP_R: Row = [1.0, 0.0, 0.0, 0.0, 0.0];
const KEEP_G: Row = [0.0, 1.0, 0.0, 0.0, 0.0];
const KEEP_B: Row = [0.0, 0.0, 1.0, 0.0, 0.0];
const KEEP_A: Row = [0.0, 0.0, 0.0, 1.0, 0.0];

/// Sepia tone weights, shared by `sepia` and `vintage`.
const SEPIA: [Row; 3] = [
    [0.393, 0.769, 0.189, 0.0, 0.0],
    [0.349, 0.686, 0.168, 0.0, 0.0],
    [0.272, 0.534, 0.131, 0.0, 0.0],
];

/// A 4×5 affine colour transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    rows: [Row; 4],
    average_input: bool,
}

impl ColorMatrix {
    /// Build a matrix from its R, G, B, A rows.
    #[must_use]
    pub const fn new(rows: [Row; 4]) -> Self {
        Self {
            rows,
            average_input: false,
        }
    }

    /// The identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new([KEEP_R, KEEP_G, KEEP_B, KEEP_A])
    }

    /// Per-channel gains with no cross-mixing.
    #[must_use]
    pub const fn scale(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::new([
            [r, 0.0, 0.0, 0.0, 0.0],
            [0.0, g, 0.0, 0.0, 0.0],
            [0.0, 0.0, b, 0.0, 0.0],
            [0.0, 0.0, 0.0, a, 0.0],
        ])
    }

    /// Replace the alpha row with a plain gain.
    #[must_use]
    pub const fn with_alpha(mut self, gain: f64) -> Self {
        self.rows[3] = [0.0, 0.0, 0.0, gain, 0.0];
        self
    }

    /// Read R, G and B as their average before applying the rows.
    #[must_use]
    pub const fn on_channel_average(mut self) -> Self {
        self.average_input = true;
        self
    }

    /// Whether R, G and B are averaged before the rows apply.
    #[must_use]
    pub const fn averages_input(&self) -> bool {
        self.average_input
    }

    /// Rows of this matrix.
    #[must_use]
    pub const fn rows(&self) -> &[Row; 4] {
        &self.rows
    }

    /// `r = g = b = (r + g + b) / 3`.
    #[must_use]
    pub const fn grayscale() -> Self {
        Self::identity().on_channel_average()
    }

    /// Classic sepia.
    #[must_use]
    pub const fn sepia() -> Self {
        Self::new([SEPIA[0], SEPIA[1], SEPIA[2], KEEP_A])
    }

    /// `255 - channel` on R, G, B.
    #[must_use]
    pub const fn invert() -> Self {
        Self::new([
            [-1.0, 0.0, 0.0, 0.0, 255.0],
            [0.0, -1.0, 0.0, 0.0, 255.0],
            [0.0, 0.0, -1.0, 0.0, 255.0],
            KEEP_A,
        ])
    }

    /// `r = g = .293r + .707g`, blue unchanged.
    ///
    /// Not a true hue rotation: blue never feeds red or green.
    #[must_use]
    pub const fn hue_rotate() -> Self {
        let mix = [0.293, 0.707, 0.0, 0.0, 0.0];
        Self::new([mix, mix, KEEP_B, KEEP_A])
    }

    /// `channel * factor + 128 * (1 - factor)` on R, G, B.
    #[must_use]
    pub fn contrast(factor: f64) -> Self {
        let intercept = 128.0 * (1.0 - factor);
        Self::new([
            [factor, 0.0, 0.0, 0.0, intercept],
            [0.0, factor, 0.0, 0.0, intercept],
            [0.0, 0.0, factor, 0.0, intercept],
            KEEP_A,
        ])
    }

    /// `channel = 1.8373 * channel - 0.8373 * luma`, luma from Rec. 601 weights.
    #[must_use]
    pub fn saturate() -> Self {
        const LUMA: [f64; 3] = [0.2989, 0.5870, 0.1140];
        const GAIN: f64 = 1.8373;
        const PULL: f64 = -0.8373;

        let row = |channel: usize| {
            let mut row = [0.0; 5];
            for (i, weight) in LUMA.iter().enumerate() {
                row[i] = PULL * weight;
            }
            row[channel] += GAIN;
            row
        };
        Self::new([row(0), row(1), row(2), KEEP_A])
    }

    /// Technicolor cross mix.
    #[must_use]
    pub const fn technicolor() -> Self {
        Self::new([
            [1.2, 0.1, 0.1, 0.0, 0.0],
            [0.1, 1.2, 0.1, 0.0, 0.0],
            [0.1, 0.1, 1.2, 0.0, 0.0],
            KEEP_A,
        ])
    }

    /// Polaroid cross mix with alpha at 90%.
    #[must_use]
    pub const fn polaroid() -> Self {
        Self::new([
            [1.08, 0.2, 0.1, 0.0, 0.0],
            [0.1, 1.08, 0.2, 0.0, 0.0],
            [0.1, 0.2, 1.08, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.9, 0.0],
        ])
    }

    /// Kodachrome per-channel gains and offsets.
    #[must_use]
    pub const fn kodachrome() -> Self {
        Self::new([
            [1.25, 0.0, 0.0, 0.0, -20.0],
            [0.0, 1.03, 0.0, 0.0, -10.0],
            [0.0, 0.0, 0.9, 0.0, 5.0],
            KEEP_A,
        ])
    }

    /// Channel average tinted blue, alpha at 90%.
    #[must_use]
    pub const fn night() -> Self {
        Self::scale(0.8, 0.5, 1.2, 0.9).on_channel_average()
    }

    /// Rainbow cross mix.
    #[must_use]
    pub const fn rainbow() -> Self {
        Self::new([
            [1.5, 0.5, 0.1, 0.0, 0.0],
            [0.1, 1.5, 0.5, 0.0, 0.0],
            [0.5, 0.1, 1.5, 0.0, 0.0],
            KEEP_A,
        ])
    }

    /// Transform one pixel.
    #[must_use]
    pub fn transform(&self, px: [u8; 4]) -> [u8; 4] {
        let mut input = px.map(f64::from);
        if self.average_input {
            let avg = (input[0] + input[1] + input[2]) / 3.0;
            input[..3].fill(avg);
        }
        self.rows.map(|row| {
            let value = row[0] * input[0]
                + row[1] * input[1]
                + row[2] * input[2]
                + row[3] * input[3]
                + row[4];
            quantize(value)
        })
    }

    /// Transform every pixel of `buffer` in place.
    pub fn apply(&self, buffer: &mut PixelBuffer) {
        for px in buffer.pixels_mut() {
            let out = self.transform([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Round to nearest (ties to even) and clamp into a channel sample.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn quantize(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}
