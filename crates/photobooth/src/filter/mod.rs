//! Pixel filters for captured frames.
//!
//! This module is the filter engine: pure transforms over a [`PixelBuffer`]
//! with no I/O.
//!
//! - **Colour matrices**: most presets are affine recombinations of a pixel's
//!   own R, G, B, A and are expressed as a 4×5 [`ColorMatrix`].
//!
//! - **Spatial filters**: `blur` reads a 3×3 neighbourhood from a snapshot of
//!   the original buffer.
//!
//! - **Threshold**: `blackwhite` maps the channel average to pure black or white.
//!
//! Every output sample is rounded to nearest and clamped to `0..=255`.
//!
//! # Example
//!
//! ```
//! use photobooth::buffer::PixelBuffer;
//! use photobooth::filter::{apply_filter, FilterKind};
//!
//! let mut frame = PixelBuffer::filled(4, 4, [200, 100, 50, 255]);
//! apply_filter(&mut frame, FilterKind::Grayscale);
//! assert_eq!(frame.pixel(0, 0), Some([117, 117, 117, 255]));
//! ```
//!
//! [`PixelBuffer`]: crate::buffer::PixelBuffer

mod engine;
mod kind;
mod matrix;

pub use engine::apply_filter;
pub use kind::{FilterKind, UnknownFilter};
pub use matrix::ColorMatrix;
