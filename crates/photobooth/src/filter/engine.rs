//! Filter dispatch and the non-affine filters.

use tracing::trace;

use super::kind::FilterKind;
use crate::buffer::{PixelBuffer, CHANNELS};

/// Channel-sum threshold for `blackwhite`: average above 128.
const BLACK_WHITE_SUM_THRESHOLD: u32 = 128 * 3;

/// Apply `kind` to `buffer` in place.
///
/// `FilterKind::None` leaves the buffer untouched.
pub fn apply_filter(buffer: &mut PixelBuffer, kind: FilterKind) {
    trace!(
        filter = %kind,
        width = buffer.width(),
        height = buffer.height(),
        "Applying filter"
    );

    match kind {
        FilterKind::None => {}
        FilterKind::Blur => box_blur(buffer),
        FilterKind::BlackWhite => threshold(buffer),
        other => {
            if let Some(matrix) = other.color_matrix() {
                matrix.apply(buffer);
            }
        }
    }
}

fn threshold(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let sum = u32::from(px[0]) + u32::from(px[1]) + u32::from(px[2]);
        let value = if sum > BLACK_WHITE_SUM_THRESHOLD { 255 } else { 0 };
        px[..3].fill(value);
    }
}

/// 3×3 box mean of R, G, B over interior pixels, read from a snapshot.
fn box_blur(buffer: &mut PixelBuffer) {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    if width < 3 || height < 3 {
        return;
    }

    let source = buffer.as_bytes().to_vec();
    let stride = width * CHANNELS;
    let data = buffer.as_bytes_mut();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sums = [0u32; 3];
            for ny in y - 1..=y + 1 {
                let row = ny * stride;
                for nx in x - 1..=x + 1 {
                    let i = row + nx * CHANNELS;
                    for (sum, sample) in sums.iter_mut().zip(&source[i..i + 3]) {
                        *sum += u32::from(*sample);
                    }
                }
            }

            let out = y * stride + x * CHANNELS;
            for (dst, sum) in data[out..out + 3].iter_mut().zip(sums) {
                *dst = mean_of_nine(sum);
            }
        }
    }
}

/// Rounded mean of nine samples. A ninth can never land on `.5`.
#[allow(clippy::cast_possible_truncation)]
fn mean_of_nine(sum: u32) -> u8 {
    ((sum + 4) / 9) as u8
}
