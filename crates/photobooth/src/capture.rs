//! Frame capture.
//!
//! A captured frame is the source frame as the user sees it in the preview:
//! mirrored horizontally for the user-facing camera, then filtered.

use tracing::trace;

use crate::buffer::PixelBuffer;
use crate::device::FacingMode;
use crate::filter::{apply_filter, FilterKind};

/// Produce a filtered, possibly mirrored copy of `source`.
///
/// The copy has the source's dimensions. The source is left untouched.
#[must_use]
pub fn capture_frame(source: &PixelBuffer, facing: FacingMode, filter: FilterKind) -> PixelBuffer {
    let mut frame = if facing.is_mirrored() {
        source.mirrored()
    } else {
        source.clone()
    };

    apply_filter(&mut frame, filter);

    trace!(
        width = frame.width(),
        height = frame.height(),
        facing = %facing,
        filter = %filter,
        "Frame captured"
    );
    frame
}
