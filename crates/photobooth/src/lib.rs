//! `photobooth` - Camera capture with pixel filters, snapshots and clip recording
//!
//! This library provides a pixel filter engine over RGBA frame buffers, a
//! capture session that manages one camera stream and drives photo capture
//! and chunked video recording, and export of the results as named artifacts.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod capture;
pub mod cli;
pub mod config;
pub mod device;
pub mod encoder;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod session;
pub mod timer;

pub use buffer::PixelBuffer;
pub use capture::capture_frame;
pub use config::Config;
pub use device::{DeviceProvider, FacingMode, MediaStream, StreamConstraints};
pub use encoder::{Encoder, EncoderError};
pub use error::{Error, Result};
pub use export::{ArtifactKind, ArtifactSink, DirectorySink, ExportedArtifact, RecordedArtifact};
pub use filter::{apply_filter, FilterKind};
pub use logging::init_logging;
pub use session::{CaptureSession, SessionState};
