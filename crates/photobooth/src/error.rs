//! Error types for photobooth.
//!
//! This module defines all error types used throughout the photobooth crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for photobooth operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Device Errors ===
    /// The device stream provider refused access (permission or hardware).
    #[error("could not access the camera: {message}")]
    DeviceDenied {
        /// Reason reported by the device stream provider.
        message: String,
    },

    /// A capture or recording was requested with no open session.
    #[error("no active camera stream")]
    NoActiveStream,

    /// The stream is open but has not delivered a video frame yet.
    #[error("camera stream has not produced a frame yet")]
    FrameUnavailable,

    // === Recording Errors ===
    /// None of the preferred encoding formats is supported by the encoder.
    #[error("no supported recording format (tried: {})", tried.join(", "))]
    UnsupportedFormat {
        /// The MIME types that were tried, in preference order.
        tried: Vec<String>,
    },

    /// A recording is already in progress.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// The operation needs an active recording.
    #[error("not recording")]
    NotRecording,

    /// The encoder failed for a reason other than format support.
    #[error("encoder error: {0}")]
    Encoder(String),

    // === Buffer Errors ===
    /// A pixel buffer's length does not match its dimensions.
    #[error("invalid pixel buffer: {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidBuffer {
        /// Buffer width in pixels.
        width: u32,
        /// Buffer height in pixels.
        height: u32,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Image encoding or decoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for photobooth operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a device denied error.
    #[must_use]
    pub fn device_denied(message: impl Into<String>) -> Self {
        Self::DeviceDenied {
            message: message.into(),
        }
    }

    /// Create a new encoder error.
    #[must_use]
    pub fn encoder(message: impl Into<String>) -> Self {
        Self::Encoder(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a device permission or hardware refusal.
    #[must_use]
    pub fn is_device_denied(&self) -> bool {
        matches!(self, Self::DeviceDenied { .. })
    }

    /// Check if this error means no stream was open.
    #[must_use]
    pub fn is_no_active_stream(&self) -> bool {
        matches!(self, Self::NoActiveStream)
    }

    /// Check if this error means no encoding format was accepted.
    #[must_use]
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}
