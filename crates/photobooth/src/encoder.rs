//! Video encoder abstraction.
//!
//! An [`Encoder`] turns a live [`MediaStream`] into chunks of container data.
//! Chunks are delivered over a tokio channel; the encoder dropping its sender
//! after [`Encoder::stop`] is the "stopped" signal.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::device::MediaStream;

/// Sending half handed to an encoder for its output chunks.
pub type ChunkSender = mpsc::UnboundedSender<Vec<u8>>;

/// Receiving half kept by the session.
pub type ChunkReceiver = mpsc::UnboundedReceiver<Vec<u8>>;

/// Preferred recording format, tried first.
pub const PREFERRED_MIME_TYPE: &str = "video/webm;codecs=vp9,opus";

/// Fallback recording format.
pub const FALLBACK_MIME_TYPE: &str = "video/webm;codecs=vp8,opus";

/// Container type of assembled recordings.
pub const CONTAINER_MIME_TYPE: &str = "video/webm";

/// Errors reported by an encoder backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncoderError {
    /// The encoder cannot produce this MIME type.
    #[error("unsupported format: {0}")]
    Unsupported(String),

    /// The encoder failed to start for another reason.
    #[error("encoder failed: {0}")]
    Failed(String),
}

/// A chunked video encoder.
pub trait Encoder: Send + std::fmt::Debug {
    /// Start encoding `stream` as `mime_type`, emitting a chunk roughly every
    /// `timeslice` on `chunks`.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::Unsupported`] if the format cannot be produced,
    /// so the caller can try the next preference.
    fn start(
        &mut self,
        stream: &dyn MediaStream,
        mime_type: &str,
        timeslice: Duration,
        chunks: ChunkSender,
    ) -> Result<(), EncoderError>;

    /// Flush pending data to the channel and drop the sender.
    fn stop(&mut self);
}

/// Start `encoder` with the first supported entry of `preferences`.
///
/// Returns the chosen MIME type and the receiver for its chunks, or the list
/// of MIME types tried when none was accepted.
pub(crate) fn negotiate(
    encoder: &mut dyn Encoder,
    stream: &dyn MediaStream,
    preferences: &[String],
    timeslice: Duration,
) -> crate::Result<(String, ChunkReceiver)> {
    let mut tried = Vec::with_capacity(preferences.len());

    for mime_type in preferences {
        let (tx, rx) = mpsc::unbounded_channel();
        match encoder.start(stream, mime_type, timeslice, tx) {
            Ok(()) => {
                debug!(mime_type = %mime_type, "Encoder started");
                return Ok((mime_type.clone(), rx));
            }
            Err(EncoderError::Unsupported(reason)) => {
                warn!(mime_type = %mime_type, reason = %reason, "Recording format rejected, trying next");
                tried.push(mime_type.clone());
            }
            Err(EncoderError::Failed(reason)) => return Err(crate::Error::encoder(reason)),
        }
    }

    Err(crate::Error::UnsupportedFormat { tried })
}

/// Encoder for hosts without a video backend. Every format is unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEncoder;

impl Encoder for NoEncoder {
    fn start(
        &mut self,
        _stream: &dyn MediaStream,
        mime_type: &str,
        _timeslice: Duration,
        _chunks: ChunkSender,
    ) -> Result<(), EncoderError> {
        Err(EncoderError::Unsupported(format!("no video backend for {mime_type}")))
    }

    fn stop(&mut self) {}
}

/// Default ordered format preferences.
#[must_use]
pub fn default_preferences() -> Vec<String> {
    vec![
        PREFERRED_MIME_TYPE.to_string(),
        FALLBACK_MIME_TYPE.to_string(),
    ]
}
