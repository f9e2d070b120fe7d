//! Device stream abstraction.
//!
//! This module defines the collaborator traits a camera backend must fulfil:
//! a [`DeviceProvider`] that grants streams and the [`MediaStream`] it hands
//! back. The [`pattern`] submodule provides a synthetic camera.

pub mod pattern;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::Result;

/// Which physical camera supplies the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user. Previewed mirrored.
    #[default]
    User,
    /// Back camera, facing the scene.
    Environment,
}

impl FacingMode {
    /// The other camera.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    /// Whether frames from this camera are shown and captured mirrored.
    #[must_use]
    pub const fn is_mirrored(self) -> bool {
        matches!(self, Self::User)
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "environment" => Ok(Self::Environment),
            other => Err(format!("unknown facing mode '{other}'")),
        }
    }
}

/// Audio track request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConstraints {
    /// Ask the device for echo cancellation.
    pub echo_cancellation: bool,
}

/// What to ask the device for when opening a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Which camera to use.
    pub facing_mode: FacingMode,
    /// Preferred frame width; the device may pick another.
    pub ideal_width: u32,
    /// Preferred frame height; the device may pick another.
    pub ideal_height: u32,
    /// Audio track, or `None` for video only.
    pub audio: Option<AudioConstraints>,
}

impl StreamConstraints {
    /// Video-only constraints at the given facing mode and size.
    #[must_use]
    pub fn video(facing_mode: FacingMode, ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            facing_mode,
            ideal_width,
            ideal_height,
            audio: None,
        }
    }

    /// Add an audio track request.
    #[must_use]
    pub fn with_audio(mut self, echo_cancellation: bool) -> Self {
        self.audio = Some(AudioConstraints { echo_cancellation });
        self
    }

    /// Whether an audio track is requested.
    #[must_use]
    pub fn wants_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// A live device stream.
///
/// Owned exclusively by the session that opened it. Dropping a stream without
/// calling [`MediaStream::stop`] leaks the device until the backend notices.
pub trait MediaStream: Send + Sync + fmt::Debug {
    /// The camera this stream comes from.
    fn facing_mode(&self) -> FacingMode;

    /// Whether the stream carries an audio track.
    fn has_audio(&self) -> bool;

    /// The most recent video frame at native resolution, if one has arrived.
    fn latest_frame(&self) -> Option<PixelBuffer>;

    /// Stop every track and release the device.
    fn stop(&mut self);

    /// Whether the tracks are still live.
    fn is_live(&self) -> bool;
}

/// Grants device streams.
///
/// Opening may wait on a permission prompt or hardware, so it is async.
#[async_trait::async_trait]
pub trait DeviceProvider: Send + Sync + fmt::Debug {
    /// Request a stream matching `constraints`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceDenied`](crate::Error::DeviceDenied) when the
    /// user refuses permission or the hardware is unavailable.
    async fn open_stream(&self, constraints: &StreamConstraints) -> Result<Box<dyn MediaStream>>;
}
