//! Artifact export and delivery.
//!
//! Export turns a finished photo or recording into a named blob. Delivery of
//! that blob (download, file write) goes through an [`ArtifactSink`].

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::buffer::PixelBuffer;
use crate::encoder::CONTAINER_MIME_TYPE;
use crate::error::{Error, Result};

/// MIME type of exported photos.
pub const PHOTO_MIME_TYPE: &str = "image/png";

/// What kind of capture produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A still image.
    Photo,
    /// A recorded clip.
    Video,
}

impl ArtifactKind {
    /// File extension used for this kind.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Photo => "png",
            Self::Video => "webm",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// A finished capture before serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedArtifact {
    /// A single filtered frame.
    Photo(PixelBuffer),
    /// Encoder output in arrival order.
    Video {
        /// MIME type negotiated with the encoder.
        mime_type: String,
        /// Non-empty chunks in arrival order.
        chunks: Vec<Vec<u8>>,
    },
}

impl RecordedArtifact {
    /// The kind of capture.
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Photo(_) => ArtifactKind::Photo,
            Self::Video { .. } => ArtifactKind::Video,
        }
    }
}

/// A named blob ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedArtifact {
    /// What produced it.
    pub kind: ArtifactKind,
    /// File name, e.g. `photo-2024-01-02T03-04-05-000Z.png`.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// When the artifact was exported.
    pub created_at: DateTime<Utc>,
    /// Encoded contents.
    pub bytes: Vec<u8>,
}

impl ExportedArtifact {
    /// Size of the encoded contents in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check whether the artifact has no contents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// ISO-8601 UTC timestamp with millisecond precision, `:` and `.` replaced by `-`.
#[must_use]
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace(|c: char| c == ':' || c == '.', "-")
}

/// File name for an artifact of `kind` exported at `at`.
#[must_use]
pub fn artifact_name(kind: ArtifactKind, at: DateTime<Utc>) -> String {
    format!("{kind}-{}.{}", file_timestamp(at), kind.extension())
}

/// Encode a photo as lossless PNG.
///
/// # Errors
///
/// Returns [`Error::Image`] if PNG encoding fails.
pub fn export_photo(buffer: &PixelBuffer, at: DateTime<Utc>) -> Result<ExportedArtifact> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        buffer.as_bytes(),
        buffer.width(),
        buffer.height(),
        ExtendedColorType::Rgba8,
    )?;

    let file_name = artifact_name(ArtifactKind::Photo, at);
    debug!(file = %file_name, size = bytes.len(), "Photo encoded");

    Ok(ExportedArtifact {
        kind: ArtifactKind::Photo,
        file_name,
        mime_type: PHOTO_MIME_TYPE.to_string(),
        created_at: at,
        bytes,
    })
}

/// Decode an encoded image (PNG) into an RGBA pixel buffer.
///
/// # Errors
///
/// Returns [`Error::Image`] if the bytes are not a supported image.
pub fn decode_photo(bytes: &[u8]) -> Result<PixelBuffer> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_raw(width, height, rgba.into_raw())
}

/// Concatenate recorded chunks into one container blob.
#[must_use]
pub fn export_video(chunks: &[Vec<u8>], at: DateTime<Utc>) -> ExportedArtifact {
    let bytes = chunks.concat();
    let file_name = artifact_name(ArtifactKind::Video, at);
    debug!(file = %file_name, chunks = chunks.len(), size = bytes.len(), "Video assembled");

    ExportedArtifact {
        kind: ArtifactKind::Video,
        file_name,
        mime_type: CONTAINER_MIME_TYPE.to_string(),
        created_at: at,
        bytes,
    }
}

/// Export any recorded artifact.
///
/// # Errors
///
/// Returns an error if photo encoding fails.
pub fn export(recorded: &RecordedArtifact, at: DateTime<Utc>) -> Result<ExportedArtifact> {
    match recorded {
        RecordedArtifact::Photo(buffer) => export_photo(buffer, at),
        RecordedArtifact::Video { chunks, .. } => Ok(export_video(chunks, at)),
    }
}

/// Persists exported artifacts.
pub trait ArtifactSink: Send + fmt::Debug {
    /// Deliver `artifact`, returning where it ended up.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact could not be persisted.
    fn deliver(&mut self, artifact: &ExportedArtifact) -> Result<PathBuf>;
}

/// Writes artifacts as files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Deliver into `dir`, created on first use.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&mut self, artifact: &ExportedArtifact) -> Result<PathBuf> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(|source| Error::DirectoryCreate {
                path: self.dir.clone(),
                source,
            })?;
        }

        let path = self.dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)?;
        info!(path = %path.display(), size = artifact.len(), "Artifact saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_file_timestamp() {
        assert_eq!(file_timestamp(at()), "2024-01-02T03-04-05-000Z");

        let with_millis = at() + chrono::Duration::milliseconds(789);
        assert_eq!(file_timestamp(with_millis), "2024-01-02T03-04-05-789Z");
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(
            artifact_name(ArtifactKind::Photo, at()),
            "photo-2024-01-02T03-04-05-000Z.png"
        );
        assert_eq!(
            artifact_name(ArtifactKind::Video, at()),
            "video-2024-01-02T03-04-05-000Z.webm"
        );
    }

    #[test]
    fn test_export_photo_is_lossless_png() {
        let mut buffer = PixelBuffer::new(3, 2);
        buffer.set_pixel(0, 0, [255, 0, 0, 255]);
        buffer.set_pixel(2, 1, [1, 2, 3, 4]);

        let artifact = export_photo(&buffer, at()).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Photo);
        assert_eq!(artifact.mime_type, "image/png");
        assert!(artifact.bytes.starts_with(b"\x89PNG"));

        let decoded = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.as_raw(), buffer.as_bytes());
    }

    #[test]
    fn test_decode_photo() {
        let buffer = PixelBuffer::filled(2, 2, [9, 8, 7, 6]);
        let artifact = export_photo(&buffer, at()).unwrap();
        assert_eq!(decode_photo(&artifact.bytes).unwrap(), buffer);

        assert!(matches!(
            decode_photo(b"not an image").unwrap_err(),
            Error::Image(_)
        ));
    }

    #[test]
    fn test_export_video_concatenates_in_order() {
        let chunks = vec![b"abc".to_vec(), b"de".to_vec()];
        let artifact = export_video(&chunks, at());
        assert_eq!(artifact.bytes, b"abcde");
        assert_eq!(artifact.mime_type, "video/webm");
        assert_eq!(artifact.file_name, "video-2024-01-02T03-04-05-000Z.webm");
    }

    #[test]
    fn test_export_empty_video() {
        let artifact = export_video(&[], at());
        assert!(artifact.is_empty());
        assert_eq!(artifact.kind, ArtifactKind::Video);
    }

    #[test]
    fn test_export_dispatch() {
        let recorded = RecordedArtifact::Video {
            mime_type: "video/webm;codecs=vp8,opus".to_string(),
            chunks: vec![vec![1, 2]],
        };
        assert_eq!(recorded.kind(), ArtifactKind::Video);
        assert_eq!(export(&recorded, at()).unwrap().bytes, vec![1, 2]);

        let recorded = RecordedArtifact::Photo(PixelBuffer::new(1, 1));
        assert_eq!(recorded.kind(), ArtifactKind::Photo);
        assert_eq!(export(&recorded, at()).unwrap().kind, ArtifactKind::Photo);
    }

    #[test]
    fn test_directory_sink_creates_dir_and_writes() {
        let dir = std::env::temp_dir().join(format!(
            "photobooth-sink-test-{}-{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let mut sink = DirectorySink::new(dir.join("nested"));

        let artifact = export_video(&[b"clip".to_vec()], at());
        let path = sink.deliver(&artifact).unwrap();

        assert_eq!(path, dir.join("nested").join(&artifact.file_name));
        assert_eq!(std::fs::read(&path).unwrap(), b"clip");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_artifact_kind_display() {
        assert_eq!(ArtifactKind::Photo.to_string(), "photo");
        assert_eq!(ArtifactKind::Video.to_string(), "video");
    }
}
