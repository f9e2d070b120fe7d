//! Capture and recording session.
//!
//! A [`CaptureSession`] owns at most one device stream and drives the frame
//! capturer for photos and the encoder for clips. Finished artifacts are
//! handed to the `on_artifact_ready` hook and kept in a last-artifact slot.
//!
//! ```text
//! Closed --open--> Idle --start_recording--> Recording
//!   ^               |  <--stop_recording--      |
//!   +----close------+-----------close-----------+
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::buffer::PixelBuffer;
use crate::capture;
use crate::config::{CameraConfig, Config, RecordingConfig};
use crate::device::{DeviceProvider, FacingMode, MediaStream};
use crate::encoder::{negotiate, ChunkReceiver, Encoder};
use crate::error::{Error, Result};
use crate::export::{export, ExportedArtifact, RecordedArtifact};
use crate::filter::FilterKind;
use crate::timer::{elapsed_seconds, format_elapsed};

type ArtifactHook = Box<dyn FnMut(&ExportedArtifact) + Send>;
type TickHook = Box<dyn FnMut(u64, &str) + Send>;

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No device stream.
    Closed,
    /// A stream is open and nothing is being recorded.
    Idle,
    /// A stream is open and the encoder is running.
    Recording,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Idle => write!(f, "idle"),
            Self::Recording => write!(f, "recording"),
        }
    }
}

#[derive(Debug)]
struct ActiveRecording {
    started_at: DateTime<Utc>,
    clock: Instant,
    ticker: Interval,
    mime_type: String,
    chunks: Vec<Vec<u8>>,
    incoming: ChunkReceiver,
}

impl ActiveRecording {
    fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            trace!("Ignoring empty chunk");
            return false;
        }
        self.chunks.push(chunk);
        true
    }

    /// Move everything the encoder has sent so far into `chunks`.
    fn drain(&mut self) -> usize {
        let mut appended = 0;
        loop {
            match self.incoming.try_recv() {
                Ok(chunk) => {
                    if self.push(chunk) {
                        appended += 1;
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        appended
    }
}

/// Camera session with photo capture and clip recording.
pub struct CaptureSession {
    provider: Box<dyn DeviceProvider>,
    encoder: Box<dyn Encoder>,
    camera: CameraConfig,
    recording_config: RecordingConfig,
    facing_mode: FacingMode,
    audio_enabled: bool,
    filter: FilterKind,
    stream: Option<Box<dyn MediaStream>>,
    recording: Option<ActiveRecording>,
    on_artifact: Option<ArtifactHook>,
    on_tick: Option<TickHook>,
    last_artifact: Option<ExportedArtifact>,
}

impl CaptureSession {
    /// Create a closed session.
    ///
    /// Facing mode, audio and the initial filter come from `config`.
    pub fn new(
        provider: impl DeviceProvider + 'static,
        encoder: impl Encoder + 'static,
        config: &Config,
    ) -> Self {
        Self {
            provider: Box::new(provider),
            encoder: Box::new(encoder),
            camera: config.camera.clone(),
            recording_config: config.recording.clone(),
            facing_mode: config.camera.facing_mode,
            audio_enabled: config.camera.audio_enabled,
            filter: config.filter.default,
            stream: None,
            recording: None,
            on_artifact: None,
            on_tick: None,
            last_artifact: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match (&self.stream, &self.recording) {
            (None, _) => SessionState::Closed,
            (Some(_), None) => SessionState::Idle,
            (Some(_), Some(_)) => SessionState::Recording,
        }
    }

    /// Whether a stream is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Whether a recording is in progress.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Facing mode of the current (or next) stream.
    #[must_use]
    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    /// Whether audio is requested when opening.
    #[must_use]
    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// Whether the open stream carries audio.
    #[must_use]
    pub fn stream_has_audio(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.has_audio())
    }

    /// Whether the preview should be shown mirrored.
    #[must_use]
    pub fn preview_mirrored(&self) -> bool {
        self.facing_mode.is_mirrored()
    }

    /// Filter applied to captured frames.
    #[must_use]
    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    /// Select the filter for subsequent captures.
    pub fn set_filter(&mut self, filter: FilterKind) {
        debug!(filter = %filter, "Filter selected");
        self.filter = filter;
    }

    /// Subscribe to finished artifacts. Replaces any previous hook.
    pub fn on_artifact_ready(&mut self, hook: impl FnMut(&ExportedArtifact) + Send + 'static) {
        self.on_artifact = Some(Box::new(hook));
    }

    /// Subscribe to recording timer ticks. Replaces any previous hook.
    ///
    /// The hook receives elapsed whole seconds and the `MM:SS` text.
    pub fn on_timer_tick(&mut self, hook: impl FnMut(u64, &str) + Send + 'static) {
        self.on_tick = Some(Box::new(hook));
    }

    /// Open a stream, closing the current one first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceDenied`] if the provider refuses; the session is
    /// left closed.
    pub async fn open(&mut self, facing_mode: FacingMode, audio_enabled: bool) -> Result<()> {
        self.close();
        self.facing_mode = facing_mode;
        self.audio_enabled = audio_enabled;

        let constraints = self.camera.constraints(facing_mode, audio_enabled);
        let stream = self.provider.open_stream(&constraints).await.map_err(|e| {
            warn!(facing = %facing_mode, error = %e, "Camera open failed");
            e
        })?;

        info!(
            facing = %facing_mode,
            audio = stream.has_audio(),
            mirrored = self.preview_mirrored(),
            "Camera opened"
        );
        self.stream = Some(stream);
        Ok(())
    }

    /// Flip between the user-facing and environment-facing camera.
    ///
    /// # Errors
    ///
    /// Returns an error if the new stream cannot be opened.
    pub async fn switch_camera(&mut self) -> Result<()> {
        let next = self.facing_mode.toggled();
        debug!(from = %self.facing_mode, to = %next, "Switching camera");
        self.open(next, self.audio_enabled).await
    }

    /// Enable or disable audio. Re-opens the stream only if one is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be re-opened.
    pub async fn toggle_audio(&mut self, enabled: bool) -> Result<()> {
        self.audio_enabled = enabled;
        debug!(audio = enabled, "Audio toggled");
        if self.is_open() {
            self.open(self.facing_mode, enabled).await?;
        }
        Ok(())
    }

    /// Start recording the open stream.
    ///
    /// If audio is enabled but the stream has no audio track, the stream is
    /// re-opened with audio once before the encoder starts.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveStream`] if the session is closed
    /// - [`Error::AlreadyRecording`] if a recording is in progress
    /// - [`Error::UnsupportedFormat`] if no preferred format is accepted
    pub async fn start_recording(&mut self) -> Result<()> {
        match self.state() {
            SessionState::Closed => return Err(Error::NoActiveStream),
            SessionState::Recording => return Err(Error::AlreadyRecording),
            SessionState::Idle => {}
        }

        if self.audio_enabled && !self.stream_has_audio() {
            info!("Re-opening camera with audio for recording");
            self.open(self.facing_mode, true).await?;
            if !self.stream_has_audio() {
                warn!("Camera granted no audio track, recording video only");
            }
        }

        let stream = self.stream.as_deref().ok_or(Error::NoActiveStream)?;
        let (mime_type, incoming) = negotiate(
            self.encoder.as_mut(),
            stream,
            &self.recording_config.codec_preferences,
            self.recording_config.timeslice(),
        )?;

        let period = self
            .recording_config
            .tick_interval()
            .max(Duration::from_millis(1));
        let clock = Instant::now();
        let mut ticker = time::interval_at(clock + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(mime_type = %mime_type, tick = ?period, "Recording started");
        self.recording = Some(ActiveRecording {
            started_at: Utc::now(),
            clock,
            ticker,
            mime_type,
            chunks: Vec::new(),
            incoming,
        });
        self.emit_tick(0);
        Ok(())
    }

    /// Append an encoder chunk. Empty chunks are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRecording`] outside a recording.
    pub fn on_chunk(&mut self, chunk: Vec<u8>) -> Result<()> {
        let recording = self.recording.as_mut().ok_or(Error::NotRecording)?;
        recording.push(chunk);
        Ok(())
    }

    /// Collect chunks the encoder has sent. Returns how many were appended.
    pub fn poll_chunks(&mut self) -> usize {
        self.recording.as_mut().map_or(0, ActiveRecording::drain)
    }

    /// Stop recording and emit the clip. The recording tick stops with it.
    ///
    /// Returns `None` when nothing was being recorded. A recording with no
    /// data still produces an (empty) artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the clip cannot be exported.
    pub fn stop_recording(&mut self) -> Result<Option<ExportedArtifact>> {
        let Some(recording) = self.recording.take() else {
            debug!("Stop requested while not recording");
            return Ok(None);
        };
        self.finish(recording).map(Some)
    }

    /// Release the stream. A recording in progress is finalized first.
    pub fn close(&mut self) {
        if let Some(recording) = self.recording.take() {
            debug!("Finalizing recording before closing camera");
            if let Err(e) = self.finish(recording) {
                warn!(error = %e, "Recording lost while closing camera");
            }
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!(facing = %stream.facing_mode(), "Camera closed");
        }
    }

    /// Capture the current frame with mirroring and the selected filter.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveStream`] if the session is closed
    /// - [`Error::FrameUnavailable`] if no frame has arrived yet
    pub fn capture_frame(&self) -> Result<PixelBuffer> {
        let stream = self.stream.as_deref().ok_or(Error::NoActiveStream)?;
        let frame = stream.latest_frame().ok_or(Error::FrameUnavailable)?;
        Ok(capture::capture_frame(&frame, self.facing_mode, self.filter))
    }

    /// Capture a frame, export it as PNG and emit it.
    ///
    /// # Errors
    ///
    /// Returns an error if capture or encoding fails.
    pub fn take_photo(&mut self) -> Result<ExportedArtifact> {
        let recorded = RecordedArtifact::Photo(self.capture_frame()?);
        let artifact = export(&recorded, Utc::now())?;
        info!(file = %artifact.file_name, filter = %self.filter, "Photo taken");
        self.emit(&artifact);
        Ok(artifact)
    }

    /// Wait for the next recording tick and fire the timer hook.
    ///
    /// Ticks arrive every `recording.tick_interval_ms` after
    /// [`start_recording`](Self::start_recording). Returns `None` at once when
    /// not recording. Cancel-safe, so it can sit in a `tokio::select!` beside
    /// other session events.
    pub async fn next_tick(&mut self) -> Option<u64> {
        let recording = self.recording.as_mut()?;
        recording.ticker.tick().await;
        let seconds = recording.clock.elapsed().as_secs();
        self.emit_tick(seconds);
        Some(seconds)
    }

    /// Fire the timer hook with the time elapsed since recording started.
    pub fn tick(&mut self) -> Option<u64> {
        self.tick_at(Utc::now())
    }

    /// Like [`tick`](Self::tick) with an explicit clock reading.
    ///
    /// Returns `None` and fires nothing when not recording.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<u64> {
        let started_at = self.recording.as_ref()?.started_at;
        let seconds = elapsed_seconds(started_at, now);
        self.emit_tick(seconds);
        Some(seconds)
    }

    /// When the current recording started.
    #[must_use]
    pub fn recording_started_at(&self) -> Option<DateTime<Utc>> {
        self.recording.as_ref().map(|r| r.started_at)
    }

    /// MIME type negotiated for the current recording.
    #[must_use]
    pub fn recording_mime_type(&self) -> Option<&str> {
        self.recording.as_ref().map(|r| r.mime_type.as_str())
    }

    /// Bytes accumulated in the current recording.
    #[must_use]
    pub fn recorded_bytes(&self) -> usize {
        self.recording
            .as_ref()
            .map_or(0, |r| r.chunks.iter().map(Vec::len).sum())
    }

    /// The most recent photo or clip.
    #[must_use]
    pub fn last_artifact(&self) -> Option<&ExportedArtifact> {
        self.last_artifact.as_ref()
    }

    /// Forget the most recent artifact.
    pub fn clear_media(&mut self) {
        if self.last_artifact.take().is_some() {
            debug!("Media cleared");
        }
    }

    fn finish(&mut self, mut recording: ActiveRecording) -> Result<ExportedArtifact> {
        self.encoder.stop();
        recording.drain();

        let recorded = RecordedArtifact::Video {
            mime_type: recording.mime_type,
            chunks: recording.chunks,
        };
        let artifact = export(&recorded, Utc::now())?;
        info!(
            file = %artifact.file_name,
            size = artifact.len(),
            "Recording stopped"
        );
        self.emit(&artifact);
        Ok(artifact)
    }

    fn emit(&mut self, artifact: &ExportedArtifact) {
        if let Some(hook) = self.on_artifact.as_mut() {
            hook(artifact);
        }
        self.last_artifact = Some(artifact.clone());
    }

    fn emit_tick(&mut self, seconds: u64) {
        if let Some(hook) = self.on_tick.as_mut() {
            hook(seconds, &format_elapsed(seconds));
        }
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state())
            .field("facing_mode", &self.facing_mode)
            .field("audio_enabled", &self.audio_enabled)
            .field("filter", &self.filter)
            .field("provider", &self.provider)
            .field("encoder", &self.encoder)
            .field("last_artifact", &self.last_artifact.as_ref().map(|a| &a.file_name))
            .finish_non_exhaustive()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Duration;

    use super::*;
    use crate::device::pattern::{PatternCamera, TestPattern};
    use crate::encoder::testing::FakeEncoder;
    use crate::encoder::{FALLBACK_MIME_TYPE, PREFERRED_MIME_TYPE};
    use crate::export::{export_photo, ArtifactKind};
    use crate::filter::apply_filter;
    use crate::logging::init_test_logging;

    fn config() -> Config {
        let mut config = Config::default();
        config.camera.ideal_width = 8;
        config.camera.ideal_height = 4;
        config
    }

    fn session_with(camera: &PatternCamera, encoder: &FakeEncoder) -> CaptureSession {
        init_test_logging();
        CaptureSession::new(camera.clone(), encoder.clone(), &config())
    }

    fn session() -> (CaptureSession, PatternCamera, FakeEncoder) {
        let camera = PatternCamera::new();
        let encoder = FakeEncoder::supporting(&[PREFERRED_MIME_TYPE, FALLBACK_MIME_TYPE]);
        (session_with(&camera, &encoder), camera, encoder)
    }

    fn collect_artifacts(session: &mut CaptureSession) -> Arc<Mutex<Vec<ExportedArtifact>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.on_artifact_ready(move |a| sink.lock().unwrap().push(a.clone()));
        seen
    }

    fn assert_timestamped(name: &str, prefix: &str, ext: &str) {
        let stamp = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(ext))
            .unwrap_or_else(|| panic!("bad artifact name {name}"));
        // 2024-01-02T03-04-05-000Z
        assert_eq!(stamp.len(), 24, "{name}");
        assert!(stamp.ends_with('Z'));
        assert!(!stamp.contains(':') && !stamp.contains('.'));
    }

    #[tokio::test]
    async fn test_new_session_is_closed() {
        let (session, camera, _) = session();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.facing_mode(), FacingMode::User);
        assert!(session.audio_enabled());
        assert_eq!(session.filter(), FilterKind::None);
        assert_eq!(camera.opened_count(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_grayscale_photo() {
        let camera = PatternCamera::new().with_pattern(TestPattern::ColorBars);
        let encoder = FakeEncoder::default();
        let mut session = session_with(&camera, &encoder);

        session.open(FacingMode::User, false).await.unwrap();
        let mut frame = session.capture_frame().unwrap();
        apply_filter(&mut frame, FilterKind::Grayscale);
        let artifact = export_photo(&frame, Utc::now()).unwrap();

        assert_timestamped(&artifact.file_name, "photo-", ".png");
        let decoded = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert!(decoded.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
    }

    #[tokio::test]
    async fn test_end_to_end_video() {
        let (mut session, _, _) = session();
        let seen = collect_artifacts(&mut session);

        session.open(FacingMode::User, true).await.unwrap();
        session.start_recording().await.unwrap();
        session.on_chunk(vec![7; 10]).unwrap();
        session.on_chunk(Vec::new()).unwrap();
        let artifact = session.stop_recording().unwrap().unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Video);
        assert_eq!(artifact.bytes, vec![7; 10]);
        assert_timestamped(&artifact.file_name, "video-", ".webm");
        assert_eq!(session.state(), SessionState::Idle);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], artifact);
    }

    #[tokio::test]
    async fn test_start_recording_when_closed() {
        let (mut session, _, encoder) = session();
        let err = session.start_recording().await.unwrap_err();

        assert!(err.is_no_active_stream());
        assert_eq!(session.state(), SessionState::Closed);
        assert!(encoder.started_with().is_empty());
    }

    #[tokio::test]
    async fn test_stop_recording_when_idle_is_noop() {
        let (mut session, _, encoder) = session();
        let seen = collect_artifacts(&mut session);
        session.open(FacingMode::User, false).await.unwrap();

        assert!(session.stop_recording().unwrap().is_none());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(encoder.stops(), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_recording_twice() {
        let (mut session, _, _) = session();
        session.open(FacingMode::User, false).await.unwrap();
        session.start_recording().await.unwrap();

        let err = session.start_recording().await.unwrap_err();
        assert!(matches!(err, Error::AlreadyRecording));
        assert_eq!(session.state(), SessionState::Recording);
    }

    #[tokio::test]
    async fn test_open_while_open_keeps_one_stream() {
        let (mut session, camera, _) = session();
        session.open(FacingMode::User, false).await.unwrap();
        session.open(FacingMode::Environment, false).await.unwrap();
        session.open(FacingMode::User, true).await.unwrap();

        assert_eq!(camera.opened_count(), 3);
        assert_eq!(camera.live_count(), 1);
        assert_eq!(camera.peak_live_count(), 1);
    }

    #[tokio::test]
    async fn test_denied_open_leaves_closed() {
        let (mut session, camera, _) = session();
        session.open(FacingMode::User, false).await.unwrap();
        camera.set_denied(true);

        let err = session.open(FacingMode::Environment, false).await.unwrap_err();
        assert!(err.is_device_denied());
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(camera.live_count(), 0);
        assert_eq!(camera.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_switch_camera_toggles_and_mirrors() {
        let (mut session, camera, _) = session();
        session.open(FacingMode::User, false).await.unwrap();
        assert!(session.preview_mirrored());

        session.switch_camera().await.unwrap();
        assert_eq!(session.facing_mode(), FacingMode::Environment);
        assert!(!session.preview_mirrored());
        assert_eq!(camera.requests()[1].facing_mode, FacingMode::Environment);

        session.switch_camera().await.unwrap();
        assert_eq!(session.facing_mode(), FacingMode::User);
        assert_eq!(camera.live_count(), 1);
    }

    #[tokio::test]
    async fn test_toggle_audio_reopens_only_when_open() {
        let (mut session, camera, _) = session();
        session.toggle_audio(false).await.unwrap();
        assert!(!session.audio_enabled());
        assert_eq!(camera.opened_count(), 0);

        session.open(FacingMode::User, false).await.unwrap();
        session.toggle_audio(true).await.unwrap();
        assert_eq!(camera.opened_count(), 2);
        assert!(session.stream_has_audio());
        assert!(camera.requests()[1].wants_audio());
    }

    #[tokio::test]
    async fn test_recording_reopens_once_for_audio() {
        let (mut session, camera, _) = session();
        camera.set_audio_available(false);
        session.open(FacingMode::User, true).await.unwrap();
        assert!(!session.stream_has_audio());

        session.start_recording().await.unwrap();
        assert_eq!(camera.opened_count(), 2);
        assert!(camera.requests()[1].wants_audio());
        assert_eq!(session.state(), SessionState::Recording);
        assert_eq!(camera.live_count(), 1);
    }

    #[tokio::test]
    async fn test_recording_without_audio_does_not_reopen() {
        let (mut session, camera, _) = session();
        session.open(FacingMode::User, false).await.unwrap();

        session.start_recording().await.unwrap();
        assert_eq!(camera.opened_count(), 1);
    }

    #[tokio::test]
    async fn test_codec_fallback() {
        let camera = PatternCamera::new();
        let encoder = FakeEncoder::supporting(&[FALLBACK_MIME_TYPE]);
        let mut session = session_with(&camera, &encoder);
        session.open(FacingMode::User, false).await.unwrap();

        session.start_recording().await.unwrap();
        assert_eq!(session.recording_mime_type(), Some(FALLBACK_MIME_TYPE));
        assert_eq!(encoder.started_with(), vec![FALLBACK_MIME_TYPE.to_string()]);
    }

    #[tokio::test]
    async fn test_unsupported_format_stays_idle() {
        let camera = PatternCamera::new();
        let encoder = FakeEncoder::supporting(&["video/mp4"]);
        let mut session = session_with(&camera, &encoder);
        session.open(FacingMode::User, false).await.unwrap();

        let err = session.start_recording().await.unwrap_err();
        assert!(err.is_unsupported_format());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_encoder_chunks_are_collected() {
        let (mut session, _, encoder) = session();
        session.open(FacingMode::User, false).await.unwrap();
        session.start_recording().await.unwrap();

        assert!(encoder.emit(b"one"));
        assert!(encoder.emit(b""));
        assert!(encoder.emit(b"two"));
        assert_eq!(session.poll_chunks(), 2);
        assert_eq!(session.recorded_bytes(), 6);

        encoder.flush_on_stop(b"-end");
        let artifact = session.stop_recording().unwrap().unwrap();
        assert_eq!(artifact.bytes, b"onetwo-end");
        assert_eq!(encoder.stops(), 1);
        assert!(!encoder.is_running());
    }

    #[tokio::test]
    async fn test_stop_before_any_data_gives_empty_clip() {
        let (mut session, _, _) = session();
        session.open(FacingMode::User, false).await.unwrap();
        session.start_recording().await.unwrap();

        let artifact = session.stop_recording().unwrap().unwrap();
        assert!(artifact.is_empty());
        assert_eq!(session.last_artifact(), Some(&artifact));
    }

    #[tokio::test]
    async fn test_on_chunk_outside_recording() {
        let (mut session, _, _) = session();
        assert!(matches!(
            session.on_chunk(vec![1]).unwrap_err(),
            Error::NotRecording
        ));
        assert_eq!(session.poll_chunks(), 0);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (mut session, camera, _) = session();
        session.close();
        session.open(FacingMode::User, false).await.unwrap();
        session.close();
        session.close();

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(camera.live_count(), 0);
    }

    #[tokio::test]
    async fn test_close_while_recording_finalizes_clip() {
        let (mut session, camera, encoder) = session();
        let seen = collect_artifacts(&mut session);
        session.open(FacingMode::User, false).await.unwrap();
        session.start_recording().await.unwrap();
        session.on_chunk(b"clip".to_vec()).unwrap();

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(encoder.stops(), 1);
        assert_eq!(camera.live_count(), 0);
        assert_eq!(seen.lock().unwrap()[0].bytes, b"clip");
    }

    #[tokio::test]
    async fn test_capture_frame_errors() {
        let (mut session, camera, _) = session();
        assert!(session.capture_frame().unwrap_err().is_no_active_stream());

        camera.set_frames_withheld(true);
        session.open(FacingMode::User, false).await.unwrap();
        assert!(matches!(
            session.capture_frame().unwrap_err(),
            Error::FrameUnavailable
        ));
    }

    #[tokio::test]
    async fn test_capture_frame_mirrors_user_camera() {
        let (mut session, _, _) = session();

        session.open(FacingMode::User, false).await.unwrap();
        let mirrored = session.capture_frame().unwrap();
        // Colour bars: white on the far left, black on the far right
        assert_eq!(mirrored.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(mirrored.pixel(7, 0), Some([255, 255, 255, 255]));

        session.open(FacingMode::Environment, false).await.unwrap();
        let direct = session.capture_frame().unwrap();
        assert_eq!(direct.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[tokio::test]
    async fn test_take_photo_uses_filter_and_fills_slot() {
        let (mut session, _, _) = session();
        let seen = collect_artifacts(&mut session);
        session.set_filter(FilterKind::Invert);
        session.open(FacingMode::Environment, false).await.unwrap();

        let artifact = session.take_photo().unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Photo);
        let decoded = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 255]);

        assert_eq!(session.last_artifact(), Some(&artifact));
        assert_eq!(seen.lock().unwrap().len(), 1);

        session.clear_media();
        assert!(session.last_artifact().is_none());
    }

    #[tokio::test]
    async fn test_timer_ticks() {
        let (mut session, _, _) = session();
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        session.on_timer_tick(move |secs, text| sink.lock().unwrap().push((secs, text.to_string())));

        assert_eq!(session.tick(), None);
        session.open(FacingMode::User, false).await.unwrap();
        session.start_recording().await.unwrap();

        let started = session.recording_started_at().unwrap();
        assert_eq!(session.tick_at(started + Duration::milliseconds(65_500)), Some(65));
        assert_eq!(session.tick_at(started + Duration::seconds(3599)), Some(3599));

        session.stop_recording().unwrap();
        assert_eq!(session.tick(), None);

        let ticks = ticks.lock().unwrap();
        assert_eq!(
            *ticks,
            vec![
                (0, "00:00".to_string()),
                (65, "01:05".to_string()),
                (3599, "59:59".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_ticks_every_second_until_stopped() {
        let (mut session, _, _) = session();
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        session.on_timer_tick(move |secs, text| sink.lock().unwrap().push((secs, text.to_string())));

        assert_eq!(session.next_tick().await, None);
        session.open(FacingMode::User, false).await.unwrap();
        session.start_recording().await.unwrap();

        let started = Instant::now();
        assert_eq!(session.next_tick().await, Some(1));
        assert_eq!(started.elapsed(), std::time::Duration::from_secs(1));
        assert_eq!(session.next_tick().await, Some(2));

        session.stop_recording().unwrap();
        assert_eq!(session.next_tick().await, None);
        assert_eq!(started.elapsed(), std::time::Duration::from_secs(2));

        let ticks = ticks.lock().unwrap();
        assert_eq!(
            *ticks,
            vec![
                (0, "00:00".to_string()),
                (1, "00:01".to_string()),
                (2, "00:02".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_interval_follows_config() {
        let camera = PatternCamera::new();
        let encoder = FakeEncoder::supporting(&[PREFERRED_MIME_TYPE]);
        let mut config = config();
        config.recording.tick_interval_ms = 250;
        let mut session = CaptureSession::new(camera, encoder, &config);
        session.open(FacingMode::User, false).await.unwrap();
        session.start_recording().await.unwrap();

        let started = Instant::now();
        for _ in 0..4 {
            session.next_tick().await;
        }
        assert_eq!(started.elapsed(), std::time::Duration::from_secs(1));
        assert_eq!(session.next_tick().await, Some(1));
    }

    #[tokio::test]
    async fn test_drop_releases_stream() {
        let (mut session, camera, _) = session();
        session.open(FacingMode::User, false).await.unwrap();
        drop(session);
        assert_eq!(camera.live_count(), 0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Closed.to_string(), "closed");
        assert_eq!(SessionState::Recording.to_string(), "recording");
    }
}
