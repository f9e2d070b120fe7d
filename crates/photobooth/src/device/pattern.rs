//! Synthetic camera producing test patterns.
//!
//! [`PatternCamera`] implements [`DeviceProvider`] without hardware. It backs
//! the CLI `snapshot` command and the session tests, and keeps counters so
//! callers can verify stream ownership.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{DeviceProvider, FacingMode, MediaStream, StreamConstraints};
use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Test pattern types for frame generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestPattern {
    /// Eight vertical colour bars: white, yellow, cyan, green, magenta, red,
    /// blue, black.
    #[default]
    ColorBars,
    /// Horizontal grey ramp from black on the left to white on the right.
    Gradient,
    /// A single RGBA colour.
    Solid([u8; 4]),
}

const BARS: [[u8; 4]; 8] = [
    [255, 255, 255, 255],
    [255, 255, 0, 255],
    [0, 255, 255, 255],
    [0, 255, 0, 255],
    [255, 0, 255, 255],
    [255, 0, 0, 255],
    [0, 0, 255, 255],
    [0, 0, 0, 255],
];

impl TestPattern {
    /// Render the pattern at the given size.
    #[must_use]
    pub fn render(self, width: u32, height: u32) -> PixelBuffer {
        let mut frame = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, self.sample(x, width));
            }
        }
        frame
    }

    #[allow(clippy::cast_possible_truncation)]
    fn sample(self, x: u32, width: u32) -> [u8; 4] {
        match self {
            Self::ColorBars => {
                let bar = (u64::from(x) * BARS.len() as u64 / u64::from(width.max(1))) as usize;
                BARS[bar.min(BARS.len() - 1)]
            }
            Self::Gradient => {
                let span = u64::from(width.saturating_sub(1).max(1));
                let v = (u64::from(x) * 255 / span) as u8;
                [v, v, v, 255]
            }
            Self::Solid(rgba) => rgba,
        }
    }
}

#[derive(Debug, Default)]
struct CameraState {
    denied: AtomicBool,
    audio_unavailable: AtomicBool,
    frames_withheld: AtomicBool,
    opened: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
    requests: Mutex<Vec<StreamConstraints>>,
}

/// A device provider that renders a fixed test pattern.
///
/// Clones share state, so a test can keep a handle while a session owns the
/// provider.
#[derive(Debug, Clone, Default)]
pub struct PatternCamera {
    pattern: TestPattern,
    resolution: Option<(u32, u32)>,
    state: Arc<CameraState>,
}

impl PatternCamera {
    /// Create a camera rendering colour bars at the requested resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Force a native resolution regardless of the ideal size requested.
    #[must_use]
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    /// Refuse (or allow again) every subsequent open, like a denied prompt.
    pub fn set_denied(&self, denied: bool) {
        self.state.denied.store(denied, Ordering::SeqCst);
    }

    /// Grant video-only streams even when audio is requested.
    pub fn set_audio_available(&self, available: bool) {
        self.state
            .audio_unavailable
            .store(!available, Ordering::SeqCst);
    }

    /// Open streams that have not produced a frame yet.
    pub fn set_frames_withheld(&self, withheld: bool) {
        self.state.frames_withheld.store(withheld, Ordering::SeqCst);
    }

    /// Number of streams successfully opened so far.
    #[must_use]
    pub fn opened_count(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Number of streams currently live.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live streams observed.
    #[must_use]
    pub fn peak_live_count(&self) -> usize {
        self.state.peak_live.load(Ordering::SeqCst)
    }

    /// Every constraint set requested so far, including denied ones.
    #[must_use]
    pub fn requests(&self) -> Vec<StreamConstraints> {
        self.state
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DeviceProvider for PatternCamera {
    async fn open_stream(&self, constraints: &StreamConstraints) -> Result<Box<dyn MediaStream>> {
        if let Ok(mut requests) = self.state.requests.lock() {
            requests.push(constraints.clone());
        }

        // Stand-in for waiting on a permission prompt
        tokio::task::yield_now().await;

        if self.state.denied.load(Ordering::SeqCst) {
            return Err(Error::device_denied("permission denied by user"));
        }

        let (width, height) = self
            .resolution
            .unwrap_or((constraints.ideal_width, constraints.ideal_height));
        let has_audio =
            constraints.wants_audio() && !self.state.audio_unavailable.load(Ordering::SeqCst);
        let frame = (!self.state.frames_withheld.load(Ordering::SeqCst))
            .then(|| self.pattern.render(width, height));

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.state.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_live.fetch_max(live, Ordering::SeqCst);

        debug!(
            facing = %constraints.facing_mode,
            width,
            height,
            has_audio,
            "Pattern stream opened"
        );

        Ok(Box::new(PatternStream {
            facing_mode: constraints.facing_mode,
            has_audio,
            frame,
            live: true,
            state: Arc::clone(&self.state),
        }))
    }
}

/// A stream handed out by [`PatternCamera`].
#[derive(Debug)]
pub struct PatternStream {
    facing_mode: FacingMode,
    has_audio: bool,
    frame: Option<PixelBuffer>,
    live: bool,
    state: Arc<CameraState>,
}

impl MediaStream for PatternStream {
    fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    fn has_audio(&self) -> bool {
        self.has_audio
    }

    fn latest_frame(&self) -> Option<PixelBuffer> {
        if self.live {
            self.frame.clone()
        } else {
            None
        }
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.state.live.fetch_sub(1, Ordering::SeqCst);
            debug!(facing = %self.facing_mode, "Pattern stream stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for PatternStream {
    fn drop(&mut self) {
        self.stop();
    }
}
