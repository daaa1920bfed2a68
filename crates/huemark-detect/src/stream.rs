use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use huemark_image::{Image, ImageSize};

use crate::{
    config::DetectorConfig,
    error::DetectError,
    pipeline::{FrameDetections, MarkerPipeline},
    profile::ColorClass,
};

/// Smoothing factor of the frame rate estimate.
const SMOOTHING: f32 = 0.95;

/// Delivers frames to the loop.
pub trait FrameSource {
    /// Error raised when a frame cannot be produced.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Size of the frames this source produces.
    fn frame_size(&self) -> ImageSize;

    /// Blocks until the next frame is available.
    ///
    /// `Ok(None)` means the stream has ended.
    fn grab(&mut self) -> Result<Option<Image<u8, 3>>, Self::Error>;
}

/// Everything a sink gets to show for one frame.
pub struct DisplayFrame<'a> {
    /// Zero-based position of the frame in the run.
    pub index: u64,
    /// The frame with the regions drawn, at frame resolution.
    pub annotated: &'a Image<u8, 3>,
    /// The regions found in the frame.
    pub detections: &'a FrameDetections,
    /// Raw threshold masks in [`ColorClass::ALL`] order, at processing resolution.
    pub masks: &'a [Image<u8, 1>; 3],
}

impl DisplayFrame<'_> {
    /// The raw threshold mask of `class`.
    pub fn mask(&self, class: ColorClass) -> &Image<u8, 1> {
        &self.masks[class.index()]
    }
}

/// Receives the result of every processed frame.
pub trait DisplaySink {
    /// Error raised when a frame cannot be presented.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Shows or stores one processed frame.
    fn present(&mut self, view: &DisplayFrame<'_>) -> Result<(), Self::Error>;
}

/// Parameters of [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Pause after each frame.
    pub loop_delay: Duration,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
    /// How often the frame rate is logged.
    pub report_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            loop_delay: Duration::from_millis(30),
            max_frames: None,
            report_interval: Duration::from_secs(5),
        }
    }
}

impl RunOptions {
    /// Options with the loop delay of `config`.
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            loop_delay: config.loop_delay(),
            ..Default::default()
        }
    }
}

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source reported the end of the stream.
    EndOfStream,
    /// The cancel flag was raised.
    Cancelled,
    /// [`RunOptions::max_frames`] frames were processed.
    FrameLimit,
}

/// Statistics of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub reason: StopReason,
    /// Number of frames processed.
    pub frames: u64,
    /// Number of regions reported over all frames and classes.
    pub regions: u64,
    /// Wall time spent in the loop.
    pub elapsed: Duration,
}

/// Smoothed frame rate estimate.
///
/// # Examples
///
/// ```
/// use huemark_detect::stream::FrameRateMeter;
///
/// let mut meter = FrameRateMeter::new();
/// for _ in 0..10 {
///     meter.update();
/// }
/// assert_eq!(meter.frame_count(), 10);
/// ```
pub struct FrameRateMeter {
    last_time: Instant,
    frame_count: u64,
    fps: f32,
}

impl FrameRateMeter {
    /// Creates a meter starting now.
    pub fn new() -> Self {
        Self {
            last_time: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Current frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Frames counted so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Records one frame.
    pub fn update(&mut self) {
        self.frame_count += 1;

        let now = Instant::now();
        let seconds = now.duration_since(self.last_time).as_secs_f32();
        self.last_time = now;
        if seconds <= 0.0 {
            return;
        }

        let instant_fps = 1.0 / seconds;
        self.fps = if self.fps == 0.0 {
            instant_fps
        } else {
            self.fps * SMOOTHING + instant_fps * (1.0 - SMOOTHING)
        };
    }
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the detection loop until the stream ends, `cancel` is raised or the
/// frame limit is reached.
///
/// Each iteration checks `cancel`, grabs a frame, processes it, presents the
/// result and sleeps for [`RunOptions::loop_delay`]. A failing source or sink
/// ends the loop with an error; nothing is retried.
pub fn run<S, D>(
    source: &mut S,
    sink: &mut D,
    pipeline: &mut MarkerPipeline,
    options: &RunOptions,
    cancel: &AtomicBool,
) -> Result<RunSummary, DetectError>
where
    S: FrameSource,
    D: DisplaySink,
{
    log::info!(
        "starting frame loop: frame {}, processing {}",
        source.frame_size(),
        pipeline.processing_size()
    );

    let start = Instant::now();
    let mut meter = FrameRateMeter::new();
    let mut last_report = Instant::now();
    let mut regions = 0u64;

    let reason = loop {
        if cancel.load(Ordering::SeqCst) {
            break StopReason::Cancelled;
        }

        if options
            .max_frames
            .is_some_and(|max| meter.frame_count() >= max)
        {
            break StopReason::FrameLimit;
        }

        let Some(frame) = source
            .grab()
            .map_err(|e| DetectError::Source(Box::new(e)))?
        else {
            break StopReason::EndOfStream;
        };

        let detections = pipeline.process(&frame)?;

        let view = DisplayFrame {
            index: meter.frame_count(),
            annotated: pipeline.annotated(),
            detections: &detections,
            masks: pipeline.masks(),
        };
        sink.present(&view)
            .map_err(|e| DetectError::Sink(Box::new(e)))?;

        regions += detections.total() as u64;
        meter.update();

        if last_report.elapsed() >= options.report_interval {
            log::info!(
                "{} frames processed, {:.1} fps",
                meter.frame_count(),
                meter.fps()
            );
            last_report = Instant::now();
        }

        if !options.loop_delay.is_zero() {
            std::thread::sleep(options.loop_delay);
        }
    };

    let summary = RunSummary {
        reason,
        frames: meter.frame_count(),
        regions,
        elapsed: start.elapsed(),
    };

    log::info!(
        "frame loop stopped ({:?}) after {} frames in {:.2?}",
        summary.reason,
        summary.frames,
        summary.elapsed
    );

    Ok(summary)
}
