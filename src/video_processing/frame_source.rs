use std::path::{Path, PathBuf};

use ffmpeg_cmdline_utils::{FfmpegFrameIterRgb, FfmpegFrameReaderBuilder, VideoInfo};
use image::RgbImage;
use log::{debug, warn};

use crate::{
    definitions::DEFAULT_FPS,
    video_processing::VideoProcessingError,
};

/// A decoded frame and the time at which it is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedFrame {
    /// Unit: Seconds from the start of the video
    pub timestamp: f64,
    pub image: RgbImage,
}

impl TimedFrame {
    pub fn new(timestamp: f64, image: RgbImage) -> Self {
        Self { timestamp, image }
    }
}

/// Anything that hands out frames in presentation order.
pub trait FrameSource {
    /// The next frame, or `Ok(None)` once the source is exhausted.
    ///
    /// # errors
    /// * The source stopped before its end (e.g. the decoder failed or timed out)
    fn next_frame(&mut self) -> Result<Option<TimedFrame>, VideoProcessingError>;
}

// In-memory frames can never fail.
impl<I> FrameSource for I
where
    I: Iterator<Item = TimedFrame>,
{
    fn next_frame(&mut self) -> Result<Option<TimedFrame>, VideoProcessingError> {
        Ok(self.next())
    }
}

/// Limits applied when decoding a video with [`FfmpegFrameSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSourceCfg {
    /// Seconds to skip at the start of the video.
    pub skip_forward: f64,
    /// Stop after this many frames.
    pub max_frames: Option<u32>,
    /// Give up decoding after this many seconds. No limit when `None`.
    pub timeout_secs: Option<u64>,
}

impl Default for FrameSourceCfg {
    fn default() -> Self {
        Self {
            skip_forward: 0.0,
            max_frames: None,
            timeout_secs: None,
        }
    }
}

/// Frames of a video file decoded by an ffmpeg child process.
///
/// Timestamps are derived from the frame index and the frame rate reported by ffprobe,
/// offset by any skipped time at the start of the video.
#[derive(Debug)]
pub struct FfmpegFrameSource {
    src_path: PathBuf,
    frames: FfmpegFrameIterRgb,
    info: VideoInfo,
    fps: f64,
    start_offset: f64,
    index: u64,
}

impl FfmpegFrameSource {
    pub fn open(src_path: impl AsRef<Path>, cfg: &FrameSourceCfg) -> Result<Self, VideoProcessingError> {
        let src_path = src_path.as_ref();

        let mut builder = FfmpegFrameReaderBuilder::new(src_path);
        if let Some(timeout_secs) = cfg.timeout_secs {
            builder.timeout_secs(timeout_secs);
        }
        if cfg.skip_forward > 0.0 {
            builder.skip_forward(cfg.skip_forward);
        }
        if let Some(max_frames) = cfg.max_frames {
            builder.num_frames(max_frames);
        }

        let (frames, info) = builder
            .spawn_rgb()
            .map_err(|error| VideoProcessingError::Open {
                src_path: src_path.to_path_buf(),
                error,
            })?;

        let fps = match info.frame_rate() {
            Some(fps) => fps,
            None => {
                warn!(
                    "No usable frame rate reported for {}. Assuming {DEFAULT_FPS} fps",
                    src_path.display()
                );
                DEFAULT_FPS
            }
        };

        debug!(
            "Opened {} ({} bytes): {:?} at {fps:.3} fps, duration {:.3}s",
            src_path.display(),
            info.file_size(),
            info.resolution(),
            info.duration().as_secs_f64()
        );

        Ok(Self {
            src_path: src_path.to_path_buf(),
            frames,
            info,
            fps,
            start_offset: cfg.skip_forward.max(0.0),
            index: 0,
        })
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// The frame rate used to compute timestamps.
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> Result<Option<TimedFrame>, VideoProcessingError> {
        let Some(image) = self.frames.next() else {
            return match self.frames.error() {
                Some(error) => Err(VideoProcessingError::Decode {
                    src_path: self.src_path.clone(),
                    frames_read: self.frames.frames_read(),
                    error: error.clone(),
                }),
                None => Ok(None),
            };
        };

        let timestamp = frame_timestamp(self.start_offset, self.index, self.fps);
        self.index += 1;
        Ok(Some(TimedFrame { timestamp, image }))
    }
}

/// Time at which frame `index` is shown, for a stream starting `start_offset` seconds in.
pub fn frame_timestamp(start_offset: f64, index: u64, fps: f64) -> f64 {
    start_offset + index as f64 / fps
}
