pub mod centroid_sink;
pub mod frame_source;
pub mod video_processor;

use std::path::PathBuf;

use ffmpeg_cmdline_utils::FfmpegError;
use thiserror::Error;

/// Reasons a video could not be processed to completion.
#[derive(Error, Debug)]
pub enum VideoProcessingError {
    /// The video could not be probed or ffmpeg could not be started.
    #[error("Failed to open video {src_path}: {error}")]
    Open { src_path: PathBuf, error: FfmpegError },

    /// Decoding stopped before the end of the video.
    #[error("Decoding {src_path} failed after {frames_read} frames: {error}")]
    Decode {
        src_path: PathBuf,
        frames_read: u32,
        error: FfmpegError,
    },

    /// A frame did not have the same resolution as the first frame of the video.
    #[error("Frame {index} is {actual:?} pixels but earlier frames were {expected:?}")]
    FrameSize {
        index: u64,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Writing to the output failed.
    #[error("Failed to write result for frame {index}: {error}")]
    Sink { index: u64, error: std::io::Error },

    /// A binarized frame could not be saved to the mask directory.
    #[error("Failed to write mask image {path}: {error}")]
    Mask { path: PathBuf, error: String },
}
