#![allow(clippy::let_and_return)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]

//! Calls `ffmpeg` and `ffprobe` from the command line.
//!
//! * [`VideoInfo`] asks ffprobe for the duration, resolution and frame rate of a video.
//! * [`FfmpegFrameReaderBuilder`] spawns ffmpeg to decode a video into raw RGB frames,
//!   which are read back one at a time through an iterator.
//! * [`extract_frame_png`] saves a single frame of a video as an image.
//!
//! Both programs must be installed and visible on the command line.

mod ffmpeg_error_kind;
mod ffmpeg_ops;
mod ffmpeg_stats;

pub use ffmpeg_error_kind::FfmpegError;
pub use ffmpeg_ops::{
    extract_frame_png, ffmpeg_and_ffprobe_are_callable, get_video_stats, is_video_file,
    FfmpegFrameIterRgb, FfmpegFrameReaderBuilder,
};
pub use ffmpeg_stats::{parse_frame_rate, VideoInfo, VideoInfoError};
