use std::path::PathBuf;

use ffmpeg_cmdline_utils::FfmpegError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /////////////////////////////////
    //argument problems
    #[error("Invalid color {0:?}. Use #RRGGBB, 0xRRGGBB or RRGGBB (e.g. #FF0000)")]
    BadColor(String),

    #[error("Invalid threshold {0:?}. Must be a non-negative integer")]
    BadThreshold(String),

    #[error("Failed to parse args file at location {path}: {reason}")]
    ArgsFile { path: PathBuf, reason: String },

    /////////////////////////////////
    //input validation
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("ffmpeg/ffprobe not found. Make sure ffmpeg/ffprobe are installed and visible on the command line")]
    FfmpegNotCallable,

    #[error("Not a video file: {0}")]
    NotAVideo(PathBuf),

    #[error("Failed to determine whether {path} is a video")]
    Probe {
        path: PathBuf,
        #[source]
        error: FfmpegError,
    },
}

pub fn print_error_and_quit(e: eyre::Report) -> ! {
    #[allow(clippy::print_stderr)]
    let () = eprintln!("{:?}", e);
    std::process::exit(1);
}
