#![allow(clippy::len_without_is_empty)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]

//! # Overview
//! centroid_finder is a library for tracking a colored object through a video. For every
//! frame it finds the largest connected group of pixels that are close to a target color, and
//! reports the centroid of that group.
//!
//! # How it works
//! Each frame passes through three stages:
//! * An [`ImageBinarizer`] decides for each pixel whether it is foreground. The provided
//!   [`DistanceImageBinarizer`] compares every pixel against a target color using a
//!   [`ColorDistanceFinder`] and a threshold.
//! * A [`BinaryGroupFinder`] splits the foreground of the resulting [`BinaryGrid`] into groups.
//!   Two cells belong to the same group when they are joined by a path of up/down/left/right steps
//!   (diagonal neighbours do not count). Groups are returned largest first.
//! * A [`CentroidSink`] records the largest group, or a `-1,-1` sentinel when there is none.
//!
//! # Labeling a grid directly
//! ```rust
//! use centroid_finder::{label_rows, Coordinate, Group};
//!
//! let rows = vec![
//!     Some(vec![1, 1, 0, 0]),
//!     Some(vec![0, 0, 0, 1]),
//!     Some(vec![0, 0, 1, 1]),
//! ];
//! let groups = label_rows(&rows).unwrap();
//!
//! assert_eq!(
//!     groups,
//!     vec![
//!         Group::new(3, Coordinate::new(2, 1)),
//!         Group::new(2, Coordinate::new(0, 0)),
//!     ]
//! );
//! ```
//!
//! # Processing a video
//! [`FfmpegFrameSource`] decodes a video with ffmpeg and [`VideoProcessor`] drives every frame
//! through the stages above.
//! ```rust,no_run
//! use centroid_finder::*;
//! use image::Rgb;
//!
//! let mut source = FfmpegFrameSource::open("ball.mp4", &FrameSourceCfg::default()).unwrap();
//! let out = std::io::BufWriter::new(std::fs::File::create("ball.csv").unwrap());
//! let mut sink = CsvCentroidSink::new(out).unwrap();
//!
//! let binarizer = DistanceImageBinarizer::new(EuclideanColorDistance, Rgb([255, 0, 0]), 60.0);
//! let processor = VideoProcessor::new(binarizer, BfsBinaryGroupFinder);
//! let summary = processor.process(&mut source, &mut sink).unwrap();
//! println!("found the ball in {} of {} frames", summary.frames_with_group, summary.frames);
//! ```
//!
//! # Prerequisites
//! Decoding videos calls Ffmpeg from the command line. You must make Ffmpeg and Ffprobe available
//! on the command line, for example:
//!
//! * Debian-based systems: ```# apt-get install ffmpeg```
//! * Yum-based systems: ```# yum install ffmpeg```
//! * Windows:
//!     1) Download the correct installer from <https://ffmpeg.org/download.html>
//!     2) Run the installer and install ffmpeg to any directory
//!     3) Add the directory into the PATH environment variable
//!
//! Labeling grids and images does not need ffmpeg.

pub(crate) mod binarizing;
pub(crate) mod definitions;
pub(crate) mod group_finding;
pub(crate) mod video_processing;

pub use binarizing::{
    binarizing_image_group_finder::{BinarizingImageGroupFinder, ImageGroupFinder},
    color_distance::{rgb_from_hex, rgb_to_hex, ColorDistanceFinder, EuclideanColorDistance},
    image_binarizer::{DistanceImageBinarizer, ImageBinarizer, ThresholdPolicy},
};
pub use definitions::{DEFAULT_FPS, DEFAULT_THRESHOLD_POLICY, NO_GROUP_SENTINEL};
pub use group_finding::{
    binary_grid::BinaryGrid,
    binary_group_finder::{find_connected_groups, label_rows, BfsBinaryGroupFinder, BinaryGroupFinder},
    group::{Coordinate, Group},
    GroupFinderError,
};
pub use video_processing::{
    centroid_sink::{CentroidSink, CsvCentroidSink, JsonLinesCentroidSink},
    frame_source::{frame_timestamp, FfmpegFrameSource, FrameSource, FrameSourceCfg, TimedFrame},
    video_processor::{FrameErrorPolicy, ProcessingSummary, VideoProcessor},
    VideoProcessingError,
};
