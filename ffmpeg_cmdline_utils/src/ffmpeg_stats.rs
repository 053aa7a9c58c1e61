use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::*;

#[derive(Debug, Deserialize, Serialize, Clone, Error, PartialEq, Eq)]
pub enum VideoInfoError {
    #[error("Error parsing stats: {0}")]
    JsonError(String),
    #[error("Error parsing stats: {0}")]
    ParseIntError(String),
    #[error("Error parsing stats: {0}")]
    ParseFloatError(String),
    #[error("Unexpected video rotation: {0}")]
    InvalidRotation(String),
}

impl From<serde_json::Error> for VideoInfoError {
    fn from(e: serde_json::Error) -> Self {
        //limit maximum number of characters
        let error_string = format!("{e}").chars().take(500).collect::<String>();
        VideoInfoError::JsonError(error_string)
    }
}

impl From<std::num::ParseIntError> for VideoInfoError {
    fn from(e: std::num::ParseIntError) -> Self {
        VideoInfoError::ParseIntError(format!("{e}"))
    }
}

impl From<std::num::ParseFloatError> for VideoInfoError {
    fn from(e: std::num::ParseFloatError) -> Self {
        VideoInfoError::ParseFloatError(format!("{e}"))
    }
}

/// Some of the video metadata that can be obtained by using ffprobe.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize, Default)]
pub struct VideoInfo {
    duration: Duration,
    file_size: u64,
    resolution: (u32, u32),
    frame_rate: Option<f64>,
}

impl VideoInfo {
    /// Use ffprobe to get the duration, resolution and frame rate of a video. If the video contains
    /// multiple streams then only information about the first video stream will be returned.
    ///
    /// # errors
    /// * The file cannot be read or is not recognized as a video by ffprobe
    /// * The output from ffprobe could not be parsed as JSON
    /// * The output from ffprobe contained malformed fields.
    pub fn new<P>(src_path: P) -> Result<Self, FfmpegError>
    where
        P: AsRef<Path>,
    {
        let stats_string = get_video_stats(&src_path)?;
        Ok(Self::from_ffprobe_json(&stats_string)?)
    }

    /// Interpret the output of `ffprobe -show_format -show_streams -print_format json`.
    pub fn from_ffprobe_json(stats_string: &str) -> Result<Self, VideoInfoError> {
        let stats_parsed: Value = serde_json::from_str(stats_string)?;

        let duration = match &stats_parsed["format"]["duration"] {
            Value::String(d) => Duration::from_secs_f64(d.parse::<f64>()?.max(0.0)),
            _ => Duration::ZERO,
        };

        let file_size = match &stats_parsed["format"]["size"] {
            Value::String(s) => s.parse()?,
            _ => 0,
        };

        let first_video = Self::first_video(&stats_parsed);

        let (width, height) = first_video.map_or((0, 0), |stream| {
            (
                Self::stream_u32(stream, "width").unwrap_or(0),
                Self::stream_u32(stream, "height").unwrap_or(0),
            )
        });

        // If the metadata declares a rotation, ffmpeg autorotates each frame it decodes, but
        // ffprobe reports the unrotated resolution. So swap the axes for quarter turns.
        let resolution = if first_video.map(Self::rotation).transpose()?.unwrap_or(0) % 180 == 0 {
            (width, height)
        } else {
            (height, width)
        };

        // avg_frame_rate is "0/0" for some containers, in which case r_frame_rate is still usable.
        let frame_rate = first_video.and_then(|stream| {
            ["avg_frame_rate", "r_frame_rate"]
                .iter()
                .filter_map(|field| stream[*field].as_str())
                .find_map(parse_frame_rate)
        });

        Ok(VideoInfo {
            duration,
            file_size,
            resolution,
            frame_rate,
        })
    }

    /// The duration of the video
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The size of the video in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// The resolution of the video in pixels.
    /// Note the returned value is correct for the orientation that the video is intended
    /// to be viewed. (Ffprobe returns a surprising value by default if the video is stored rotated)
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Frames per second of the first video stream, if ffprobe reported a usable value.
    pub fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    fn first_video(stats_parsed: &Value) -> Option<&Value> {
        stats_parsed["streams"]
            .as_array()?
            .iter()
            .find(|s| s["codec_type"].as_str() == Some("video"))
    }

    fn stream_u32(stream: &Value, field_name: &str) -> Option<u32> {
        stream[field_name]
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
    }

    // Rotation in degrees normalized to 0, 90, 180 or 270. Older ffprobes put it in
    // tags as a string, newer ones in the side data as a number.
    fn rotation(stream: &Value) -> Result<i64, VideoInfoError> {
        let raw = stream["side_data_list"]
            .as_array()
            .and_then(|list| list.iter().find_map(|sd| sd.get("rotation")))
            .or_else(|| stream["tags"].get("rotate"));

        let degrees = match raw {
            None => return Ok(0),
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| VideoInfoError::InvalidRotation(n.to_string()))?,
            Some(Value::String(s)) => s.trim().parse::<i64>()?,
            Some(other) => return Err(VideoInfoError::InvalidRotation(other.to_string())),
        };

        match degrees.rem_euclid(360) {
            r @ (0 | 90 | 180 | 270) => Ok(r),
            _ => Err(VideoInfoError::InvalidRotation(degrees.to_string())),
        }
    }
}

/// Parse a frame rate as printed by ffprobe, either a fraction such as `30000/1001`
/// or a plain number. Returns `None` for zero, negative or malformed rates.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let rate = rate.trim();
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.parse::<f64>().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}
