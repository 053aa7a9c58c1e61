use std::path::PathBuf;

use centroid_finder::{FrameErrorPolicy, ThresholdPolicy};
use image::Rgb;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Csv,
    JsonLines,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) enum ThresholdPolicyArg {
    Inclusive,
    Exclusive,
}

impl From<ThresholdPolicyArg> for ThresholdPolicy {
    fn from(arg: ThresholdPolicyArg) -> Self {
        match arg {
            ThresholdPolicyArg::Inclusive => ThresholdPolicy::Inclusive,
            ThresholdPolicyArg::Exclusive => ThresholdPolicy::Exclusive,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) enum FrameErrorPolicyArg {
    Abort,
    Skip,
}

impl From<FrameErrorPolicyArg> for FrameErrorPolicy {
    fn from(arg: FrameErrorPolicyArg) -> Self {
        match arg {
            FrameErrorPolicyArg::Abort => FrameErrorPolicy::Abort,
            FrameErrorPolicyArg::Skip => FrameErrorPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputCfg {
    pub input: PathBuf,
    pub skip_forward: f64,
    pub max_frames: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCfg {
    pub target_color: Rgb<u8>,
    pub threshold: u32,
    pub threshold_policy: ThresholdPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailCfg {
    pub path: PathBuf,
    pub at_secs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputCfg {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub on_frame_error: FrameErrorPolicy,
    pub mask_dir: Option<PathBuf>,
    pub thumbnail: Option<ThumbnailCfg>,

    pub verbosity: ReportVerbosity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppCfg {
    pub input_cfg: InputCfg,
    pub detection_cfg: DetectionCfg,
    pub output_cfg: OutputCfg,
}
