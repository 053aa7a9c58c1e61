use std::{fs::File, io::BufWriter, path::Path};

use centroid_finder::*;
use eyre::WrapErr;
use ffmpeg_cmdline_utils::{extract_frame_png, ffmpeg_and_ffprobe_are_callable, is_video_file};
use itertools::Itertools;

use crate::app::*;

// * read cfg
// * validate input
// * save thumbnail
// * process every frame into the output file
// * report

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.output_cfg.verbosity);

    let ret = match run_app_inner(&cfg) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.output_cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<()> {
    let input = &cfg.input_cfg.input;
    let output = &cfg.output_cfg.output;

    validate_input(input)?;

    if let Some(thumbnail) = &cfg.output_cfg.thumbnail {
        extract_frame_png(input, thumbnail.at_secs, &thumbnail.path).wrap_err_with(|| {
            format!(
                "Failed to save thumbnail at {:.3}s to {}",
                thumbnail.at_secs,
                thumbnail.path.display()
            )
        })?;
        info!("Saved thumbnail: {}", thumbnail.path.display());
    }

    let source_cfg = FrameSourceCfg {
        skip_forward: cfg.input_cfg.skip_forward,
        max_frames: cfg.input_cfg.max_frames,
        ..FrameSourceCfg::default()
    };
    let mut source = FfmpegFrameSource::open(input, &source_cfg)?;

    let detection = &cfg.detection_cfg;
    let binarizer = DistanceImageBinarizer::new(
        EuclideanColorDistance,
        detection.target_color,
        f64::from(detection.threshold),
    )
    .with_policy(detection.threshold_policy);

    let mut processor =
        VideoProcessor::new(binarizer, BfsBinaryGroupFinder).with_error_policy(cfg.output_cfg.on_frame_error);
    if let Some(mask_dir) = &cfg.output_cfg.mask_dir {
        processor = processor.with_mask_dir(mask_dir);
    }

    let writer = BufWriter::new(
        File::create(output).wrap_err_with(|| format!("Failed to create output file {}", output.display()))?,
    );

    let mut sink: Box<dyn CentroidSink> = match cfg.output_cfg.format {
        OutputFormat::Csv => Box::new(CsvCentroidSink::new(writer)?),
        OutputFormat::JsonLines => Box::new(JsonLinesCentroidSink::new(writer)),
    };

    let summary = processor
        .process(&mut source, &mut sink)
        .wrap_err_with(|| format!("Failed to process {}", input.display()))?;

    report_summary(cfg, &summary);

    Ok(())
}

// Checks that run before any decoding, so that the most common mistakes get a clear message.
fn validate_input(input: &Path) -> Result<(), AppError> {
    if !input.is_file() {
        return Err(AppError::InputNotFound(input.to_path_buf()));
    }

    if !ffmpeg_and_ffprobe_are_callable() {
        return Err(AppError::FfmpegNotCallable);
    }

    match is_video_file(input) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::NotAVideo(input.to_path_buf())),
        Err(error) => Err(AppError::Probe {
            path: input.to_path_buf(),
            error,
        }),
    }
}

fn report_summary(cfg: &AppCfg, summary: &ProcessingSummary) {
    let detection = &cfg.detection_cfg;

    info!("Video processed successfully");
    info!("    Input file: {}", cfg.input_cfg.input.display());
    info!("    Output file: {}", cfg.output_cfg.output.display());
    info!("    Target color: #{:06X}", rgb_to_hex(detection.target_color));
    info!(
        "    Threshold: {} ({:?})",
        detection.threshold, detection.threshold_policy
    );
    info!("    Frames: {}", summary.frames);
    info!("    Frames with a detection: {}", summary.frames_with_group);

    if summary.frames_skipped > 0 {
        warn!("{} frames could not be processed and were recorded as having no detection", summary.frames_skipped);
    }

    if summary.frames == 0 {
        warn!("No frames were decoded from {}", cfg.input_cfg.input.display());
    }
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let causes = fatal_err.chain().skip(1).map(ToString::to_string).collect_vec();
        for cause in causes {
            error!(target: "app-errorlog", "    caused by: {}", cause);
        }
    } else if let Some(e) = fatal_err.source() {
        error!(target: "app-errorlog", "    caused by: {}", e);
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_time_level(LevelFilter::Off);

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    // Only fails if a logger is already installed, in which case that logger is kept.
    let _already_initialized = TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_missing_input_is_reported_first() {
        let res = validate_input(Path::new("/no/such/video/file.mp4"));
        assert!(matches!(res, Err(AppError::InputNotFound(p)) if p == PathBuf::from("/no/such/video/file.mp4")));
    }

    #[test]
    fn test_directory_is_not_an_input_file() {
        let res = validate_input(&std::env::temp_dir());
        assert!(matches!(res, Err(AppError::InputNotFound(_))));
    }
}
