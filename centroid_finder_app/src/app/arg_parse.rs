use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};
use image::Rgb;

use crate::app::{color_arg::*, *};

// input
const INPUT: &str = "Input video";
const SKIP_FORWARD: &str = "Skip forward";
const MAX_FRAMES: &str = "Max frames";

// detection
const COLOR: &str = "Target color";
const THRESHOLD: &str = "Threshold";
const THRESHOLD_POLICY: &str = "Threshold policy";

// output
const OUTPUT: &str = "Output file";
const OUTPUT_FORMAT: &str = "Format";
const ON_FRAME_ERROR: &str = "On frame error";
const MASK_DIR: &str = "Mask directory";
const THUMBNAIL: &str = "Thumbnail";
const THUMBNAIL_AT: &str = "Thumbnail time";

// Arg specification
const ARGS_FILE: &str = "Args file";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 15] = [
    //
    //input
    INPUT,
    SKIP_FORWARD,
    MAX_FRAMES,
    //
    //detection
    COLOR,
    THRESHOLD,
    THRESHOLD_POLICY,
    //
    //outputs
    OUTPUT,
    OUTPUT_FORMAT,
    ON_FRAME_ERROR,
    MASK_DIR,
    THUMBNAIL,
    THUMBNAIL_AT,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
    //
    //argument replacement
    ARGS_FILE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Centroid finder")
        .version(clap::crate_version!())
        .about("Track the largest patch of a target color through a video, writing its centroid for every frame");

    clap_app = clap_app.arg(
        clap::Arg::new(INPUT)
            .long("input")
            .required_unless_present(ARGS_FILE)
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("The video file to process")
            .display_order(get_ordering(INPUT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SKIP_FORWARD)
            .long("skip-forward")
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Start processing this many seconds into the video. Timestamps in the output are still measured from the start of the video")
            .display_order(get_ordering(SKIP_FORWARD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_FRAMES)
            .long("max-frames")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .help("Stop after processing this many frames")
            .display_order(get_ordering(MAX_FRAMES)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(COLOR)
            .long("color")
            .required_unless_present(ARGS_FILE)
            .num_args(1)
            .value_parser(parse_hex_color)
            .allow_hyphen_values(true)
            .help("The color to track, as #RRGGBB, 0xRRGGBB or RRGGBB")
            .display_order(get_ordering(COLOR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(THRESHOLD)
            .long("threshold")
            .required_unless_present(ARGS_FILE)
            .num_args(1)
            .value_parser(parse_threshold)
            .allow_hyphen_values(true)
            .help("Pixels whose euclidean RGB distance from the target color is within this value are part of the object")
            .display_order(get_ordering(THRESHOLD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(THRESHOLD_POLICY)
            .long("threshold-policy")
            .num_args(1)
            .value_parser(value_parser!(ThresholdPolicyArg))
            .default_value("inclusive")
            .help("Whether a pixel exactly --threshold away from the target color matches (inclusive) or not (exclusive)")
            .display_order(get_ordering(THRESHOLD_POLICY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT)
            .long("output")
            .required_unless_present(ARGS_FILE)
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("Where to write one row per frame. Existing files are overwritten")
            .display_order(get_ordering(OUTPUT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_FORMAT)
            .long("output-format")
            .num_args(1)
            .value_parser(value_parser!(OutputFormat))
            .default_value("csv")
            .help("csv writes 'time,x,y' rows. json-lines writes one object per frame which also holds the size of the group")
            .display_order(get_ordering(OUTPUT_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(ON_FRAME_ERROR)
            .long("on-frame-error")
            .num_args(1)
            .value_parser(value_parser!(FrameErrorPolicyArg))
            .default_value("abort")
            .help("What to do when a frame cannot be processed: stop, or record the frame as having no object and continue")
            .display_order(get_ordering(ON_FRAME_ERROR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MASK_DIR)
            .long("mask-dir")
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("Also save the black and white mask of every frame into this directory")
            .display_order(get_ordering(MASK_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(THUMBNAIL)
            .long("thumbnail")
            .num_args(1)
            .value_parser(value_parser!(PathBuf))
            .help("Save a single frame of the video to this PNG file before processing")
            .display_order(get_ordering(THUMBNAIL)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(THUMBNAIL_AT)
            .long("thumbnail-at")
            .num_args(1)
            .requires(THUMBNAIL)
            .value_parser(value_parser!(f64))
            .default_value("0")
            .help("Time in seconds of the frame saved by --thumbnail")
            .display_order(get_ordering(THUMBNAIL_AT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(ARGS_FILE)
            .long("args-file")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Read command line arguments from a file. Text from a '#' at the start of a word to the end of the line is ignored, so quote colors like '#FF0000'. If this argument is used it must be the only argument")
            .display_order(get_ordering(ARGS_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

pub fn parse_args() -> AppCfg {
    //capture the cwd once, to minimize the risk of working with two values if it is changed by the OS at runtime.
    let cwd = std::env::current_dir().unwrap_or_else(|e| print_error_and_quit(eyre::Report::new(e)));

    //Start by parsing the provided arguments from the commandline. If the --args-file
    //argument is provided, then we will ignore the true command line arguments and
    //take the arguments from the file instead.
    let args = get_args_from_cmdline_or_file();

    cfg_from_matches(&args, &cwd)
}

fn cfg_from_matches(args: &clap::ArgMatches, cwd: &Path) -> AppCfg {
    let input_cfg = InputCfg {
        input: args
            .get_one::<PathBuf>(INPUT)
            .map(|p| absolutify_path(cwd, p))
            .unwrap_or_default(),
        skip_forward: args.get_one::<f64>(SKIP_FORWARD).copied().unwrap_or(0.0),
        max_frames: args.get_one::<u32>(MAX_FRAMES).copied(),
    };

    let detection_cfg = DetectionCfg {
        target_color: args.get_one::<Rgb<u8>>(COLOR).copied().unwrap_or(Rgb([0, 0, 0])),
        threshold: args.get_one::<u32>(THRESHOLD).copied().unwrap_or(0),
        threshold_policy: (*args
            .get_one::<ThresholdPolicyArg>(THRESHOLD_POLICY)
            .expect("This argument has a default value"))
        .into(),
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let thumbnail = args.get_one::<PathBuf>(THUMBNAIL).map(|path| ThumbnailCfg {
        path: absolutify_path(cwd, path),
        at_secs: *args
            .get_one::<f64>(THUMBNAIL_AT)
            .expect("This argument has a default value"),
    });

    let output_cfg = OutputCfg {
        output: args
            .get_one::<PathBuf>(OUTPUT)
            .map(|p| absolutify_path(cwd, p))
            .unwrap_or_default(),
        format: *args
            .get_one::<OutputFormat>(OUTPUT_FORMAT)
            .expect("This argument has a default value"),
        on_frame_error: (*args
            .get_one::<FrameErrorPolicyArg>(ON_FRAME_ERROR)
            .expect("This argument has a default value"))
        .into(),
        mask_dir: args.get_one::<PathBuf>(MASK_DIR).map(|p| absolutify_path(cwd, p)),
        thumbnail,
        verbosity,
    };

    let ret = AppCfg {
        input_cfg,
        detection_cfg,
        output_cfg,
    };

    ret
}

// Arguments are always first read from the command line, but if --args-file
// is present, then arguments are actually located in a file on disk.
// This fn obtains the args from the correct location.
fn get_args_from_cmdline_or_file() -> clap::ArgMatches {
    let cmdline_args = build_app().get_matches();

    match cmdline_args.get_one::<PathBuf>(ARGS_FILE) {
        None => cmdline_args,
        Some(args_path) => get_argsfile_args(args_path),
    }
}

fn get_argsfile_args(argsfile_path: &Path) -> clap::ArgMatches {
    let args = read_argsfile(argsfile_path)
        .map_err(eyre::Report::new)
        .unwrap_or_else(|e| print_error_and_quit(e));

    //When parsing args from file, the binary name will not be present,
    // so update the parser that we use to not expect it.
    let matches = build_app().no_binary_name(true).get_matches_from(args);
    matches
}

fn read_argsfile(argsfile_path: &Path) -> Result<Vec<String>, AppError> {
    let argsfile_err = |reason: String| AppError::ArgsFile {
        path: argsfile_path.to_path_buf(),
        reason,
    };

    let text = std::fs::read_to_string(argsfile_path).map_err(|e| argsfile_err(e.to_string()))?;

    //the arguments file needs to be split into args in the same way as the shell would do it.
    //call out to an external crate for this.
    shell_words::split(&strip_comments(&text)).map_err(|e| argsfile_err(e.to_string()))
}

// Removes everything from an unquoted '#' that starts a word to the end of its line.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for line in text.lines() {
        let mut quote = None;
        let mut escaped = false;
        let mut prev_is_space = true;

        for c in line.chars() {
            match (quote, c) {
                _ if escaped => escaped = false,
                (Some('\''), '\'') => quote = None,
                (Some('\''), _) => (),
                (_, '\\') => escaped = true,
                (Some('"'), '"') => quote = None,
                (None, '\'' | '"') => quote = Some(c),
                (None, '#') if prev_is_space => break,
                _ => (),
            }
            prev_is_space = c.is_whitespace();
            out.push(c);
        }
        out.push('\n');
    }

    out
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    //get the absolute path if it is not absolute, by prepending the cwd.
    let path = if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    };

    //the output file usually doesn't exist yet, in which case canonicalizing fails. Carry on with the joined path.
    let p = path.canonicalize().unwrap_or(path);

    p
}
