use std::{
    ffi::OsStr,
    io::prelude::*,
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    thread::JoinHandle,
    time::{Duration, Instant},
};

#[cfg(target_family = "windows")]
use std::os::windows::process::CommandExt;

use image::RgbImage;
use wait_timeout::ChildExt;
use FfmpegCommandName::*;
use FfmpegError::*;

use crate::*;

const FFPROBE_TIMEOUT_SECS: u64 = 60;

// How long ffmpeg gets to exit after it has closed its output.
const EXIT_GRACE_SECS: u64 = 60;

// Refuse to allocate frame buffers for implausible resolutions.
const MAX_FRAME_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Iterator over the decoded frames of a video, in presentation order.
///
/// Iteration ends when ffmpeg has no more frames to give, when the requested number of
/// frames has been read or when the timeout given to [`FfmpegFrameReaderBuilder::timeout_secs`]
/// has elapsed. Once it has ended, [`FfmpegFrameIterRgb::error`] tells a clean end of the
/// video apart from a failed decode. The ffmpeg child process is killed and reaped when the
/// iterator is dropped.
#[derive(Debug)]
pub struct FfmpegFrameIterRgb {
    width: u32,
    height: u32,
    frame_bytes: usize,
    child: Child,
    stderr_thread: Option<JoinHandle<Vec<u8>>>,
    num_frames: u32,
    frames_read: u32,
    timeout_secs: Option<u64>,
    deadline: Option<Instant>,
    finished: bool,
    error: Option<FfmpegError>,
}

impl FfmpegFrameIterRgb {
    fn from_child(
        mut child: Child,
        (width, height): (u32, u32),
        num_frames: Option<u32>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, FfmpegError> {
        let frame_bytes = frame_bytes(width, height)?;
        let stderr_thread = child.stderr.take().map(drain_in_thread);
        let deadline = timeout_secs.and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));

        Ok(Self {
            width,
            height,
            frame_bytes,
            child,
            stderr_thread,
            num_frames: num_frames.unwrap_or(u32::MAX),
            frames_read: 0,
            timeout_secs,
            deadline,
            finished: false,
            error: None,
        })
    }

    /// Number of frames yielded so far.
    pub fn frames_read(&self) -> u32 {
        self.frames_read
    }

    /// The reason iteration stopped before the end of the video, if it did.
    ///
    /// Always `None` while frames are still being yielded, after a clean end of the video
    /// and after the requested number of frames has been read.
    pub fn error(&self) -> Option<&FfmpegError> {
        self.error.as_ref()
    }

    fn finish(&mut self) {
        self.finished = true;
        let _kill_error = self.child.kill();
        let _wait_error = self.child.wait();
    }

    fn fail(&mut self, error: FfmpegError) {
        self.finish();
        self.error = Some(error);
    }

    // ffmpeg stopped writing before a whole frame arrived. Its exit status decides whether
    // that was the end of the video or a failure.
    fn finish_after_short_read(&mut self, read_error: &std::io::Error) {
        if read_error.kind() != std::io::ErrorKind::UnexpectedEof {
            self.fail(Io(format!("{:?}", read_error.kind())));
            return;
        }

        match self.child.wait_timeout(Duration::from_secs(EXIT_GRACE_SECS)) {
            Ok(Some(status)) if status.success() => self.finished = true,
            Ok(Some(status)) => {
                self.finished = true;
                let stderr = self.stderr_thread.take().and_then(|h| h.join().ok()).unwrap_or_default();
                self.error = Some(match ffmpeg_err_msg(&stderr) {
                    FfmpegInternal(msg) if msg.is_empty() => FfmpegInternal(format!("ffmpeg exited with {status}")),
                    error => error,
                });
            }
            Ok(None) => self.fail(Timeout(EXIT_GRACE_SECS)),
            Err(e) => self.fail(io_err(&e)),
        }
    }
}

impl Iterator for FfmpegFrameIterRgb {
    type Item = RgbImage;

    fn next(&mut self) -> Option<RgbImage> {
        if self.finished {
            return None;
        }

        if self.frames_read >= self.num_frames {
            self.finish();
            return None;
        }

        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.fail(Timeout(self.timeout_secs.unwrap_or_default()));
            return None;
        }

        let mut raw_buf = vec![0u8; self.frame_bytes];

        let read_result = match self.child.stdout.as_mut() {
            Some(stdout) => stdout.read_exact(&mut raw_buf),
            None => Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe)),
        };
        if let Err(e) = read_result {
            self.finish_after_short_read(&e);
            return None;
        }

        match RgbImage::from_raw(self.width, self.height, raw_buf) {
            Some(frame) => {
                self.frames_read += 1;
                Some(frame)
            }
            None => {
                self.fail(InvalidResolution);
                None
            }
        }
    }
}

// to prevent accumulation of zombie processes, reap the return code of
// ffmpeg subcommands (if nothing else has done so already) here
impl Drop for FfmpegFrameIterRgb {
    fn drop(&mut self) {
        let _kill_error = self.child.kill();
        let _wait_error = self.child.wait();
    }
}

// Size in bytes of one rgb24 frame.
fn frame_bytes(width: u32, height: u32) -> Result<usize, FfmpegError> {
    let bytes = u64::from(width) * u64::from(height) * 3;
    if width == 0 || height == 0 || bytes > MAX_FRAME_BYTES {
        return Err(InvalidResolution);
    }
    usize::try_from(bytes).map_err(|_| InvalidResolution)
}

/// Configures and spawns an ffmpeg process that decodes a video into raw RGB frames.
#[derive(Clone, Debug)]
pub struct FfmpegFrameReaderBuilder {
    src_path: PathBuf,
    num_frames: Option<u32>,
    skip_forward: Option<f64>,
    timeout_secs: Option<u64>,
}

impl FfmpegFrameReaderBuilder {
    pub fn new(src_path: impl AsRef<Path>) -> Self {
        Self {
            src_path: src_path.as_ref().to_path_buf(),
            num_frames: None,
            skip_forward: None,
            timeout_secs: None,
        }
    }

    pub fn src_path(&self) -> &Path {
        &self.src_path
    }

    /// Stop after this many frames have been decoded.
    pub fn num_frames(&mut self, num_frames: u32) -> &mut Self {
        self.num_frames = Some(num_frames);
        self
    }

    /// Start decoding this many seconds into the video. Negative values are treated as zero.
    pub fn skip_forward(&mut self, secs: f64) -> &mut Self {
        self.skip_forward = Some(secs.max(0.0));
        self
    }

    /// Stop yielding frames once this many seconds have passed since spawning. Reaching the
    /// timeout is reported through [`FfmpegFrameIterRgb::error`]. No timeout by default.
    pub fn timeout_secs(&mut self, timeout_secs: u64) -> &mut Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Probe the video and spawn ffmpeg.
    ///
    /// # errors
    /// * The video could not be probed by ffprobe
    /// * The video has no usable resolution (e.g it is an audio file)
    /// * ffmpeg could not be spawned
    pub fn spawn_rgb(&self) -> Result<(FfmpegFrameIterRgb, VideoInfo), FfmpegError> {
        //we need to find out the resolution of the video so that stdout can be converted into frames.
        let stats = VideoInfo::new(&self.src_path)?;

        // fail before spawning anything if the frames could never be buffered
        let resolution = stats.resolution();
        frame_bytes(resolution.0, resolution.1)?;

        let skip_forward_string = self.skip_forward.map(|secs| format!("{secs:.3}"));
        let num_frames_string = self.num_frames.map(|n| n.to_string());

        #[rustfmt::skip]
        let mut args = vec![
            OsStr::new("-hide_banner"),
            OsStr::new("-loglevel"), OsStr::new("warning"),
            OsStr::new("-nostats"),
        ];

        if let Some(secs) = &skip_forward_string {
            args.extend([OsStr::new("-ss"), OsStr::new(secs)]);
        }

        args.extend([OsStr::new("-i"), OsStr::new(&self.src_path)]);

        if let Some(n) = &num_frames_string {
            args.extend([OsStr::new("-vframes"), OsStr::new(n)]);
        }

        #[rustfmt::skip]
        args.extend([
            OsStr::new("-pix_fmt"),  OsStr::new("rgb24"),
            OsStr::new("-c:v"),      OsStr::new("rawvideo"),
            OsStr::new("-f"),        OsStr::new("image2pipe"),
            OsStr::new("-"),
        ]);

        // stderr is kept so that a failed decode can say why it failed.
        let child = spawn_ffmpeg_command(Ffmpeg, &args, false)?;

        let frame_iterator = FfmpegFrameIterRgb::from_child(child, resolution, self.num_frames, self.timeout_secs)?;

        Ok((frame_iterator, stats))
    }
}

/// Run ffprobe on a file and return its description of the container and streams as JSON.
pub fn get_video_stats<P: AsRef<Path>>(src_path: P) -> Result<String, FfmpegError> {
    #[rustfmt::skip]
    let args = &[
        OsStr::new("-v"),            OsStr::new("quiet"),
        OsStr::new("-show_format"),
        OsStr::new("-show_streams"),
        OsStr::new("-print_format"), OsStr::new("json"),
        OsStr::new(src_path.as_ref()),
    ];

    let stdout = run_ffmpeg_command(Ffprobe, args, true, FFPROBE_TIMEOUT_SECS)?.stdout;

    String::from_utf8(stdout).map_err(|_| Utf8Conversion)
}

/// True if ffprobe recognizes the file as containing at least one video stream.
pub fn is_video_file<P: AsRef<Path>>(src_path: P) -> Result<bool, FfmpegError> {
    #[rustfmt::skip]
    let args = &[
        OsStr::new("-v"),              OsStr::new("error"),
        OsStr::new("-select_streams"), OsStr::new("v"),
        OsStr::new("-show_entries"),   OsStr::new("stream=codec_type"),
        OsStr::new("-of"),             OsStr::new("compact=p=0:nk=1"),
        OsStr::new(src_path.as_ref()),
    ];

    let output = run_ffmpeg_command(Ffprobe, args, true, FFPROBE_TIMEOUT_SECS)?;
    let streams_string = String::from_utf8(output.stdout).map_err(|_| Utf8Conversion)?;

    Ok(streams_string.lines().any(|line| line.trim() == "video"))
}

pub fn ffmpeg_and_ffprobe_are_callable() -> bool {
    [Ffprobe, Ffmpeg].into_iter().all(|name| {
        run_ffmpeg_command(name, &[OsStr::new("-version")], true, FFPROBE_TIMEOUT_SECS).is_ok()
    })
}

/// Decode the frame `at_secs` seconds into `src_path` and save it to `dest_path`. The image
/// format is chosen by ffmpeg from the extension of `dest_path`. Existing files are overwritten.
pub fn extract_frame_png(
    src_path: impl AsRef<Path>,
    at_secs: f64,
    dest_path: impl AsRef<Path>,
) -> Result<(), FfmpegError> {
    let at_string = format!("{:.3}", at_secs.max(0.0));

    #[rustfmt::skip]
    let args = &[
        OsStr::new("-hide_banner"),
        OsStr::new("-loglevel"),  OsStr::new("error"),
        OsStr::new("-ss"),        OsStr::new(&at_string),
        OsStr::new("-i"),         OsStr::new(src_path.as_ref()),
        OsStr::new("-frames:v"),  OsStr::new("1"),
        OsStr::new("-y"),
        OsStr::new(dest_path.as_ref()),
    ];

    run_ffmpeg_command(Ffmpeg, args, false, FFPROBE_TIMEOUT_SECS).map(|_| ())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FfmpegCommandName {
    Ffprobe,
    Ffmpeg,
}

impl FfmpegCommandName {
    pub fn as_os_str(&self) -> &'static OsStr {
        match self {
            Self::Ffprobe => OsStr::new("ffprobe"),
            Self::Ffmpeg => OsStr::new("ffmpeg"),
        }
    }
}

fn io_err(e: &std::io::Error) -> FfmpegError {
    match e.kind() {
        //by far the most likely cause is ffmpeg is not installed.
        std::io::ErrorKind::NotFound => FfmpegNotFound,
        kind => Io(format!("{kind:?}")),
    }
}

fn spawn_ffmpeg_command(
    name: FfmpegCommandName,
    args: &[&OsStr],
    stderr_null: bool,
) -> Result<Child, FfmpegError> {
    let stderr_cfg = if stderr_null {
        Stdio::null()
    } else {
        Stdio::piped()
    };

    let mut command = Command::new(name.as_os_str());
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(stderr_cfg);

    //do not spawn a command window on windows when when in a gui application
    #[cfg(target_family = "windows")]
    command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);

    command.spawn().map_err(|e| io_err(&e))
}

struct FfmpegOutput {
    stdout: Vec<u8>,
}

//sometimes ffmpeg creates very long error messages. Limit them to the first 500 characters
fn ffmpeg_err_msg(stderr: &[u8]) -> FfmpegError {
    match std::str::from_utf8(stderr) {
        Ok(error_text) => FfmpegInternal(error_text.trim().chars().take(500).collect::<String>()),
        Err(_) => Utf8Conversion,
    }
}

fn drain_in_thread<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut acc = vec![];
        let _read_error = reader.read_to_end(&mut acc);
        acc
    })
}

fn run_ffmpeg_command(
    name: FfmpegCommandName,
    args: &[&OsStr],
    stderr_null: bool,
    timeout_secs: u64,
) -> Result<FfmpegOutput, FfmpegError> {
    let mut child = spawn_ffmpeg_command(name, args, stderr_null)?;

    // Both pipes are drained on their own threads so that a chatty child can never
    // block on a full pipe while we wait for it to exit.
    let stdout_thread = child.stdout.take().map(drain_in_thread);
    let stderr_thread = child.stderr.take().map(drain_in_thread);

    let status = match child.wait_timeout(Duration::from_secs(timeout_secs)) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _kill_error = child.kill();
            let _wait_error = child.wait();
            return Err(Timeout(timeout_secs));
        }
        Err(e) => {
            let _kill_error = child.kill();
            let _wait_error = child.wait();
            return Err(io_err(&e));
        }
    };

    let join = |handle: Option<JoinHandle<Vec<u8>>>| -> Result<Vec<u8>, FfmpegError> {
        match handle {
            Some(h) => h
                .join()
                .map_err(|_| Io("output reader thread panicked".to_string())),
            None => Ok(vec![]),
        }
    };

    let stdout = join(stdout_thread)?;
    let stderr = join(stderr_thread)?;

    if status.success() {
        Ok(FfmpegOutput { stdout })
    } else {
        Err(ffmpeg_err_msg(&stderr))
    }
}
