use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    video_processing::{centroid_sink::CentroidSink, frame_source::FrameSource, VideoProcessingError},
    BinarizingImageGroupFinder, BinaryGroupFinder, Group, ImageBinarizer,
};

/// What to do when a single frame cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameErrorPolicy {
    /// Stop processing and return the error.
    #[default]
    Abort,
    /// Log a warning, record "no group" for the frame and carry on.
    Skip,
}

/// Counts gathered over one run of [`VideoProcessor::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// Frames read from the source. Each one produced exactly one output row.
    pub frames: u64,
    /// Frames in which at least one group was found.
    pub frames_with_group: u64,
    /// Frames that failed and were written as "no group" under [`FrameErrorPolicy::Skip`].
    pub frames_skipped: u64,
}

/// Runs every frame of a [`FrameSource`] through binarization and labeling, and writes
/// the largest group of each frame to a [`CentroidSink`].
#[derive(Debug, Clone)]
pub struct VideoProcessor<B, F> {
    finder: BinarizingImageGroupFinder<B, F>,
    error_policy: FrameErrorPolicy,
    mask_dir: Option<PathBuf>,
}

impl<B, F> VideoProcessor<B, F>
where
    B: ImageBinarizer,
    F: BinaryGroupFinder,
{
    pub fn new(binarizer: B, group_finder: F) -> Self {
        Self {
            finder: BinarizingImageGroupFinder::new(binarizer, group_finder),
            error_policy: FrameErrorPolicy::default(),
            mask_dir: None,
        }
    }

    pub fn with_error_policy(mut self, error_policy: FrameErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    /// Also save each binarized frame as `mask_NNNNNN.png` in `mask_dir`.
    pub fn with_mask_dir(mut self, mask_dir: impl AsRef<Path>) -> Self {
        self.mask_dir = Some(mask_dir.as_ref().to_path_buf());
        self
    }

    pub fn error_policy(&self) -> FrameErrorPolicy {
        self.error_policy
    }

    pub fn binarizer(&self) -> &B {
        self.finder.binarizer()
    }

    /// Process frames until the source is exhausted, then finish the sink.
    ///
    /// # errors
    /// * Writing to the sink failed (regardless of the error policy)
    /// * The mask directory could not be created
    /// * The source failed before its end (regardless of the error policy)
    /// * A frame failed and the policy is [`FrameErrorPolicy::Abort`]
    pub fn process<S, K>(&self, source: &mut S, sink: &mut K) -> Result<ProcessingSummary, VideoProcessingError>
    where
        S: FrameSource + ?Sized,
        K: CentroidSink + ?Sized,
    {
        if let Some(mask_dir) = &self.mask_dir {
            std::fs::create_dir_all(mask_dir).map_err(|e| VideoProcessingError::Mask {
                path: mask_dir.clone(),
                error: e.to_string(),
            })?;
        }

        let mut summary = ProcessingSummary::default();
        let mut expected_resolution = None;

        while let Some(frame) = source.next_frame()? {
            let index = summary.frames;
            let resolution = frame.image.dimensions();
            let expected = *expected_resolution.get_or_insert(resolution);

            let result = if resolution == expected {
                self.process_frame(index, &frame.image)
            } else {
                Err(VideoProcessingError::FrameSize {
                    index,
                    expected,
                    actual: resolution,
                })
            };

            let best = match result {
                Ok(best) => best,
                Err(e) => match self.error_policy {
                    FrameErrorPolicy::Abort => return Err(e),
                    FrameErrorPolicy::Skip => {
                        warn!("Skipping frame {index} at {:.3}s: {e}", frame.timestamp);
                        summary.frames_skipped += 1;
                        None
                    }
                },
            };

            sink.write_frame(frame.timestamp, best.as_ref())
                .map_err(|error| VideoProcessingError::Sink { index, error })?;

            summary.frames += 1;
            if best.is_some() {
                summary.frames_with_group += 1;
            }
        }

        sink.finish().map_err(|error| VideoProcessingError::Sink {
            index: summary.frames,
            error,
        })?;

        debug!("Processing finished: {summary:?}");

        Ok(summary)
    }

    fn process_frame(&self, index: u64, image: &RgbImage) -> Result<Option<Group>, VideoProcessingError> {
        let (grid, groups) = self.finder.find_groups_with_grid(image);

        if let Some(mask_dir) = &self.mask_dir {
            let path = mask_dir.join(format!("mask_{index:06}.png"));
            self.finder
                .binarizer()
                .to_mask_image(&grid)
                .save(&path)
                .map_err(|e| VideoProcessingError::Mask {
                    path,
                    error: e.to_string(),
                })?;
        }

        Ok(groups.into_iter().next())
    }
}
