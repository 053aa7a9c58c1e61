use crate::ThresholdPolicy;

/// The frame rate assumed when the container does not report a usable one.
///
/// Unit: Frames per second
pub const DEFAULT_FPS: f64 = 30.0;

/// Whether a pixel exactly `threshold` away from the target color counts as foreground.
pub const DEFAULT_THRESHOLD_POLICY: ThresholdPolicy = ThresholdPolicy::Inclusive;

/// Written in place of both centroid coordinates when no group was found in a frame,
/// so that "nothing detected" can never be confused with a detection at the origin.
pub const NO_GROUP_SENTINEL: i64 = -1;
