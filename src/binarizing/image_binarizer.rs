use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::{
    binarizing::color_distance::{ColorDistanceFinder, EuclideanColorDistance},
    definitions::DEFAULT_THRESHOLD_POLICY,
    BinaryGrid,
};

/// Whether a pixel whose distance from the target color is exactly the threshold
/// counts as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThresholdPolicy {
    /// foreground when `distance <= threshold`
    #[default]
    Inclusive,
    /// foreground when `distance < threshold`
    Exclusive,
}

impl ThresholdPolicy {
    #[must_use]
    pub fn accepts(self, distance: f64, threshold: f64) -> bool {
        match self {
            Self::Inclusive => distance <= threshold,
            Self::Exclusive => distance < threshold,
        }
    }
}

/// Converts color images into binary grids and back.
pub trait ImageBinarizer {
    /// Classify every pixel of `image` as foreground or background.
    fn to_binary_grid(&self, image: &RgbImage) -> BinaryGrid;

    /// Render a binary grid as a black and white image: foreground is white (255)
    /// and background is black (0).
    fn to_mask_image(&self, grid: &BinaryGrid) -> GrayImage {
        GrayImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
            if grid.is_foreground(x as usize, y as usize) {
                Luma([u8::MAX])
            } else {
                Luma([0])
            }
        })
    }
}

/// Marks a pixel as foreground when its color is within `threshold` of a target color,
/// as measured by a [`ColorDistanceFinder`].
#[derive(Debug, Clone)]
pub struct DistanceImageBinarizer<D = EuclideanColorDistance> {
    distance_finder: D,
    target_color: Rgb<u8>,
    threshold: f64,
    policy: ThresholdPolicy,
}

impl<D> DistanceImageBinarizer<D>
where
    D: ColorDistanceFinder,
{
    pub fn new(distance_finder: D, target_color: Rgb<u8>, threshold: f64) -> Self {
        Self {
            distance_finder,
            target_color,
            threshold,
            policy: DEFAULT_THRESHOLD_POLICY,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn target_color(&self) -> Rgb<u8> {
        self.target_color
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    fn is_foreground(&self, pixel: Rgb<u8>) -> bool {
        let distance = self.distance_finder.distance(pixel, self.target_color);
        self.policy.accepts(distance, self.threshold)
    }
}

impl<D> ImageBinarizer for DistanceImageBinarizer<D>
where
    D: ColorDistanceFinder,
{
    fn to_binary_grid(&self, image: &RgbImage) -> BinaryGrid {
        let (width, height) = image.dimensions();
        BinaryGrid::from_fn(width as usize, height as usize, |x, y| {
            self.is_foreground(*image.get_pixel(x as u32, y as u32))
        })
    }
}
