use image::RgbImage;

use crate::{
    binarizing::image_binarizer::ImageBinarizer,
    group_finding::{binary_grid::BinaryGrid, binary_group_finder::BinaryGroupFinder, group::Group},
};

/// Finds groups of pixels in a color image.
pub trait ImageGroupFinder {
    /// The connected groups of matching pixels in `image`, largest first.
    fn find_connected_groups(&self, image: &RgbImage) -> Vec<Group>;
}

/// An [`ImageGroupFinder`] that first binarizes the image and then labels the
/// resulting grid.
#[derive(Debug, Clone)]
pub struct BinarizingImageGroupFinder<B, F> {
    binarizer: B,
    group_finder: F,
}

impl<B, F> BinarizingImageGroupFinder<B, F>
where
    B: ImageBinarizer,
    F: BinaryGroupFinder,
{
    pub fn new(binarizer: B, group_finder: F) -> Self {
        Self {
            binarizer,
            group_finder,
        }
    }

    pub fn binarizer(&self) -> &B {
        &self.binarizer
    }

    /// Like [`ImageGroupFinder::find_connected_groups`], but also hands back the
    /// intermediate binary grid.
    pub fn find_groups_with_grid(&self, image: &RgbImage) -> (BinaryGrid, Vec<Group>) {
        let grid = self.binarizer.to_binary_grid(image);
        let groups = self.group_finder.find_connected_groups(&grid);
        (grid, groups)
    }
}

impl<B, F> ImageGroupFinder for BinarizingImageGroupFinder<B, F>
where
    B: ImageBinarizer,
    F: BinaryGroupFinder,
{
    fn find_connected_groups(&self, image: &RgbImage) -> Vec<Group> {
        self.find_groups_with_grid(image).1
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use image::Rgb;

    use super::*;
    use crate::{BfsBinaryGroupFinder, Coordinate, DistanceImageBinarizer, EuclideanColorDistance};

    struct FixedBinarizer(Vec<Vec<i32>>);

    impl ImageBinarizer for FixedBinarizer {
        fn to_binary_grid(&self, _image: &RgbImage) -> BinaryGrid {
            BinaryGrid::try_from(self.0.clone()).unwrap()
        }
    }

    #[derive(Default)]
    struct RecordingFinder {
        seen: RefCell<Vec<BinaryGrid>>,
    }

    impl BinaryGroupFinder for RecordingFinder {
        fn find_connected_groups(&self, grid: &BinaryGrid) -> Vec<Group> {
            self.seen.borrow_mut().push(grid.clone());
            vec![Group::new(99, Coordinate::new(5, 5))]
        }
    }

    #[test]
    fn test_passes_binarized_grid_to_finder() {
        let finder = BinarizingImageGroupFinder::new(
            FixedBinarizer(vec![vec![1, 0], vec![0, 1]]),
            RecordingFinder::default(),
        );

        let groups = finder.find_connected_groups(&RgbImage::new(1, 1));

        assert_eq!(groups, vec![Group::new(99, Coordinate::new(5, 5))]);
        let seen = finder.group_finder.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].to_rows(), vec![vec![1, 0], vec![0, 1]]);
    }

    #[test]
    fn test_empty_grid_no_groups() {
        let finder = BinarizingImageGroupFinder::new(FixedBinarizer(vec![]), BfsBinaryGroupFinder);
        assert!(finder.find_connected_groups(&RgbImage::new(1, 1)).is_empty());
    }

    #[test]
    fn test_real_components() {
        let red = Rgb([250, 10, 10]);
        let black = Rgb([0, 0, 0]);
        let img = RgbImage::from_fn(4, 3, |x, y| match (x, y) {
            (0, 0) | (1, 0) => red,
            (3, 1) | (3, 2) | (2, 2) => red,
            _ => black,
        });

        let binarizer = DistanceImageBinarizer::new(EuclideanColorDistance, Rgb([255, 0, 0]), 20.0);
        let finder = BinarizingImageGroupFinder::new(binarizer, BfsBinaryGroupFinder);

        let (grid, groups) = finder.find_groups_with_grid(&img);
        assert_eq!(grid.foreground_count(), 5);
        assert_eq!(
            groups,
            vec![
                Group::new(3, Coordinate::new(2, 1)),
                Group::new(2, Coordinate::new(0, 0)),
            ]
        );
    }
}
