pub mod binarizing_image_group_finder;
pub mod color_distance;
pub mod image_binarizer;
