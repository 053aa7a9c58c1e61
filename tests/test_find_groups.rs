use centroid_finder::*;
use image::{Rgb, RgbImage};
use itertools::Itertools;
use rand::prelude::*;

/// A random grid where each cell is foreground with probability `density`.
fn random_grid(width: usize, height: usize, density: f64, rng: &mut StdRng) -> BinaryGrid {
    BinaryGrid::from_fn(width, height, |_x, _y| rng.gen_bool(density))
}

/// Labels a grid with a union-find over horizontal and vertical neighbours. Slow but
/// obviously correct, used as an oracle.
fn union_find_groups(grid: &BinaryGrid) -> Vec<Group> {
    fn root(parents: &mut [usize], mut i: usize) -> usize {
        while parents[i] != i {
            parents[i] = parents[parents[i]];
            i = parents[i];
        }
        i
    }

    let (w, h) = (grid.width(), grid.height());
    let mut parents = (0..w * h).collect::<Vec<_>>();

    for y in 0..h {
        for x in 0..w {
            if !grid.is_foreground(x, y) {
                continue;
            }
            let here = y * w + x;
            for (nx, ny) in [(x + 1, y), (x, y + 1)] {
                if grid.is_foreground(nx, ny) {
                    let a = root(&mut parents, here);
                    let b = root(&mut parents, ny * w + nx);
                    parents[a] = b;
                }
            }
        }
    }

    let mut groups = (0..h)
        .cartesian_product(0..w)
        .filter(|&(y, x)| grid.is_foreground(x, y))
        .map(|(y, x)| (root(&mut parents, y * w + x), Coordinate::new(x as u32, y as u32)))
        .into_group_map()
        .into_values()
        .filter_map(|members| Group::from_members(&members))
        .collect::<Vec<_>>();

    groups.sort_by(|a, b| b.cmp(a));
    groups
}

fn assert_descending(groups: &[Group]) {
    for (a, b) in groups.iter().tuple_windows() {
        let key_a = (a.size(), a.centroid().y, a.centroid().x);
        let key_b = (b.size(), b.centroid().y, b.centroid().x);
        assert!(key_a >= key_b, "{a:?} listed before {b:?}");
    }
}

#[test]
fn test_matches_union_find_on_random_grids() {
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..200 {
        let width = rng.gen_range(0..40);
        let height = rng.gen_range(0..40);
        let density = rng.gen_range(0.05..0.95);
        let grid = random_grid(width, height, density, &mut rng);

        let groups = find_connected_groups(&grid);

        assert_eq!(groups, union_find_groups(&grid));
    }
}

#[test]
fn test_sizes_partition_foreground() {
    let mut rng = StdRng::seed_from_u64(2);

    for _ in 0..200 {
        let grid = random_grid(rng.gen_range(1..60), rng.gen_range(1..60), 0.5, &mut rng);
        let groups = find_connected_groups(&grid);

        assert!(groups.iter().all(|g| g.size() >= 1));
        assert_eq!(groups.iter().map(Group::size).sum::<usize>(), grid.foreground_count());
        assert_descending(&groups);
    }
}

#[test]
fn test_centroids_inside_grid() {
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..100 {
        let grid = random_grid(rng.gen_range(1..30), rng.gen_range(1..30), 0.6, &mut rng);
        for g in find_connected_groups(&grid) {
            assert!((g.centroid().x as usize) < grid.width());
            assert!((g.centroid().y as usize) < grid.height());
        }
    }
}

#[test]
fn test_repeatable_and_input_untouched() {
    let mut rng = StdRng::seed_from_u64(4);
    let rows = (0..25)
        .map(|_| Some((0..31).map(|_| rng.gen_range(0..2)).collect::<Vec<i32>>()))
        .collect::<Vec<_>>();
    let before = rows.clone();

    let first = label_rows(&rows).unwrap();
    let second = label_rows(&rows).unwrap();

    assert_eq!(first, second);
    assert_eq!(rows, before);
}

#[test]
fn test_checkerboard_has_no_diagonal_joins() {
    let grid = BinaryGrid::from_fn(9, 7, |x, y| (x + y) % 2 == 0);
    let groups = find_connected_groups(&grid);

    assert_eq!(groups.len(), grid.foreground_count());
    assert!(groups.iter().all(|g| g.size() == 1));
    // the bottom right cell has the largest y, then x
    assert_eq!(groups[0], Group::new(1, Coordinate::new(8, 6)));
    assert_eq!(groups.last(), Some(&Group::new(1, Coordinate::new(0, 0))));
}

#[test]
fn test_single_cell() {
    assert_eq!(
        label_rows(&[Some(vec![1])]).unwrap(),
        vec![Group::new(1, Coordinate::new(0, 0))]
    );
}

#[test]
fn test_diagonal_cells_are_separate() {
    let rows = [Some(vec![1, 0]), Some(vec![0, 1])];
    assert_eq!(
        label_rows(&rows).unwrap(),
        vec![
            Group::new(1, Coordinate::new(1, 1)),
            Group::new(1, Coordinate::new(0, 0)),
        ]
    );
}

#[test]
fn test_three_shapes() {
    #[rustfmt::skip]
    let rows = [
        Some(vec![1, 1, 0, 0, 0]),
        Some(vec![1, 0, 0, 0, 1]),
        Some(vec![0, 0, 0, 0, 1]),
        Some(vec![0, 0, 0, 0, 0]),
        Some(vec![0, 1, 1, 1, 0]),
        Some(vec![0, 0, 0, 0, 0]),
    ];

    let groups = label_rows(&rows).unwrap();

    assert_eq!(groups.len(), 3);
    assert_eq!(groups.iter().map(Group::size).collect::<Vec<_>>(), vec![3, 3, 2]);
    assert_eq!(
        groups,
        vec![
            Group::new(3, Coordinate::new(2, 4)),
            Group::new(3, Coordinate::new(0, 0)),
            Group::new(2, Coordinate::new(4, 1)),
        ]
    );
}

#[test]
fn test_rejected_grids() {
    let absent: [Option<Vec<i32>>; 2] = [Some(vec![1, 0]), None];
    assert_eq!(label_rows(&absent), Err(GroupFinderError::NullInput { row: 1 }));

    let ragged = [Some(vec![1, 0]), Some(vec![1, 0, 1])];
    assert_eq!(
        label_rows(&ragged),
        Err(GroupFinderError::Shape {
            row: 1,
            expected: 2,
            actual: 3
        })
    );

    let bad_value = [Some(vec![0, 0, 0]), Some(vec![0, 2, 0])];
    assert_eq!(
        label_rows(&bad_value),
        Err(GroupFinderError::Value {
            row: 1,
            column: 1,
            value: 2
        })
    );
}

#[test]
fn test_zero_rows() {
    let rows: [Option<Vec<i32>>; 0] = [];
    assert_eq!(label_rows(&rows), Ok(vec![]));
}

#[test]
fn test_long_serpentine_is_one_group() {
    // Full rows joined alternately at the right and left edges, so the only path through
    // the group is very long.
    let n = 301;
    let grid = BinaryGrid::from_fn(n, n, |x, y| match y % 4 {
        0 | 2 => true,
        1 => x == n - 1,
        _ => x == 0,
    });

    let groups = find_connected_groups(&grid);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size(), 151 * n + 150);
    assert_eq!(groups, union_find_groups(&grid));
}

#[test]
fn test_image_pipeline_matches_grid_labeling() {
    let mut rng = StdRng::seed_from_u64(5);
    let target = Rgb([200, 40, 40]);
    let threshold = 80.0;

    for _ in 0..20 {
        let image = RgbImage::from_fn(rng.gen_range(1..50), rng.gen_range(1..50), |_, _| {
            if rng.gen_bool(0.4) {
                Rgb([rng.gen_range(150..=255), rng.gen_range(0..80), rng.gen_range(0..80)])
            } else {
                Rgb(rng.gen())
            }
        });

        let binarizer = DistanceImageBinarizer::new(EuclideanColorDistance, target, threshold);
        let finder = BinarizingImageGroupFinder::new(binarizer, BfsBinaryGroupFinder);

        let expected_grid = BinaryGrid::from_fn(image.width() as usize, image.height() as usize, |x, y| {
            let px = image.get_pixel(x as u32, y as u32);
            EuclideanColorDistance.distance(*px, target) <= threshold
        });

        assert_eq!(
            finder.find_connected_groups(&image),
            union_find_groups(&expected_grid)
        );
    }
}

#[test]
fn test_processing_in_memory_frames() {
    let red = Rgb([255, 0, 0]);
    let fps = 30.0;
    let frames = (0..60u32).map(|i| {
        // a 3x3 red square moving one pixel right per frame, missing every tenth frame
        let image = RgbImage::from_fn(80, 20, |x, y| {
            if i % 10 != 9 && (i..i + 3).contains(&x) && (5..8).contains(&y) {
                red
            } else {
                Rgb([10, 10, 10])
            }
        });
        TimedFrame::new(frame_timestamp(0.0, u64::from(i), fps), image)
    });

    let binarizer = DistanceImageBinarizer::new(EuclideanColorDistance, red, 30.0);
    let processor = VideoProcessor::new(binarizer, BfsBinaryGroupFinder);
    let mut sink = CsvCentroidSink::new(vec![]).unwrap();

    let summary = processor.process(&mut frames.into_iter(), &mut sink).unwrap();

    assert_eq!(summary.frames, 60);
    assert_eq!(summary.frames_with_group, 54);
    assert_eq!(summary.frames_skipped, 0);

    let csv = String::from_utf8(sink.into_inner()).unwrap();
    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 61);
    assert_eq!(lines[0], "time,x,y");
    assert_eq!(lines[1], "0.000,1,6");
    assert_eq!(lines[10], "0.300,-1,-1");
    assert_eq!(lines[31], "1.000,31,6");
}
