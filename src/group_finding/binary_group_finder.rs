use std::collections::VecDeque;

use super::{
    binary_grid::BinaryGrid,
    group::{Coordinate, Group},
    GroupFinderError,
};

/// Something that can split a binary grid into groups of connected foreground cells.
pub trait BinaryGroupFinder {
    /// Find all groups of 4-connected foreground cells, largest first.
    fn find_connected_groups(&self, grid: &BinaryGrid) -> Vec<Group>;
}

/// Labels groups with a breadth-first search over an explicit work queue, so that
/// very large groups cannot exhaust the call stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsBinaryGroupFinder;

impl BinaryGroupFinder for BfsBinaryGroupFinder {
    fn find_connected_groups(&self, grid: &BinaryGrid) -> Vec<Group> {
        find_connected_groups(grid)
    }
}

/// Validate `rows` and then find their connected groups.
///
/// See [`BinaryGrid::from_rows`] for the validation rules. Nothing is labeled
/// unless the whole input is valid.
pub fn label_rows<R>(rows: &[Option<R>]) -> Result<Vec<Group>, GroupFinderError>
where
    R: AsRef<[i32]>,
{
    let grid = BinaryGrid::from_rows(rows)?;
    Ok(find_connected_groups(&grid))
}

/// Find all groups of 4-connected foreground cells in `grid`.
///
/// Cells only connect through their top, bottom, left and right neighbours, never
/// diagonally. The result is sorted in descending order of size; equal sizes are
/// broken by descending centroid row and then by descending centroid column.
#[must_use]
pub fn find_connected_groups(grid: &BinaryGrid) -> Vec<Group> {
    let (width, height) = (grid.width(), grid.height());

    let mut visited = vec![false; width * height];
    let mut queue = VecDeque::new();
    let mut members = vec![];
    let mut groups = vec![];

    for y in 0..height {
        for x in 0..width {
            if !grid.is_foreground(x, y) || visited[grid.index(x, y)] {
                continue;
            }

            members.clear();
            visited[grid.index(x, y)] = true;
            queue.push_back((x, y));

            while let Some((cur_x, cur_y)) = queue.pop_front() {
                members.push(Coordinate::new(cur_x as u32, cur_y as u32));

                for (next_x, next_y) in neighbours(cur_x, cur_y, width, height) {
                    let idx = grid.index(next_x, next_y);
                    if grid.is_foreground(next_x, next_y) && !visited[idx] {
                        visited[idx] = true;
                        queue.push_back((next_x, next_y));
                    }
                }
            }

            // members always holds at least the seed cell.
            groups.extend(Group::from_members(&members));
        }
    }

    // stable, so any fully equal groups keep discovery order.
    groups.sort_by(|a, b| b.cmp(a));
    groups
}

// up, down, left, right; clipped to the grid.
fn neighbours(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let up = y.checked_sub(1).map(|y| (x, y));
    let down = (y + 1 < height).then_some((x, y + 1));
    let left = x.checked_sub(1).map(|x| (x, y));
    let right = (x + 1 < width).then_some((x + 1, y));

    [up, down, left, right].into_iter().flatten()
}

#[cfg(test)]
mod test {
    use super::*;

    fn groups_of(rows: Vec<Vec<i32>>) -> Vec<Group> {
        let grid = BinaryGrid::try_from(rows).unwrap();
        find_connected_groups(&grid)
    }

    fn g(size: usize, x: u32, y: u32) -> Group {
        Group::new(size, Coordinate::new(x, y))
    }

    #[test]
    fn test_single_pixel() {
        assert_eq!(groups_of(vec![vec![1]]), vec![g(1, 0, 0)]);
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        let act = groups_of(vec![vec![1, 0], vec![0, 1]]);
        assert_eq!(act, vec![g(1, 1, 1), g(1, 0, 0)]);
    }

    #[test]
    fn test_all_background() {
        assert!(groups_of(vec![vec![0, 0, 0], vec![0, 0, 0]]).is_empty());
    }

    #[test]
    fn test_zero_rows() {
        let rows: &[Option<Vec<i32>>] = &[];
        assert_eq!(label_rows(rows), Ok(vec![]));
    }

    #[test]
    fn test_three_shapes() {
        #[rustfmt::skip]
        let rows = vec![
            vec![1, 1, 0, 0, 0, 0],
            vec![1, 0, 0, 0, 1, 0],
            vec![0, 0, 0, 0, 1, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 1, 1, 1, 0, 0],
        ];

        let act = groups_of(rows);

        // the L in the top left: x = (0+1+0)/3, y = (0+0+1)/3
        // the bar along the bottom: x = (1+2+3)/3, y = 4
        // the vertical pair: x = 4, y = (1+2)/2
        assert_eq!(act, vec![g(3, 2, 4), g(3, 0, 0), g(2, 4, 1)]);
    }

    #[test]
    fn test_same_row_tiebreak_by_column() {
        #[rustfmt::skip]
        let rows = vec![
            vec![1, 0, 1, 0, 1],
        ];

        assert_eq!(groups_of(rows), vec![g(1, 4, 0), g(1, 2, 0), g(1, 0, 0)]);
    }

    #[test]
    fn test_ring_is_one_group() {
        #[rustfmt::skip]
        let rows = vec![
            vec![1, 1, 1],
            vec![1, 0, 1],
            vec![1, 1, 1],
        ];

        assert_eq!(groups_of(rows), vec![g(8, 1, 1)]);
    }

    #[test]
    fn test_snake() {
        #[rustfmt::skip]
        let rows = vec![
            vec![1, 1, 1, 1],
            vec![0, 0, 0, 1],
            vec![1, 1, 1, 1],
            vec![1, 0, 0, 0],
        ];

        // xs: 0+1+2+3 + 3 + 0+1+2+3 + 0 = 15, ys: 0*4 + 1 + 2*4 + 3 = 12
        assert_eq!(groups_of(rows), vec![g(10, 1, 1)]);
    }

    #[test]
    fn test_label_rows_rejects_before_labeling() {
        let rows = [Some(vec![1, 1]), Some(vec![1, 2])];
        assert_eq!(
            label_rows(&rows),
            Err(GroupFinderError::Value {
                row: 1,
                column: 1,
                value: 2
            })
        );

        let rows = [Some(vec![1, 0]), Some(vec![1, 0, 1])];
        assert!(matches!(
            label_rows(&rows),
            Err(GroupFinderError::Shape { .. })
        ));

        let rows: [Option<&[i32]>; 2] = [None, Some(&[1][..])];
        assert_eq!(
            label_rows(&rows),
            Err(GroupFinderError::NullInput { row: 0 })
        );
    }

    #[test]
    fn test_input_untouched_and_repeatable() {
        let grid = BinaryGrid::try_from(vec![vec![1, 1, 0], vec![0, 0, 1]]).unwrap();
        let before = grid.clone();

        let first = BfsBinaryGroupFinder.find_connected_groups(&grid);
        let second = BfsBinaryGroupFinder.find_connected_groups(&grid);

        assert_eq!(first, second);
        assert_eq!(grid, before);
    }

    // A recursive walk would overflow the stack on this.
    #[test]
    fn test_huge_group() {
        let grid = BinaryGrid::from_fn(1500, 1500, |_, _| true);
        let act = find_connected_groups(&grid);
        assert_eq!(act, vec![g(1500 * 1500, 749, 749)]);
    }
}
