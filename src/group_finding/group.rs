use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A cell position. `x` is the column and `y` is the row, with the origin in the
/// top-left corner of the grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

// Rows are compared before columns.
impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One maximal 4-connected region of foreground cells, summarized by its size and
/// the integer average of its member positions.
///
/// Groups order by size, then by centroid row, then by centroid column. Result lists
/// are sorted in *descending* order so the largest group comes first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Group {
    size: usize,
    centroid: Coordinate,
}

impl Group {
    /// A group of `size` cells centred on `centroid`. A group always has at least one cell.
    #[must_use]
    pub fn new(size: usize, centroid: Coordinate) -> Self {
        debug_assert!(size >= 1, "a group has at least one cell");
        Self { size, centroid }
    }

    /// Build a group from its member cells.
    ///
    /// Each centroid component is the sum of the member coordinates divided by the number
    /// of members, using truncating integer division. Returns `None` if `members` is empty.
    pub fn from_members(members: &[Coordinate]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }

        let (sum_x, sum_y) = members.iter().fold((0u64, 0u64), |(sx, sy), c| {
            (sx + u64::from(c.x), sy + u64::from(c.y))
        });
        let size = members.len();

        // the quotient is an average of u32 values, so it always fits back into a u32.
        let centroid = Coordinate {
            x: (sum_x / size as u64) as u32,
            y: (sum_y / size as u64) as u32,
        };

        Some(Self { size, centroid })
    }

    /// The number of cells in the group.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn centroid(&self) -> Coordinate {
        self.centroid
    }
}

impl Ord for Group {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| self.centroid.cmp(&other.centroid))
    }
}

impl PartialOrd for Group {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_centroid_truncates() {
        let members = [
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(1, 1),
        ];
        // (0+1+1)/3 and (0+0+1)/3
        let group = Group::from_members(&members).unwrap();
        assert_eq!(group.size(), 3);
        assert_eq!(group.centroid(), Coordinate::new(0, 0));
    }

    #[test]
    fn test_no_members_no_group() {
        assert_eq!(Group::from_members(&[]), None);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "at least one cell")]
    fn test_empty_group_rejected() {
        let _ = Group::new(0, Coordinate::new(0, 0));
    }

    #[test]
    fn test_ordering_keys() {
        let small = Group::new(1, Coordinate::new(9, 9));
        let big = Group::new(2, Coordinate::new(0, 0));
        assert!(big > small);

        // equal size: lower row wins, regardless of column
        let upper = Group::new(3, Coordinate::new(9, 1));
        let lower = Group::new(3, Coordinate::new(0, 2));
        assert!(lower > upper);

        // equal size and row: rightmost wins
        let left = Group::new(3, Coordinate::new(1, 2));
        let right = Group::new(3, Coordinate::new(4, 2));
        assert!(right > left);
    }

    #[test]
    fn test_serialize() {
        let group = Group::new(4, Coordinate::new(2, 7));
        let json = serde_json::to_string(&group).unwrap();
        assert_eq!(json, r#"{"size":4,"centroid":{"x":2,"y":7}}"#);
    }
}
