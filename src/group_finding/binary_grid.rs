use super::GroupFinderError;

/// A rectangular grid of foreground (1) and background (0) cells.
///
/// A `BinaryGrid` can only be obtained through validation ([`BinaryGrid::from_rows`])
/// or from a binarizer, so every instance is rectangular and contains only 0s and 1s.
/// Cells are addressed as (x: column, y: row) with the origin in the top-left corner.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct BinaryGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl BinaryGrid {
    /// Validate raw rows of cell values and build a grid from them.
    ///
    /// `None` stands for an absent row. The whole input is checked before anything
    /// else happens, in this order:
    /// * any absent row is a [`GroupFinderError::NullInput`]
    /// * any row whose length differs from the first row is a [`GroupFinderError::Shape`]
    /// * any value other than 0 or 1 is a [`GroupFinderError::Value`]
    ///
    /// Zero rows is not an error, and results in an empty grid.
    pub fn from_rows<R>(rows: &[Option<R>]) -> Result<Self, GroupFinderError>
    where
        R: AsRef<[i32]>,
    {
        let present_rows = rows
            .iter()
            .enumerate()
            .map(|(row, r)| {
                r.as_ref()
                    .map(AsRef::as_ref)
                    .ok_or(GroupFinderError::NullInput { row })
            })
            .collect::<Result<Vec<&[i32]>, _>>()?;

        let width = present_rows.first().map_or(0, |r| r.len());

        if let Some((row, r)) = present_rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != width)
        {
            return Err(GroupFinderError::Shape {
                row,
                expected: width,
                actual: r.len(),
            });
        }

        let mut cells = Vec::with_capacity(width * present_rows.len());
        for (row, r) in present_rows.iter().enumerate() {
            for (column, &value) in r.iter().enumerate() {
                match value {
                    0 => cells.push(false),
                    1 => cells.push(true),
                    value => return Err(GroupFinderError::Value { row, column, value }),
                }
            }
        }

        Ok(Self {
            width,
            height: present_rows.len(),
            cells,
        })
    }

    /// Build a grid by evaluating `is_foreground` at every (x, y) position.
    pub fn from_fn(width: usize, height: usize, mut is_foreground: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(is_foreground(x, y));
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether the cell at (x, y) is foreground. Out-of-bounds positions are background.
    #[must_use]
    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[self.index(x, y)]
    }

    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// The grid as rows of 0s and 1s.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        if self.width == 0 {
            return vec![vec![]; self.height];
        }

        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|&c| i32::from(c)).collect())
            .collect()
    }

    pub(crate) fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

impl TryFrom<Vec<Vec<i32>>> for BinaryGrid {
    type Error = GroupFinderError;

    fn try_from(rows: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        let rows = rows.into_iter().map(Some).collect::<Vec<_>>();
        Self::from_rows(&rows)
    }
}
