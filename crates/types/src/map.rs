//! Occupancy grid.

use std::fmt;
use thiserror::Error;

/// Errors constructing a [`GridMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The map has no rows, or its first row has no cells.
    #[error("Map must have at least one row and one column")]
    Empty,

    /// A row has a different length than the first row.
    #[error("Map row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A cell holds something other than 0 (free) or 1 (occupied).
    #[error("Map cell ({x}, {y}) has value {value}, expected 0 or 1")]
    InvalidCell { x: usize, y: usize, value: u8 },
}

/// A rectangular occupancy grid.
///
/// Cells are addressed as `(x, y)` where `x` is the column and `y` the row;
/// higher row indices are +y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: usize,
    height: usize,
    /// Row-major occupancy, `true` = occupied.
    occupied: Vec<bool>,
}

impl GridMap {
    /// Build a map from rows of 0 (free) / 1 (occupied) cells.
    pub fn new(rows: Vec<Vec<u8>>) -> Result<Self, MapError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(MapError::Empty);
        }

        let height = rows.len();
        let mut occupied = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &value) in row.iter().enumerate() {
                match value {
                    0 => occupied.push(false),
                    1 => occupied.push(true),
                    _ => return Err(MapError::InvalidCell { x, y, value }),
                }
            }
        }

        Ok(Self {
            width,
            height,
            occupied,
        })
    }

    /// A `width` x `height` map whose outermost ring of cells is occupied.
    pub fn bordered(width: usize, height: usize) -> Result<Self, MapError> {
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                        u8::from(edge)
                    })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// Map dimensions as `(height, width)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check whether `(x, y)` lies inside the map.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Occupancy of `(x, y)`, or `None` when out of bounds.
    pub fn is_occupied(&self, x: i64, y: i64) -> Option<bool> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.occupied[y as usize * self.width + x as usize])
    }

    /// Whether `(x, y)` is in bounds and unoccupied.
    pub fn is_free(&self, x: i64, y: i64) -> bool {
        self.is_occupied(x, y) == Some(false)
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&cell| cell).count()
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.occupied.chunks(self.width) {
            for &cell in row {
                f.write_str(if cell { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bordered_map() {
        let map = GridMap::bordered(10, 10).unwrap();
        assert_eq!(map.dims(), (10, 10));
        assert_eq!(map.occupied_count(), 36);

        assert_eq!(map.is_occupied(0, 0), Some(true));
        assert_eq!(map.is_occupied(9, 5), Some(true));
        assert_eq!(map.is_occupied(1, 1), Some(false));
        assert!(map.is_free(8, 8));
        assert!(!map.is_free(9, 8));
    }

    #[test]
    fn test_bounds() {
        let map = GridMap::new(vec![vec![0, 0, 0], vec![0, 1, 0]]).unwrap();
        assert_eq!(map.dims(), (2, 3));

        assert!(map.in_bounds(2, 1));
        assert!(!map.in_bounds(3, 1));
        assert!(!map.in_bounds(2, 2));
        assert!(!map.in_bounds(-1, 0));
        assert_eq!(map.is_occupied(1, 1), Some(true));
        assert_eq!(map.is_occupied(0, -1), None);
    }

    #[test]
    fn test_rejects_malformed_rows() {
        assert_eq!(GridMap::new(vec![]), Err(MapError::Empty));
        assert_eq!(GridMap::new(vec![vec![]]), Err(MapError::Empty));
        assert_eq!(
            GridMap::new(vec![vec![0, 0], vec![0]]),
            Err(MapError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            GridMap::new(vec![vec![0, 2]]),
            Err(MapError::InvalidCell {
                x: 1,
                y: 0,
                value: 2
            })
        );
    }

    #[test]
    fn test_display() {
        let map = GridMap::bordered(3, 3).unwrap();
        assert_eq!(map.to_string(), "###\n#.#\n###\n");
    }
}
