//! Uniform grid bucketing.
//!
//! Positions are hashed into square cells of `cell_size` pixels. A neighbor
//! query returns everything in the 3x3 block of cells around the query point,
//! which over-approximates a disc of radius `cell_size`; callers still apply
//! the exact distance test.

use std::collections::HashMap;

use glam::Vec2;

/// `(column, row)` of a grid cell.
pub type CellKey = (i32, i32);

/// Sparse grid of particle indices, rebuilt from scratch every frame.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl UniformGrid {
    /// Create an empty grid. `cell_size` must be positive.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `position`.
    #[inline]
    pub fn cell_key(&self, position: Vec2) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, index: usize, position: Vec2) {
        let key = self.cell_key(position);
        self.cells.entry(key).or_default().push(index);
    }

    /// Insert every position, using its slice index as the id.
    pub fn insert_all(&mut self, positions: &[Vec2]) {
        for (index, &position) in positions.iter().enumerate() {
            self.insert(index, position);
        }
    }

    /// Append the contents of the 3x3 cell block around `position` to `out`.
    ///
    /// The result includes the querying particle itself when it was inserted.
    pub fn query_neighbors(&self, position: Vec2, out: &mut Vec<usize>) {
        let (col, row) = self.cell_key(position);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(cell) = self.cells.get(&(col + dx, row + dy)) {
                    out.extend_from_slice(cell);
                }
            }
        }
    }

    /// Indices stored in a single cell.
    pub fn cell(&self, key: CellKey) -> &[usize] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_floors() {
        let grid = UniformGrid::new(10.0);
        assert_eq!(grid.cell_key(Vec2::new(0.0, 9.99)), (0, 0));
        assert_eq!(grid.cell_key(Vec2::new(10.0, 25.0)), (1, 2));
        assert_eq!(grid.cell_key(Vec2::new(-0.5, -10.5)), (-1, -2));
    }

    #[test]
    fn test_query_covers_three_by_three_block() {
        let mut grid = UniformGrid::new(10.0);
        let positions = [
            Vec2::new(15.0, 15.0), // own cell
            Vec2::new(5.0, 5.0),   // diagonal neighbor
            Vec2::new(25.0, 15.0), // right neighbor
            Vec2::new(35.0, 15.0), // two cells away
        ];
        grid.insert_all(&positions);

        let mut found = Vec::new();
        grid.query_neighbors(positions[0], &mut found);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn test_clear_empties_grid() {
        let mut grid = UniformGrid::new(5.0);
        grid.insert(0, Vec2::new(1.0, 1.0));
        grid.insert(1, Vec2::new(2.0, 2.0));
        assert_eq!(grid.cell((0, 0)), &[0, 1]);
        assert_eq!(grid.occupied_cells(), 1);

        grid.clear();
        assert_eq!(grid.occupied_cells(), 0);

        let mut found = Vec::new();
        grid.query_neighbors(Vec2::new(1.0, 1.0), &mut found);
        assert!(found.is_empty());
    }
}
