//! Board data and mutation primitives.
//!
//! The board is a fixed `width × height` grid stored as a flat row-major
//! vector. It owns tile positions outright: every external handle to a tile is
//! a plain [`CellCoord`] lookup, so there is no second copy of a coordinate
//! that could drift out of sync. The board knows nothing about scoring,
//! matching or rendering.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, LineKind, TileValue};

/// Cell on the board (`None` = empty, `Some` = tile with that value).
pub type Cell = Option<TileValue>;

/// Movement of a single tile produced by gravity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFall {
    /// Cell the tile occupied before falling.
    pub from: CellCoord,
    /// Cell the tile came to rest in.
    pub to: CellCoord,
    /// Value carried by the tile.
    pub value: TileValue,
}

/// Tile created by a spawn operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnedTile {
    /// Cell the tile was placed in.
    pub cell: CellCoord,
    /// Value drawn for the tile.
    pub value: TileValue,
}

/// Fixed-size grid of numeric tiles.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![None; len],
        }
    }

    /// Builds a fully occupied board from rows listed top to bottom.
    ///
    /// Returns `None` when the rows are ragged or empty.
    #[must_use]
    pub fn from_rows<R: AsRef<[TileValue]>>(rows: &[R]) -> Option<Self> {
        let height = u32::try_from(rows.len()).ok()?;
        let width = u32::try_from(rows.first()?.as_ref().len()).ok()?;
        if width == 0 || rows.iter().any(|row| row.as_ref().len() != width as usize) {
            return None;
        }

        let cells = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied().map(Some))
            .collect();
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        Some(row * self.width as usize + column)
    }

    /// Reports whether `cell` lies inside the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Returns the cell contents, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Returns the tile value at `cell`, or `None` when empty or out of bounds.
    #[must_use]
    pub fn value(&self, cell: CellCoord) -> Option<TileValue> {
        self.get(cell).flatten()
    }

    /// Sets the cell contents. Returns `false` when out of bounds.
    pub fn set(&mut self, cell: CellCoord, contents: Cell) -> bool {
        match self.index(cell) {
            Some(index) => {
                self.cells[index] = contents;
                true
            }
            None => false,
        }
    }

    /// Exchanges the contents of two cells. Returns `false` when either is out
    /// of bounds, leaving the board untouched.
    pub fn swap(&mut self, a: CellCoord, b: CellCoord) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(first), Some(second)) => {
                self.cells.swap(first, second);
                true
            }
            _ => false,
        }
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Reports whether every cell holds a tile.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Number of cells in a line of the given orientation.
    #[must_use]
    pub const fn line_len(&self, kind: LineKind) -> u32 {
        match kind {
            LineKind::Row => self.width,
            LineKind::Column => self.height,
        }
    }

    /// Number of lines of the given orientation.
    #[must_use]
    pub const fn line_count(&self, kind: LineKind) -> u32 {
        match kind {
            LineKind::Row => self.height,
            LineKind::Column => self.width,
        }
    }

    /// Coordinates composing a line, ordered left-to-right or top-to-bottom.
    ///
    /// Returns an empty vector for an out-of-range index.
    #[must_use]
    pub fn line_cells(&self, kind: LineKind, index: u32) -> Vec<CellCoord> {
        if index >= self.line_count(kind) {
            return Vec::new();
        }
        (0..self.line_len(kind))
            .map(|offset| match kind {
                LineKind::Row => CellCoord::new(offset, index),
                LineKind::Column => CellCoord::new(index, offset),
            })
            .collect()
    }

    /// Sum of the occupied cells in a line. Empty cells contribute nothing.
    #[must_use]
    pub fn line_sum(&self, kind: LineKind, index: u32) -> u32 {
        if index >= self.line_count(kind) {
            return 0;
        }
        (0..self.line_len(kind))
            .filter_map(|offset| match kind {
                LineKind::Row => self.value(CellCoord::new(offset, index)),
                LineKind::Column => self.value(CellCoord::new(index, offset)),
            })
            .map(u32::from)
            .sum()
    }

    /// Values of every occupied cell in row-major order.
    #[must_use]
    pub fn occupied_values(&self) -> Vec<TileValue> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Compacts every column downward, keeping the relative order of tiles.
    ///
    /// Returns one record per tile that moved, grouped by column and listed
    /// bottom-up within each column.
    pub fn apply_gravity(&mut self) -> Vec<TileFall> {
        let mut falls = Vec::new();

        for column in 0..self.width {
            let mut write_row = self.height;
            for read_row in (0..self.height).rev() {
                let from = CellCoord::new(column, read_row);
                let Some(value) = self.value(from) else {
                    continue;
                };
                write_row -= 1;
                if write_row != read_row {
                    let to = CellCoord::new(column, write_row);
                    let _ = self.set(to, Some(value));
                    let _ = self.set(from, None);
                    falls.push(TileFall { from, to, value });
                }
            }
        }

        falls
    }

    /// Empty cells in refill order: column by column, top to bottom.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<CellCoord> {
        (0..self.width)
            .flat_map(|column| (0..self.height).map(move |row| CellCoord::new(column, row)))
            .filter(|cell| matches!(self.get(*cell), Some(None)))
            .collect()
    }

    /// Reports whether no column has an empty cell beneath an occupied one.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        (0..self.width).all(|column| {
            let mut seen_tile = false;
            (0..self.height).all(|row| {
                let occupied = self.value(CellCoord::new(column, row)).is_some();
                let ok = occupied || !seen_tile;
                seen_tile |= occupied;
                ok
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_row_major() {
        let board = Board::new(5, 4);
        assert_eq!(board.index(CellCoord::new(0, 0)), Some(0));
        assert_eq!(board.index(CellCoord::new(4, 0)), Some(4));
        assert_eq!(board.index(CellCoord::new(0, 1)), Some(5));
        assert_eq!(board.index(CellCoord::new(4, 3)), Some(19));
        assert_eq!(board.index(CellCoord::new(5, 0)), None);
        assert_eq!(board.index(CellCoord::new(0, 4)), None);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Board::from_rows(&[vec![1, 2], vec![3]]).is_none());
        assert!(Board::from_rows::<Vec<u8>>(&[]).is_none());
    }

    #[test]
    fn settled_detects_floating_tiles() {
        let mut board = Board::from_rows(&[[1, 2], [3, 4]]).expect("valid rows");
        assert!(board.is_settled());
        let _ = board.set(CellCoord::new(0, 1), None);
        assert!(!board.is_settled());
        let _ = board.apply_gravity();
        assert!(board.is_settled());
    }
}
