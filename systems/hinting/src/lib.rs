#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hint generation by probing hypothetical swaps.

use sum_ten_core::{Board, CellCoord, Direction, HintMove, LineKind, TileValue, TARGET_SUM};

/// Pure system that suggests a swap producing an immediate solve.
///
/// The board is only read. Only stable boards should be queried; transient
/// empty cells mid-cascade would produce meaningless suggestions.
#[derive(Clone, Copy, Debug, Default)]
pub struct HintAdvisor;

impl HintAdvisor {
    /// Creates a new advisor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the first swap, in row-major cell order and right/down/left/up
    /// neighbour order, after which a row or column through either swapped
    /// cell sums to the target.
    #[must_use]
    pub fn find_hint(&self, board: &Board) -> Option<HintMove> {
        (0..board.height())
            .flat_map(|row| (0..board.width()).map(move |column| CellCoord::new(column, row)))
            .find_map(|origin| {
                let origin_value = board.value(origin)?;
                Direction::HINT_ORDER.into_iter().find_map(|direction| {
                    let target = origin.neighbor(direction)?;
                    let target_value = board.value(target)?;
                    let swap = SwapProbe {
                        origin,
                        origin_value,
                        target,
                        target_value,
                    };
                    swap.completes_line(board)
                        .then_some(HintMove { origin, direction })
                })
            })
    }
}

/// Hypothetical exchange of two tiles, evaluated without touching the board.
#[derive(Clone, Copy, Debug)]
struct SwapProbe {
    origin: CellCoord,
    origin_value: TileValue,
    target: CellCoord,
    target_value: TileValue,
}

impl SwapProbe {
    fn value_after(&self, board: &Board, cell: CellCoord) -> Option<TileValue> {
        if cell == self.origin {
            Some(self.target_value)
        } else if cell == self.target {
            Some(self.origin_value)
        } else {
            board.value(cell)
        }
    }

    fn line_sum_after(&self, board: &Board, kind: LineKind, index: u32) -> u32 {
        board
            .line_cells(kind, index)
            .into_iter()
            .filter_map(|cell| self.value_after(board, cell))
            .map(u32::from)
            .sum()
    }

    fn completes_line(&self, board: &Board) -> bool {
        [
            (LineKind::Row, self.origin.row()),
            (LineKind::Row, self.target.row()),
            (LineKind::Column, self.origin.column()),
            (LineKind::Column, self.target.column()),
        ]
        .into_iter()
        .any(|(kind, index)| self.line_sum_after(board, kind, index) == TARGET_SUM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reads_swapped_values() {
        let board = Board::from_rows(&[[1, 2], [3, 4]]).expect("valid rows");
        let probe = SwapProbe {
            origin: CellCoord::new(0, 0),
            origin_value: 1,
            target: CellCoord::new(1, 0),
            target_value: 2,
        };
        assert_eq!(probe.value_after(&board, CellCoord::new(0, 0)), Some(2));
        assert_eq!(probe.value_after(&board, CellCoord::new(1, 0)), Some(1));
        assert_eq!(probe.value_after(&board, CellCoord::new(1, 1)), Some(4));
        assert_eq!(probe.line_sum_after(&board, LineKind::Column, 0), 5);
        assert_eq!(probe.line_sum_after(&board, LineKind::Row, 0), 3);
    }
}
