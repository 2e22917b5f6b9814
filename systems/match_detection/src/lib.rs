#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Detection of rows and columns whose tiles sum to the target.

use sum_ten_core::{Board, LineKind, LineScanner, MatchResult, TARGET_SUM};

/// Scan order: every row before any column.
const SCAN_ORDER: [LineKind; 2] = [LineKind::Row, LineKind::Column];

/// Pure system that scans a board for target-sum lines.
///
/// Empty cells contribute nothing to a line's sum.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchDetector;

impl MatchDetector {
    /// Creates a new detector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn line_matches(board: &Board, kind: LineKind, index: u32) -> bool {
        board.line_sum(kind, index) == TARGET_SUM
    }

    fn result(board: &Board, kind: LineKind, index: u32) -> MatchResult {
        MatchResult {
            kind,
            index,
            cells: board.line_cells(kind, index),
        }
    }
}

impl LineScanner for MatchDetector {
    /// Rows top-to-bottom, then columns left-to-right; the first hit wins.
    fn scan_for_first_match(&self, board: &Board) -> Option<MatchResult> {
        SCAN_ORDER.into_iter().find_map(|kind| {
            (0..board.line_count(kind))
                .find(|index| Self::line_matches(board, kind, *index))
                .map(|index| Self::result(board, kind, index))
        })
    }

    fn all_matches(&self, board: &Board) -> Vec<MatchResult> {
        SCAN_ORDER
            .into_iter()
            .flat_map(|kind| (0..board.line_count(kind)).map(move |index| (kind, index)))
            .filter(|(kind, index)| Self::line_matches(board, *kind, *index))
            .map(|(kind, index)| Self::result(board, kind, index))
            .collect()
    }
}
