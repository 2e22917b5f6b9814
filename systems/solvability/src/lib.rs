#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Approximate solvability analysis.
//!
//! A board is considered viable when its tile multiset contains a subset of
//! exactly one line's length whose values sum to the target. Positions are
//! ignored: the check does not prove the chosen tiles can be swapped into a
//! single line, so it is a necessary condition for a solve and not a
//! sufficient one.

use sum_ten_core::{Board, LineKind, TileValue, ViabilityProbe, TARGET_SUM};

const _: () = assert!(TARGET_SUM < u64::BITS, "sum bitsets are stored in a u64");

/// Bits `0..=TARGET_SUM` set.
const SUM_MASK: u64 = (1 << (TARGET_SUM + 1)) - 1;

/// Pure system answering whether a settled board can still produce a solve.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolvabilityAnalyzer;

impl SolvabilityAnalyzer {
    /// Creates a new analyzer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reports whether exactly `count` of `values` sum to the target.
    ///
    /// Runs an exact-count subset-sum table where `reachable[k]` holds, as a
    /// bitset, every sum attainable by choosing `k` values seen so far. Sums
    /// above the target are discarded as they appear, since values are never
    /// negative.
    #[must_use]
    pub fn has_target_subset(values: &[TileValue], count: usize) -> bool {
        if count > values.len() {
            return false;
        }

        let mut reachable = vec![0_u64; count + 1];
        reachable[0] = 1;
        for (seen, value) in values.iter().enumerate() {
            let shift = u32::from(*value);
            if shift > TARGET_SUM {
                continue;
            }
            for chosen in (0..count.min(seen + 1)).rev() {
                reachable[chosen + 1] |= (reachable[chosen] << shift) & SUM_MASK;
            }
        }

        reachable[count] & (1 << TARGET_SUM) != 0
    }
}

impl ViabilityProbe for SolvabilityAnalyzer {
    fn has_valid_moves(&self, board: &Board) -> bool {
        let values = board.occupied_values();
        let row_len = board.line_len(LineKind::Row) as usize;
        let column_len = board.line_len(LineKind::Column) as usize;

        Self::has_target_subset(&values, row_len)
            || (column_len != row_len && Self::has_target_subset(&values, column_len))
    }
}
