use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sum_ten_core::{Board, TileValue, ViabilityProbe, TARGET_SUM};
use sum_ten_system_solvability::SolvabilityAnalyzer;

/// Exhaustive enumeration of every `count`-sized combination.
fn brute_force(values: &[TileValue], count: usize, target: u32) -> bool {
    if count == 0 {
        return target == 0;
    }
    (0..values.len()).any(|first| {
        let value = u32::from(values[first]);
        value <= target && brute_force(&values[first + 1..], count - 1, target - value)
    })
}

fn random_board<R: Rng>(rng: &mut R, size: u32, low: TileValue, high: TileValue) -> Board {
    let rows: Vec<Vec<TileValue>> = (0..size)
        .map(|_| (0..size).map(|_| rng.gen_range(low..=high)).collect())
        .collect();
    Board::from_rows(&rows).expect("square rows")
}

#[test]
fn uniform_sixes_on_five_wide_board_are_unsolvable() {
    let board = Board::from_rows(&[[6_u8; 5]; 5]).expect("square rows");
    assert!(!SolvabilityAnalyzer::new().has_valid_moves(&board));
}

#[test]
fn board_with_target_row_is_solvable() {
    let board = Board::from_rows(&[
        [1, 2, 3, 2, 2],
        [6, 6, 6, 6, 6],
        [6, 6, 6, 6, 6],
        [6, 6, 6, 6, 6],
        [6, 6, 6, 6, 6],
    ])
    .expect("square rows");
    assert!(SolvabilityAnalyzer::new().has_valid_moves(&board));
}

#[test]
fn scattered_tiles_count_even_when_unreachable() {
    // The four small tiles sit in different rows and columns; the check is
    // positional-blind and still reports a solve.
    let board = Board::from_rows(&[
        [1, 6, 6, 6, 6],
        [6, 2, 6, 6, 6],
        [6, 6, 0, 6, 6],
        [6, 6, 6, 1, 6],
        [6, 6, 6, 6, 6],
    ])
    .expect("square rows");
    assert!(SolvabilityAnalyzer::new().has_valid_moves(&board));
}

#[test]
fn six_wide_board_needs_six_tiles() {
    // Five 2s reach ten, but any sixth tile of value 1 or more overshoots.
    let mut rows = [[6_u8; 6]; 6];
    rows[0][..5].fill(2);
    let board = Board::from_rows(&rows).expect("square rows");
    assert!(!SolvabilityAnalyzer::new().has_valid_moves(&board));

    rows[1][0] = 0;
    let board = Board::from_rows(&rows).expect("square rows");
    assert!(SolvabilityAnalyzer::new().has_valid_moves(&board));
}

#[test]
fn agrees_with_brute_force_on_random_five_by_five_boards() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_0005);
    let analyzer = SolvabilityAnalyzer::new();
    let mut outcomes = [0_usize; 2];

    for _ in 0..200 {
        let low = rng.gen_range(0..=4);
        let board = random_board(&mut rng, 5, low, 6);
        let expected = brute_force(&board.occupied_values(), 5, TARGET_SUM);
        assert_eq!(analyzer.has_valid_moves(&board), expected, "{board:?}");
        outcomes[usize::from(expected)] += 1;
    }

    assert!(outcomes[0] > 0 && outcomes[1] > 0, "{outcomes:?}");
}

#[test]
fn agrees_with_brute_force_on_random_six_by_six_boards() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_0006);
    let analyzer = SolvabilityAnalyzer::new();

    for _ in 0..12 {
        let low = rng.gen_range(1..=3);
        let board = random_board(&mut rng, 6, low, 6);
        let expected = brute_force(&board.occupied_values(), 6, TARGET_SUM);
        assert_eq!(analyzer.has_valid_moves(&board), expected, "{board:?}");
    }
}
