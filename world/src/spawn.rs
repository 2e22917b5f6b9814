//! Weighted tile spawning.

use rand::Rng;
use sum_ten_core::{Board, SpawnWeights, SpawnedTile, TileValue};

/// Draws fresh tile values from a difficulty tier's spawn weights.
#[derive(Clone, Debug, PartialEq)]
pub struct TileSpawner {
    weights: SpawnWeights,
    fallback: TileValue,
}

impl TileSpawner {
    /// Creates a spawner that substitutes `fallback` whenever `weights` leave a
    /// roll uncovered.
    #[must_use]
    pub fn new(weights: SpawnWeights, fallback: TileValue) -> Self {
        Self { weights, fallback }
    }

    /// Draws a single value by cumulative-distribution sampling.
    pub fn spawn_value<R: Rng + ?Sized>(&self, rng: &mut R) -> TileValue {
        let roll: f32 = rng.gen();
        self.weights.sample(roll).unwrap_or(self.fallback)
    }

    /// Fills every empty cell, column by column and top to bottom.
    pub fn fill<R: Rng + ?Sized>(&self, board: &mut Board, rng: &mut R) -> Vec<SpawnedTile> {
        board
            .empty_cells()
            .into_iter()
            .map(|cell| {
                let value = self.spawn_value(rng);
                let _ = board.set(cell, Some(value));
                SpawnedTile { cell, value }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sum_ten_core::CellCoord;

    use super::*;

    #[test]
    fn degenerate_weights_fall_back() {
        let spawner = TileSpawner::new(SpawnWeights::new(vec![0.0; 7]), 2);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(spawner.spawn_value(&mut rng), 2);
        }
    }

    #[test]
    fn fill_only_touches_empty_cells() {
        let spawner = TileSpawner::new(SpawnWeights::new(vec![0.0, 1.0]), 0);
        let mut board = Board::from_rows(&[[5, 5], [5, 5]]).expect("valid rows");
        let _ = board.set(CellCoord::new(1, 0), None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let spawned = spawner.fill(&mut board, &mut rng);

        assert_eq!(
            spawned,
            vec![SpawnedTile {
                cell: CellCoord::new(1, 0),
                value: 1,
            }]
        );
        assert_eq!(board.occupied_values(), vec![5, 1, 5, 5]);
    }
}
