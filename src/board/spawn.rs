use rand::{Rng, seq::IndexedRandom as _};

use super::{Board, Tile};

impl Board {
    /// An empty board seeded with two random tiles.
    pub fn new_game(rng: &mut impl Rng) -> Self {
        let (board, _) = Self::empty().with_random_tiles(2, rng);
        board
    }

    /// Places up to `n` random tiles, each on an empty cell chosen uniformly:
    /// exponent 2 with probability 1/5, exponent 1 otherwise. Occupied cells
    /// are never overwritten. Returns `(self, false)` unchanged when the
    /// board is already full; filling up mid-way stops early.
    pub fn with_random_tiles(mut self, n: usize, rng: &mut impl Rng) -> (Self, bool) {
        if self.is_full() {
            return (self, false);
        }

        for _ in 0..n {
            let empty: Vec<usize> = self.empty_slots().collect();
            let Some(&slot) = empty.choose(rng) else { break };

            let exponent = if rng.random_ratio(1, 5) { 2 } else { 1 };
            self.cells[slot] = Tile::new(exponent);
        }

        (self, true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::test_utils;

    #[test]
    fn test_full_board_rejects_spawn() {
        let board = test_utils::random_board(15, 1);
        assert!(board.is_full());

        let (spawned, ok) = board.with_random_tiles(1, &mut rand::rng());
        assert!(!ok);
        assert_eq!(spawned.to_array(), board.to_array());
    }

    #[test]
    fn test_spawn_never_overwrites() {
        let rng = &mut rand::rng();

        for filled in 0..16 {
            let board = test_utils::random_board(filled, 0);
            let (spawned, ok) = board.with_random_tiles(1, rng);
            assert!(ok);
            assert_eq!(spawned.num_empty(), board.num_empty() - 1);

            for (before, after) in board.to_array().as_flattened().iter().zip(
                spawned.to_array().as_flattened(),
            ) {
                if *before != 0 {
                    assert_eq!(before, after, "spawn overwrote an occupied cell");
                } else {
                    assert!(
                        *after == *before || *after == 1 || *after == 2,
                        "spawned tile must have exponent 1 or 2"
                    );
                }
            }
        }
    }

    #[test]
    fn test_spawn_stops_when_board_fills() {
        let board = test_utils::random_board(14, 0);
        assert_eq!(board.num_empty(), 2);

        let (spawned, ok) = board.with_random_tiles(5, &mut rand::rng());
        assert!(ok);
        assert!(spawned.is_full());
    }

    #[test]
    fn test_new_game_seeds_two_tiles() {
        let board = Board::new_game(&mut rand::rng());
        assert_eq!(board.num_empty(), 14);
        assert_eq!(board.score(), 0);
        assert_eq!(board.merge_count(), 0);
    }
}
