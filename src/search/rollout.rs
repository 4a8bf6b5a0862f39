use rand::Rng;

use crate::board::{Board, Direction};

/// Plays uniformly random legal moves, spawning one tile after each, until no
/// direction changes the board, and returns the terminal score.
///
/// The board is taken by value: the caller's state cannot be touched. A full
/// board is not terminal on its own, it may still hold a legal merge.
pub fn random_rollout(rng: &mut impl Rng, mut board: Board) -> u32 {
    loop {
        let mut moves = [board; 4];
        let mut num_moves = 0;
        for shifted in Direction::ALL
            .into_iter()
            .filter_map(|direction| board.checked_shift(direction))
        {
            moves[num_moves] = shifted;
            num_moves += 1;
        }

        if num_moves == 0 {
            return board.score();
        }

        let shifted = moves[rng.random_range(0..num_moves)];
        let (spawned, ok) = shifted.with_random_tiles(1, rng);
        debug_assert!(ok, "a changed board always has an empty cell");

        board = spawned;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::test_utils;

    #[test]
    fn test_rollout_leaves_caller_state_untouched() {
        let rng = &mut rand::rng();

        for filled in 0..12 {
            let board = test_utils::random_board(filled, 2);
            let before = board;

            random_rollout(rng, board);

            assert_eq!(board, before);
            assert_eq!(board.score(), before.score());
            assert_eq!(board.merge_count(), before.merge_count());
        }
    }

    #[test]
    fn test_rollout_score_is_monotonic() {
        let rng = &mut rand::rng();

        for _ in 0..20 {
            let board = Board::new_game(rng);
            assert!(random_rollout(rng, board) >= board.score());
        }
    }

    #[test]
    fn test_rollout_of_terminal_board_returns_its_score() {
        // No empty cells and no equal neighbors: nothing to play.
        let board = Board::from_array([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 2, 1]]);
        assert!(board.possible_moves().is_empty());

        assert_eq!(random_rollout(&mut rand::rng(), board), board.score());
    }
}
