use std::time::Instant;

use rand::Rng;

use crate::board::{Board, Direction};

use super::rollout::random_rollout;

/// Exponent of the winning tile, `2^11 = 2048`.
pub const WINNING_EXPONENT: u8 = 11;

#[derive(Debug, Clone, Copy)]
pub struct SearchConstraint {
    pub board: Board,
    pub deadline: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Move(Direction),
    Over(Outcome),
}

/// Per-direction rollout accumulator.
#[derive(Default, Clone, Copy)]
struct Arm {
    total_score: u64,
    samples: u32,
}

impl Arm {
    fn add(&mut self, score: u32) {
        self.total_score += u64::from(score);
        self.samples += 1;
    }

    fn mean(&self) -> f64 {
        debug_assert!(self.samples > 0, "unsampled arm");
        self.total_score as f64 / f64::from(self.samples)
    }
}

/// The move-selection policy: samples random rollouts per legal direction
/// until a deadline, then picks the best average terminal score.
pub struct RolloutPolicy {
    /// Rollouts run by the most recent decision.
    pub rollout_counter: u32,
}

impl RolloutPolicy {
    pub fn new() -> Self {
        Self { rollout_counter: 0 }
    }

    /// Decides the next move, sampling until the constraint's deadline. The
    /// deadline is polled once per full round, so every legal direction gets
    /// the same number of rollouts, at least one even on an expired budget.
    pub fn decide(
        &mut self,
        rng: &mut impl Rng,
        SearchConstraint { board, deadline }: SearchConstraint,
    ) -> Decision {
        self.decide_inner(rng, board, |_| Instant::now() < deadline)
    }

    /// Deadline-free variant running a fixed number of sampling rounds, at
    /// least one.
    pub fn decide_sampled(&mut self, rng: &mut impl Rng, board: Board, rounds: usize) -> Decision {
        self.decide_inner(rng, board, |done| done < rounds)
    }

    fn decide_inner(
        &mut self,
        rng: &mut impl Rng,
        board: Board,
        mut keep_sampling: impl FnMut(usize) -> bool,
    ) -> Decision {
        let moves = board.possible_moves();
        if moves.is_empty() {
            let won = board
                .max_tile()
                .is_some_and(|(tile, _, _)| tile.exponent() >= WINNING_EXPONENT);

            return Decision::Over(if won { Outcome::Won } else { Outcome::Lost });
        }

        // The shifted board per direction is deterministic; only the spawn
        // and the playout behind it are sampled.
        let mut candidates = [(Direction::Up, board); 4];
        let mut num_candidates = 0;
        for candidate in Direction::ALL
            .into_iter()
            .filter_map(|direction| board.checked_shift(direction).map(|b| (direction, b)))
        {
            candidates[num_candidates] = candidate;
            num_candidates += 1;
        }

        let candidates = &candidates[..num_candidates];
        debug_assert_eq!(candidates.len(), moves.len(), "detector and engine disagree");

        let mut arms = [Arm::default(); 4];
        self.rollout_counter = 0;
        let mut rounds = 0;
        loop {
            for (&(_, shifted), arm) in candidates.iter().zip(&mut arms) {
                let (spawned, _) = shifted.with_random_tiles(1, rng);
                arm.add(random_rollout(rng, spawned));
                self.rollout_counter += 1;
            }

            rounds += 1;
            if !keep_sampling(rounds) {
                break;
            }
        }

        // Strictly-greater comparison: on ties the first direction in
        // enumeration order stays the incumbent.
        let mut best = (f64::NEG_INFINITY, Direction::Up);
        for (&(direction, _), arm) in candidates.iter().zip(&arms) {
            let mean = arm.mean();
            log::trace!("{direction}: mean {mean:.1} over {} rollouts", arm.samples);

            if mean > best.0 {
                best = (mean, direction);
            }
        }

        Decision::Move(best.1)
    }
}

impl Default for RolloutPolicy {
    fn default() -> Self {
        Self::new()
    }
}
