use std::{
    fs::{File, OpenOptions},
    io::Write as _,
    path::Path,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use indicatif::ProgressBar;
use number_prefix::NumberPrefix;
use rand::Rng;

use crate::{
    board::Board,
    search::policy::{Decision, Outcome, RolloutPolicy, SearchConstraint},
};

pub mod tui;

#[derive(Debug, Clone, Copy)]
pub struct GameSummary {
    pub outcome: Outcome,
    pub score: u32,
    pub max_value: u32,
    pub moves: u32,
    pub duration: Duration,
}

impl GameSummary {
    pub fn average_move_time(&self) -> Duration {
        if self.moves == 0 {
            return Duration::ZERO;
        }

        self.duration / self.moves
    }
}

/// Lets the rollout policy play one game to the end, spending `budget` of
/// wall-clock time per move.
pub fn play_auto(rng: &mut impl Rng, budget: Duration, start: Board, render: bool) -> GameSummary {
    let mut policy = RolloutPolicy::new();
    let mut board = start;
    let mut moves = 0;
    let started = Instant::now();

    loop {
        if render {
            println!("{board}\n");
        }

        let constraint = SearchConstraint {
            board,
            deadline: Instant::now() + budget,
        };

        let move_started = Instant::now();
        let direction = match policy.decide(rng, constraint) {
            Decision::Move(direction) => direction,
            Decision::Over(outcome) => {
                return GameSummary {
                    outcome,
                    score: board.score(),
                    max_value: board.max_tile().map_or(0, |(tile, _, _)| tile.value()),
                    moves,
                    duration: started.elapsed(),
                };
            }
        };

        let Some(shifted) = board.checked_shift(direction) else {
            unreachable!("the policy picked {direction}, but the board rejects it");
        };

        board = shifted.with_random_tiles(1, rng).0;
        moves += 1;

        let rate = f64::from(policy.rollout_counter) / move_started.elapsed().as_secs_f64();
        match NumberPrefix::decimal(rate) {
            NumberPrefix::Standalone(rate) => {
                log::info!(
                    "move {moves}: {direction} after {} rollouts ({rate:.0}/s)",
                    policy.rollout_counter
                );
            }
            NumberPrefix::Prefixed(prefix, rate) => {
                log::info!(
                    "move {moves}: {direction} after {} rollouts ({rate:.1} {prefix}/s)",
                    policy.rollout_counter
                );
            }
        }
    }
}

/// One line per completed game plus a closing aggregate line, appended to a
/// plain-text log that survives across invocations.
pub struct ResultsLog {
    file: File,
}

impl ResultsLog {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .with_context(|| format!("opening results log {}", path.display()))?;

        Ok(Self { file })
    }

    pub fn record_run(&mut self, run: usize, score: u32) -> anyhow::Result<()> {
        writeln!(self.file, "run {run} completed with score: {score}")?;
        Ok(())
    }

    pub fn record_batch(
        &mut self,
        runs: usize,
        average_score: f64,
        average_move_time: Duration,
    ) -> anyhow::Result<()> {
        writeln!(
            self.file,
            "finished {runs} runs with average score: {average_score:.1}, \
             average time per move: {:.3}s",
            average_move_time.as_secs_f64()
        )?;

        Ok(())
    }
}

/// Plays `runs` policy games and appends per-run scores and the batch
/// aggregate to the results log.
pub fn run_batch(
    rng: &mut impl Rng,
    runs: usize,
    budget: Duration,
    log_path: &Path,
) -> anyhow::Result<()> {
    let mut results = ResultsLog::open(log_path)?;
    let bar = ProgressBar::new(runs as u64);

    let mut total_score = 0u64;
    let mut total_moves = 0u32;
    let mut total_play_time = Duration::ZERO;

    for run in 1..=runs {
        let board = Board::new_game(rng);
        let summary = play_auto(rng, budget, board, false);
        results.record_run(run, summary.score)?;

        log::info!(
            "run {run}: {:?} with score {} and max tile {} after {} moves",
            summary.outcome,
            summary.score,
            summary.max_value,
            summary.moves,
        );

        total_score += u64::from(summary.score);
        total_moves += summary.moves;
        total_play_time += summary.duration;
        bar.inc(1);
    }

    bar.finish_and_clear();

    let average_score = total_score as f64 / runs as f64;
    let average_move_time = if total_moves == 0 {
        Duration::ZERO
    } else {
        total_play_time / total_moves
    };
    results.record_batch(runs, average_score, average_move_time)?;

    println!(
        "finished {runs} runs: average score {average_score:.1}, \
         average time per move {:.3}s",
        average_move_time.as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_results_log_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "rollout-2048-results-{}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let mut log = ResultsLog::open(&path).unwrap();
            log.record_run(1, 1234).unwrap();
            log.record_run(2, 990).unwrap();
        }
        {
            let mut log = ResultsLog::open(&path).unwrap();
            log.record_batch(2, 1112.0, Duration::from_millis(82)).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3, "reopening must append, not truncate");
        assert_eq!(lines[0], "run 1 completed with score: 1234");
        assert_eq!(lines[1], "run 2 completed with score: 990");
        assert!(lines[2].starts_with("finished 2 runs with average score: 1112.0"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_play_auto_reaches_a_terminal_state() {
        let rng = &mut rand::rng();
        let board = Board::new_game(rng);
        let summary = play_auto(rng, Duration::ZERO, board, false);

        assert!(summary.moves > 0);
        assert!(summary.score > 0);
        assert!(summary.max_value >= 4);
    }
}
