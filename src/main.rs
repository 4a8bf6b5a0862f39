use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

use twenty_fourty_eight_rollout::{board::Board, game};

/// 2048 with a time-boxed random-rollout auto-player
#[derive(Parser)]
#[command(name = "twenty-fourty-eight-rollout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively with WASD or the arrow keys
    Play {
        /// Start position: 16 cells in row-major order, `.` for an empty
        /// cell, a hex exponent otherwise (e.g. ".1.. .... ..2. ....")
        #[arg(long)]
        board: Option<Board>,
    },
    /// Watch the rollout policy play one game
    Auto {
        /// Wall-clock time budget per move, in milliseconds
        #[arg(long, default_value_t = 100)]
        budget_ms: u64,

        /// Start position instead of a fresh game
        #[arg(long)]
        board: Option<Board>,

        /// Skip per-move rendering
        #[arg(long)]
        quiet: bool,
    },
    /// Play many policy games and append their results to a log
    Batch {
        /// Number of games to play
        #[arg(long, default_value_t = 10)]
        runs: usize,

        /// Wall-clock time budget per move, in milliseconds
        #[arg(long, default_value_t = 100)]
        budget_ms: u64,

        /// Append-only results file
        #[arg(long, default_value = "results.log")]
        log: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let rng = &mut rand::rng();

    match cli.command.unwrap_or(Commands::Play { board: None }) {
        Commands::Play { board } => {
            let start = board.unwrap_or_else(|| Board::new_game(rng));
            game::tui::play_interactive(rng, start)?;
        }

        Commands::Auto {
            budget_ms,
            board,
            quiet,
        } => {
            let start = board.unwrap_or_else(|| Board::new_game(rng));
            let budget = Duration::from_millis(budget_ms);
            let summary = game::play_auto(rng, budget, start, !quiet);

            println!(
                "{:?} with score {} and max tile {} after {} moves \
                 ({:.3}s per move)",
                summary.outcome,
                summary.score,
                summary.max_value,
                summary.moves,
                summary.average_move_time().as_secs_f64(),
            );
        }

        Commands::Batch {
            runs,
            budget_ms,
            log,
        } => {
            game::run_batch(rng, runs, Duration::from_millis(budget_ms), &log)?;
        }
    }

    Ok(())
}
