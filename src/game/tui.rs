use std::io::{self, Write as _};

use crossterm::{
    QueueableCommand as _,
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use rand::Rng;

use crate::{
    board::{Board, Direction, Tile},
    search::policy::{Outcome, WINNING_EXPONENT},
};

/// Interactive play: WASD or the arrow keys move, `q` or Esc quits. A key
/// that maps to no direction, or to a rejected move, changes nothing and the
/// board is simply drawn again.
pub fn play_interactive(rng: &mut impl Rng, start: Board) -> io::Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let mut board = start;
    let mut moves = 0u32;
    let mut last_move: Option<Direction> = None;

    loop {
        draw(&mut stdout, board, moves, last_move)?;

        if board.possible_moves().is_empty() {
            let outcome = if board
                .max_tile()
                .is_some_and(|(tile, _, _)| tile.exponent() >= WINNING_EXPONENT)
            {
                Outcome::Won
            } else {
                Outcome::Lost
            };

            let message = match outcome {
                Outcome::Won => "You won! Press any key to exit.",
                Outcome::Lost => "No moves left. Press any key to exit.",
            };

            stdout.queue(Print(message))?.queue(Print("\r\n"))?;
            stdout.flush()?;
            event::read()?;
            break;
        }

        let event = event::read()?;
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            continue;
        };

        let direction = match code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('w') | KeyCode::Up => Direction::Up,
            KeyCode::Char('s') | KeyCode::Down => Direction::Down,
            KeyCode::Char('a') | KeyCode::Left => Direction::Left,
            KeyCode::Char('d') | KeyCode::Right => Direction::Right,
            _ => continue,
        };

        last_move = Some(direction);
        if let Some(shifted) = board.checked_shift(direction) {
            board = shifted.with_random_tiles(1, rng).0;
            moves += 1;
        }
    }

    execute!(stdout, LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;

    Ok(())
}

fn draw(
    stdout: &mut io::Stdout,
    board: Board,
    moves: u32,
    last_move: Option<Direction>,
) -> io::Result<()> {
    stdout.queue(Clear(ClearType::All))?;
    stdout.queue(MoveTo(0, 0))?;

    match last_move {
        Some(direction) => stdout.queue(Print(format!(
            "Moves:{moves}, Last move:{direction}\r\n"
        )))?,
        None => stdout.queue(Print(format!("Moves:{moves}\r\n")))?,
    };

    match board.max_tile() {
        Some((tile, row, col)) => stdout.queue(Print(format!(
            "Score:{}, Merges:{}, Max tile:{} at ({},{})\r\n",
            board.score(),
            board.merge_count(),
            tile.value(),
            row + 1,
            col + 1,
        )))?,
        None => stdout.queue(Print(format!(
            "Score:{}, Merges:{}\r\n",
            board.score(),
            board.merge_count()
        )))?,
    };

    let rule = "-".repeat(4 * 7 + 1);
    for row in 0..4 {
        stdout.queue(Print(&rule))?.queue(Print("\r\n"))?;
        stdout.queue(Print("|"))?;

        for col in 0..4 {
            let cell = board.get(row, col);
            stdout
                .queue(SetForegroundColor(tile_color(cell)))?
                .queue(Print(match cell {
                    Some(tile) => format!("{:^6}", tile.value()),
                    None => "      ".to_string(),
                }))?
                .queue(ResetColor)?
                .queue(Print("|"))?;
        }

        stdout.queue(Print("\r\n"))?;
    }
    stdout.queue(Print(&rule))?.queue(Print("\r\n"))?;

    stdout.flush()
}

fn tile_color(tile: Option<Tile>) -> Color {
    match tile.map_or(0, Tile::exponent) {
        0 => Color::DarkGrey,
        1..=6 => Color::White,
        7..WINNING_EXPONENT => Color::Yellow,
        _ => Color::Green,
    }
}
