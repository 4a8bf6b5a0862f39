use std::{
    fmt::{self, Write as _},
    num::NonZeroU8,
    str::FromStr,
};

use thiserror::Error;

mod shift;
mod spawn;

pub use shift::{Direction, DirectionSet};

/// A single occupied cell, holding the tile's exponent.
///
/// The displayed value is `2^exponent`, so exponents start at 1. Storing a
/// `NonZeroU8` keeps `Option<Tile>` at one byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Tile(NonZeroU8);

impl Tile {
    pub fn new(exponent: u8) -> Option<Self> {
        NonZeroU8::new(exponent).map(Self)
    }

    pub fn exponent(self) -> u8 {
        self.0.get()
    }

    /// The displayed value, `2^exponent`.
    pub fn value(self) -> u32 {
        1 << u32::from(self.0.get())
    }

    /// The tile created by merging two of this tile.
    pub(crate) fn promoted(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tile").field(&self.value()).finish()
    }
}

/// A 4x4 board: a 16-slot arena of optional tiles plus the score and merge
/// counters.
///
/// `Board` is a plain value. Every transition consumes `self` and returns a
/// new board, so a rollout can never alias the state it was forked from.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Tile>; 16],
    score: u32,
    merge_count: u32,
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [None; 16],
            score: 0,
            merge_count: 0,
        }
    }

    /// Builds a board from exponents, `0` meaning an empty cell.
    pub fn from_array(cells: [[u8; 4]; 4]) -> Self {
        let mut board = Self::empty();
        let flat: [u8; 16] = unsafe { std::mem::transmute(cells) };

        for (slot, exponent) in board.cells.iter_mut().zip(flat) {
            *slot = Tile::new(exponent);
        }

        board
    }

    pub fn to_array(self) -> [[u8; 4]; 4] {
        let mut flat = [0u8; 16];
        for (out, cell) in flat.iter_mut().zip(self.cells) {
            *out = cell.map_or(0, Tile::exponent);
        }

        unsafe { std::mem::transmute(flat) }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.cells[row * 4 + col]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn merge_count(&self) -> u32 {
        self.merge_count
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn num_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// The highest tile and its (row, col), keeping the first occurrence when
    /// the maximum appears more than once.
    pub fn max_tile(&self) -> Option<(Tile, usize, usize)> {
        let mut max = None;
        for (idx, tile) in self.cells.iter().enumerate() {
            let Some(tile) = *tile else { continue };
            if max.is_none_or(|(best, _, _): (Tile, _, _)| tile.exponent() > best.exponent()) {
                max = Some((tile, idx / 4, idx % 4));
            }
        }

        max
    }

    pub(crate) fn empty_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.is_none().then_some(idx))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("unexpected character {0:?} in board string")]
    UnexpectedChar(char),
    #[error("expected 16 cells, found {0}")]
    WrongCellCount(usize),
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parses 16 cell characters in row-major order: `.` for an empty cell,
    /// a hex digit `1`..`f` for an exponent. Whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Self::empty();
        let mut count = 0;

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            let exponent = match c {
                '.' => 0,
                '1'..='9' => c as u8 - b'0',
                'a'..='f' => 10 + (c as u8 - b'a'),
                _ => return Err(ParseBoardError::UnexpectedChar(c)),
            };

            if count < 16 {
                board.cells[count] = Tile::new(exponent);
            }
            count += 1;
        }

        if count != 16 {
            return Err(ParseBoardError::WrongCellCount(count));
        }

        Ok(board)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, cell) in self.cells.iter().enumerate() {
            if idx > 0 && idx % 4 == 0 {
                f.write_char('\n')?;
            }

            match cell {
                Some(tile) => write!(f, "{:2x}", tile.exponent())?,
                None => f.write_str(" .")?,
            }
        }

        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_tile() {
            Some((tile, row, col)) => writeln!(
                f,
                "Score:{}, Merges:{}, Max tile:{} at ({},{})",
                self.score,
                self.merge_count,
                tile.value(),
                row + 1,
                col + 1,
            )?,
            None => writeln!(f, "Score:{}, Merges:{}", self.score, self.merge_count)?,
        }

        let rule = "-".repeat(4 * 7 + 1);
        for row in 0..4 {
            writeln!(f, "{rule}")?;
            f.write_char('|')?;
            for col in 0..4 {
                match self.get(row, col) {
                    Some(tile) => write!(f, "{:^6}|", tile.value())?,
                    None => write!(f, "      |")?,
                }
            }
            f.write_char('\n')?;
        }
        f.write_str(&rule)
    }
}

pub mod test_utils {
    use itertools::Itertools as _;
    use rand::seq::{IndexedRandom as _, SliceRandom as _};

    use super::{Board, Tile};

    /// A board with `filled` distinct exponents plus `duplicates` repeats of
    /// them, shuffled over the 16 slots.
    pub fn random_board(filled: u8, duplicates: u8) -> Board {
        let mut exponents = Vec::with_capacity(16);
        exponents.extend(1..filled + 1);

        if !exponents.is_empty() {
            let duplicates = (0..duplicates)
                .map(|_| *exponents.choose(&mut rand::rng()).unwrap())
                .collect_vec();

            exponents.extend(duplicates);
        }

        exponents.resize(16, 0);
        exponents.shuffle(&mut rand::rng());

        let mut board = Board::empty();
        for (slot, exponent) in board.cells.iter_mut().zip(exponents) {
            *slot = Tile::new(exponent);
        }

        board
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_array_round_trip() {
        let cells = [[0, 1, 0, 1], [0, 2, 2, 1], [2, 2, 2, 1], [1, 1, 1, 1]];
        let board = Board::from_array(cells);
        assert_eq!(board.to_array(), cells);
        assert_eq!(board.score(), 0);
        assert_eq!(board.merge_count(), 0);
    }

    #[test]
    fn test_tile_values() {
        let tile = Tile::new(3).unwrap();
        assert_eq!(tile.value(), 8);
        assert_eq!(tile.promoted().value(), 16);
        assert_eq!(Tile::new(0), None);
    }

    #[test]
    fn test_parse() {
        let board: Board = "1 . . 2\n. . . .\n. a . .\n. . . f".parse().unwrap();
        assert_eq!(board.to_array(), [
            [1, 0, 0, 2],
            [0, 0, 0, 0],
            [0, 10, 0, 0],
            [0, 0, 0, 15]
        ]);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            "x...............".parse::<Board>(),
            Err(ParseBoardError::UnexpectedChar('x'))
        );
        assert_eq!(
            "....".parse::<Board>(),
            Err(ParseBoardError::WrongCellCount(4))
        );
        assert_eq!(
            ".................".parse::<Board>(),
            Err(ParseBoardError::WrongCellCount(17))
        );
    }

    #[test]
    fn test_debug_parse_round_trip() {
        for filled in 0..16 {
            let board = test_utils::random_board(filled, 0);
            let reparsed: Board = format!("{board:?}").parse().unwrap();
            assert_eq!(reparsed.to_array(), board.to_array());
        }
    }

    #[test]
    fn test_max_tile_keeps_first() {
        let board = Board::from_array([[0, 3, 0, 0], [0, 0, 3, 0], [1, 0, 0, 0], [0, 0, 0, 0]]);
        let (tile, row, col) = board.max_tile().unwrap();
        assert_eq!((tile.value(), row, col), (8, 0, 1));
    }

    #[test]
    fn test_max_tile_empty_board() {
        assert!(Board::empty().max_tile().is_none());
    }

    #[test]
    fn test_display_metrics() {
        let board = Board::from_array([[1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let rendered = board.to_string();
        assert!(rendered.starts_with("Score:0, Merges:0, Max tile:2 at (1,1)"));
        assert!(rendered.contains("|  2   |"));
    }
}
