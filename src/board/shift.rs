use std::fmt;

use super::{Board, Tile};

/// The axis a move compacts and merges along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order; tie-breaking in the policy depends on it.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn bit(self) -> u8 {
        match self {
            Direction::Up => 1 << 0,
            Direction::Down => 1 << 1,
            Direction::Left => 1 << 2,
            Direction::Right => 1 << 3,
        }
    }

    /// The neighbor of (row, col) one step along this direction, if any.
    fn step(self, row: usize, col: usize) -> Option<(usize, usize)> {
        match self {
            Direction::Up => row.checked_sub(1).map(|r| (r, col)),
            Direction::Down => (row < 3).then(|| (row + 1, col)),
            Direction::Left => col.checked_sub(1).map(|c| (row, c)),
            Direction::Right => (col < 3).then(|| (row, col + 1)),
        }
    }

    /// Cell indices of the four lines swept by this direction, each ordered
    /// from the destination edge outward.
    fn lines(self) -> [[usize; 4]; 4] {
        let mut lines = [[0; 4]; 4];
        for (line, lane) in lines.iter_mut().zip(0..4) {
            for (slot, depth) in line.iter_mut().zip(0..4) {
                *slot = match self {
                    Direction::Up => depth * 4 + lane,
                    Direction::Down => (3 - depth) * 4 + lane,
                    Direction::Left => lane * 4 + depth,
                    Direction::Right => lane * 4 + (3 - depth),
                };
            }
        }

        lines
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };

        f.write_str(name)
    }
}

/// A set of directions, iterated in enumeration order.
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_all(self) -> bool {
        self.0 == 0b1111
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl fmt::Debug for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Board {
    /// Applies one move: compact toward the edge, merge equal neighbors once,
    /// compact again. Returns `None` iff the grid is unchanged, in which case
    /// the move is rejected and the caller must not spawn or count it.
    pub fn checked_shift(self, direction: Direction) -> Option<Board> {
        let mut next = self;
        for line in direction.lines() {
            next.shift_line(&line);
        }

        (next.cells != self.cells).then_some(next)
    }

    fn shift_line(&mut self, line: &[usize; 4]) {
        compact_line(&mut self.cells, line);

        // One ascending pass merges each tile at most once: a merge lands on
        // the near slot of a pair the scan has already moved past, and empties
        // the far slot before the next pair is read.
        for near in 0..3 {
            let (Some(a), Some(b)) = (self.cells[line[near]], self.cells[line[near + 1]]) else {
                continue;
            };

            if a.exponent() != b.exponent() {
                continue;
            }

            let merged = a.promoted();
            self.cells[line[near]] = Some(merged);
            self.cells[line[near + 1]] = None;
            self.score += merged.value();
            self.merge_count += 1;
        }

        compact_line(&mut self.cells, line);
    }

    /// Directions whose application would change the grid: some occupied cell
    /// has a neighbor along the direction that is empty or of equal exponent.
    /// Agrees exactly with `checked_shift`.
    pub fn possible_moves(&self) -> DirectionSet {
        let mut moves = DirectionSet::default();

        for row in 0..4 {
            for col in 0..4 {
                let Some(tile) = self.get(row, col) else { continue };

                for direction in Direction::ALL {
                    if moves.contains(direction) {
                        continue;
                    }

                    let Some((r, c)) = direction.step(row, col) else {
                        continue;
                    };

                    match self.get(r, c) {
                        None => moves.insert(direction),
                        Some(other) if other.exponent() == tile.exponent() => {
                            moves.insert(direction)
                        }
                        Some(_) => {}
                    }
                }

                if moves.is_all() {
                    return moves;
                }
            }
        }

        moves
    }
}

/// Slides the line's tiles toward its first slot, closing gaps and keeping
/// their order.
fn compact_line(cells: &mut [Option<Tile>; 16], line: &[usize; 4]) {
    let mut write = 0;
    for read in 0..4 {
        let Some(tile) = cells[line[read]].take() else {
            continue;
        };

        cells[line[write]] = Some(tile);
        write += 1;
    }
}
