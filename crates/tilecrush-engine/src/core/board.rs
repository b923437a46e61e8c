use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{InvalidMoveError, ParseBoardError};

use super::{
    color_source::ColorSource,
    piece::{Color, Piece},
    position::Pos,
};

/// One piece's movement during a column refill.
///
/// `from_row` is negative for newly spawned pieces, which start above the
/// board. `distance` is the number of empty cells the piece fell through.
/// Renderers use these to animate falls; the engine itself never reads
/// them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallMove {
    pub from_row: isize,
    pub to_row: usize,
    pub distance: usize,
    pub spawned: bool,
}

/// The `rows`×`cols` grid of optional pieces.
///
/// The board owns every piece; nothing outside this type writes a slot
/// directly. Cells are addressed by [`Pos`] and stored row-major.
///
/// # Text form
///
/// `Board` implements [`FromStr`] and [`Display`](fmt::Display) with one
/// line per row and one character per cell: digits are ordinary colors,
/// `.` is an empty slot, and specials use the symbols from
/// [`SpecialKind::as_char`](super::piece::SpecialKind::as_char).
///
/// ```
/// use tilecrush_engine::{Board, Pos};
///
/// let board: Board = "012\n1*0\n.20".parse().unwrap();
/// assert_eq!(board.rows(), 3);
/// assert!(board.get(Pos::new(1, 1)).unwrap().is_special());
/// assert!(board.get(Pos::new(2, 0)).is_none());
/// assert_eq!(board.to_string(), "012\n1*0\n.20");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Piece>>,
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Creates a full board with no color runs.
    ///
    /// Cells are filled row-major from `source`. A drawn color that would
    /// complete a run of three with the two cells to the left or the two
    /// cells above is replaced by the next color in the palette that does
    /// not. With at least three colors such a color always exists, so
    /// generation never loops regardless of what the source returns.
    pub fn generate<S>(rows: usize, cols: usize, color_count: u8, source: &mut S) -> Self
    where
        S: ColorSource + ?Sized,
    {
        let mut board = Self::empty(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                let pos = Pos::new(row, col);
                let mut color = draw_color(source, color_count);
                for _ in 0..color_count {
                    if !board.completes_run(pos, color) {
                        break;
                    }
                    color = color.next_in(color_count);
                }
                board.set(pos, Some(Piece::normal(color)));
            }
        }
        board
    }

    fn completes_run(&self, pos: Pos, color: Color) -> bool {
        let same = |row: usize, col: usize| {
            self.get(Pos::new(row, col))
                .and_then(Piece::color)
                .is_some_and(|c| c == color)
        };
        let (row, col) = (pos.row(), pos.col());
        (col >= 2 && same(row, col - 1) && same(row, col - 2))
            || (row >= 2 && same(row - 1, col) && same(row - 2, col))
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub const fn contains(&self, pos: Pos) -> bool {
        pos.row() < self.rows && pos.col() < self.cols
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.row() * self.cols + pos.col())
    }

    /// Returns the piece at `pos`, or `None` for an empty or out-of-bounds
    /// slot.
    #[must_use]
    pub fn get(&self, pos: Pos) -> Option<&Piece> {
        self.index(pos).and_then(|i| self.cells[i].as_ref())
    }

    pub(crate) fn get_mut(&mut self, pos: Pos) -> Option<&mut Piece> {
        self.index(pos).and_then(|i| self.cells[i].as_mut())
    }

    /// Replaces the slot at `pos` and returns the previous occupant.
    ///
    /// Out-of-bounds positions are ignored.
    pub fn set(&mut self, pos: Pos, piece: Option<Piece>) -> Option<Piece> {
        let i = self.index(pos)?;
        std::mem::replace(&mut self.cells[i], piece)
    }

    /// Clears the slot at `pos` and returns what was there.
    pub fn take(&mut self, pos: Pos) -> Option<Piece> {
        self.set(pos, None)
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Pos::new(row, col)))
    }

    /// Iterates over occupied slots in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Pos, &Piece)> + '_ {
        self.positions()
            .filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Exchanges the pieces at two 4-directionally adjacent, in-bounds
    /// positions.
    ///
    /// Fails without touching the board otherwise.
    pub fn swap(&mut self, from: Pos, to: Pos) -> Result<(), InvalidMoveError> {
        let (Some(a), Some(b)) = (self.index(from), self.index(to)) else {
            return Err(InvalidMoveError { from, to });
        };
        if !from.is_adjacent(to) {
            return Err(InvalidMoveError { from, to });
        }
        self.cells.swap(a, b);
        Ok(())
    }

    /// Applies gravity to one column and fills the vacated top slots.
    ///
    /// Remaining pieces are compacted downward preserving their order, then
    /// each empty slot at the top receives a fresh ordinary piece colored by
    /// `source`. Returns one [`FallMove`] for every piece that moved or was
    /// created, bottom-most existing pieces first, then spawned pieces from
    /// the top.
    pub fn refill_column<S>(&mut self, col: usize, color_count: u8, source: &mut S) -> Vec<FallMove>
    where
        S: ColorSource + ?Sized,
    {
        let mut moves = Vec::new();
        if col >= self.cols {
            return moves;
        }

        let mut empty = 0;
        for row in (0..self.rows).rev() {
            let pos = Pos::new(row, col);
            match self.get(pos) {
                None => empty += 1,
                Some(_) if empty > 0 => {
                    let piece = self.take(pos);
                    self.set(Pos::new(row + empty, col), piece);
                    moves.push(FallMove {
                        from_row: to_signed(row),
                        to_row: row + empty,
                        distance: empty,
                        spawned: false,
                    });
                }
                Some(_) => {}
            }
        }

        for row in 0..empty {
            let color = draw_color(source, color_count);
            self.set(Pos::new(row, col), Some(Piece::normal(color)));
            moves.push(FallMove {
                from_row: to_signed(row) - to_signed(empty),
                to_row: row,
                distance: empty,
                spawned: true,
            });
        }
        moves
    }
}

/// Draws the next color, folded into `0..color_count` for sources that
/// ignore the palette size.
fn draw_color<S>(source: &mut S, color_count: u8) -> Color
where
    S: ColorSource + ?Sized,
{
    let color = source.next_color(color_count);
    color
        .index()
        .checked_rem(color_count)
        .map_or(color, Color::new)
}

#[expect(clippy::cast_possible_wrap)]
fn to_signed(n: usize) -> isize {
    n as isize
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..self.cols {
                let c = self.get(Pos::new(row, col)).map_or('.', Piece::as_char);
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self::from_rows(&lines)
    }
}

impl Board {
    fn from_rows<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseBoardError> {
        let Some(first) = lines.first() else {
            return Err(ParseBoardError::Empty);
        };
        let cols = first.as_ref().chars().count();
        if cols == 0 {
            return Err(ParseBoardError::Empty);
        }

        let mut board = Self::empty(lines.len(), cols);
        for (row, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let width = line.chars().count();
            if width != cols {
                return Err(ParseBoardError::RaggedRow {
                    row,
                    expected: cols,
                    found: width,
                });
            }
            for (col, c) in line.chars().enumerate() {
                if c == '.' {
                    continue;
                }
                let piece = Piece::from_char(c)
                    .ok_or(ParseBoardError::UnknownCell { row, col, found: c })?;
                board.set(Pos::new(row, col), Some(piece));
            }
        }
        Ok(board)
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: one string per row (e.g., ["012", "1*0", ".20"])
        let text = self.to_string();
        serializer.collect_seq(text.lines())
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Self::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::SpecialKind;

    fn cycling(colors: &[u8]) -> impl FnMut() -> Color + '_ {
        let mut i = 0;
        move || {
            let c = Color::new(colors[i % colors.len()]);
            i += 1;
            c
        }
    }

    #[test]
    fn test_parse_and_display() {
        let text = "012\n|*+\n.w@";
        let board: Board = text.parse().unwrap();
        assert_eq!(board.rows(), 3);
        assert_eq!(board.cols(), 3);
        assert_eq!(
            board.get(Pos::new(1, 0)).unwrap().special_kind(),
            Some(SpecialKind::VerticalStripe)
        );
        assert_eq!(board.get(Pos::new(2, 0)), None);
        assert_eq!(board.to_string(), text);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("".parse::<Board>(), Err(ParseBoardError::Empty)));
        assert!(matches!(
            "012\n01".parse::<Board>(),
            Err(ParseBoardError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            "01?".parse::<Board>(),
            Err(ParseBoardError::UnknownCell {
                row: 0,
                col: 2,
                found: '?'
            })
        ));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut board: Board = "01\n10".parse().unwrap();
        assert!(board.get(Pos::new(2, 0)).is_none());
        assert!(board.set(Pos::new(0, 5), Some(Piece::spent())).is_none());
        assert_eq!(board.to_string(), "01\n10");
    }

    #[test]
    fn test_swap_adjacent() {
        let mut board: Board = "012\n345".parse().unwrap();
        board.swap(Pos::new(0, 0), Pos::new(0, 1)).unwrap();
        assert_eq!(board.to_string(), "102\n345");
        board.swap(Pos::new(1, 2), Pos::new(0, 2)).unwrap();
        assert_eq!(board.to_string(), "105\n342");
    }

    #[test]
    fn test_swap_rejects_non_adjacent_and_out_of_bounds() {
        let mut board: Board = "012\n345".parse().unwrap();
        let before = board.clone();

        let err = board.swap(Pos::new(0, 0), Pos::new(1, 1)).unwrap_err();
        assert_eq!(err.from, Pos::new(0, 0));
        assert!(board.swap(Pos::new(0, 0), Pos::new(0, 2)).is_err());
        assert!(board.swap(Pos::new(0, 0), Pos::new(0, 0)).is_err());
        assert!(board.swap(Pos::new(1, 2), Pos::new(1, 3)).is_err());
        assert!(board.swap(Pos::new(2, 0), Pos::new(1, 0)).is_err());

        assert_eq!(board, before);
    }

    #[test]
    fn test_refill_column_compacts_and_spawns() {
        // Column 0 holds a, ., b, ., c from top to bottom.
        let mut board: Board = "1\n.\n2\n.\n3".parse().unwrap();
        let mut source = cycling(&[7, 8]);
        let moves = board.refill_column(0, 10, &mut source);

        assert_eq!(board.to_string(), "7\n8\n1\n2\n3");
        assert_eq!(
            moves,
            vec![
                FallMove {
                    from_row: 2,
                    to_row: 3,
                    distance: 1,
                    spawned: false,
                },
                FallMove {
                    from_row: 0,
                    to_row: 2,
                    distance: 2,
                    spawned: false,
                },
                FallMove {
                    from_row: -2,
                    to_row: 0,
                    distance: 2,
                    spawned: true,
                },
                FallMove {
                    from_row: -1,
                    to_row: 1,
                    distance: 2,
                    spawned: true,
                },
            ]
        );
    }

    #[test]
    fn test_refill_full_column_is_noop() {
        let mut board: Board = "12\n34".parse().unwrap();
        let mut source = cycling(&[0]);
        assert!(board.refill_column(1, 5, &mut source).is_empty());
        assert!(board.refill_column(9, 5, &mut source).is_empty());
        assert_eq!(board.to_string(), "12\n34");
    }

    #[test]
    fn test_refill_keeps_specials() {
        let mut board: Board = "*\n.\n.".parse().unwrap();
        let mut source = cycling(&[4]);
        board.refill_column(0, 5, &mut source);
        assert_eq!(board.to_string(), "4\n4\n*");
    }

    #[test]
    fn test_generate_has_no_runs_even_with_constant_source() {
        let mut source = cycling(&[2]);
        let board = Board::generate(9, 9, 3, &mut source);
        assert!(board.is_full());
        for pos in board.positions() {
            let color = board.get(pos).and_then(Piece::color).unwrap();
            assert!(!board.completes_run(pos, color), "run ends at {pos}");
        }
    }

    #[test]
    fn test_out_of_palette_colors_are_folded() {
        let mut source = cycling(&[12, 200, 255]);
        let mut board = Board::generate(4, 4, 5, &mut source);
        for (_, piece) in board.pieces() {
            assert!(piece.color().unwrap().index() < 5);
        }

        assert!(board.take(Pos::new(0, 1)).is_some());
        assert!(board.take(Pos::new(1, 1)).is_some());
        board.refill_column(1, 5, &mut source);
        for (_, piece) in board.pieces() {
            assert!(piece.color().unwrap().index() < 5);
        }

        let text = board.to_string();
        assert!(text.chars().all(|c| c == '\n' || c.is_ascii_digit()));
        assert_eq!(text.parse::<Board>().unwrap(), board);
    }

    #[test]
    fn test_serde_as_rows() {
        let board: Board = "01\n*.".parse().unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["01","*."]"#);
        assert_eq!(serde_json::from_str::<Board>(&json).unwrap(), board);
        assert!(serde_json::from_str::<Board>(r#"["01","*"]"#).is_err());
    }
}
