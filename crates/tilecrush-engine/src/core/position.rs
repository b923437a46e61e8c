use std::{collections::BTreeSet, fmt, str::FromStr};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::ParsePosError;

/// A set of cells, ordered row-major.
pub type CellSet = BTreeSet<Pos>;

/// A cell coordinate on the board.
///
/// Rows grow downward (row 0 is the top, where refilled pieces enter) and
/// columns grow rightward. Two positions denote the same slot iff both
/// coordinates are equal; every set of affected cells in the engine is keyed
/// by `Pos`, never by piece identity.
///
/// The derived ordering is ascending `(row, col)`, which is also the final
/// tie-break when choosing a promotion anchor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Pos {
    row: usize,
    col: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Parses the `row,col` form used on the command line (e.g. `"4,7"`).
impl FromStr for Pos {
    type Err = ParsePosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s.split_once(',').ok_or_else(|| ParsePosError {
            input: s.to_owned(),
        })?;
        let parse = |part: &str| {
            part.trim().parse::<usize>().map_err(|_| ParsePosError {
                input: s.to_owned(),
            })
        };
        Ok(Self::new(parse(row)?, parse(col)?))
    }
}

impl Pos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.col
    }

    /// Returns `true` if `other` is exactly one step away along one axis.
    ///
    /// Diagonal neighbors and the position itself are not adjacent.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        let d_row = self.row.abs_diff(other.row);
        let d_col = self.col.abs_diff(other.col);
        (d_row == 1 && d_col == 0) || (d_row == 0 && d_col == 1)
    }

    /// Returns the up-to-four orthogonal neighbors that lie inside a
    /// `rows`×`cols` grid, in up, down, left, right order.
    #[must_use]
    pub fn neighbors(self, rows: usize, cols: usize) -> ArrayVec<Self, 4> {
        let mut out = ArrayVec::new();
        if self.row > 0 {
            out.push(Self::new(self.row - 1, self.col));
        }
        if self.row + 1 < rows {
            out.push(Self::new(self.row + 1, self.col));
        }
        if self.col > 0 {
            out.push(Self::new(self.row, self.col - 1));
        }
        if self.col + 1 < cols {
            out.push(Self::new(self.row, self.col + 1));
        }
        out
    }
}
