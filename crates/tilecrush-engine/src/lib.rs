pub use self::{core::*, engine::*, rules::*};

pub mod core;
pub mod engine;
pub mod rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid move: {from} and {to} are not adjacent cells on the board")]
pub struct InvalidMoveError {
    pub from: Pos,
    pub to: Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum SwapError {
    #[display("{_0}")]
    InvalidMove(InvalidMoveError),
    #[display("input is locked while the board is resolving")]
    InputLocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("input is locked while the board is resolving")]
pub struct InputLockedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no mix defined for {first} + {second}")]
pub struct MalformedSpecialCombination {
    pub first: SpecialKind,
    pub second: SpecialKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no piece at {pos}")]
pub struct MissingPieceAtCoordinate {
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid position {input:?}: expected `row,col`")]
pub struct ParsePosError {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("board has no rows")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("unknown cell {found:?} at ({row}, {col})")]
    UnknownCell { row: usize, col: usize, found: char },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least 1x1, got {rows}x{cols}")]
    EmptyBoard { rows: usize, cols: usize },
    #[display("board side must not exceed {max}, got {rows}x{cols}")]
    BoardTooLarge { rows: usize, cols: usize, max: usize },
    #[display("color count must be between {min} and {max}, got {count}")]
    ColorCount { count: u8, min: u8, max: u8 },
    #[display("board is {found_rows}x{found_cols}, configured for {rows}x{cols}")]
    BoardSizeMismatch {
        rows: usize,
        cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
}
