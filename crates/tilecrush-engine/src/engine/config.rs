use serde::{Deserialize, Serialize};

use crate::{ConfigError, core::{Board, Color, ColorSeed}};

/// Board dimensions, palette size and color seed of a session.
///
/// Every field has a default, so a partial JSON object such as
/// `{"rows": 6}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rows: usize,
    pub cols: usize,
    pub color_count: u8,
    /// Seed for the default color source; drawn at random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<ColorSeed>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: Self::DEFAULT_ROWS,
            cols: Self::DEFAULT_COLS,
            color_count: Self::DEFAULT_COLOR_COUNT,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub const DEFAULT_ROWS: usize = 9;
    pub const DEFAULT_COLS: usize = 9;
    pub const DEFAULT_COLOR_COUNT: u8 = 5;

    pub const MAX_SIDE: usize = 64;
    /// Fewer colors could make a run-free fill impossible.
    pub const MIN_COLOR_COUNT: u8 = 3;
    pub const MAX_COLOR_COUNT: u8 = Color::MAX_COUNT;

    #[must_use]
    pub fn with_seed(mut self, seed: ColorSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            rows,
            cols,
            color_count,
            ..
        } = *self;
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyBoard { rows, cols });
        }
        if rows > Self::MAX_SIDE || cols > Self::MAX_SIDE {
            return Err(ConfigError::BoardTooLarge {
                rows,
                cols,
                max: Self::MAX_SIDE,
            });
        }
        if !(Self::MIN_COLOR_COUNT..=Self::MAX_COLOR_COUNT).contains(&color_count) {
            return Err(ConfigError::ColorCount {
                count: color_count,
                min: Self::MIN_COLOR_COUNT,
                max: Self::MAX_COLOR_COUNT,
            });
        }
        Ok(())
    }

    /// Checks that `board` has the configured dimensions.
    pub fn check_board(&self, board: &Board) -> Result<(), ConfigError> {
        if board.rows() == self.rows && board.cols() == self.cols {
            Ok(())
        } else {
            Err(ConfigError::BoardSizeMismatch {
                rows: self.rows,
                cols: self.cols,
                found_rows: board.rows(),
                found_cols: board.cols(),
            })
        }
    }
}
