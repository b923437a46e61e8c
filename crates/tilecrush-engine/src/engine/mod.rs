//! Cascade resolution and session state.
//!
//! This module drives the [`rules`](crate::rules) through a full cascade:
//!
//! - [`ResolverSession`] - Board, score and the step-by-step cascade state machine
//! - [`EffectEvent`] - State changes reported to the renderer, one step at a time
//! - [`EngineConfig`] - Board size, palette size and color seed
//! - [`ScoreState`], [`ChainState`], [`SessionStats`] - Counters kept across swaps
//!
//! # Cascade Flow
//!
//! 1. A player swap is accepted if it forms a run or moves a special piece
//! 2. The swapped pieces are promoted or mixed, and specials detonate wave by wave
//! 3. Affected pieces are removed and scored at the current chain index
//! 4. Columns fall and refill from the top
//! 5. The whole board is rescanned; new runs (or armed pieces) go back to step 2
//! 6. Once nothing is left to remove, the chain resets and input unlocks
//!
//! Each step is committed before its events are handed out, and the next one
//! only runs after [`ResolverSession::acknowledge`].
//!
//! # Example
//!
//! ```
//! use tilecrush_engine::{Board, Color, EffectEvent, EngineConfig, Pos, ResolverSession};
//!
//! let board: Board = "
//!     0120
//!     1002
//!     2012
//!     0121
//! "
//! .parse()?;
//! let config = EngineConfig { rows: 4, cols: 4, ..EngineConfig::default() };
//! let mut session = ResolverSession::from_board(config, board, || Color::new(4))?;
//!
//! // Drag the 0 at (0,3) down into the row of zeros.
//! session.try_swap(Pos::new(0, 3), Pos::new(1, 3))?;
//! let events = session.acknowledge().unwrap();
//! assert!(matches!(events, [EffectEvent::PiecesRemoved { .. }]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{config::*, events::*, resolver::*, score::*};

mod config;
mod events;
mod resolver;
mod score;
