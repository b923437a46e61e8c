use serde::{Deserialize, Serialize};

use crate::{
    core::{CellSet, FallMove, Pos, SpecialKind},
    rules::Detonation,
};

/// A logical state change the renderer may animate.
///
/// Events are grouped into steps; the resolver waits for each step to be
/// acknowledged before applying the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EffectEvent {
    SwapCommitted {
        from: Pos,
        to: Pos,
    },
    SpecialDetonated {
        pos: Pos,
        kind: SpecialKind,
        affected: CellSet,
    },
    PiecesRemoved {
        cells: CellSet,
    },
    ColumnRefilled {
        col: usize,
        moves: Vec<FallMove>,
    },
    /// The board is stable and input is unlocked again.
    CascadeStable {
        /// Chain index of the last removal batch, or 0 if nothing was removed.
        chain: u32,
        /// Score gained over the whole cascade.
        score_delta: u64,
    },
}

impl From<Detonation> for EffectEvent {
    fn from(d: Detonation) -> Self {
        Self::SpecialDetonated {
            pos: d.pos,
            kind: d.kind,
            affected: d.affected,
        }
    }
}
