//! Breadth-first area-effect expansion.
//!
//! An [`Expansion`] starts from a removal batch: ordinary pieces go straight
//! into the removal set, specials form the first wave. Each call to
//! [`Expansion::detonate_wave`] detonates one wave and queues the specials it
//! hits as the next one. Every cell is claimed at most once per pass, keyed
//! by coordinate.

use std::mem;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    MissingPieceAtCoordinate,
    core::{Board, CellSet, PieceKind, Pos, SpecialKind},
};

use super::special::definition;

/// One special piece going off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detonation {
    pub pos: Pos,
    pub kind: SpecialKind,
    /// Cells newly claimed by this detonation, excluding its own cell.
    pub affected: CellSet,
}

/// Expansion state of one removal pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    claimed: CellSet,
    wave: Vec<Pos>,
    removal: CellSet,
    retained: CellSet,
}

impl Expansion {
    /// Seeds an expansion with a removal batch.
    ///
    /// Duplicate and empty cells are skipped.
    #[must_use]
    pub fn new<I>(board: &Board, batch: I) -> Self
    where
        I: IntoIterator<Item = Pos>,
    {
        let mut expansion = Self::default();
        expansion.queue(board, batch);
        expansion
    }

    /// Like [`new`](Self::new), but treats `already` as claimed.
    #[must_use]
    pub fn with_claimed<I>(board: &Board, batch: I, already: &CellSet) -> Self
    where
        I: IntoIterator<Item = Pos>,
    {
        let mut expansion = Self {
            claimed: already.clone(),
            ..Self::default()
        };
        expansion.queue(board, batch);
        expansion
    }

    fn queue<I>(&mut self, board: &Board, batch: I)
    where
        I: IntoIterator<Item = Pos>,
    {
        for pos in batch {
            let Some(piece) = board.get(pos) else {
                trace!("{}", MissingPieceAtCoordinate { pos });
                continue;
            };
            if !self.claimed.insert(pos) {
                continue;
            }
            if piece.is_special() {
                self.wave.push(pos);
            } else {
                self.removal.insert(pos);
            }
        }
    }

    /// Returns `true` once no special is left to detonate.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.wave.is_empty()
    }

    /// Specials that go off in the next wave.
    #[must_use]
    pub fn wave(&self) -> &[Pos] {
        &self.wave
    }

    /// Cells that [`commit`](Self::commit) will clear.
    #[must_use]
    pub fn removal(&self) -> &CellSet {
        &self.removal
    }

    /// Detonates the current wave and queues the specials it hits.
    ///
    /// Pieces with an armed form turn into it and are retained for this
    /// pass; every other detonating piece joins the removal set. Spent
    /// pieces are removed without an area effect or event.
    pub fn detonate_wave(&mut self, board: &mut Board) -> Vec<Detonation> {
        let wave = mem::take(&mut self.wave);
        let in_wave: CellSet = wave.iter().copied().collect();
        let mut next = Vec::new();
        let mut detonations = Vec::with_capacity(wave.len());

        for pos in wave {
            let Some(piece) = board.get(pos) else {
                trace!("{}", MissingPieceAtCoordinate { pos });
                continue;
            };
            let PieceKind::Special(kind) = piece.kind() else {
                self.removal.insert(pos);
                continue;
            };

            let mut affected = CellSet::new();
            for cell in definition(kind).affected_cells(board, pos) {
                if self.claimed.contains(&cell) || in_wave.contains(&cell) {
                    continue;
                }
                let Some(target) = board.get(cell) else {
                    continue;
                };
                self.claimed.insert(cell);
                affected.insert(cell);
                if target.is_special() {
                    next.push(cell);
                } else {
                    self.removal.insert(cell);
                }
            }

            match (kind.armed_form(), board.get_mut(pos)) {
                (Some(armed), Some(piece)) => {
                    piece.set_kind(PieceKind::Special(armed));
                    piece.set_retained(true);
                    self.retained.insert(pos);
                }
                _ => {
                    self.removal.insert(pos);
                }
            }
            detonations.push(Detonation {
                pos,
                kind,
                affected,
            });
        }

        self.wave = next;
        detonations
    }

    /// Runs every remaining wave.
    pub fn detonate_all(&mut self, board: &mut Board) -> Vec<Detonation> {
        let mut detonations = Vec::new();
        while !self.is_exhausted() {
            detonations.extend(self.detonate_wave(board));
        }
        detonations
    }

    /// Clears the removal set from the board, skipping retained pieces, and
    /// drops the retain flags. Returns the cells actually cleared.
    pub fn commit(self, board: &mut Board) -> CellSet {
        let mut cleared = CellSet::new();
        for &pos in &self.removal {
            if self.retained.contains(&pos) {
                continue;
            }
            if board.take(pos).is_some() {
                cleared.insert(pos);
            } else {
                trace!("{}", MissingPieceAtCoordinate { pos });
            }
        }
        for &pos in &self.retained {
            if let Some(piece) = board.get_mut(pos) {
                piece.set_retained(false);
            }
        }
        cleared
    }
}

/// Expands `trigger` to a fixed point and returns every newly claimed cell.
///
/// Cells in `already` are neither claimed nor detonated again. Detonating
/// pieces are transitioned on `board` like in a real pass, but nothing is
/// removed.
pub fn expand(board: &mut Board, trigger: &[Pos], already: &CellSet) -> CellSet {
    let mut expansion = Expansion::with_claimed(board, trigger.iter().copied(), already);
    expansion.detonate_all(board);
    expansion
        .claimed
        .into_iter()
        .filter(|pos| !already.contains(pos))
        .collect()
}

/// Every armed piece on the board, row-major.
#[must_use]
pub fn find_armed(board: &Board) -> Vec<Pos> {
    board
        .pieces()
        .filter(|(_, piece)| piece.is_armed())
        .map(|(pos, _)| pos)
        .collect()
}
