use std::{fmt, mem};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    ConfigError, InputLockedError, SwapError,
    core::{Board, ColorSource, Piece, Pos, SeededColors},
    rules::{self, Expansion, Promotions},
};

use super::{ChainState, EffectEvent, EngineConfig, ScoreState, SessionStats, score_delta};

/// Externally visible state of the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum ResolverPhase {
    /// Stable board; swaps are accepted.
    Idle,
    /// Evaluating a swap or rescanning the board.
    Resolving,
    Removing,
    Refilling,
}

/// Result of an in-bounds, adjacent swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SwapOutcome {
    /// The swap formed a match or moved a special; a cascade is pending.
    Accepted,
    /// Nothing happened and the pieces went back.
    Reverted,
}

#[derive(Debug)]
enum Stage {
    Idle,
    Swapped { from: Pos, to: Pos },
    Removing(Expansion),
    Refilling,
    Rescanning,
}

/// A match-3 game: the board, its score and the cascade state machine.
///
/// Resolution proceeds in steps. [`try_swap`](Self::try_swap) commits a swap
/// and leaves a [`SwapCommitted`](EffectEvent::SwapCommitted) step pending;
/// each [`acknowledge`](Self::acknowledge) applies the next step (one
/// detonation wave, one removal, one refill or the final
/// [`CascadeStable`](EffectEvent::CascadeStable)) and returns its events.
/// Input stays locked until the cascade is stable again.
///
/// # Example
///
/// ```
/// use tilecrush_engine::{ColorSeed, EngineConfig, ResolverSession};
///
/// let config = EngineConfig::default().with_seed(ColorSeed::from_u128(42));
/// let mut session = ResolverSession::new(config)?;
///
/// if let Some(&(from, to)) = session.valid_swaps().first() {
///     session.try_swap(from, to)?;
///     let events = session.run_until_stable();
///     assert!(events.last().unwrap().is_cascade_stable());
/// }
/// assert!(session.phase().is_idle());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ResolverSession {
    config: EngineConfig,
    board: Board,
    source: Box<dyn ColorSource>,
    chain: ChainState,
    score: ScoreState,
    stats: SessionStats,
    stage: Stage,
    pending: Vec<EffectEvent>,
    cascade_score: u64,
    last_chain: u32,
}

impl fmt::Debug for ResolverSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverSession")
            .field("config", &self.config)
            .field("board", &self.board)
            .field("chain", &self.chain)
            .field("score", &self.score)
            .field("stats", &self.stats)
            .field("stage", &self.stage)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl ResolverSession {
    /// Starts a session on a freshly generated board, with colors drawn from
    /// the configured seed (or a random one).
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let source = config
            .seed
            .map_or_else(SeededColors::new, SeededColors::with_seed);
        Self::with_color_source(config, source)
    }

    /// Starts a session on a freshly generated board, with colors drawn from
    /// `source`.
    pub fn with_color_source<S>(config: EngineConfig, mut source: S) -> Result<Self, ConfigError>
    where
        S: ColorSource + 'static,
    {
        config.validate()?;
        let board = Board::generate(config.rows, config.cols, config.color_count, &mut source);
        Ok(Self::assemble(config, board, Box::new(source)))
    }

    /// Starts a session on an existing board.
    ///
    /// Runs already on the board are resolved by the cascade of the first
    /// accepted swap.
    pub fn from_board<S>(config: EngineConfig, board: Board, source: S) -> Result<Self, ConfigError>
    where
        S: ColorSource + 'static,
    {
        config.validate()?;
        config.check_board(&board)?;
        Ok(Self::assemble(config, board, Box::new(source)))
    }

    fn assemble(config: EngineConfig, board: Board, source: Box<dyn ColorSource>) -> Self {
        Self {
            config,
            board,
            source,
            chain: ChainState::new(),
            score: ScoreState::new(),
            stats: SessionStats::new(),
            stage: Stage::Idle,
            pending: Vec::new(),
            cascade_score: 0,
            last_chain: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    #[must_use]
    pub fn chain(&self) -> ChainState {
        self.chain
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn phase(&self) -> ResolverPhase {
        match self.stage {
            Stage::Idle => ResolverPhase::Idle,
            Stage::Swapped { .. } | Stage::Rescanning => ResolverPhase::Resolving,
            Stage::Removing(_) => ResolverPhase::Removing,
            Stage::Refilling => ResolverPhase::Refilling,
        }
    }

    /// Returns `true` while a cascade is in progress.
    #[must_use]
    pub fn is_input_locked(&self) -> bool {
        !self.phase().is_idle()
    }

    /// Events of the step that was applied but not yet acknowledged.
    #[must_use]
    pub fn pending_events(&self) -> &[EffectEvent] {
        &self.pending
    }

    /// Swaps the pieces at `from` and `to`, the piece at `from` being the one
    /// the player dragged.
    ///
    /// The swap is kept if either piece now sits in a run of three or more,
    /// or if either piece is special; otherwise the pieces go back and the
    /// session is left as it was.
    #[instrument(level = "debug", skip(self))]
    pub fn try_swap(&mut self, from: Pos, to: Pos) -> Result<SwapOutcome, SwapError> {
        if self.is_input_locked() {
            return Err(SwapError::InputLocked);
        }
        self.board.swap(from, to).map_err(SwapError::InvalidMove)?;

        if !swap_triggers(&self.board, from, to) {
            self.board.swap(to, from).map_err(SwapError::InvalidMove)?;
            self.stats.record_swap(false);
            debug!(%from, %to, "swap reverted");
            return Ok(SwapOutcome::Reverted);
        }

        self.stats.record_swap(true);
        debug!(%from, %to, "swap accepted");
        self.chain.reset();
        self.cascade_score = 0;
        self.last_chain = 0;
        self.stage = Stage::Swapped { from, to };
        self.pending = vec![EffectEvent::SwapCommitted { from, to }];
        Ok(SwapOutcome::Accepted)
    }

    /// Signals that the pending step has been animated and applies the next
    /// one.
    ///
    /// Returns the events of the new step, or `None` if the session was
    /// already idle.
    pub fn acknowledge(&mut self) -> Option<&[EffectEvent]> {
        self.pending.clear();
        while self.pending.is_empty() {
            if matches!(self.stage, Stage::Idle) {
                return None;
            }
            self.step();
        }
        Some(self.pending.as_slice())
    }

    /// Acknowledges every remaining step and returns all events, starting
    /// with the currently pending ones.
    pub fn run_until_stable(&mut self) -> Vec<EffectEvent> {
        let mut events = self.pending.clone();
        while let Some(step) = self.acknowledge() {
            events.extend_from_slice(step);
        }
        events
    }

    /// Every adjacent pair whose swap would be accepted, row-major.
    #[must_use]
    pub fn valid_swaps(&self) -> Vec<(Pos, Pos)> {
        if self.is_input_locked() {
            return Vec::new();
        }
        let (rows, cols) = (self.board.rows(), self.board.cols());
        let mut swaps = Vec::new();
        for from in self.board.positions() {
            for to in from.neighbors(rows, cols) {
                if to <= from {
                    continue;
                }
                let mut swapped = self.board.clone();
                if swapped.swap(from, to).is_ok() && swap_triggers(&swapped, from, to) {
                    swaps.push((from, to));
                }
            }
        }
        swaps
    }

    /// Starts a new game on a fresh board: score, chain and statistics go
    /// back to zero.
    pub fn restart(&mut self) -> Result<(), InputLockedError> {
        if self.is_input_locked() {
            return Err(InputLockedError);
        }
        let EngineConfig {
            rows,
            cols,
            color_count,
            ..
        } = self.config;
        self.board = Board::generate(rows, cols, color_count, &mut *self.source);
        self.score.reset();
        self.chain.reset();
        self.stats = SessionStats::new();
        self.pending.clear();
        self.cascade_score = 0;
        self.last_chain = 0;
        debug!("session restarted");
        Ok(())
    }

    fn step(&mut self) {
        match mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Idle => {}
            Stage::Swapped { from, to } => {
                let batch = self.swap_batch(from, to);
                self.stage = Stage::Removing(Expansion::new(&self.board, batch));
            }
            Stage::Removing(mut expansion) => {
                if expansion.is_exhausted() {
                    self.remove(expansion);
                    self.stage = Stage::Refilling;
                } else {
                    let detonations = expansion.detonate_wave(&mut self.board);
                    self.pending
                        .extend(detonations.into_iter().map(EffectEvent::from));
                    self.stage = Stage::Removing(expansion);
                }
            }
            Stage::Refilling => {
                self.refill();
                self.stage = Stage::Rescanning;
            }
            Stage::Rescanning => self.rescan(),
        }
    }

    /// Builds the first removal batch after an accepted swap.
    ///
    /// Each swapped piece is evaluated on its own; a promoted special lands on
    /// the swapped piece. When both pieces are special they are mixed into
    /// the piece at `to`.
    fn swap_batch(&mut self, from: Pos, to: Pos) -> Vec<Pos> {
        let board = &mut self.board;
        let groups = [to, from].map(|pos| (pos, rules::find_matches_at(board, pos)));
        let is_special = |pos: Pos| board.get(pos).is_some_and(Piece::is_special);
        let specials: Vec<Pos> = [to, from].into_iter().filter(|&pos| is_special(pos)).collect();

        let mut promotions = Promotions::default();
        for (anchor, group) in &groups {
            if !group.is_empty() {
                promotions.add_group(board, group, *anchor);
            }
        }
        let mut created = promotions.created.len();
        if specials.len() == 2 && matches!(rules::apply_mix(board, to, from), Ok(Some(_))) {
            created += 1;
        }
        self.stats.record_specials(created);

        let mut batch = promotions.removal;
        batch.extend(specials);
        batch
    }

    fn remove(&mut self, expansion: Expansion) {
        let queued = expansion.removal().len();
        let cleared = expansion.commit(&mut self.board);
        if cleared.is_empty() {
            return;
        }
        let chain = self.chain.current();
        let delta = score_delta(cleared.len(), chain);
        self.score.add(delta);
        self.cascade_score = self.cascade_score.saturating_add(delta);
        self.stats.record_batch(cleared.len(), chain);
        self.last_chain = chain;
        self.chain.advance();
        debug!(chain, queued, cleared = cleared.len(), delta, "batch removed");
        self.pending.push(EffectEvent::PiecesRemoved { cells: cleared });
    }

    fn refill(&mut self) {
        for col in 0..self.board.cols() {
            let moves =
                self.board
                    .refill_column(col, self.config.color_count, &mut *self.source);
            if !moves.is_empty() {
                self.pending.push(EffectEvent::ColumnRefilled { col, moves });
            }
        }
    }

    fn rescan(&mut self) {
        let groups = rules::find_runs(&self.board);
        if !groups.is_empty() {
            let promotions = Promotions::from_groups(&mut self.board, &groups);
            self.stats.record_specials(promotions.created.len());
            self.stage = Stage::Removing(Expansion::new(&self.board, promotions.removal));
            return;
        }

        let armed = rules::find_armed(&self.board);
        if !armed.is_empty() {
            debug!(count = armed.len(), "detonating armed pieces");
            self.stage = Stage::Removing(Expansion::new(&self.board, armed));
            return;
        }

        debug!(
            chain = self.last_chain,
            score_delta = self.cascade_score,
            total = self.score.total(),
            "cascade stable"
        );
        self.pending.push(EffectEvent::CascadeStable {
            chain: self.last_chain,
            score_delta: self.cascade_score,
        });
        self.chain.reset();
        self.stage = Stage::Idle;
    }
}

/// Whether a swap that already happened on `board` should be kept.
fn swap_triggers(board: &Board, from: Pos, to: Pos) -> bool {
    [from, to].into_iter().any(|pos| {
        board.get(pos).is_some_and(Piece::is_special)
            || !rules::find_matches_at(board, pos).is_empty()
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        Color, ColorSeed, InvalidMoveError, SpecialKind, find_armed, find_runs, is_stable,
    };

    use super::*;

    /// A 9x9 board with no runs, colored `(row + 2 * col) % 5`, with some
    /// cells replaced.
    fn pattern_board(overrides: &[((usize, usize), char)]) -> Board {
        let mut rows: Vec<Vec<char>> = (0..9)
            .map(|row| {
                (0..9)
                    .map(|col| Color::new(u8::try_from((row + 2 * col) % 5).unwrap()).as_char())
                    .collect()
            })
            .collect();
        for &((row, col), c) in overrides {
            rows[row][col] = c;
        }
        let text: Vec<String> = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        text.join("\n").parse().unwrap()
    }

    fn session(board: Board) -> ResolverSession {
        let source = SeededColors::with_seed(ColorSeed::from_u128(0x5eed));
        ResolverSession::from_board(EngineConfig::default(), board, source).unwrap()
    }

    fn four_in_a_row() -> Board {
        // Dragging the 9 at (3,4) down lines up (4,2)..=(4,5).
        pattern_board(&[((4, 2), '9'), ((4, 3), '9'), ((4, 5), '9'), ((3, 4), '9')])
    }

    fn count_kind(events: &[EffectEvent], wanted: SpecialKind) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, EffectEvent::SpecialDetonated { kind, .. } if *kind == wanted))
            .count()
    }

    #[test]
    fn test_pattern_board_is_stable() {
        assert!(is_stable(&pattern_board(&[])));
        assert!(is_stable(&four_in_a_row()));
    }

    #[test]
    fn test_four_in_a_row_makes_horizontal_stripe() {
        let mut s = session(four_in_a_row());
        let outcome = s.try_swap(Pos::new(3, 4), Pos::new(4, 4)).unwrap();
        assert_eq!(outcome, SwapOutcome::Accepted);
        assert_eq!(
            s.pending_events(),
            &[EffectEvent::SwapCommitted {
                from: Pos::new(3, 4),
                to: Pos::new(4, 4)
            }]
        );
        assert!(s.is_input_locked());

        let step = s.acknowledge().unwrap().to_vec();
        let removed = [Pos::new(4, 2), Pos::new(4, 3), Pos::new(4, 5)];
        assert_eq!(
            step,
            vec![EffectEvent::PiecesRemoved {
                cells: removed.into_iter().collect()
            }]
        );
        assert_eq!(
            s.board().get(Pos::new(4, 4)).and_then(Piece::special_kind),
            Some(SpecialKind::HorizontalStripe)
        );
        for pos in removed {
            assert_eq!(s.board().get(pos), None);
        }
        assert_eq!(s.score().total(), 9);
        assert_eq!(s.chain().current(), 2);
        assert_eq!(s.stats().specials_created(), 1);
        assert_eq!(s.phase(), ResolverPhase::Refilling);

        let refill = s.acknowledge().unwrap().to_vec();
        assert!(refill.iter().all(EffectEvent::is_column_refilled));
        let cols: Vec<usize> = refill
            .iter()
            .filter_map(|e| match e {
                EffectEvent::ColumnRefilled { col, .. } => Some(*col),
                _ => None,
            })
            .collect();
        assert_eq!(cols, vec![2, 3, 5]);
        assert!(s.board().is_full());

        s.run_until_stable();
        assert!(s.phase().is_idle());
        assert!(is_stable(s.board()));
    }

    #[test]
    fn test_two_bombs_mix_into_double_bomb() {
        let mut s = session(pattern_board(&[((4, 4), '*'), ((4, 5), '*')]));
        let from = Pos::new(4, 4);
        let to = Pos::new(4, 5);
        assert_eq!(s.try_swap(from, to), Ok(SwapOutcome::Accepted));

        let wave = s.acknowledge().unwrap().to_vec();
        assert_eq!(wave.len(), 1);
        let EffectEvent::SpecialDetonated {
            pos,
            kind,
            affected,
        } = &wave[0]
        else {
            panic!("expected a detonation, got {wave:?}");
        };
        assert_eq!(*pos, to);
        assert_eq!(*kind, SpecialKind::DoubleBomb);
        assert_eq!(affected.len(), 23);
        assert!(!affected.contains(&from));

        let removal = s.acknowledge().unwrap().to_vec();
        let [EffectEvent::PiecesRemoved { cells }] = removal.as_slice() else {
            panic!("expected a removal, got {removal:?}");
        };
        assert_eq!(cells.len(), 24);
        assert!(cells.contains(&from));
        assert_eq!(s.board().get(from), None);
        assert_eq!(
            s.board().get(to).and_then(Piece::special_kind),
            Some(SpecialKind::WaitingDoubleBomb)
        );
        assert!(!s.board().get(to).unwrap().is_retained());
        assert_eq!(s.stats().specials_created(), 1);

        let rest = s.run_until_stable();
        assert_eq!(
            count_kind(&rest, SpecialKind::WaitingDoubleBomb),
            1,
            "the armed piece goes off exactly once"
        );
        assert!(find_armed(s.board()).is_empty());
    }

    #[test]
    fn test_armed_bomb_detonates_once_and_is_removed() {
        // A bomb swapped with an ordinary piece detonates without any match.
        let mut s = session(pattern_board(&[((4, 4), '*')]));
        assert_eq!(
            s.try_swap(Pos::new(4, 4), Pos::new(4, 5)),
            Ok(SwapOutcome::Accepted)
        );
        let events = s.run_until_stable();

        let bombs = count_kind(&events, SpecialKind::Bomb)
            + count_kind(&events, SpecialKind::HorizontalBomb)
            + count_kind(&events, SpecialKind::VerticalBomb);
        let doubles = count_kind(&events, SpecialKind::DoubleBomb);
        assert!(bombs >= 1);
        assert_eq!(count_kind(&events, SpecialKind::WaitingBomb), bombs);
        assert_eq!(count_kind(&events, SpecialKind::WaitingDoubleBomb), doubles);
        assert!(find_armed(s.board()).is_empty());
        assert!(is_stable(s.board()));
    }

    #[test]
    fn test_armed_bomb_waits_while_runs_remain() {
        // The first refill drops 9s into (0,0)..=(0,2); the waiting bomb at
        // (8,1) must sit out the pass that clears that run.
        let config = EngineConfig {
            color_count: 10,
            ..EngineConfig::default()
        };
        let mut script = [9, 9, 9, 9, 9, 3, 4, 3].into_iter().cycle();
        let source = move || Color::new(script.next().unwrap());
        let board = pattern_board(&[((8, 0), '*')]);
        let mut s = ResolverSession::from_board(config, board, source).unwrap();

        let bomb_at = Pos::new(8, 1);
        assert_eq!(
            s.try_swap(Pos::new(8, 0), bomb_at),
            Ok(SwapOutcome::Accepted)
        );

        let step = s.acknowledge().unwrap().to_vec();
        let [EffectEvent::SpecialDetonated { pos, kind, affected }] = step.as_slice() else {
            panic!("expected one detonation, got {step:?}");
        };
        assert_eq!((*pos, *kind, affected.len()), (bomb_at, SpecialKind::Bomb, 5));

        let step = s.acknowledge().unwrap().to_vec();
        let [EffectEvent::PiecesRemoved { cells }] = step.as_slice() else {
            panic!("expected a removal, got {step:?}");
        };
        assert_eq!(cells.len(), 5);
        assert_eq!(s.score().total(), 25);

        let step = s.acknowledge().unwrap().to_vec();
        assert_eq!(step.len(), 3);
        assert!(step.iter().all(EffectEvent::is_column_refilled));

        // The rescan finds the run of 9s and leaves the armed piece alone.
        let step = s.acknowledge().unwrap().to_vec();
        let run = [Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2)];
        assert_eq!(
            step,
            vec![EffectEvent::PiecesRemoved {
                cells: run.into_iter().collect()
            }]
        );
        assert_eq!(s.score().total(), 25 + 144);
        assert_eq!(find_armed(s.board()), vec![bomb_at]);

        let step = s.acknowledge().unwrap().to_vec();
        assert!(step.iter().all(EffectEvent::is_column_refilled));
        assert!(is_stable(s.board()));

        // No run left, so the armed piece goes off.
        let step = s.acknowledge().unwrap().to_vec();
        let [EffectEvent::SpecialDetonated { pos, kind, affected }] = step.as_slice() else {
            panic!("expected the armed piece to go off, got {step:?}");
        };
        assert_eq!(
            (*pos, *kind, affected.len()),
            (bomb_at, SpecialKind::WaitingBomb, 5)
        );

        let step = s.acknowledge().unwrap().to_vec();
        let [EffectEvent::PiecesRemoved { cells }] = step.as_slice() else {
            panic!("expected a removal, got {step:?}");
        };
        assert_eq!(cells.len(), 6);
        assert!(cells.contains(&bomb_at));
        assert_eq!(s.score().total(), 25 + 144 + 2916);
        assert_eq!(s.stats().longest_chain(), 3);
        assert!(find_armed(s.board()).is_empty());
    }

    #[test]
    fn test_invalid_swap_leaves_board_untouched() {
        let board = four_in_a_row();
        let mut s = session(board.clone());
        let from = Pos::new(0, 0);
        for to in [Pos::new(0, 2), Pos::new(1, 1), Pos::new(0, 0), Pos::new(0, 9)] {
            assert_eq!(
                s.try_swap(from, to),
                Err(SwapError::InvalidMove(InvalidMoveError { from, to }))
            );
        }
        assert_eq!(s.board(), &board);
        assert_eq!(s.board().to_string(), board.to_string());
        assert!(s.pending_events().is_empty());
        assert!(s.phase().is_idle());
        assert_eq!(s.stats(), &SessionStats::new());
    }

    #[test]
    fn test_swap_without_match_is_reverted() {
        let board = pattern_board(&[]);
        let mut s = session(board.clone());
        assert_eq!(
            s.try_swap(Pos::new(0, 0), Pos::new(0, 1)),
            Ok(SwapOutcome::Reverted)
        );
        assert_eq!(s.board(), &board);
        assert!(s.phase().is_idle());
        assert!(s.pending_events().is_empty());
        assert_eq!(s.stats().reverted_swaps(), 1);
        assert_eq!(s.acknowledge(), None);
    }

    #[test]
    fn test_input_locked_during_cascade() {
        let mut s = session(four_in_a_row());
        s.try_swap(Pos::new(3, 4), Pos::new(4, 4)).unwrap();
        assert_eq!(
            s.try_swap(Pos::new(0, 0), Pos::new(0, 1)),
            Err(SwapError::InputLocked)
        );
        assert_eq!(s.restart(), Err(InputLockedError));
        assert!(s.valid_swaps().is_empty());

        let events = s.run_until_stable();
        assert!(events.first().unwrap().is_swap_committed());
        let EffectEvent::CascadeStable { chain, score_delta } = events.last().unwrap() else {
            panic!("cascade did not end stable");
        };
        assert!(*chain >= 1);
        assert_eq!(*score_delta, s.score().total());
        assert_eq!(s.chain().current(), 1);
        assert!(!s.is_input_locked());
    }

    #[test]
    fn test_valid_swaps_lists_match_forming_pairs() {
        let s = session(four_in_a_row());
        let swaps = s.valid_swaps();
        assert!(swaps.contains(&(Pos::new(3, 4), Pos::new(4, 4))));
        for &(from, to) in &swaps {
            assert!(from < to);
            assert!(from.is_adjacent(to));
        }
        // Listing swaps never changes the board.
        assert_eq!(s.board(), &four_in_a_row());
    }

    #[test]
    fn test_seeded_sessions_are_deterministic() {
        let config = EngineConfig::default().with_seed(ColorSeed::from_u128(0xdead_beef));
        let play = || {
            let mut s = ResolverSession::new(config.clone()).unwrap();
            let mut log = Vec::new();
            for _ in 0..10 {
                let Some(&(from, to)) = s.valid_swaps().first() else {
                    break;
                };
                assert_eq!(s.try_swap(from, to), Ok(SwapOutcome::Accepted));
                log.extend(s.run_until_stable());
                assert!(is_stable(s.board()));
                assert!(find_armed(s.board()).is_empty());
                assert!(s.board().is_full());
            }
            (s.board().clone(), s.score().total(), log)
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_random_sessions_end_stable() {
        for seed in 0..8 {
            let config = EngineConfig::default().with_seed(ColorSeed::from_u128(seed));
            let mut s = ResolverSession::new(config).unwrap();
            assert!(find_runs(s.board()).is_empty());
            for _ in 0..5 {
                let swaps = s.valid_swaps();
                let Some(&(from, to)) = swaps.last() else {
                    break;
                };
                s.try_swap(from, to).unwrap();
                let events = s.run_until_stable();
                assert!(events.last().unwrap().is_cascade_stable());
                assert!(is_stable(s.board()));
            }
        }
    }

    #[test]
    fn test_restart_resets_score_and_stats() {
        let mut s = session(four_in_a_row());
        s.try_swap(Pos::new(3, 4), Pos::new(4, 4)).unwrap();
        s.run_until_stable();
        assert!(s.score().total() > 0);

        s.restart().unwrap();
        assert_eq!(s.score().total(), 0);
        assert_eq!(s.stats(), &SessionStats::new());
        assert!(s.board().is_full());
        assert!(is_stable(s.board()));
    }

    #[test]
    fn test_from_board_checks_size() {
        let config = EngineConfig {
            rows: 3,
            ..EngineConfig::default()
        };
        let source = SeededColors::with_seed(ColorSeed::from_u128(1));
        assert!(matches!(
            ResolverSession::from_board(config, pattern_board(&[]), source),
            Err(ConfigError::BoardSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_injected_color_source() {
        let config = EngineConfig {
            rows: 4,
            cols: 4,
            ..EngineConfig::default()
        };
        let s = ResolverSession::with_color_source(config, || Color::new(0)).unwrap();
        assert!(s.board().is_full());
        assert!(is_stable(s.board()));
    }
}
