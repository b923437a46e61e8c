use std::cmp::Reverse;

use tracing::{trace, warn};

use crate::{
    MalformedSpecialCombination,
    core::{Board, Piece, PieceKind, Pos, SpecialKind},
};

use super::matching::{MatchGroup, Orientation};

/// How many matched pieces a group needs to promote into a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Exactly(usize),
    AtLeast(usize),
}

impl Trigger {
    #[must_use]
    pub const fn accepts(self, len: usize) -> bool {
        match self {
            Self::Exactly(n) => len == n,
            Self::AtLeast(n) => len >= n,
        }
    }
}

/// Mix element of a special kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    Bomb,
    Stripe,
}

/// Sorted pair of elements identifying a two-special combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixKey(Element, Element);

impl MixKey {
    #[must_use]
    pub fn new(a: Element, b: Element) -> Self {
        Self(a.min(b), a.max(b))
    }
}

/// One entry of the special registry.
#[derive(Debug, Clone, Copy)]
pub struct SpecialTypeDefinition {
    pub kind: SpecialKind,
    /// Promotion rule; kinds produced only by mixing or detonation have none.
    pub trigger: Option<Trigger>,
    /// Required group orientation for promotion, or the direction handed
    /// down when the kind takes part in a mix.
    pub orientation: Option<Orientation>,
    pub element: Option<Element>,
    /// Element pair this kind is produced from when two specials are mixed.
    pub mixed_from: Option<MixKey>,
    area: fn(Pos, Pos) -> bool,
}

impl SpecialTypeDefinition {
    /// Whether detonating this kind at `anchor` affects `cell`.
    #[must_use]
    pub fn affects(&self, anchor: Pos, cell: Pos) -> bool {
        (self.area)(anchor, cell)
    }

    /// Every cell of `board` this kind affects when detonated at `anchor`,
    /// in row-major order. Includes the anchor itself.
    pub fn affected_cells(&self, board: &Board, anchor: Pos) -> impl Iterator<Item = Pos> + use<> {
        let area = self.area;
        board.positions().filter(move |&cell| area(anchor, cell))
    }
}

fn within(anchor: Pos, cell: Pos, radius: usize) -> bool {
    anchor.row().abs_diff(cell.row()) <= radius && anchor.col().abs_diff(cell.col()) <= radius
}

fn square_3x3(anchor: Pos, cell: Pos) -> bool {
    within(anchor, cell, 1)
}

fn square_5x5(anchor: Pos, cell: Pos) -> bool {
    within(anchor, cell, 2)
}

fn same_col(anchor: Pos, cell: Pos) -> bool {
    anchor.col() == cell.col()
}

fn same_row(anchor: Pos, cell: Pos) -> bool {
    anchor.row() == cell.row()
}

fn three_cols(anchor: Pos, cell: Pos) -> bool {
    anchor.col().abs_diff(cell.col()) <= 1
}

fn three_rows(anchor: Pos, cell: Pos) -> bool {
    anchor.row().abs_diff(cell.row()) <= 1
}

fn row_and_col(anchor: Pos, cell: Pos) -> bool {
    same_row(anchor, cell) || same_col(anchor, cell)
}

/// The special registry, indexed by `SpecialKind as usize`.
pub static REGISTRY: [SpecialTypeDefinition; SpecialKind::LEN] = [
    SpecialTypeDefinition {
        kind: SpecialKind::Bomb,
        trigger: Some(Trigger::AtLeast(5)),
        orientation: None,
        element: Some(Element::Bomb),
        mixed_from: None,
        area: square_3x3,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::HorizontalStripe,
        trigger: Some(Trigger::Exactly(4)),
        orientation: Some(Orientation::Row),
        element: Some(Element::Stripe),
        mixed_from: None,
        area: same_col,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::VerticalStripe,
        trigger: Some(Trigger::Exactly(4)),
        orientation: Some(Orientation::Col),
        element: Some(Element::Stripe),
        mixed_from: None,
        area: same_row,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::WaitingBomb,
        trigger: None,
        orientation: None,
        element: None,
        mixed_from: None,
        area: square_3x3,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::DoubleBomb,
        trigger: None,
        orientation: None,
        element: None,
        mixed_from: Some(MixKey(Element::Bomb, Element::Bomb)),
        area: square_5x5,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::WaitingDoubleBomb,
        trigger: None,
        orientation: None,
        element: None,
        mixed_from: None,
        area: square_5x5,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::HorizontalBomb,
        trigger: None,
        orientation: Some(Orientation::Row),
        element: None,
        mixed_from: Some(MixKey(Element::Bomb, Element::Stripe)),
        area: three_cols,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::VerticalBomb,
        trigger: None,
        orientation: Some(Orientation::Col),
        element: None,
        mixed_from: Some(MixKey(Element::Bomb, Element::Stripe)),
        area: three_rows,
    },
    SpecialTypeDefinition {
        kind: SpecialKind::Cross,
        trigger: None,
        orientation: None,
        element: None,
        mixed_from: Some(MixKey(Element::Stripe, Element::Stripe)),
        area: row_and_col,
    },
];

#[must_use]
pub fn definition(kind: SpecialKind) -> &'static SpecialTypeDefinition {
    &REGISTRY[kind as usize]
}

/// Picks the special kind a match group promotes into, if any.
///
/// Minimum-count rules are tried before exact-count rules, so a group of
/// five or more is always a bomb even when four of its members line up.
#[must_use]
pub fn promote(group: &MatchGroup) -> Option<SpecialKind> {
    let len = group.len();
    let at_least = REGISTRY
        .iter()
        .filter(|def| matches!(def.trigger, Some(Trigger::AtLeast(_))));
    let exactly = REGISTRY
        .iter()
        .filter(|def| matches!(def.trigger, Some(Trigger::Exactly(_))));
    at_least
        .chain(exactly)
        .find(|def| {
            def.trigger.is_some_and(|t| t.accepts(len))
                && def
                    .orientation
                    .is_none_or(|o| group.orientation() == Some(o))
        })
        .map(|def| def.kind)
}

/// Chooses the member of a merged group that becomes the promoted piece.
///
/// Prefers the member with the most 4-neighbors inside the group, then the
/// one closest (Manhattan) to the center of the group's bounding box, then
/// the smallest `(row, col)`.
#[must_use]
pub fn choose_anchor(group: &MatchGroup) -> Option<Pos> {
    let members = group.members();
    let min_row = members.iter().map(|p| p.row()).min()?;
    let max_row = members.iter().map(|p| p.row()).max()?;
    let min_col = members.iter().map(|p| p.col()).min()?;
    let max_col = members.iter().map(|p| p.col()).max()?;

    // Distances are doubled so a half-cell center stays integral.
    let center_distance =
        |p: Pos| (2 * p.row()).abs_diff(min_row + max_row) + (2 * p.col()).abs_diff(min_col + max_col);
    let neighbors = |p: Pos| members.iter().filter(|&&q| p.is_adjacent(q)).count();

    members
        .iter()
        .copied()
        .min_by_key(|&p| (Reverse(neighbors(p)), center_distance(p), p))
}

/// Looks up the kind produced by swapping special `a` onto special `b`.
///
/// The element pair is order-insensitive. For bomb-and-stripe, the direction
/// comes from `a` if it carries one, otherwise from `b`.
pub fn mix(a: SpecialKind, b: SpecialKind) -> Result<SpecialKind, MalformedSpecialCombination> {
    let malformed = MalformedSpecialCombination {
        first: a,
        second: b,
    };
    let (def_a, def_b) = (definition(a), definition(b));
    let (Some(elem_a), Some(elem_b)) = (def_a.element, def_b.element) else {
        return Err(malformed);
    };
    let key = MixKey::new(elem_a, elem_b);
    let direction = def_a.orientation.or(def_b.orientation);
    REGISTRY
        .iter()
        .find(|def| {
            def.mixed_from == Some(key) && def.orientation.is_none_or(|o| direction == Some(o))
        })
        .map(|def| def.kind)
        .ok_or(malformed)
}

/// Applies a mix on the board after a swap of two specials.
///
/// `dest` is where the dragged piece landed; it becomes the mixed kind and
/// `other` becomes spent. Returns `Ok(None)` if either slot holds no special
/// kind. A failed lookup leaves both pieces untouched.
pub fn apply_mix(
    board: &mut Board,
    dest: Pos,
    other: Pos,
) -> Result<Option<SpecialKind>, MalformedSpecialCombination> {
    let kind_at = |pos: Pos| board.get(pos).and_then(Piece::special_kind);
    let (Some(a), Some(b)) = (kind_at(dest), kind_at(other)) else {
        return Ok(None);
    };
    let mixed = mix(a, b).inspect_err(|e| warn!(%dest, %other, "{e}"))?;
    if let Some(piece) = board.get_mut(dest) {
        piece.set_kind(PieceKind::Special(mixed));
    }
    if let Some(piece) = board.get_mut(other) {
        piece.set_kind(PieceKind::Spent);
    }
    Ok(Some(mixed))
}

/// Outcome of promoting a set of match groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Promotions {
    /// Cells to clear as ordinary matched pieces.
    pub removal: Vec<Pos>,
    /// Pieces turned into specials, with their new kind.
    pub created: Vec<(Pos, SpecialKind)>,
}

impl Promotions {
    /// Promotes `group` with the given anchor, or removes the whole group if
    /// it earns no special.
    pub fn add_group(&mut self, board: &mut Board, group: &MatchGroup, anchor: Pos) {
        if let Some(kind) = promote(group) {
            match board.get_mut(anchor) {
                Some(piece) => {
                    piece.set_kind(PieceKind::Special(kind));
                    self.created.push((anchor, kind));
                }
                None => trace!(%anchor, "promotion anchor is empty"),
            }
        }
        for &pos in group.members() {
            // Anchors promoted by this or an earlier group stay on the board.
            if self.created.iter().any(|&(p, _)| p == pos) {
                continue;
            }
            if !self.removal.contains(&pos) {
                self.removal.push(pos);
            }
        }
    }

    /// Promotes every merged group of a full-board scan, each at its
    /// [`choose_anchor`] cell.
    pub fn from_groups(board: &mut Board, groups: &[MatchGroup]) -> Self {
        let mut promotions = Self::default();
        for group in groups {
            if let Some(anchor) = choose_anchor(group) {
                promotions.add_group(board, group, anchor);
            }
        }
        promotions
    }
}
